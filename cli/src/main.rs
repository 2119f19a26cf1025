//! Fraudgraph CLI: ingest datasets, export features, trace fraud paths
//!
//! The graph lives in memory; between invocations it is kept in a bincode
//! snapshot file (`--snapshot`).

use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use fraudgraph::{FraudConfig, FraudService, FEATURE_NAMES};
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "fraudgraph", version, about = "Fraud-detection property graph")]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true, env = "FRAUDGRAPH_CONFIG")]
    config: Option<PathBuf>,

    /// Graph snapshot file
    #[arg(long, default_value = "fraudgraph.snap", global = true, env = "FRAUDGRAPH_SNAPSHOT")]
    snapshot: PathBuf,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest a directory of entity files and save the snapshot
    Ingest {
        /// Directory holding users.json, accounts.json, ... (or .jsonl)
        #[arg(long)]
        data_dir: PathBuf,
    },
    /// Write the feature table for every transaction
    Features {
        /// Output file (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Enumerate fraud paths starting at an account
    Paths {
        account: String,

        #[arg(long)]
        max_hops: Option<usize>,

        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show a transaction, its neighbors, features and label
    Transaction { id: String },
    /// Classify a feature vector given as a JSON object
    Classify {
        /// e.g. '{"amount": 9000, "is_foreign": 0, ...}'
        #[arg(long)]
        json: String,
    },
    /// Node and edge counts of the snapshot
    Stats,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> CliResult {
    let config = match &cli.config {
        Some(path) => FraudConfig::load(path)?,
        None => FraudConfig::default(),
    };
    let service = FraudService::new(config);

    match cli.command {
        Commands::Ingest { data_dir } => {
            run_ingest(&service, &data_dir, &cli.snapshot, &cli.format).await
        }
        Commands::Features { out } => {
            service.load_snapshot(&cli.snapshot).await?;
            run_features(&service, out.as_deref(), &cli.format).await
        }
        Commands::Paths {
            account,
            max_hops,
            limit,
        } => {
            service.load_snapshot(&cli.snapshot).await?;
            run_paths(&service, &account, max_hops, limit, &cli.format).await
        }
        Commands::Transaction { id } => {
            service.load_snapshot(&cli.snapshot).await?;
            run_transaction(&service, &id, &cli.format).await
        }
        Commands::Classify { json } => run_classify(&service, &json, &cli.format),
        Commands::Stats => {
            service.load_snapshot(&cli.snapshot).await?;
            run_stats(&service, &cli.format).await
        }
    }
}

async fn run_ingest(
    service: &FraudService,
    data_dir: &Path,
    snapshot: &Path,
    format: &OutputFormat,
) -> CliResult {
    // Re-ingesting into an existing snapshot only refreshes attributes
    if snapshot.is_file() {
        service.load_snapshot(snapshot).await?;
    }
    let reports = service.ingest_dataset(data_dir).await?;
    service.save_snapshot(snapshot).await?;

    match format {
        OutputFormat::Json => {
            let rows: Vec<_> = reports
                .iter()
                .map(|r| {
                    serde_json::json!({
                        "kind": r.kind.to_string(),
                        "processed": r.processed,
                        "succeeded": r.succeeded,
                        "failed": r.failed,
                        "nodes_created": r.nodes_created,
                        "nodes_updated": r.nodes_updated,
                        "edges_created": r.edges_created,
                        "errors": r.errors.iter().map(ToString::to_string).collect::<Vec<_>>(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec![
                "Kind", "Processed", "Succeeded", "Failed", "Created", "Updated", "New edges",
            ]);
            for r in &reports {
                table.add_row(vec![
                    r.kind.to_string(),
                    r.processed.to_string(),
                    r.succeeded.to_string(),
                    r.failed.to_string(),
                    r.nodes_created.to_string(),
                    r.nodes_updated.to_string(),
                    r.edges_created.to_string(),
                ]);
            }
            println!("{}", table);
            for err in reports.iter().flat_map(|r| &r.errors) {
                eprintln!("  {}", err);
            }
            println!("Snapshot written to {}", snapshot.display());
        }
    }
    Ok(())
}

async fn run_features(service: &FraudService, out: Option<&Path>, format: &OutputFormat) -> CliResult {
    let rows = service.extract_all().await?;

    match (format, out) {
        (OutputFormat::Json, None) => {
            let json: Vec<_> = rows
                .iter()
                .map(|(id, v)| serde_json::json!({ "transaction_id": id, "features": v }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        (_, Some(path)) => {
            let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
            let written = fraudgraph::features::write_feature_table(&mut file, &rows)?;
            eprintln!("Wrote {} row(s) to {}", written, path.display());
        }
        (OutputFormat::Table, None) => {
            let mut stdout = std::io::stdout().lock();
            fraudgraph::features::write_feature_table(&mut stdout, &rows)?;
        }
    }
    Ok(())
}

async fn run_paths(
    service: &FraudService,
    account: &str,
    max_hops: Option<usize>,
    limit: Option<usize>,
    format: &OutputFormat,
) -> CliResult {
    let paths = service.find_fraud_paths(account, max_hops, limit).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&paths)?),
        OutputFormat::Table => {
            if paths.is_empty() {
                println!("(no paths)");
                return Ok(());
            }
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["#", "To", "Hops", "Path"]);
            for (i, path) in paths.iter().enumerate() {
                let chain: Vec<String> = path
                    .nodes
                    .iter()
                    .map(|n| format!("{}({})", n.label, n.key))
                    .collect();
                table.add_row(vec![
                    (i + 1).to_string(),
                    path.end().map(|n| n.key.clone()).unwrap_or_default(),
                    path.hops().to_string(),
                    chain.join(" - "),
                ]);
            }
            println!("{}", table);
            println!("{} path(s)", paths.len());
        }
    }
    Ok(())
}

async fn run_transaction(service: &FraudService, id: &str, format: &OutputFormat) -> CliResult {
    let Some(view) = service.transaction_view(id).await? else {
        println!("Transaction '{}' not found", id);
        return Ok(());
    };
    let features = service.extract_features(id).await?;
    let label = features.as_ref().map(|v| service.classify(v)).transpose()?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "view": view,
                "features": features,
                "label": label,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["Role", "Node", "Attributes"]);
            let roles = [
                ("transaction", Some(&view.transaction)),
                ("from_account", view.from_account.as_ref()),
                ("to_account", view.to_account.as_ref()),
                ("owner", view.owner.as_ref()),
                ("location", view.location.as_ref()),
                ("device", view.device.as_ref()),
                ("ip_address", view.ip_address.as_ref()),
                ("merchant", view.merchant.as_ref()),
            ];
            for (role, node) in roles {
                let Some(node) = node else { continue };
                let attrs: Vec<String> = node
                    .properties
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, v))
                    .collect();
                table.add_row(vec![
                    role.to_string(),
                    format!("{}({})", node.label, node.key),
                    attrs.join(", "),
                ]);
            }
            println!("{}", table);

            if let Some(vector) = features {
                let values = vector.to_array();
                let pairs: Vec<String> = FEATURE_NAMES
                    .iter()
                    .zip(values)
                    .map(|(name, value)| format!("{}={}", name, value))
                    .collect();
                println!("Features: {}", pairs.join(", "));
            }
            if let Some(label) = label {
                println!("Label:    {}", label);
            }
        }
    }
    Ok(())
}

fn run_classify(service: &FraudService, json: &str, format: &OutputFormat) -> CliResult {
    let features: IndexMap<String, f64> = serde_json::from_str(json)?;
    let label = service.classify_named(&features)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "label": label })),
        OutputFormat::Table => println!("{}", label),
    }
    Ok(())
}

async fn run_stats(service: &FraudService, format: &OutputFormat) -> CliResult {
    let stats = service.statistics().await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        OutputFormat::Table => {
            let mut table = Table::new();
            table.set_header(vec!["Type", "Count"]);
            for (kind, count) in &stats.nodes_by_kind {
                table.add_row(vec![kind.to_string(), count.to_string()]);
            }
            for (rel, count) in &stats.edges_by_rel {
                table.add_row(vec![rel.to_string(), count.to_string()]);
            }
            println!("{}", table);
            println!("Nodes: {}", stats.node_count);
            println!("Edges: {}", stats.edge_count);
        }
    }
    Ok(())
}
