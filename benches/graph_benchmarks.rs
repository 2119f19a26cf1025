use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use fraudgraph::algo::find_fraud_paths;
use fraudgraph::features::FeatureExtractor;
use fraudgraph::graph::{GraphStore, PropertyValue};
use fraudgraph::ingest::{record, EntityKind, IngestionEngine, Record};

/// `accounts` users/accounts and `accounts * 4` transfers in a ring-ish pattern
fn build_graph(accounts: usize) -> GraphStore {
    let engine = IngestionEngine::new();
    let mut store = GraphStore::new();

    let users: Vec<Record> = (0..accounts)
        .map(|i| record([("user_id", PropertyValue::Integer(i as i64))]))
        .collect();
    engine.ingest(&mut store, EntityKind::Users, users);

    let owned: Vec<Record> = (0..accounts)
        .map(|i| {
            record([
                ("account_id", PropertyValue::from(format!("A{}", i))),
                ("user_id", PropertyValue::Integer(i as i64)),
            ])
        })
        .collect();
    engine.ingest(&mut store, EntityKind::Accounts, owned);

    let transfers: Vec<Record> = (0..accounts * 4)
        .map(|i| {
            let from = i % accounts;
            let to = (i * 7 + 1) % accounts;
            record([
                ("transaction_id", PropertyValue::from(format!("T{}", i))),
                ("amount", PropertyValue::Float((i % 10_000) as f64)),
                ("date", PropertyValue::from(format!("2024-03-05 {:02}:00:00", i % 24))),
                ("from_account", PropertyValue::from(format!("A{}", from))),
                ("to_account", PropertyValue::from(format!("A{}", to))),
            ])
        })
        .collect();
    engine.ingest(&mut store, EntityKind::Transactions, transfers);

    let links: Vec<Record> = (0..accounts)
        .map(|i| record([("user_id", i as i64), ("knows_user_id", ((i + 1) % accounts) as i64)]))
        .collect();
    engine.ingest(&mut store, EntityKind::Connections, links);
    store
}

/// Benchmark batch ingestion throughput
fn bench_ingestion(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingestion");

    for size in [100, 1000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| criterion::black_box(build_graph(size).edge_count()));
        });
    }
    group.finish();
}

/// Benchmark single and bulk feature extraction
fn bench_feature_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("feature_extraction");
    let extractor = FeatureExtractor::default();

    for size in [100, 1000].iter() {
        let store = build_graph(*size);
        group.bench_with_input(BenchmarkId::new("single", size), size, |b, _| {
            b.iter(|| criterion::black_box(extractor.extract_features(&store, "T42").ok()));
        });
        group.bench_with_input(BenchmarkId::new("all", size), size, |b, _| {
            b.iter(|| criterion::black_box(extractor.extract_all(&store).map(|rows| rows.len()).ok()));
        });
    }
    group.finish();
}

/// Benchmark bounded fraud-path enumeration
fn bench_fraud_paths(c: &mut Criterion) {
    let mut group = c.benchmark_group("fraud_paths");
    let store = build_graph(1000);

    for hops in [2, 4, 6].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(hops), hops, |b, &hops| {
            b.iter(|| criterion::black_box(find_fraud_paths(&store, "A0", hops, 10).len()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_ingestion, bench_feature_extraction, bench_fraud_paths);
criterion_main!(benches);
