//! Re-ingesting the same data must not change the graph

use fraudgraph::graph::{GraphStore, NodeKind, PropertyMap, PropertyValue, RelKind};
use fraudgraph::ingest::{ingest_dataset, record, EntityKind, IngestionEngine};
use fraudgraph::persistence::{load_snapshot, save_snapshot};
use tempfile::TempDir;

type Fingerprint = (
    Vec<(NodeKind, String, PropertyMap)>,
    Vec<(RelKind, String, String)>,
);

/// Everything observable about the graph except IDs and timestamps
fn fingerprint(store: &GraphStore) -> Fingerprint {
    let nodes = store
        .all_nodes()
        .map(|n| (n.kind, n.key.clone(), n.properties.clone()))
        .collect();
    let key = |id| store.get_node(id).map(|n| n.key.clone()).unwrap_or_default();
    let edges = store
        .all_edges()
        .map(|e| (e.rel, key(e.source), key(e.target)))
        .collect();
    (nodes, edges)
}

fn write_dataset(dir: &TempDir) {
    let files = [
        ("users.json", r#"[
            {"user_id": 1, "name": "Alice", "age": 34, "email": "alice@example.com"},
            {"user_id": 2, "name": "Bob", "age": 41, "email": null}
        ]"#),
        ("locations.json", r#"[
            {"location_id": "L1", "country": "USA", "city": "Austin"},
            {"location_id": "L2", "country": "Nigeria", "city": "Lagos"}
        ]"#),
        ("merchants.json", r#"[{"merchant_id": "M1", "name": "Grocer", "industry": "Food"}]"#),
        ("accounts.json", r#"[
            {"account_id": "A1", "user_id": 1, "account_type": "checking", "status": "active"},
            {"account_id": "A2", "user_id": 2.0, "account_type": "savings", "status": "active"}
        ]"#),
        ("devices.json", r#"[{"device_id": "D1", "device_type": "Mobile", "os": "Android", "user_id": 2}]"#),
        ("ip_addresses.json", r#"[
            {"ip_address_id": "IP1", "ip_address": "203.0.113.9", "location_id": "L2"},
            {"ip_address_id": "IP2", "ip_address": "10.1.1.1", "location_id": "L1"},
            {"ip_address_id": "IP3", "ip_address": "10.1.1.2", "location_id": null}
        ]"#),
        ("connections.json", r#"[{"user_id": 1, "knows_user_id": 2}]"#),
    ];
    for (name, body) in files {
        std::fs::write(dir.path().join(name), body).unwrap();
    }

    let transactions = [
        r#"{"transaction_id": "T1", "amount": 9000, "date": "2024-03-05 14:22:10", "from_account": "A1", "to_account": "A2", "merchant_id": "M1", "location_id": "L1"}"#,
        r#"{"transaction_id": "T2", "amount": 15.5, "date": "2024-03-06T23:01:00Z", "from_account": "A2", "to_account": "A1", "device_id": "D1", "ip_address_id": "IP1"}"#,
        r#"{"transaction_id": "T3", "amount": 20, "date": "2024-03-06", "from_account": "A9"}"#,
    ];
    std::fs::write(dir.path().join("transactions.jsonl"), transactions.join("\n")).unwrap();
}

#[test]
fn test_repeated_dataset_ingestion_is_idempotent() {
    let dir = TempDir::new().unwrap();
    write_dataset(&dir);
    let engine = IngestionEngine::new();

    let mut once = GraphStore::new();
    let first = ingest_dataset(&engine, &mut once, dir.path()).unwrap();
    assert_eq!(first.len(), 8);
    let tx_report = first
        .iter()
        .find(|r| r.kind == EntityKind::Transactions)
        .unwrap();
    assert_eq!((tx_report.succeeded, tx_report.failed), (2, 1));
    let ip_report = first
        .iter()
        .find(|r| r.kind == EntityKind::IPAddresses)
        .unwrap();
    // IP3 has no location
    assert_eq!((ip_report.succeeded, ip_report.failed), (2, 1));

    let mut many = GraphStore::new();
    for _ in 0..3 {
        ingest_dataset(&engine, &mut many, dir.path()).unwrap();
    }

    assert_eq!(fingerprint(&once), fingerprint(&many));
    assert_eq!(once.statistics(), many.statistics());

    let again = ingest_dataset(&engine, &mut many, dir.path()).unwrap();
    assert!(again.iter().all(|r| r.nodes_created == 0 && r.edges_created == 0));
}

#[test]
fn test_idempotent_for_in_memory_batches() {
    let engine = IngestionEngine::new();
    let batch = || {
        vec![
            record([("user_id", 7i64)]),
            record([("user_id", 8i64)]),
        ]
    };
    let links = || vec![record([("user_id", 7i64), ("knows_user_id", 8i64)])];

    let mut store = GraphStore::new();
    for _ in 0..5 {
        engine.ingest(&mut store, EntityKind::Users, batch());
        engine.ingest(&mut store, EntityKind::Connections, links());
    }
    assert_eq!(store.node_count(), 2);
    assert_eq!(store.edge_count(), 1);
}

#[test]
fn test_attributes_are_last_write_wins() {
    let engine = IngestionEngine::new();
    let mut store = GraphStore::new();
    engine.ingest(
        &mut store,
        EntityKind::Users,
        vec![record([("user_id", "5"), ("name", "Eve"), ("email", "eve@old.example")])],
    );
    engine.ingest(
        &mut store,
        EntityKind::Users,
        vec![record([("user_id", "5"), ("name", "Eve Adams")])],
    );

    let user = store.node_by_key(NodeKind::User, "5").unwrap();
    assert_eq!(user.get_str("name"), Some("Eve Adams"));
    assert!(user.get_property("email").map_or(true, |v| *v == PropertyValue::Null));
    assert_eq!(store.node_count(), 1);
}

#[test]
fn test_snapshot_reload_matches_live_graph() {
    let dir = TempDir::new().unwrap();
    write_dataset(&dir);
    let engine = IngestionEngine::new();
    let mut store = GraphStore::new();
    ingest_dataset(&engine, &mut store, dir.path()).unwrap();

    let snap = dir.path().join("graph.snap");
    save_snapshot(&store, &snap).unwrap();
    let mut reloaded = load_snapshot(&snap).unwrap();
    assert_eq!(fingerprint(&store), fingerprint(&reloaded));

    // Ingesting into the reloaded graph behaves like ingesting into the live graph
    ingest_dataset(&engine, &mut reloaded, dir.path()).unwrap();
    assert_eq!(fingerprint(&store), fingerprint(&reloaded));
}
