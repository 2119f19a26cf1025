//! End-to-end scenarios: ingestion through features, scoring and paths
//!
//! This test exercises:
//! - Ingestion with referential integrity
//! - Feature extraction on a bare and a fully linked transaction
//! - Classification with the reference scorer
//! - Bounded fraud-path queries

use fraudgraph::features::FeatureExtractor;
use fraudgraph::graph::{GraphStore, NodeKind, PropertyValue, RelKind};
use fraudgraph::ingest::{record, EntityKind, IngestionEngine, Record};
use fraudgraph::*;

fn users() -> Vec<Record> {
    vec![
        record([("user_id", PropertyValue::Integer(1)), ("name", "Alice".into())]),
        record([("user_id", PropertyValue::Integer(2)), ("name", "Bob".into())]),
        record([("user_id", PropertyValue::Integer(3)), ("name", "Carol".into())]),
    ]
}

fn accounts() -> Vec<Record> {
    vec![
        record([("account_id", "A1"), ("user_id", "1"), ("status", "active")]),
        record([("account_id", "A2"), ("user_id", "2"), ("status", "active")]),
        record([("account_id", "A3"), ("user_id", "3"), ("status", "frozen")]),
    ]
}

fn transfer(id: &str, from: &str, to: &str, amount: f64, date: &str) -> Record {
    record([
        ("transaction_id", PropertyValue::from(id)),
        ("amount", amount.into()),
        ("date", date.into()),
        ("from_account", from.into()),
        ("to_account", to.into()),
    ])
}

/// Users {1,2,3}, accounts A1..A3, T1 A1->A2 for 9000, T2 A2->A3 for 40
fn scenario_store() -> GraphStore {
    let engine = IngestionEngine::new();
    let mut store = GraphStore::new();
    assert!(engine.ingest(&mut store, EntityKind::Users, users()).is_clean());
    assert!(engine.ingest(&mut store, EntityKind::Accounts, accounts()).is_clean());
    let report = engine.ingest(
        &mut store,
        EntityKind::Transactions,
        vec![
            transfer("T1", "A1", "A2", 9000.0, "2024-03-05 14:22:10"),
            transfer("T2", "A2", "A3", 40.0, "2024-03-06T09:05:00"),
        ],
    );
    assert!(report.is_clean(), "{:?}", report.errors);
    store
}

#[test]
fn test_large_transfer_is_classified_as_fraud() {
    let store = scenario_store();
    let extractor = FeatureExtractor::default();

    let vector = extractor.extract_features(&store, "T1").unwrap().unwrap();
    assert_eq!(vector.to_array(), [9000.0, 0.0, 0.0, 0.0, 14.0, 0.0]);

    let facade: ScoringFacade = ScoringFacade::default();
    assert_eq!(facade.classify(&vector).unwrap(), FraudLabel::Fraud);

    let small = extractor.extract_features(&store, "T2").unwrap().unwrap();
    assert_eq!(small.hour, 9.0);
    assert_eq!(facade.classify(&small).unwrap(), FraudLabel::Legitimate);
}

#[test]
fn test_user_connections_follow_the_initiating_owner() {
    let engine = IngestionEngine::new();
    let mut store = scenario_store();
    let report = engine.ingest(
        &mut store,
        EntityKind::Connections,
        vec![
            record([("user_id", 1i64), ("knows_user_id", 2i64)]),
            record([("user_id", 1i64), ("knows_user_id", 3i64)]),
            record([("user_id", 2i64), ("knows_user_id", 1i64)]),
        ],
    );
    assert!(report.is_clean());

    let extractor = FeatureExtractor::default();
    let t1 = extractor.extract_features(&store, "T1").unwrap().unwrap();
    let t2 = extractor.extract_features(&store, "T2").unwrap().unwrap();
    assert_eq!(t1.user_connections, 2.0);
    assert_eq!(t2.user_connections, 1.0);
}

#[test]
fn test_fully_linked_transaction() {
    let engine = IngestionEngine::new();
    let mut store = scenario_store();

    engine.ingest(
        &mut store,
        EntityKind::Locations,
        vec![record([("location_id", "L1"), ("country", "Brazil"), ("city", "Recife")])],
    );
    engine.ingest(
        &mut store,
        EntityKind::Devices,
        vec![record([("device_id", "D1"), ("device_type", "Tablet"), ("user_id", "1")])],
    );
    engine.ingest(
        &mut store,
        EntityKind::IPAddresses,
        vec![record([("ip_address_id", "IP1"), ("ip_address", "198.51.100.4"), ("location_id", "L1")])],
    );
    engine.ingest(
        &mut store,
        EntityKind::Merchants,
        vec![record([("merchant_id", "M1"), ("name", "Kiosk"), ("industry", "Retail")])],
    );
    let report = engine.ingest(
        &mut store,
        EntityKind::Transactions,
        vec![record([
            ("transaction_id", PropertyValue::from("T3")),
            ("amount", PropertyValue::Float(75.0)),
            ("date", "2024-03-07T02:10:00-03:00".into()),
            ("from_account", "A1".into()),
            ("to_account", "A3".into()),
            ("merchant_id", "M1".into()),
            ("device_id", "D1".into()),
            ("location_id", "L1".into()),
            ("ip_address_id", "IP1".into()),
        ])],
    );
    assert!(report.is_clean(), "{:?}", report.errors);
    assert_eq!(report.edges_created, 6);

    let vector = FeatureExtractor::default()
        .extract_features(&store, "T3")
        .unwrap()
        .unwrap();
    assert_eq!(vector.to_array(), [75.0, 1.0, 1.0, 1.0, 2.0, 0.0]);

    let view = features::transaction_view(&store, "T3").unwrap();
    assert_eq!(view.merchant.map(|m| m.key), Some("M1".to_string()));
    assert_eq!(view.owner.map(|u| u.key), Some("1".to_string()));
}

#[test]
fn test_dangling_account_reference_is_reported() {
    let engine = IngestionEngine::new();
    let mut store = scenario_store();
    let edges_before = store.edge_count();

    let report = engine.ingest(
        &mut store,
        EntityKind::Transactions,
        vec![transfer("T9", "A1", "A404", 10.0, "2024-03-05")],
    );

    assert_eq!(report.failed, 1);
    assert!(matches!(
        &report.errors[0],
        IngestionError::DanglingReference { field: "to_account", target_key, .. } if target_key == "A404"
    ));
    assert!(store.find_node(NodeKind::Transaction, "T9").is_none());
    assert_eq!(store.edge_count(), edges_before);
}

#[test]
fn test_bare_transaction_is_null_safe() {
    let engine = IngestionEngine::new();
    let mut store = GraphStore::new();
    engine.ingest(
        &mut store,
        EntityKind::Transactions,
        vec![record([
            ("transaction_id", PropertyValue::from("T1")),
            ("amount", PropertyValue::Integer(12)),
            ("date", PropertyValue::Null),
            ("device_id", PropertyValue::Null),
            ("location_id", "".into()),
        ])],
    );

    let vector = FeatureExtractor::default()
        .extract_features(&store, "T1")
        .unwrap()
        .unwrap();
    assert_eq!(vector.to_array(), [12.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    assert_eq!(vector.to_named().len(), FEATURE_NAMES.len());
}

#[test]
fn test_feature_extraction_is_deterministic() {
    let store = scenario_store();
    let extractor = FeatureExtractor::default();
    let first = extractor.extract_features(&store, "T1").unwrap().unwrap();
    let second = extractor.extract_features(&store, "T1").unwrap().unwrap();
    assert_eq!(
        first.to_array().map(f64::to_bits),
        second.to_array().map(f64::to_bits)
    );
}

#[test]
fn test_fraud_paths() {
    let store = scenario_store();

    let paths = find_fraud_paths(&store, "A1", 2, 10);
    assert_eq!(paths.len(), 1);
    let keys: Vec<_> = paths[0].nodes.iter().map(|n| n.key.as_str()).collect();
    assert_eq!(keys, ["A1", "T1", "A2"]);
    let labels: Vec<_> = paths[0].nodes.iter().map(|n| n.label).collect();
    assert_eq!(labels, [NodeKind::Account, NodeKind::Transaction, NodeKind::Account]);

    let longer = find_fraud_paths(&store, "A1", 4, 10);
    assert_eq!(longer.len(), 2);
    assert_eq!(longer[1].hops(), 4);
    assert_eq!(longer[1].end().map(|n| n.key.as_str()), Some("A3"));

    for path in find_fraud_paths(&store, "A2", 2, 10) {
        assert!(path.hops() <= 2);
    }
    assert!(find_fraud_paths(&store, "A2", 2, 1).len() <= 1);
}

#[test]
fn test_unknown_account_has_no_paths() {
    let store = scenario_store();
    assert!(find_fraud_paths(&store, "Z9", 3, 10).is_empty());
}

#[test]
fn test_repointed_transaction_keeps_single_initiator() {
    let engine = IngestionEngine::new();
    let mut store = scenario_store();
    engine.ingest(
        &mut store,
        EntityKind::Transactions,
        vec![transfer("T1", "A3", "A2", 9000.0, "2024-03-05 14:22:10")],
    );

    let t1 = store.find_node(NodeKind::Transaction, "T1").unwrap();
    assert_eq!(store.incoming(t1, RelKind::Initiated).count(), 1);
    assert_eq!(
        store.in_neighbor(t1, RelKind::Initiated).map(|a| a.key.as_str()),
        Some("A3")
    );
    assert!(find_fraud_paths(&store, "A1", 2, 10).is_empty());
}
