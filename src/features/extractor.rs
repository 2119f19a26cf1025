//! Feature derivation from a transaction's graph neighborhood
//!
//! Each transaction is resolved to at most one of each neighbor:
//!
//! ```text
//! (User)-[:OWNS]->(Account)-[:INITIATED]->(Transaction)
//! (Transaction)-[:FROM_LOCATION]->(Location)
//! (Transaction)-[:USING_DEVICE]->(Device)
//! (Transaction)-[:USING_IP]->(IPAddress)
//! (User)-[:KNOWS]->(User)
//! ```
//!
//! Missing neighbors are not errors; they produce the zero value of the
//! feature they would have fed (or the configured policy for Location).

use super::vector::FeatureVector;
use crate::config::{FeatureConfig, MissingLocationPolicy};
use crate::error::{FraudError, FraudResult};
use crate::graph::{GraphStore, Node, NodeKind, PropertyValue, RelKind};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};
use tracing::debug;

/// Timestamp layouts accepted besides RFC 3339
const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// The resolved neighbors of one transaction
#[derive(Debug, Clone, Copy)]
pub struct TransactionContext<'a> {
    pub transaction: &'a Node,
    pub from_account: Option<&'a Node>,
    pub to_account: Option<&'a Node>,
    pub owner: Option<&'a Node>,
    pub location: Option<&'a Node>,
    pub device: Option<&'a Node>,
    pub ip_address: Option<&'a Node>,
    pub merchant: Option<&'a Node>,
}

impl<'a> TransactionContext<'a> {
    /// Resolve the neighborhood of `transaction_id`; `None` if no such transaction
    pub fn resolve(store: &'a GraphStore, transaction_id: &str) -> Option<Self> {
        store
            .node_by_key(NodeKind::Transaction, transaction_id)
            .map(|transaction| Self::around(store, transaction))
    }

    /// Resolve the neighborhood of a transaction node already in hand
    pub fn around(store: &'a GraphStore, transaction: &'a Node) -> Self {
        let id = transaction.id;
        let from_account = store.in_neighbor(id, RelKind::Initiated);
        let owner = from_account.and_then(|account| store.in_neighbor(account.id, RelKind::Owns));

        Self {
            transaction,
            from_account,
            to_account: store.out_neighbor(id, RelKind::Completed),
            owner,
            location: store.out_neighbor(id, RelKind::FromLocation),
            device: store.out_neighbor(id, RelKind::UsingDevice),
            ip_address: store.out_neighbor(id, RelKind::UsingIp),
            merchant: store.out_neighbor(id, RelKind::At),
        }
    }
}

/// Derives [`FeatureVector`]s from the graph
#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor {
    config: FeatureConfig,
}

impl FeatureExtractor {
    pub fn new(config: FeatureConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Features of one transaction; `Ok(None)` when the id is unknown
    pub fn extract_features(
        &self,
        store: &GraphStore,
        transaction_id: &str,
    ) -> FraudResult<Option<FeatureVector>> {
        match TransactionContext::resolve(store, transaction_id.trim()) {
            Some(context) => self.vector_for(store, &context).map(Some),
            None => {
                debug!("Transaction '{}' not found", transaction_id);
                Ok(None)
            }
        }
    }

    /// Features of every transaction, in ingestion order
    pub fn extract_all(&self, store: &GraphStore) -> FraudResult<Vec<(String, FeatureVector)>> {
        store
            .nodes_of_kind(NodeKind::Transaction)
            .into_iter()
            .map(|tx| {
                self.vector_for(store, &TransactionContext::around(store, tx))
                    .map(|vector| (tx.key.clone(), vector))
            })
            .collect()
    }

    /// Compute the vector for an already resolved neighborhood
    pub fn vector_for(
        &self,
        store: &GraphStore,
        context: &TransactionContext<'_>,
    ) -> FraudResult<FeatureVector> {
        let tx = context.transaction;

        let amount = match tx.get_property("amount") {
            Some(value) if !value.is_absent() => value
                .to_f64()
                .filter(|a| a.is_finite())
                .ok_or_else(|| invalid(tx, "amount", value))?,
            _ => 0.0,
        };

        let hour = match tx.get_property("date") {
            Some(value) if !value.is_absent() => value
                .as_string()
                .and_then(parse_hour)
                .ok_or_else(|| invalid(tx, "date", value))?,
            _ => 0,
        };

        let is_foreign = match context.location.and_then(|loc| loc.get_str("country")) {
            Some(country) => country.trim() != self.config.home_country,
            None => self.config.missing_location_policy == MissingLocationPolicy::Foreign,
        };

        let device_risk = context
            .device
            .and_then(|d| d.get_str("device_type"))
            .map(|kind| self.config.risky_device_types.iter().any(|r| r == kind))
            .unwrap_or(false);

        let ip_risk = context
            .ip_address
            .and_then(|ip| ip.get_str("ip_address"))
            .map(|addr| {
                self.config
                    .risky_ip_prefixes
                    .iter()
                    .any(|prefix| addr.trim().starts_with(prefix.as_str()))
            })
            .unwrap_or(false);

        let user_connections = context
            .owner
            .map(|user| store.outgoing(user.id, RelKind::Knows).count())
            .unwrap_or(0);

        Ok(FeatureVector::new(
            amount,
            is_foreign,
            device_risk,
            ip_risk,
            hour,
            user_connections,
        ))
    }
}

/// Hour of day from a timestamp, in the timestamp's own offset.
///
/// A bare date is midnight.
pub fn parse_hour(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.hour());
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts.hour());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().map(|_| 0)
}

fn invalid(node: &Node, field: &'static str, value: &PropertyValue) -> FraudError {
    FraudError::InvalidAttribute {
        kind: node.kind,
        key: node.key.clone(),
        field,
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{NodeId, PropertyMap};

    fn attrs(pairs: &[(&str, PropertyValue)]) -> PropertyMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn node(store: &mut GraphStore, kind: NodeKind, key: &str, pairs: &[(&str, PropertyValue)]) -> NodeId {
        store.merge_node(kind, key, attrs(pairs)).unwrap().0
    }

    /// Users 1 and 2, A1 owned by 1, A2 owned by 2, T1 from A1 to A2
    fn base_graph(date: &str) -> GraphStore {
        let mut store = GraphStore::new();
        let u1 = node(&mut store, NodeKind::User, "1", &[]);
        let u2 = node(&mut store, NodeKind::User, "2", &[]);
        let a1 = node(&mut store, NodeKind::Account, "A1", &[]);
        let a2 = node(&mut store, NodeKind::Account, "A2", &[]);
        let t1 = node(
            &mut store,
            NodeKind::Transaction,
            "T1",
            &[("amount", 9000.0.into()), ("date", date.into())],
        );
        store.merge_edge(RelKind::Owns, u1, a1).unwrap();
        store.merge_edge(RelKind::Owns, u2, a2).unwrap();
        store.merge_edge(RelKind::Initiated, a1, t1).unwrap();
        store.merge_edge(RelKind::Completed, t1, a2).unwrap();
        store
    }

    #[test]
    fn test_bare_transaction_has_zero_risk_flags() {
        let store = base_graph("2024-03-05 14:22:10");
        let v = FeatureExtractor::default()
            .extract_features(&store, "T1")
            .unwrap()
            .unwrap();
        assert_eq!(v.to_array(), [9000.0, 0.0, 0.0, 0.0, 14.0, 0.0]);
    }

    #[test]
    fn test_unknown_transaction_is_none() {
        let store = base_graph("2024-03-05");
        assert!(FeatureExtractor::default()
            .extract_features(&store, "T404")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_linked_neighbors_set_flags() {
        let mut store = base_graph("2024-03-05T23:59:00");
        let t1 = store.find_node(NodeKind::Transaction, "T1").unwrap();
        let loc = node(&mut store, NodeKind::Location, "L1", &[("country", "France".into())]);
        let dev = node(&mut store, NodeKind::Device, "D1", &[("device_type", "Mobile".into())]);
        let ip = node(&mut store, NodeKind::IPAddress, "IP1", &[("ip_address", "203.0.113.7".into())]);
        store.merge_edge(RelKind::FromLocation, t1, loc).unwrap();
        store.merge_edge(RelKind::UsingDevice, t1, dev).unwrap();
        store.merge_edge(RelKind::UsingIp, t1, ip).unwrap();

        let u1 = store.find_node(NodeKind::User, "1").unwrap();
        let u2 = store.find_node(NodeKind::User, "2").unwrap();
        let u3 = node(&mut store, NodeKind::User, "3", &[]);
        store.merge_edge(RelKind::Knows, u1, u2).unwrap();
        store.merge_edge(RelKind::Knows, u1, u3).unwrap();
        // Incoming KNOWS does not count
        store.merge_edge(RelKind::Knows, u3, u1).unwrap();

        let v = FeatureExtractor::default()
            .extract_features(&store, "T1")
            .unwrap()
            .unwrap();
        assert_eq!(v.to_array(), [9000.0, 1.0, 1.0, 1.0, 23.0, 2.0]);
    }

    #[test]
    fn test_home_country_and_safe_device() {
        let mut store = base_graph("2024-03-05 08:00");
        let t1 = store.find_node(NodeKind::Transaction, "T1").unwrap();
        let loc = node(&mut store, NodeKind::Location, "L1", &[("country", "USA".into())]);
        let dev = node(&mut store, NodeKind::Device, "D1", &[("device_type", "Desktop".into())]);
        let ip = node(&mut store, NodeKind::IPAddress, "IP1", &[("ip_address", "10.0.0.1".into())]);
        store.merge_edge(RelKind::FromLocation, t1, loc).unwrap();
        store.merge_edge(RelKind::UsingDevice, t1, dev).unwrap();
        store.merge_edge(RelKind::UsingIp, t1, ip).unwrap();

        let v = FeatureExtractor::default()
            .extract_features(&store, "T1")
            .unwrap()
            .unwrap();
        assert_eq!((v.is_foreign, v.device_risk, v.ip_risk, v.hour), (0.0, 0.0, 0.0, 8.0));
    }

    #[test]
    fn test_missing_location_policy() {
        let store = base_graph("2024-03-05");
        let config = FeatureConfig {
            missing_location_policy: MissingLocationPolicy::Foreign,
            ..FeatureConfig::default()
        };
        let v = FeatureExtractor::new(config)
            .extract_features(&store, "T1")
            .unwrap()
            .unwrap();
        assert_eq!(v.is_foreign, 1.0);
    }

    #[test]
    fn test_unparseable_date_is_invalid_attribute() {
        let store = base_graph("next tuesday");
        let err = FeatureExtractor::default()
            .extract_features(&store, "T1")
            .unwrap_err();
        assert!(matches!(
            err,
            FraudError::InvalidAttribute { field: "date", ref key, .. } if key == "T1"
        ));
    }

    #[test]
    fn test_string_amount_is_parsed() {
        let mut store = GraphStore::new();
        node(
            &mut store,
            NodeKind::Transaction,
            "T9",
            &[("amount", "250.75".into()), ("date", PropertyValue::Null)],
        );
        let v = FeatureExtractor::default()
            .extract_features(&store, "T9")
            .unwrap()
            .unwrap();
        assert_eq!(v.to_array(), [250.75, 0.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_extract_all_in_ingestion_order() {
        let mut store = base_graph("2024-03-05 10:00:00");
        node(&mut store, NodeKind::Transaction, "T0", &[("amount", 5i64.into())]);
        let rows = FeatureExtractor::default().extract_all(&store).unwrap();
        let keys: Vec<_> = rows.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["T1", "T0"]);
        assert_eq!(rows[1].1.amount, 5.0);
    }

    #[test]
    fn test_parse_hour_formats() {
        assert_eq!(parse_hour("2024-03-05T14:22:10+05:30"), Some(14));
        assert_eq!(parse_hour("2024-03-05T21:00:00Z"), Some(21));
        assert_eq!(parse_hour("2024-03-05 07:15:00.250"), Some(7));
        assert_eq!(parse_hour("2024-03-05 07:15"), Some(7));
        assert_eq!(parse_hour("2024-03-05"), Some(0));
        assert_eq!(parse_hour("05/03/2024"), None);
    }
}
