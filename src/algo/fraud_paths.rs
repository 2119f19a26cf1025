//! Bounded fraud-path enumeration between accounts
//!
//! A fraud path starts at the queried Account and ends at a different
//! Account, stepping over INITIATED / COMPLETED edges in either direction.
//! Paths are relationship-unique (no edge is walked twice) but may revisit
//! nodes, so a chain can pass through intermediate accounts.
//!
//! Enumeration is breadth-first over partial paths: all paths of `n` hops are
//! produced before any of `n + 1` hops, and within a level partial paths
//! expand in the order they were discovered, trying incident edges in edge
//! insertion order. Truncation at `limit` is therefore reproducible for a
//! given graph state.

use crate::graph::{EdgeId, GraphStore, NodeId, NodeKind, NodeView, RelKind};
use serde::Serialize;
use std::collections::VecDeque;
use tracing::debug;

/// Relationship types a fraud path may traverse
pub const FRAUD_PATH_RELS: [RelKind; 2] = [RelKind::Initiated, RelKind::Completed];

/// One hop of a path, in traversal direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PathStep {
    pub rel: RelKind,
    /// True when the edge was walked against its stored direction
    pub reversed: bool,
}

/// An account-to-account path; `nodes.len() == steps.len() + 1`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FraudPath {
    pub nodes: Vec<NodeView>,
    pub steps: Vec<PathStep>,
}

impl FraudPath {
    /// Number of relationship hops
    pub fn hops(&self) -> usize {
        self.steps.len()
    }

    /// Account the path arrives at
    pub fn end(&self) -> Option<&NodeView> {
        self.nodes.last()
    }
}

/// A partial path under expansion
#[derive(Debug, Clone)]
struct Frontier {
    nodes: Vec<NodeId>,
    edges: Vec<EdgeId>,
    steps: Vec<PathStep>,
}

impl Frontier {
    fn tip(&self) -> NodeId {
        // Never empty: created with the origin and only ever extended
        self.nodes[self.nodes.len() - 1]
    }
}

/// Enumerate up to `limit` fraud paths of 1..=`max_hops` hops from `account_id`.
///
/// An unknown account (or `limit == 0`, or `max_hops == 0`) yields no paths.
pub fn find_fraud_paths(
    store: &GraphStore,
    account_id: &str,
    max_hops: usize,
    limit: usize,
) -> Vec<FraudPath> {
    let Some(origin) = store.find_node(NodeKind::Account, account_id.trim()) else {
        debug!("Account '{}' not found, no paths", account_id);
        return Vec::new();
    };
    if limit == 0 || max_hops == 0 {
        return Vec::new();
    }

    let mut results = Vec::new();
    let mut queue = VecDeque::new();
    queue.push_back(Frontier {
        nodes: vec![origin],
        edges: Vec::new(),
        steps: Vec::new(),
    });

    while let Some(partial) = queue.pop_front() {
        if partial.steps.len() >= max_hops {
            continue;
        }
        let tip = partial.tip();

        for edge in store.incident_edges(tip, &FRAUD_PATH_RELS) {
            if partial.edges.contains(&edge.id) {
                continue;
            }
            let Some(next) = edge.other_end(tip) else {
                continue;
            };

            let mut extended = partial.clone();
            extended.nodes.push(next);
            extended.edges.push(edge.id);
            extended.steps.push(PathStep {
                rel: edge.rel,
                reversed: edge.target == tip,
            });

            let is_end = next != origin
                && store.get_node(next).map_or(false, |n| n.is(NodeKind::Account));
            if is_end {
                results.push(materialize(store, &extended));
                if results.len() >= limit {
                    debug!("Path limit {} reached for account '{}'", limit, account_id);
                    return results;
                }
            }
            queue.push_back(extended);
        }
    }

    results
}

fn materialize(store: &GraphStore, partial: &Frontier) -> FraudPath {
    FraudPath {
        nodes: partial
            .nodes
            .iter()
            .filter_map(|id| store.get_node(*id))
            .map(NodeView::from)
            .collect(),
        steps: partial.steps.clone(),
    }
}

/// Path queries with configured defaults
#[derive(Debug, Clone, Copy)]
pub struct PathFinder {
    pub max_hops: usize,
    pub limit: usize,
}

impl Default for PathFinder {
    fn default() -> Self {
        Self {
            max_hops: 3,
            limit: 10,
        }
    }
}

impl PathFinder {
    pub fn new(max_hops: usize, limit: usize) -> Self {
        Self { max_hops, limit }
    }

    /// Paths from `account_id` using the configured bounds
    pub fn find(&self, store: &GraphStore, account_id: &str) -> Vec<FraudPath> {
        find_fraud_paths(store, account_id, self.max_hops, self.limit)
    }
}

impl From<&crate::config::PathConfig> for PathFinder {
    fn from(config: &crate::config::PathConfig) -> Self {
        Self::new(config.max_hops, config.limit)
    }
}
