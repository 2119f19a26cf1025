//! Edge implementation for the fraud graph

use super::schema::RelKind;
use super::types::{EdgeId, NodeId};
use serde::{Deserialize, Serialize};

/// A directed, typed edge
///
/// Relationships in this graph carry no attributes; their identity is the
/// `(rel, source, target)` triple.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// Unique identifier for this edge
    pub id: EdgeId,

    /// Source node (edge goes FROM this node)
    pub source: NodeId,

    /// Target node (edge goes TO this node)
    pub target: NodeId,

    /// Relationship type
    pub rel: RelKind,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,
}

impl Edge {
    /// Create a new directed edge
    pub fn new(id: EdgeId, source: NodeId, target: NodeId, rel: RelKind) -> Self {
        Edge {
            id,
            source,
            target,
            rel,
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Endpoint opposite to `node`, `None` if `node` is not an endpoint
    pub fn other_end(&self, node: NodeId) -> Option<NodeId> {
        if self.source == node {
            Some(self.target)
        } else if self.target == node {
            Some(self.source)
        } else {
            None
        }
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Edge {}

impl std::hash::Hash for Edge {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
