//! Fraud graph data model
//!
//! This module implements the property graph the rest of the crate works on:
//! - A closed schema of node kinds and relationship types
//! - Nodes unique per `(kind, key)` with scalar attributes
//! - Directed edges unique per `(type, source, target)` with declared cardinality
//! - In-memory storage with hash-based indices and insertion-ordered adjacency

pub mod edge;
pub mod node;
pub mod property;
pub mod schema;
pub mod store;
pub mod types;

// Re-export main types
pub use edge::Edge;
pub use node::{Node, NodeView};
pub use property::{PropertyMap, PropertyValue};
pub use schema::{Cardinality, NodeKind, RelKind};
pub use store::{GraphError, GraphResult, GraphStatistics, GraphStore};
pub use types::{EdgeId, MergeOutcome, NodeId};
