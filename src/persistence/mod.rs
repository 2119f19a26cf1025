//! Snapshot persistence for the fraud graph
//!
//! The store is purely in-memory; a snapshot is the whole node and edge arena
//! encoded with bincode. Loading re-inserts everything with its saved IDs,
//! so traversal order after a reload is identical to the order before.

use crate::graph::{Edge, GraphError, GraphStore, Node};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Snapshot format version, bumped on incompatible layout changes
pub const SNAPSHOT_VERSION: u32 = 1;

/// Persistence errors
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot encoding error: {0}")]
    Encode(#[from] bincode::Error),

    #[error("Unsupported snapshot version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },

    #[error("Snapshot is inconsistent: {0}")]
    Graph(#[from] GraphError),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Serialized form of a [`GraphStore`]
#[derive(Debug, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub version: u32,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl GraphSnapshot {
    /// Capture the current contents of `store`
    pub fn capture(store: &GraphStore) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            nodes: store.all_nodes().cloned().collect(),
            edges: store.all_edges().cloned().collect(),
        }
    }

    /// Rebuild a store, validating every edge against the schema
    pub fn restore(self) -> PersistenceResult<GraphStore> {
        if self.version != SNAPSHOT_VERSION {
            return Err(PersistenceError::Version {
                found: self.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        let mut store = GraphStore::new();
        for node in self.nodes {
            store.insert_recovered_node(node)?;
        }
        for edge in self.edges {
            store.insert_recovered_edge(edge)?;
        }
        Ok(store)
    }
}

/// Write `store` to `path`, replacing any previous snapshot
pub fn save_snapshot(store: &GraphStore, path: impl AsRef<Path>) -> PersistenceResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let snapshot = GraphSnapshot::capture(store);
    let mut writer = BufWriter::new(File::create(path)?);
    bincode::serialize_into(&mut writer, &snapshot)?;
    writer.flush()?;

    info!(
        "Saved snapshot to {:?}: {} nodes, {} edges",
        path,
        snapshot.nodes.len(),
        snapshot.edges.len()
    );
    Ok(())
}

/// Read a snapshot written by [`save_snapshot`]
pub fn load_snapshot(path: impl AsRef<Path>) -> PersistenceResult<GraphStore> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let snapshot: GraphSnapshot = bincode::deserialize_from(reader)?;
    let store = snapshot.restore()?;

    info!(
        "Loaded snapshot from {:?}: {} nodes, {} edges",
        path,
        store.node_count(),
        store.edge_count()
    );
    Ok(store)
}
