//! In-memory graph storage with merge-by-key semantics
//!
//! Nodes live in an arena indexed by `NodeId` and are unique per
//! `(kind, key)`. Edges live in an arena indexed by `EdgeId` and are unique per
//! `(rel, source, target)`. Adjacency lists keep edge-insertion order, which
//! is the traversal order every reader in the crate relies on.

use super::edge::Edge;
use super::node::Node;
use super::property::PropertyMap;
use super::schema::{Cardinality, NodeKind, RelKind};
use super::types::{EdgeId, MergeOutcome, NodeId};
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during graph operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Node {0} not found")]
    NodeNotFound(NodeId),

    #[error("Edge {0} not found")]
    EdgeNotFound(EdgeId),

    #[error("Node {0} already exists")]
    NodeAlreadyExists(NodeId),

    #[error("Edge {0} already exists")]
    EdgeAlreadyExists(EdgeId),

    #[error("Invalid key for {kind}: key must be a non-empty scalar")]
    InvalidKey { kind: NodeKind },

    #[error("{rel} cannot connect {source_kind} to {target_kind}")]
    SchemaViolation {
        rel: RelKind,
        source_kind: NodeKind,
        target_kind: NodeKind,
    },
}

pub type GraphResult<T> = Result<T, GraphError>;

/// Node and edge counts, broken down by kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphStatistics {
    pub node_count: usize,
    pub edge_count: usize,
    pub nodes_by_kind: BTreeMap<NodeKind, usize>,
    pub edges_by_rel: BTreeMap<RelKind, usize>,
}

/// In-memory fraud graph
///
/// - nodes: NodeId -> Node (arena, never shrinks)
/// - edges: EdgeId -> Edge (arena, replaced edges leave a hole)
/// - outgoing / incoming: NodeId -> Vec<EdgeId> in insertion order
/// - kind_index: NodeKind -> Vec<NodeId> in insertion order
/// - key_index: (NodeKind, key) -> NodeId
/// - pair_index: (RelKind, source, target) -> EdgeId
#[derive(Debug, Default)]
pub struct GraphStore {
    nodes: Vec<Node>,
    edges: Vec<Option<Edge>>,
    outgoing: Vec<Vec<EdgeId>>,
    incoming: Vec<Vec<EdgeId>>,
    kind_index: HashMap<NodeKind, Vec<NodeId>>,
    key_index: FxHashMap<(NodeKind, String), NodeId>,
    pair_index: FxHashMap<(RelKind, NodeId, NodeId), EdgeId>,
    live_edges: usize,
}

impl GraphStore {
    /// Create a new empty graph store
    pub fn new() -> Self {
        GraphStore {
            nodes: Vec::with_capacity(1024),
            edges: Vec::with_capacity(4096),
            outgoing: Vec::with_capacity(1024),
            incoming: Vec::with_capacity(1024),
            ..Default::default()
        }
    }

    /// Merge-upsert a node by `(kind, key)`.
    ///
    /// A new node is created when the key is unknown; otherwise every non-key
    /// attribute is overwritten with `attributes`.
    pub fn merge_node(
        &mut self,
        kind: NodeKind,
        key: &str,
        attributes: PropertyMap,
    ) -> GraphResult<(NodeId, MergeOutcome)> {
        let key = key.trim();
        if key.is_empty() {
            return Err(GraphError::InvalidKey { kind });
        }

        if let Some(id) = self.find_node(kind, key) {
            self.nodes[id.index()].replace_attributes(attributes);
            return Ok((id, MergeOutcome::Updated));
        }

        let id = NodeId::new(self.nodes.len() as u64);
        let mut node = Node::new(id, kind, key);
        node.replace_attributes(attributes);
        self.index_node(node);
        Ok((id, MergeOutcome::Created))
    }

    /// Look up a node by kind and canonical key
    pub fn find_node(&self, kind: NodeKind, key: &str) -> Option<NodeId> {
        self.key_index.get(&(kind, key.trim().to_string())).copied()
    }

    /// Get a node by ID
    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Look up a node by kind and key and return it
    pub fn node_by_key(&self, kind: NodeKind, key: &str) -> Option<&Node> {
        self.find_node(kind, key).and_then(|id| self.get_node(id))
    }

    /// Merge-upsert a relationship by `(rel, source, target)`.
    ///
    /// Re-merging an existing pair is a no-op. For to-one relationships an
    /// existing edge of the same type on the single-valued endpoint is
    /// replaced, so a transaction never ends up with two initiators.
    pub fn merge_edge(
        &mut self,
        rel: RelKind,
        source: NodeId,
        target: NodeId,
    ) -> GraphResult<(EdgeId, MergeOutcome)> {
        let source_kind = self
            .get_node(source)
            .map(|n| n.kind)
            .ok_or(GraphError::NodeNotFound(source))?;
        let target_kind = self
            .get_node(target)
            .map(|n| n.kind)
            .ok_or(GraphError::NodeNotFound(target))?;
        if !rel.accepts(source_kind, target_kind) {
            return Err(GraphError::SchemaViolation {
                rel,
                source_kind,
                target_kind,
            });
        }

        if let Some(&existing) = self.pair_index.get(&(rel, source, target)) {
            return Ok((existing, MergeOutcome::Updated));
        }

        let displaced: Vec<EdgeId> = match rel.cardinality() {
            Cardinality::Many => Vec::new(),
            Cardinality::OneFromSource => self.outgoing(source, rel).map(|e| e.id).collect(),
            Cardinality::OneToTarget => self.incoming(target, rel).map(|e| e.id).collect(),
        };
        for edge_id in displaced {
            debug!("Replacing {} edge {} to keep it single-valued", rel, edge_id);
            self.delete_edge(edge_id)?;
        }

        let id = EdgeId::new(self.edges.len() as u64);
        self.index_edge(Edge::new(id, source, target, rel));
        Ok((id, MergeOutcome::Created))
    }

    /// Get an edge by ID
    pub fn get_edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.index()).and_then(|e| e.as_ref())
    }

    /// Delete an edge
    pub(crate) fn delete_edge(&mut self, id: EdgeId) -> GraphResult<Edge> {
        let edge = self
            .edges
            .get_mut(id.index())
            .and_then(Option::take)
            .ok_or(GraphError::EdgeNotFound(id))?;

        self.outgoing[edge.source.index()].retain(|&e| e != id);
        self.incoming[edge.target.index()].retain(|&e| e != id);
        self.pair_index.remove(&(edge.rel, edge.source, edge.target));
        self.live_edges -= 1;
        Ok(edge)
    }

    /// Outgoing edges of one relationship type
    pub fn outgoing(&self, node_id: NodeId, rel: RelKind) -> impl Iterator<Item = &Edge> + '_ {
        self.adjacent(&self.outgoing, node_id)
            .filter(move |e| e.rel == rel)
    }

    /// Incoming edges of one relationship type
    pub fn incoming(&self, node_id: NodeId, rel: RelKind) -> impl Iterator<Item = &Edge> + '_ {
        self.adjacent(&self.incoming, node_id)
            .filter(move |e| e.rel == rel)
    }

    /// Node reached by the first outgoing edge of `rel`
    pub fn out_neighbor(&self, node_id: NodeId, rel: RelKind) -> Option<&Node> {
        self.outgoing(node_id, rel)
            .next()
            .and_then(|e| self.get_node(e.target))
    }

    /// Node reached by the first incoming edge of `rel`
    pub fn in_neighbor(&self, node_id: NodeId, rel: RelKind) -> Option<&Node> {
        self.incoming(node_id, rel)
            .next()
            .and_then(|e| self.get_node(e.source))
    }

    /// Edges of the given types touching `node_id` in either direction,
    /// ordered by edge ID (insertion order). A self-loop is reported once.
    pub fn incident_edges(&self, node_id: NodeId, rels: &[RelKind]) -> Vec<&Edge> {
        let mut edges: Vec<&Edge> = self
            .adjacent(&self.outgoing, node_id)
            .chain(self.adjacent(&self.incoming, node_id))
            .filter(|e| rels.contains(&e.rel))
            .collect();
        edges.sort_by_key(|e| e.id);
        edges.dedup_by_key(|e| e.id);
        edges
    }

    /// Nodes of one kind, in insertion order
    pub fn nodes_of_kind(&self, kind: NodeKind) -> Vec<&Node> {
        self.kind_index
            .get(&kind)
            .map(|ids| ids.iter().filter_map(|id| self.get_node(*id)).collect())
            .unwrap_or_default()
    }

    /// Get total number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get total number of live edges
    pub fn edge_count(&self) -> usize {
        self.live_edges
    }

    /// All nodes in ID order
    pub fn all_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// All live edges in ID order
    pub fn all_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().flatten()
    }

    /// Counts by node kind and relationship type
    pub fn statistics(&self) -> GraphStatistics {
        let mut stats = GraphStatistics {
            node_count: self.node_count(),
            edge_count: self.edge_count(),
            ..Default::default()
        };
        for node in &self.nodes {
            *stats.nodes_by_kind.entry(node.kind).or_insert(0) += 1;
        }
        for edge in self.all_edges() {
            *stats.edges_by_rel.entry(edge.rel).or_insert(0) += 1;
        }
        stats
    }

    /// Re-insert a node read back from a snapshot, keeping its ID
    pub fn insert_recovered_node(&mut self, node: Node) -> GraphResult<()> {
        if node.id.index() != self.nodes.len() {
            return Err(GraphError::NodeAlreadyExists(node.id));
        }
        if node.key.trim().is_empty() {
            return Err(GraphError::InvalidKey { kind: node.kind });
        }
        self.index_node(node);
        Ok(())
    }

    /// Re-insert an edge read back from a snapshot, keeping its ID
    pub fn insert_recovered_edge(&mut self, edge: Edge) -> GraphResult<()> {
        let source_kind = self
            .get_node(edge.source)
            .map(|n| n.kind)
            .ok_or(GraphError::NodeNotFound(edge.source))?;
        let target_kind = self
            .get_node(edge.target)
            .map(|n| n.kind)
            .ok_or(GraphError::NodeNotFound(edge.target))?;
        if !edge.rel.accepts(source_kind, target_kind) {
            return Err(GraphError::SchemaViolation {
                rel: edge.rel,
                source_kind,
                target_kind,
            });
        }
        if edge.id.index() < self.edges.len() {
            return Err(GraphError::EdgeAlreadyExists(edge.id));
        }
        self.edges.resize(edge.id.index(), None);
        self.index_edge(edge);
        Ok(())
    }

    fn adjacent<'a>(
        &'a self,
        lists: &'a [Vec<EdgeId>],
        node_id: NodeId,
    ) -> impl Iterator<Item = &'a Edge> + 'a {
        lists
            .get(node_id.index())
            .into_iter()
            .flatten()
            .filter_map(move |id| self.get_edge(*id))
    }

    fn index_node(&mut self, node: Node) {
        let id = node.id;
        self.kind_index.entry(node.kind).or_default().push(id);
        self.key_index.insert((node.kind, node.key.clone()), id);
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());
        self.nodes.push(node);
    }

    fn index_edge(&mut self, edge: Edge) {
        let id = edge.id;
        self.outgoing[edge.source.index()].push(id);
        self.incoming[edge.target.index()].push(id);
        self.pair_index.insert((edge.rel, edge.source, edge.target), id);
        self.edges.push(Some(edge));
        self.live_edges += 1;
    }
}
