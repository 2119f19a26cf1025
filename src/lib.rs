//! Fraudgraph
//!
//! A fraud-detection property graph: transactional and identity records are
//! merge-upserted into an in-memory graph, per-transaction risk features are
//! derived from each transaction's neighborhood, a pluggable scorer turns
//! those features into a fraud / legitimate label, and bounded traversals
//! surface multi-hop money paths between accounts.
//!
//! # Architecture
//!
//! - [`graph`]: closed schema, typed attribute values and the keyed store
//! - [`ingest`]: idempotent, per-record atomic ingestion of flat records
//! - [`features`]: the six-field feature vector and the feature table
//! - [`algo`]: fraud-path enumeration between accounts
//! - [`scoring`]: scorer capability, reference scorer and validating facade
//! - [`persistence`]: bincode snapshots of the whole store
//! - [`service`]: async access to a shared store with optional timeouts
//!
//! ## Example Usage
//!
//! ```rust
//! use fraudgraph::graph::GraphStore;
//! use fraudgraph::ingest::{record, EntityKind, IngestionEngine};
//! use fraudgraph::features::FeatureExtractor;
//! use fraudgraph::scoring::{FraudLabel, ScoringFacade};
//!
//! let mut store = GraphStore::new();
//! let engine = IngestionEngine::new();
//!
//! engine.ingest(&mut store, EntityKind::Users, vec![record([("user_id", 1i64)])]);
//! engine.ingest(
//!     &mut store,
//!     EntityKind::Accounts,
//!     vec![record([("account_id", "A1"), ("user_id", "1")])],
//! );
//! engine.ingest(
//!     &mut store,
//!     EntityKind::Transactions,
//!     vec![record([
//!         ("transaction_id", "T1"),
//!         ("amount", "9000"),
//!         ("date", "2024-03-05 14:22:10"),
//!         ("from_account", "A1"),
//!     ])],
//! );
//!
//! let vector = FeatureExtractor::default()
//!     .extract_features(&store, "T1")
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(vector.to_array(), [9000.0, 0.0, 0.0, 0.0, 14.0, 0.0]);
//!
//! let facade: ScoringFacade = ScoringFacade::default();
//! assert_eq!(facade.classify(&vector).unwrap(), FraudLabel::Fraud);
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod config;
pub mod error;
pub mod features;
pub mod graph;
pub mod ingest;
pub mod persistence;
pub mod scoring;
pub mod service;

// Re-export main types for convenience
pub use algo::{find_fraud_paths, FraudPath, PathFinder};
pub use config::{FraudConfig, MissingLocationPolicy};
pub use error::{FraudError, FraudResult, IngestionError, ScoringError, ValidationError};
pub use features::{FeatureExtractor, FeatureVector, TransactionView, FEATURE_NAMES};
pub use graph::{GraphError, GraphStore, NodeKind, PropertyValue, RelKind};
pub use ingest::{EntityKind, IngestReport, IngestionEngine, Record};
pub use persistence::{load_snapshot, save_snapshot, PersistenceError};
pub use scoring::{FraudLabel, Scorer, ScoringFacade, ThresholdScorer};
pub use service::FraudService;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
