//! Error taxonomy
//!
//! Per-record ingestion failures, vector validation failures and scorer
//! failures are recoverable and carry enough context (entity kind, key,
//! field) to act on. Unknown transaction or account ids are not errors: the
//! lookups return `None` or an empty result instead.

use crate::config::ConfigError;
use crate::graph::{GraphError, NodeKind};
use crate::ingest::{EntityKind, IngestReport, LoadError};
use crate::persistence::PersistenceError;
use thiserror::Error;

/// A record that could not be applied to the graph
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IngestionError {
    #[error("{kind} record #{row}: missing required key field '{field}'")]
    MissingKey {
        kind: EntityKind,
        row: usize,
        field: &'static str,
    },

    #[error("{kind} record #{row}: column '{column}' {reason}")]
    MalformedRecord {
        kind: EntityKind,
        row: usize,
        column: String,
        reason: String,
    },

    #[error("{kind} '{key}': '{field}' references {target} '{target_key}' which does not exist")]
    DanglingReference {
        kind: EntityKind,
        key: String,
        field: &'static str,
        target: NodeKind,
        target_key: String,
    },

    #[error("{kind} '{key}': graph rejected the record: {source}")]
    Graph {
        kind: EntityKind,
        key: String,
        source: GraphError,
    },
}

impl IngestionError {
    pub fn kind(&self) -> EntityKind {
        match self {
            IngestionError::MissingKey { kind, .. }
            | IngestionError::MalformedRecord { kind, .. }
            | IngestionError::DanglingReference { kind, .. }
            | IngestionError::Graph { kind, .. } => *kind,
        }
    }
}

/// A feature vector that does not match the fixed six-field layout
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing feature: {0}")]
    MissingField(&'static str),

    #[error("Unexpected feature: {0}")]
    UnexpectedField(String),

    #[error("Feature at position {position} must be '{expected}', found '{found}'")]
    OutOfOrder {
        position: usize,
        expected: &'static str,
        found: String,
    },

    #[error("Feature '{field}' is not a finite number")]
    NonFinite { field: &'static str },
}

/// The scorer answered outside its {0, 1} domain
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoringError {
    #[error("Scorer returned {output}, expected 0 or 1")]
    OutOfDomain { output: i64 },
}

/// Top-level error for the fraud graph core
#[derive(Error, Debug)]
pub enum FraudError {
    #[error("Ingestion error: {0}")]
    Ingestion(#[from] IngestionError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Scoring error: {0}")]
    Scoring(#[from] ScoringError),

    #[error("{kind} '{key}': attribute '{field}' has unusable value '{value}'")]
    InvalidAttribute {
        kind: NodeKind,
        key: String,
        field: &'static str,
        value: String,
    },

    #[error("Graph store unavailable: {operation} did not complete within {timeout_ms}ms")]
    StoreUnavailable {
        operation: &'static str,
        timeout_ms: u64,
    },

    /// A batch stopped part way through. `reports` covers everything handled
    /// before the stop; records past the last report's `processed` count were
    /// not attempted.
    #[error("Ingestion stopped after {} record(s): {source}", processed(.reports))]
    PartialIngest {
        reports: Vec<IngestReport>,
        source: Box<FraudError>,
    },

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type FraudResult<T> = Result<T, FraudError>;

fn processed(reports: &[IngestReport]) -> usize {
    reports.iter().map(|r| r.processed).sum()
}
