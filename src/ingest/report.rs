//! Aggregate result of one ingestion batch

use super::record::EntityKind;
use crate::error::IngestionError;
use crate::graph::MergeOutcome;
use std::fmt;

/// What a single successfully applied record did to the graph
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedRecord {
    /// Canonical key of the record's node (or `source->target` for connections)
    pub key: String,
    /// `None` for relationship-only records
    pub node: Option<MergeOutcome>,
    pub edges_created: usize,
}

/// Succeeded/failed counts plus every per-record error of a batch
#[derive(Debug, Clone, PartialEq)]
pub struct IngestReport {
    pub kind: EntityKind,
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub nodes_created: usize,
    pub nodes_updated: usize,
    pub edges_created: usize,
    pub errors: Vec<IngestionError>,
}

impl IngestReport {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            processed: 0,
            succeeded: 0,
            failed: 0,
            nodes_created: 0,
            nodes_updated: 0,
            edges_created: 0,
            errors: Vec::new(),
        }
    }

    pub fn record_success(&mut self, applied: &AppliedRecord) {
        self.processed += 1;
        self.succeeded += 1;
        match applied.node {
            Some(MergeOutcome::Created) => self.nodes_created += 1,
            Some(MergeOutcome::Updated) => self.nodes_updated += 1,
            None => {}
        }
        self.edges_created += applied.edges_created;
    }

    pub fn record_failure(&mut self, error: IngestionError) {
        self.processed += 1;
        self.failed += 1;
        self.errors.push(error);
    }

    /// True when every record was applied
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }

    /// Fold another report of the same kind into this one
    pub fn merge(&mut self, other: IngestReport) {
        self.processed += other.processed;
        self.succeeded += other.succeeded;
        self.failed += other.failed;
        self.nodes_created += other.nodes_created;
        self.nodes_updated += other.nodes_updated;
        self.edges_created += other.edges_created;
        self.errors.extend(other.errors);
    }
}

impl fmt::Display for IngestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} processed, {} succeeded, {} failed ({} created, {} updated, {} new edges)",
            self.kind,
            self.processed,
            self.succeeded,
            self.failed,
            self.nodes_created,
            self.nodes_updated,
            self.edges_created
        )
    }
}
