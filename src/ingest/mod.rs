//! Ingestion of tabular entity records into the fraud graph
//!
//! Record sets arrive one entity kind at a time. Nodes are merge-upserted by
//! key, relationships by endpoint pair, so replaying a batch only refreshes
//! attributes.

pub mod engine;
pub mod loader;
pub mod record;
pub mod report;

pub use engine::IngestionEngine;
pub use loader::{
    dataset_file, ingest_dataset, read_dataset, read_records, record_from_json, rejected_report,
    LoadError, RecordBatch,
};
pub use record::{record, EntityKind, Record, Reference, Side};
pub use report::{AppliedRecord, IngestReport};
