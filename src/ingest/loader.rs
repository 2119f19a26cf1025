//! Record source: JSON array or JSON-lines files
//!
//! The engine only consumes iterated records; this is one way of producing
//! them from disk. Rows that are not flat objects are rejected per row and
//! reported alongside the engine's own errors.

use super::engine::IngestionEngine;
use super::record::{EntityKind, Record};
use super::report::IngestReport;
use crate::error::IngestionError;
use crate::graph::{GraphStore, PropertyValue};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Failures that prevent a file from being read at all
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path:?} at line {line}: {source}")]
    Json {
        path: PathBuf,
        line: usize,
        source: serde_json::Error,
    },

    #[error("{path:?} must hold a JSON array of objects or one object per line")]
    UnsupportedLayout { path: PathBuf },
}

/// Rows read from one file: accepted records keep their 1-based row number
#[derive(Debug, Default)]
pub struct RecordBatch {
    pub rows: Vec<(usize, Record)>,
    pub rejected: Vec<IngestionError>,
}

impl RecordBatch {
    pub fn len(&self) -> usize {
        self.rows.len() + self.rejected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Read the records of one entity kind from `path`.
///
/// `.jsonl` / `.ndjson` files are read line by line; anything else must be a
/// single JSON array.
pub fn read_records(path: impl AsRef<Path>, kind: EntityKind) -> Result<RecordBatch, LoadError> {
    let path = path.as_ref();
    let io_err = |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = std::fs::File::open(path).map_err(io_err)?;

    let is_lines = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("jsonl") | Some("ndjson")
    );

    let mut batch = RecordBatch::default();
    if is_lines {
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(io_err)?;
            if line.trim().is_empty() {
                continue;
            }
            let value: serde_json::Value =
                serde_json::from_str(&line).map_err(|source| LoadError::Json {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    source,
                })?;
            push_row(&mut batch, kind, idx + 1, &value);
        }
    } else {
        let value: serde_json::Value =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| LoadError::Json {
                path: path.to_path_buf(),
                line: source.line(),
                source,
            })?;
        let rows = value.as_array().ok_or_else(|| LoadError::UnsupportedLayout {
            path: path.to_path_buf(),
        })?;
        for (idx, row) in rows.iter().enumerate() {
            push_row(&mut batch, kind, idx + 1, row);
        }
    }
    Ok(batch)
}

/// Convert one JSON row into a flat record
pub fn record_from_json(
    kind: EntityKind,
    row: usize,
    value: &serde_json::Value,
) -> Result<Record, IngestionError> {
    let object = value.as_object().ok_or_else(|| IngestionError::MalformedRecord {
        kind,
        row,
        column: String::new(),
        reason: "is not a JSON object".to_string(),
    })?;

    let mut record = Record::with_capacity(object.len());
    for (column, value) in object {
        let scalar = PropertyValue::from_json(value).ok_or_else(|| IngestionError::MalformedRecord {
            kind,
            row,
            column: column.clone(),
            reason: "holds a nested value; records must be flat".to_string(),
        })?;
        record.insert(column.clone(), scalar);
    }
    Ok(record)
}

fn push_row(batch: &mut RecordBatch, kind: EntityKind, row: usize, value: &serde_json::Value) {
    match record_from_json(kind, row, value) {
        Ok(record) => batch.rows.push((row, record)),
        Err(err) => batch.rejected.push(err),
    }
}

/// Locate the data file for `kind` inside `dir`
pub fn dataset_file(dir: &Path, kind: EntityKind) -> Option<PathBuf> {
    ["json", "jsonl", "ndjson"]
        .iter()
        .map(|ext| dir.join(format!("{}.{}", kind.file_stem(), ext)))
        .find(|p| p.is_file())
}

/// Read every entity file found in `dir`, in dependency order.
///
/// Kinds without a file are skipped with a warning.
pub fn read_dataset(dir: impl AsRef<Path>) -> Result<Vec<(EntityKind, RecordBatch)>, LoadError> {
    let dir = dir.as_ref();
    let mut batches = Vec::new();
    for kind in EntityKind::INGEST_ORDER {
        let Some(path) = dataset_file(dir, kind) else {
            warn!("No {} file in {:?}, skipping", kind.file_stem(), dir);
            continue;
        };
        batches.push((kind, read_records(&path, kind)?));
    }
    Ok(batches)
}

/// Ingest every entity file found in `dir`, in dependency order.
///
/// Returns one report per ingested kind.
pub fn ingest_dataset(
    engine: &IngestionEngine,
    store: &mut GraphStore,
    dir: impl AsRef<Path>,
) -> Result<Vec<IngestReport>, LoadError> {
    let dir = dir.as_ref();
    info!("Ingesting dataset from {:?}", dir);

    let reports = read_dataset(dir)?
        .into_iter()
        .map(|(kind, batch)| {
            let mut report = rejected_report(kind, batch.rejected);
            report.merge(engine.ingest_rows(store, kind, batch.rows));
            report
        })
        .collect();
    Ok(reports)
}

/// Start a report pre-filled with the rows the loader already rejected
pub fn rejected_report(kind: EntityKind, rejected: Vec<IngestionError>) -> IngestReport {
    let mut report = IngestReport::new(kind);
    for err in rejected {
        warn!("Rejected record: {}", err);
        report.record_failure(err);
    }
    report
}
