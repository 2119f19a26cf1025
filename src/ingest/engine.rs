//! Idempotent ingestion of flat records into the fraud graph
//!
//! Each record is applied as one unit: its key and every referenced endpoint
//! are resolved first, and only then is the node upserted and its
//! relationships merged. A record that fails resolution writes nothing, so a
//! referential-integrity miss never leaves a half-linked node or a dangling
//! edge behind.
//!
//! Callers must feed kinds in [`EntityKind::INGEST_ORDER`] and must not run
//! two batches of the same kind concurrently; the engine does no locking of
//! its own.

use super::record::{EntityKind, Record, Reference, Side, CONNECTION_SOURCE, CONNECTION_TARGET};
use super::report::{AppliedRecord, IngestReport};
use crate::error::IngestionError;
use crate::graph::{GraphStore, NodeId, NodeKind, PropertyMap, PropertyValue, RelKind};
use tracing::{debug, info, warn};

/// A relationship ready to be merged
struct ResolvedEdge {
    rel: RelKind,
    other: NodeId,
    side: Side,
}

/// Applies record sets to a [`GraphStore`]
#[derive(Debug, Clone, Copy, Default)]
pub struct IngestionEngine;

impl IngestionEngine {
    pub fn new() -> Self {
        IngestionEngine
    }

    /// Ingest a record set of one entity kind.
    ///
    /// Rows are numbered from 1 in iteration order. Failures are collected in
    /// the report; the batch always runs to the end.
    pub fn ingest<I>(&self, store: &mut GraphStore, kind: EntityKind, records: I) -> IngestReport
    where
        I: IntoIterator<Item = Record>,
    {
        self.ingest_rows(
            store,
            kind,
            records.into_iter().enumerate().map(|(i, r)| (i + 1, r)),
        )
    }

    /// Ingest records that already carry their source row numbers
    pub fn ingest_rows<I>(&self, store: &mut GraphStore, kind: EntityKind, rows: I) -> IngestReport
    where
        I: IntoIterator<Item = (usize, Record)>,
    {
        let mut report = IngestReport::new(kind);
        for (row, record) in rows {
            match self.apply(store, kind, row, &record) {
                Ok(applied) => report.record_success(&applied),
                Err(err) => {
                    warn!("Rejected record: {}", err);
                    report.record_failure(err);
                }
            }
        }
        info!("Ingested {}", report);
        report
    }

    /// Apply a single record
    pub fn apply(
        &self,
        store: &mut GraphStore,
        kind: EntityKind,
        row: usize,
        record: &Record,
    ) -> Result<AppliedRecord, IngestionError> {
        match kind.node_kind() {
            Some(node_kind) => self.apply_entity(store, kind, node_kind, row, record),
            None => self.apply_connection(store, kind, row, record),
        }
    }

    fn apply_entity(
        &self,
        store: &mut GraphStore,
        kind: EntityKind,
        node_kind: NodeKind,
        row: usize,
        record: &Record,
    ) -> Result<AppliedRecord, IngestionError> {
        let key = required_key(kind, row, record, node_kind.key_attribute())?;

        let mut resolved = Vec::with_capacity(kind.references().len());
        for reference in kind.references() {
            if let Some(edge) = resolve_reference(store, kind, row, &key, record, reference)? {
                resolved.push(edge);
            }
        }

        let attributes: PropertyMap = node_kind
            .attributes()
            .iter()
            .map(|attr| {
                let value = record.get(*attr).cloned().unwrap_or(PropertyValue::Null);
                (attr.to_string(), value)
            })
            .collect();

        let graph_err = |source| IngestionError::Graph {
            kind,
            key: key.clone(),
            source,
        };

        let (node_id, outcome) = store
            .merge_node(node_kind, &key, attributes)
            .map_err(graph_err)?;

        let mut edges_created = 0;
        for edge in resolved {
            let (source, target) = match edge.side {
                Side::Source => (node_id, edge.other),
                Side::Target => (edge.other, node_id),
            };
            let (_, edge_outcome) = store
                .merge_edge(edge.rel, source, target)
                .map_err(graph_err)?;
            if edge_outcome.is_created() {
                edges_created += 1;
            }
        }

        debug!("Applied {} '{}' ({:?}, {} new edges)", kind, key, outcome, edges_created);
        Ok(AppliedRecord {
            key,
            node: Some(outcome),
            edges_created,
        })
    }

    fn apply_connection(
        &self,
        store: &mut GraphStore,
        kind: EntityKind,
        row: usize,
        record: &Record,
    ) -> Result<AppliedRecord, IngestionError> {
        let from_key = required_key(kind, row, record, CONNECTION_SOURCE)?;
        let to_key = required_key(kind, row, record, CONNECTION_TARGET)?;
        let key = format!("{}->{}", from_key, to_key);

        let lookup = |field: &'static str, user_key: &str| {
            store
                .find_node(NodeKind::User, user_key)
                .ok_or_else(|| IngestionError::DanglingReference {
                    kind,
                    key: key.clone(),
                    field,
                    target: NodeKind::User,
                    target_key: user_key.to_string(),
                })
        };
        let from = lookup(CONNECTION_SOURCE, &from_key)?;
        let to = lookup(CONNECTION_TARGET, &to_key)?;

        let (_, outcome) = store
            .merge_edge(RelKind::Knows, from, to)
            .map_err(|source| IngestionError::Graph {
                kind,
                key: key.clone(),
                source,
            })?;

        Ok(AppliedRecord {
            key,
            node: None,
            edges_created: usize::from(outcome.is_created()),
        })
    }
}

/// Canonical key from a column that must be present
fn required_key(
    kind: EntityKind,
    row: usize,
    record: &Record,
    field: &'static str,
) -> Result<String, IngestionError> {
    let value = match record.get(field) {
        Some(value) if !value.is_absent() => value,
        _ => return Err(IngestionError::MissingKey { kind, row, field }),
    };
    value
        .key_string()
        .ok_or_else(|| IngestionError::MalformedRecord {
            kind,
            row,
            column: field.to_string(),
            reason: format!("holds a {} which cannot be used as a key", value.type_name()),
        })
}

/// Look up the endpoint named by a foreign-key column.
///
/// `Ok(None)` means the column is optional and empty, so the relationship is
/// skipped.
fn resolve_reference(
    store: &GraphStore,
    kind: EntityKind,
    row: usize,
    key: &str,
    record: &Record,
    reference: &Reference,
) -> Result<Option<ResolvedEdge>, IngestionError> {
    let absent = record.get(reference.column).map_or(true, PropertyValue::is_absent);
    if absent {
        if reference.required {
            return Err(IngestionError::MissingKey {
                kind,
                row,
                field: reference.column,
            });
        }
        return Ok(None);
    }

    let target_key = required_key(kind, row, record, reference.column)?;
    let other = store
        .find_node(reference.target, &target_key)
        .ok_or_else(|| IngestionError::DanglingReference {
            kind,
            key: key.to_string(),
            field: reference.column,
            target: reference.target,
            target_key,
        })?;

    Ok(Some(ResolvedEdge {
        rel: reference.rel,
        other,
        side: reference.side,
    }))
}
