//! Shared, timeout-bounded access to the fraud graph
//!
//! `FraudService` owns the store behind `Arc<tokio::sync::RwLock<_>>` and
//! exposes every core operation as an async call. Ingestion takes the write
//! lock once per record, so a record is applied atomically while readers can
//! interleave between records (a reader may see a batch half applied).
//! Feature extraction, path queries and lookups share the read lock.
//!
//! When `store.timeout_ms` is configured, waiting for the lock longer than
//! that fails with [`FraudError::StoreUnavailable`]. An ingestion batch that
//! times out part way returns [`FraudError::PartialIngest`] with the report
//! collected so far. Nothing is retried.
//! Dropping the returned future cancels the call; records already applied
//! stay applied.

use crate::algo::{find_fraud_paths, FraudPath, PathFinder};
use crate::config::FraudConfig;
use crate::error::{FraudError, FraudResult};
use crate::features::{transaction_view, FeatureExtractor, FeatureVector, TransactionView};
use crate::graph::{GraphStatistics, GraphStore};
use crate::ingest::{
    read_dataset, rejected_report, EntityKind, IngestReport, IngestionEngine, Record, RecordBatch,
};
use crate::persistence;
use crate::scoring::{FraudLabel, Scorer, ScoringFacade, ThresholdScorer};
use indexmap::IndexMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

/// Async facade over the graph store and the components that use it
pub struct FraudService<S = ThresholdScorer> {
    store: Arc<RwLock<GraphStore>>,
    config: FraudConfig,
    engine: IngestionEngine,
    extractor: FeatureExtractor,
    paths: PathFinder,
    facade: ScoringFacade<S>,
}

impl FraudService<ThresholdScorer> {
    /// Empty store, reference scorer configured from `config.scoring`
    pub fn new(config: FraudConfig) -> Self {
        let scorer = ThresholdScorer::from(&config.scoring);
        Self::with_scorer(config, scorer)
    }
}

impl<S: Scorer> FraudService<S> {
    pub fn with_scorer(config: FraudConfig, scorer: S) -> Self {
        Self::with_store(config, scorer, Arc::new(RwLock::new(GraphStore::new())))
    }

    /// Build a service over an existing shared store
    pub fn with_store(config: FraudConfig, scorer: S, store: Arc<RwLock<GraphStore>>) -> Self {
        Self {
            extractor: FeatureExtractor::new(config.features.clone()),
            paths: PathFinder::from(&config.paths),
            facade: ScoringFacade::new(scorer),
            engine: IngestionEngine::new(),
            store,
            config,
        }
    }

    pub fn config(&self) -> &FraudConfig {
        &self.config
    }

    /// Handle to the shared store
    pub fn store(&self) -> Arc<RwLock<GraphStore>> {
        Arc::clone(&self.store)
    }

    /// Ingest one record set, taking the write lock per record
    pub async fn ingest(&self, kind: EntityKind, records: Vec<Record>) -> FraudResult<IngestReport> {
        let batch = RecordBatch {
            rows: records.into_iter().enumerate().map(|(i, r)| (i + 1, r)).collect(),
            rejected: Vec::new(),
        };
        self.ingest_batch(kind, batch).await
    }

    /// Ingest a batch produced by the loader.
    ///
    /// A lock timeout part way through returns [`FraudError::PartialIngest`]
    /// with this batch's report so far, loader rejections included.
    pub async fn ingest_batch(&self, kind: EntityKind, batch: RecordBatch) -> FraudResult<IngestReport> {
        let mut report = rejected_report(kind, batch.rejected);
        for (row, record) in batch.rows {
            let mut store = match self.write_guard("ingest").await {
                Ok(store) => store,
                Err(source) => {
                    warn!("Stopped {} at record #{}: {}", kind, row, report);
                    return Err(FraudError::PartialIngest {
                        reports: vec![report],
                        source: Box::new(source),
                    });
                }
            };
            match self.engine.apply(&mut store, kind, row, &record) {
                Ok(applied) => report.record_success(&applied),
                Err(err) => {
                    warn!("Rejected record: {}", err);
                    report.record_failure(err);
                }
            }
        }
        info!("Ingested {}", report);
        Ok(report)
    }

    /// Load and ingest every entity file in `dir`, in dependency order
    pub async fn ingest_dataset(&self, dir: impl AsRef<Path>) -> FraudResult<Vec<IngestReport>> {
        let dir = dir.as_ref().to_path_buf();
        info!("Ingesting dataset from {:?}", dir);
        let batches = tokio::task::spawn_blocking(move || read_dataset(&dir))
            .await
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))??;

        let mut reports = Vec::with_capacity(batches.len());
        for (kind, batch) in batches {
            match self.ingest_batch(kind, batch).await {
                Ok(report) => reports.push(report),
                Err(FraudError::PartialIngest { reports: partial, source }) => {
                    reports.extend(partial);
                    return Err(FraudError::PartialIngest { reports, source });
                }
                Err(err) => return Err(err),
            }
        }
        Ok(reports)
    }

    pub async fn extract_features(&self, transaction_id: &str) -> FraudResult<Option<FeatureVector>> {
        let store = self.read_guard("extract_features").await?;
        self.extractor.extract_features(&store, transaction_id)
    }

    /// Feature table rows for every transaction
    pub async fn extract_all(&self) -> FraudResult<Vec<(String, FeatureVector)>> {
        let store = self.read_guard("extract_all").await?;
        self.extractor.extract_all(&store)
    }

    /// Fraud paths from `account_id`; `None` bounds fall back to the configured defaults
    pub async fn find_fraud_paths(
        &self,
        account_id: &str,
        max_hops: Option<usize>,
        limit: Option<usize>,
    ) -> FraudResult<Vec<FraudPath>> {
        let max_hops = max_hops.unwrap_or(self.paths.max_hops);
        let limit = limit.unwrap_or(self.paths.limit);
        let store = self.read_guard("find_fraud_paths").await?;
        let paths = find_fraud_paths(&store, account_id, max_hops, limit);
        debug!("Found {} paths from account '{}'", paths.len(), account_id);
        Ok(paths)
    }

    pub async fn transaction_view(&self, transaction_id: &str) -> FraudResult<Option<TransactionView>> {
        let store = self.read_guard("transaction_view").await?;
        Ok(transaction_view(&store, transaction_id))
    }

    pub fn classify(&self, vector: &FeatureVector) -> FraudResult<FraudLabel> {
        self.facade.classify(vector)
    }

    pub fn classify_named(&self, features: &IndexMap<String, f64>) -> FraudResult<FraudLabel> {
        self.facade.classify_named(features)
    }

    /// Extract and classify a stored transaction; `None` when it is unknown
    pub async fn score_transaction(&self, transaction_id: &str) -> FraudResult<Option<FraudLabel>> {
        match self.extract_features(transaction_id).await? {
            Some(vector) => self.classify(&vector).map(Some),
            None => Ok(None),
        }
    }

    pub async fn statistics(&self) -> FraudResult<GraphStatistics> {
        let store = self.read_guard("statistics").await?;
        Ok(store.statistics())
    }

    pub async fn save_snapshot(&self, path: impl AsRef<Path>) -> FraudResult<()> {
        let store = self.read_guard("save_snapshot").await?;
        persistence::save_snapshot(&store, path)?;
        Ok(())
    }

    /// Replace the store contents with a snapshot
    pub async fn load_snapshot(&self, path: impl AsRef<Path>) -> FraudResult<()> {
        let loaded = persistence::load_snapshot(path)?;
        let mut store = self.write_guard("load_snapshot").await?;
        *store = loaded;
        Ok(())
    }

    async fn read_guard(&self, operation: &'static str) -> FraudResult<RwLockReadGuard<'_, GraphStore>> {
        match self.config.store.timeout() {
            Some(limit) => tokio::time::timeout(limit, self.store.read())
                .await
                .map_err(|_| unavailable(operation, limit)),
            None => Ok(self.store.read().await),
        }
    }

    async fn write_guard(&self, operation: &'static str) -> FraudResult<RwLockWriteGuard<'_, GraphStore>> {
        match self.config.store.timeout() {
            Some(limit) => tokio::time::timeout(limit, self.store.write())
                .await
                .map_err(|_| unavailable(operation, limit)),
            None => Ok(self.store.write().await),
        }
    }
}

fn unavailable(operation: &'static str, limit: std::time::Duration) -> FraudError {
    warn!("{} timed out waiting for the graph store", operation);
    FraudError::StoreUnavailable {
        operation,
        timeout_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
    }
}

impl<S> std::fmt::Debug for FraudService<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FraudService")
            .field("config", &self.config)
            .field("facade", &self.facade)
            .finish_non_exhaustive()
    }
}
