//! Batch ingestion into a vector store
//!
//! Records are upserted in batches of at most [`MAX_BATCH_SIZE`]. A batch the
//! store rejects is counted and skipped; ingestion carries on with the next
//! one.

use crate::chunk::ChunkRecord;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Largest batch a store accepts in one upsert
pub const MAX_BATCH_SIZE: usize = 96;

/// Namespace records land in by default
pub const DEFAULT_NAMESPACE: &str = "docs";

/// Destination for retrieval records
#[async_trait::async_trait]
pub trait VectorStore: Send + Sync {
    /// Upsert one batch into `namespace`
    ///
    /// # Errors
    /// Returns error if the store rejects the batch
    async fn upsert(&self, namespace: &str, records: &[ChunkRecord]) -> Result<()>;
}

/// Ingestion settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestConfig {
    pub namespace: String,
    /// Requested batch size, clamped to `1..=MAX_BATCH_SIZE`
    pub batch_size: usize,
    /// Pause between batches
    pub pause: Duration,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            batch_size: MAX_BATCH_SIZE,
            pause: Duration::from_millis(100),
        }
    }
}

impl IngestConfig {
    /// With namespace
    #[inline]
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// With batch size
    #[inline]
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// With pause between batches
    #[inline]
    #[must_use]
    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    /// Batch size actually used
    #[inline]
    #[must_use]
    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.clamp(1, MAX_BATCH_SIZE)
    }
}

/// Outcome of an ingestion run
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IngestReport {
    pub namespace: String,
    /// Records the store accepted
    pub upserted: usize,
    pub total_records: usize,
    pub batch_size: usize,
    pub failed_batches: usize,
}

/// Upsert `records` in batches
pub async fn ingest(
    store: &dyn VectorStore,
    records: &[ChunkRecord],
    config: &IngestConfig,
) -> IngestReport {
    let batch_size = config.effective_batch_size();
    let total_batches = records.len().div_ceil(batch_size);
    let mut report = IngestReport {
        namespace: config.namespace.clone(),
        total_records: records.len(),
        batch_size,
        ..IngestReport::default()
    };

    for (i, batch) in records.chunks(batch_size).enumerate() {
        tracing::info!(
            "Upserting batch {}/{} ({} records)",
            i + 1,
            total_batches,
            batch.len()
        );
        match store.upsert(&config.namespace, batch).await {
            Ok(()) => report.upserted += batch.len(),
            Err(e) => {
                tracing::error!("Failed to upsert batch {}: {}", i + 1, e);
                report.failed_batches += 1;
            }
        }
        if i + 1 < total_batches && !config.pause.is_zero() {
            tokio::time::sleep(config.pause).await;
        }
    }

    tracing::info!(
        "Ingested {}/{} records into '{}' ({} failed batches)",
        report.upserted,
        report.total_records,
        report.namespace,
        report.failed_batches
    );
    report
}
