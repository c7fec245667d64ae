// Batch Processing Pipeline
// Orchestrates decoding, grouping, analytics and cache persistence for one stream event

use std::sync::Arc;
use std::time::Duration;

use cache_store::{
    CacheWriter, PersistenceError, ProjectionBuilder, ProjectionError, DEFAULT_KEY_PREFIX,
};
use chrono::{DateTime, Utc};
use common::{AnalyticsResult, SymbolBatch};
use data_ingestion::{decode_event, group_by_symbol, StreamEvent};
use signal_generation::{assemble_result, classify, compute_statistics, AnalyticsError};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::state::{BatchPhase, SymbolStage};
use crate::summary::{BatchSummary, SymbolReport};

const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Why one symbol's pipeline stopped.
#[derive(Debug, Error)]
pub enum SymbolFailure {
    #[error("analytics failed: {0}")]
    Analytics(#[from] AnalyticsError),

    #[error("projection failed: {0}")]
    Projection(#[from] ProjectionError),

    #[error("persistence failed: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Processes stream events against one cache writer.
pub struct BatchProcessor {
    writer: Arc<dyn CacheWriter>,
    projection: ProjectionBuilder,
    write_timeout: Duration,
}

impl BatchProcessor {
    pub fn new(writer: Arc<dyn CacheWriter>) -> Self {
        info!("Batch processor using {} cache", writer.describe());
        Self {
            writer,
            projection: ProjectionBuilder::new().with_key_prefix(DEFAULT_KEY_PREFIX),
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.projection = self.projection.with_key_prefix(prefix);
        self
    }

    /// Bound on each symbol's write; hitting it fails that symbol only.
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    pub async fn process_event(&self, event: &StreamEvent) -> BatchSummary {
        self.process_event_at(event, Utc::now()).await
    }

    /// Process with a fixed `processed_at`, which every key and result in the
    /// batch shares. Re-running an event with the same instant rewrites the
    /// same keys.
    pub async fn process_event_at(
        &self,
        event: &StreamEvent,
        processed_at: DateTime<Utc>,
    ) -> BatchSummary {
        let batch_id = Uuid::new_v4();
        let mut phase = BatchPhase::Received;
        info!("Batch {} received with {} records", batch_id, event.len());

        phase = self.advance(batch_id, phase);
        let decoded = decode_event(event);
        let received = decoded.received();
        let decoded_count = decoded.ticks.len();
        if decoded_count == 0 && received > 0 {
            warn!("Batch {}: none of {} records decoded", batch_id, received);
        }

        phase = self.advance(batch_id, phase);
        let groups = group_by_symbol(decoded.ticks);

        // Deterministic order for logs and the summary
        let mut batches: Vec<SymbolBatch> = groups.into_values().collect();
        batches.sort_by(|a, b| a.symbol().cmp(b.symbol()));

        phase = self.advance(batch_id, phase);
        let mut reports = Vec::with_capacity(batches.len());
        for batch in &batches {
            reports.push(self.process_symbol(batch, processed_at).await);
        }

        phase = self.advance(batch_id, phase);
        debug_assert_eq!(phase, BatchPhase::Complete);

        let summary = BatchSummary::complete(
            batch_id,
            processed_at,
            received,
            decoded_count,
            decoded.failures,
            reports,
        );

        info!(
            "Batch {} complete: {} received, {} decoded, {} persisted, {} failed symbols, {} bad records",
            batch_id,
            summary.received,
            summary.decoded,
            summary.persisted,
            summary.failed,
            summary.decode_failures
        );
        summary
    }

    fn advance(&self, batch_id: Uuid, phase: BatchPhase) -> BatchPhase {
        let next = phase.next().unwrap_or(BatchPhase::Complete);
        debug!("Batch {}: {} -> {}", batch_id, phase, next);
        next
    }

    /// Run one symbol through every stage, converting the first failure into
    /// a failed report.
    async fn process_symbol(&self, batch: &SymbolBatch, processed_at: DateTime<Utc>) -> SymbolReport {
        let symbol = batch.symbol().clone();
        let record_count = batch.len();

        match self.run_stages(batch, processed_at).await {
            Ok(result) => {
                info!(
                    "{}: persisted ({} ticks, {} / {})",
                    symbol,
                    record_count,
                    result.classification.strength_category,
                    result.classification.direction
                );
                SymbolReport::persisted(symbol, record_count)
            }
            Err((stage, failure)) => {
                error!("{}: failed while {}: {}", symbol, stage, failure);
                SymbolReport::failed(symbol, record_count, stage, failure)
            }
        }
    }

    async fn run_stages(
        &self,
        batch: &SymbolBatch,
        processed_at: DateTime<Utc>,
    ) -> Result<AnalyticsResult, (SymbolStage, SymbolFailure)> {
        let symbol = batch.symbol();

        debug!("{}: {}", symbol, SymbolStage::Analyzing);
        let stats = compute_statistics(batch).map_err(|e| (SymbolStage::Analyzing, e.into()))?;

        debug!("{}: {}", symbol, SymbolStage::Classifying);
        let classification = classify(stats.signal_mean, stats.indicators.momentum);
        let result = assemble_result(batch, &stats, classification, processed_at)
            .map_err(|e| (SymbolStage::Classifying, e.into()))?;

        debug!("{}: {}", symbol, SymbolStage::Projecting);
        let records = self
            .projection
            .project(&result)
            .map_err(|e| (SymbolStage::Projecting, e.into()))?;

        debug!("{}: {} ({} records)", symbol, SymbolStage::Persisting, records.len());
        self.persist(&records)
            .await
            .map_err(|e| (SymbolStage::Persisting, e.into()))?;

        Ok(result)
    }

    async fn persist(&self, records: &[cache_store::CacheRecord]) -> Result<(), PersistenceError> {
        match tokio::time::timeout(self.write_timeout, self.writer.apply(records)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(PersistenceError::Timeout {
                operation: "cache write",
                timeout_ms: self.write_timeout.as_millis() as u64,
            }),
        }
    }
}
