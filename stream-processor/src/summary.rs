// Batch Summary
// The structured result every invocation returns, including total failures

use chrono::{DateTime, Utc};
use common::Symbol;
use data_ingestion::RecordFailure;
use serde::Serialize;
use uuid::Uuid;

use crate::state::{BatchPhase, SymbolOutcome, SymbolStage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Success,
    PartialFailure,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolReport {
    pub symbol: Symbol,
    pub record_count: usize,
    pub outcome: SymbolOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_stage: Option<SymbolStage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SymbolReport {
    pub fn persisted(symbol: Symbol, record_count: usize) -> Self {
        Self {
            symbol,
            record_count,
            outcome: SymbolOutcome::Persisted,
            failed_stage: None,
            error: None,
        }
    }

    pub fn failed(
        symbol: Symbol,
        record_count: usize,
        stage: SymbolStage,
        error: impl ToString,
    ) -> Self {
        Self {
            symbol,
            record_count,
            outcome: SymbolOutcome::Failed,
            failed_stage: Some(stage),
            error: Some(error.to_string()),
        }
    }
}

/// Counts and per-symbol outcomes for one batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub batch_id: Uuid,
    pub processed_at: DateTime<Utc>,
    pub phase: BatchPhase,
    pub status: BatchStatus,
    pub received: usize,
    pub decoded: usize,
    pub decode_failures: usize,
    pub symbols_grouped: usize,
    pub analyzed: usize,
    pub persisted: usize,
    pub failed: usize,
    pub failed_records: Vec<RecordFailure>,
    pub symbols: Vec<SymbolReport>,
}

impl BatchSummary {
    /// Assemble the final summary; counts and status derive from the parts.
    pub fn complete(
        batch_id: Uuid,
        processed_at: DateTime<Utc>,
        received: usize,
        decoded: usize,
        failed_records: Vec<RecordFailure>,
        symbols: Vec<SymbolReport>,
    ) -> Self {
        let persisted = symbols
            .iter()
            .filter(|s| s.outcome == SymbolOutcome::Persisted)
            .count();
        let failed = symbols.len() - persisted;
        // A symbol counts as analyzed once it got past the analysis stage
        let analyzed = symbols
            .iter()
            .filter(|s| s.failed_stage != Some(SymbolStage::Analyzing))
            .count();

        let status = if persisted == 0 {
            BatchStatus::Failed
        } else if failed > 0 || !failed_records.is_empty() {
            BatchStatus::PartialFailure
        } else {
            BatchStatus::Success
        };

        Self {
            batch_id,
            processed_at,
            phase: BatchPhase::Complete,
            status,
            received,
            decoded,
            decode_failures: failed_records.len(),
            symbols_grouped: symbols.len(),
            analyzed,
            persisted,
            failed,
            failed_records,
            symbols,
        }
    }

    /// Records arrived but nothing reached the store.
    pub fn is_total_failure(&self) -> bool {
        self.received > 0 && self.persisted == 0
    }

    pub fn report_for(&self, symbol: &str) -> Option<&SymbolReport> {
        self.symbols.iter().find(|s| s.symbol.as_str() == symbol)
    }
}
