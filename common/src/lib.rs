//! Shared domain types for the signal analytics workspace.
//!
//! Every crate in the pipeline speaks these types: the decoder produces
//! [`RawTick`]s, the grouper collects them into [`SymbolBatch`]es, the
//! statistics engine and classifier fill in an [`AnalyticsResult`], and the
//! cache layer persists it.

mod analytics;
mod error;
mod tick;

pub use analytics::{
    AnalyticsMetadata, AnalyticsResult, Confidence, Direction, PriceStatistics,
    SignalClassification, StrengthCategory, TechnicalIndicators, VolumeStatistics,
    PROCESSING_SOURCE, PROCESSOR_VERSION,
};
pub use error::MalformedRecordError;
pub use tick::{RawTick, Symbol, SymbolBatch};

// Re-export chrono types used across the public API
pub use chrono::{DateTime, Utc};
