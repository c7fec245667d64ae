//! Batch orchestration for the streaming signal analytics engine.
//!
//! One invocation takes one stream event through
//! `Received -> Decoding -> Grouping -> per-symbol stages -> Complete`.
//! Every symbol runs `Analyzing -> Classifying -> Projecting -> Persisting`
//! on its own; a failure marks that symbol failed and the batch carries on.
//! The outcome is a [`BatchSummary`], never a batch-level error.

pub mod config;
pub mod logging;
pub mod pipeline;
pub mod state;
pub mod summary;

pub use config::{ConfigError, ProcessorConfig};
pub use logging::init_logging;
pub use pipeline::{BatchProcessor, SymbolFailure};
pub use state::{BatchPhase, SymbolOutcome, SymbolStage};
pub use summary::{BatchStatus, BatchSummary, SymbolReport};
