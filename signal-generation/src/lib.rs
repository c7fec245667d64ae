// Signal Generation Framework (Layer 2)
// Derives per-symbol statistics and indicators and classifies the batch signal

pub mod analytics;
pub mod classifier;
pub mod error;
pub mod indicators;
pub mod statistics;

pub use analytics::assemble_result;
pub use classifier::{classify, confidence_for, direction_for, strength_category};
pub use error::AnalyticsError;
pub use indicators::{momentum, sma, technical_indicators, MOMENTUM_LOOKBACK, SMA_LONG_PERIOD, SMA_SHORT_PERIOD};
pub use statistics::{compute_statistics, price_statistics, volume_statistics, BatchStatistics};
