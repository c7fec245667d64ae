use thiserror::Error;

/// Failures while deriving analytics for one symbol.
///
/// Too-few-points conditions are not errors: they produce `0.0` or an absent
/// indicator instead.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("cannot analyze an empty batch")]
    EmptyBatch,

    #[error("statistic '{field}' is not finite")]
    NonFiniteStatistic { field: &'static str },
}
