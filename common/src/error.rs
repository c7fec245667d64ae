use thiserror::Error;

/// Reasons a single stream record cannot become a [`crate::RawTick`].
///
/// These are always recovered by the caller: the record is skipped and the
/// rest of the batch carries on.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MalformedRecordError {
    #[error("record data is not valid base64: {0}")]
    InvalidEncoding(String),
    #[error("record data is not valid UTF-8")]
    InvalidUtf8,
    #[error("record payload is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("record payload must be a JSON object")]
    NotAnObject,

    #[error("missing required field '{field}'")]
    MissingField { field: &'static str },
    #[error("field '{field}' has an invalid value: {reason}")]
    InvalidField { field: &'static str, reason: String },
    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative, got {value}")]
    NegativeValue { field: &'static str, value: f64 },
    #[error("signal_value must be within [0, 1], got {value}")]
    SignalOutOfRange { value: f64 },

    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter: '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("timestamp must be RFC3339 or a unix epoch number: '{value}'")]
    InvalidTimestamp { value: String },
}
