use thiserror::Error;

/// Failures turning an analytics result into cache payloads.
#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("failed to serialize {view} view for {symbol}: {source}")]
    Serialization {
        view: &'static str,
        symbol: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures at the keyed-store boundary. Always scoped to one symbol's
/// writes; the orchestrator marks that symbol failed and moves on.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("store connection refused: {0}")]
    ConnectionRefused(String),

    #[error("store authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("{operation} timed out after {timeout_ms}ms")]
    Timeout {
        operation: &'static str,
        timeout_ms: u64,
    },

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store command failed: {0}")]
    Command(String),

    #[error("invalid store configuration: {0}")]
    InvalidConfig(String),
}

impl From<redis::RedisError> for PersistenceError {
    fn from(e: redis::RedisError) -> Self {
        if e.is_connection_refusal() {
            Self::ConnectionRefused(e.to_string())
        } else if e.kind() == redis::ErrorKind::AuthenticationFailed {
            Self::AuthenticationFailed(e.to_string())
        } else if e.is_timeout() || e.is_connection_dropped() || e.is_io_error() {
            Self::Unavailable(e.to_string())
        } else {
            Self::Command(e.to_string())
        }
    }
}
