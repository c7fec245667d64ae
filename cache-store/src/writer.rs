// Cache Writer Interface
// The keyed store the projection records are applied to

use crate::error::PersistenceError;
use crate::projection::CacheRecord;

/// Trait for cache store backends
#[async_trait::async_trait]
pub trait CacheWriter: Send + Sync {
    /// Apply every record for one symbol. Backends that can should apply them
    /// atomically; either way the call reports a single outcome.
    async fn apply(&self, records: &[CacheRecord]) -> Result<(), PersistenceError>;

    /// Check the store is reachable.
    async fn ping(&self) -> Result<(), PersistenceError>;

    /// Short backend description for logs.
    fn describe(&self) -> String;
}
