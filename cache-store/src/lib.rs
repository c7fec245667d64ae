//! Cache projection and persistence (Layer 3)
//!
//! Turns one [`common::AnalyticsResult`] into the four TTL-governed views
//! downstream consumers read, and applies them to a keyed store:
//!
//! | Key | TTL | Content |
//! |-----|-----|---------|
//! | `{prefix}:{symbol}:{processed_at}` | 1 hour | full result |
//! | `{prefix}:latest:{symbol}` | 1 hour | most recent result |
//! | `{prefix}:analytics:{symbol}` | 30 minutes | classification and indicators |
//! | `{prefix}:symbols` | 24 hours | set of every symbol processed |
//!
//! The store itself sits behind [`CacheWriter`]; [`RedisCacheWriter`] talks to
//! Redis and [`InMemoryCacheWriter`] keeps everything in process.

mod config;
mod error;
mod keys;
mod memory;
mod projection;
mod redis_writer;
mod writer;

pub use config::StoreConfig;
pub use error::{PersistenceError, ProjectionError};
pub use keys::{
    format_key_timestamp, KeySpace, ANALYTICS_TTL, DEFAULT_KEY_PREFIX, LATEST_TTL, SNAPSHOT_TTL,
    SYMBOLS_TTL,
};
pub use memory::InMemoryCacheWriter;
pub use projection::{AnalyticsSummary, CachePayload, CacheRecord, CacheView, ProjectionBuilder};
pub use redis_writer::RedisCacheWriter;
pub use writer::CacheWriter;
