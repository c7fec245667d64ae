//! Key naming and retention for the cache views

use std::time::Duration;

use chrono::{DateTime, Utc};
use common::Symbol;

pub const DEFAULT_KEY_PREFIX: &str = "bavest";

/// Per-invocation snapshot, `{prefix}:{symbol}:{processed_at}`.
pub const SNAPSHOT_TTL: Duration = Duration::from_secs(3600);
/// Most recent result, `{prefix}:latest:{symbol}`.
pub const LATEST_TTL: Duration = Duration::from_secs(3600);
/// Dashboard view, `{prefix}:analytics:{symbol}`.
pub const ANALYTICS_TTL: Duration = Duration::from_secs(1800);
/// Registry of every symbol seen, `{prefix}:symbols`.
pub const SYMBOLS_TTL: Duration = Duration::from_secs(86_400);

/// RFC 3339 UTC with microsecond precision, e.g. `2024-01-01T00:00:00.000000Z`.
pub fn format_key_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

/// The namespace every cache key lives under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpace {
    prefix: String,
}

impl KeySpace {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn snapshot(&self, symbol: &Symbol, processed_at: DateTime<Utc>) -> String {
        format!(
            "{}:{}:{}",
            self.prefix,
            symbol,
            format_key_timestamp(processed_at)
        )
    }

    pub fn latest(&self, symbol: &Symbol) -> String {
        format!("{}:latest:{}", self.prefix, symbol)
    }

    pub fn analytics(&self, symbol: &Symbol) -> String {
        format!("{}:analytics:{}", self.prefix, symbol)
    }

    pub fn symbols(&self) -> String {
        format!("{}:symbols", self.prefix)
    }
}

impl Default for KeySpace {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn key_layout() {
        let keys = KeySpace::default();
        let aapl = Symbol::parse("AAPL").unwrap();
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        assert_eq!(keys.snapshot(&aapl, at), "bavest:AAPL:2024-01-01T00:00:00.000000Z");
        assert_eq!(keys.latest(&aapl), "bavest:latest:AAPL");
        assert_eq!(keys.analytics(&aapl), "bavest:analytics:AAPL");
        assert_eq!(keys.symbols(), "bavest:symbols");
    }

    #[test]
    fn timestamp_keeps_microseconds() {
        let at = Utc.timestamp_opt(1_704_067_200, 123_456_789).unwrap();
        assert_eq!(format_key_timestamp(at), "2024-01-01T00:00:00.123456Z");
    }

    #[test]
    fn custom_prefix() {
        let keys = KeySpace::new("staging");
        assert_eq!(keys.symbols(), "staging:symbols");
        assert_eq!(keys.prefix(), "staging");
    }
}
