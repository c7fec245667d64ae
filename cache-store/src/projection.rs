// Cache Projection
// Derives the four cache records written for every analyzed symbol

use std::fmt::{Display, Formatter};
use std::time::Duration;

use chrono::{DateTime, Utc};
use common::{AnalyticsResult, SignalClassification, Symbol, TechnicalIndicators};
use serde::{Deserialize, Serialize};

use crate::error::ProjectionError;
use crate::keys::{KeySpace, ANALYTICS_TTL, LATEST_TTL, SNAPSHOT_TTL, SYMBOLS_TTL};

/// Which downstream view a record feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheView {
    Snapshot,
    Latest,
    Analytics,
    SymbolRegistry,
}

impl CacheView {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Snapshot => "snapshot",
            Self::Latest => "latest",
            Self::Analytics => "analytics",
            Self::SymbolRegistry => "symbol_registry",
        }
    }
}

impl Display for CacheView {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachePayload {
    /// Replace the key with a JSON document.
    Json(String),
    /// Add a member to the set stored at the key.
    SetMember(String),
}

/// One keyed write with its retention. Re-applying the same record is a
/// no-op for the store's contents apart from refreshing the expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRecord {
    pub view: CacheView,
    pub key: String,
    pub ttl: Duration,
    pub payload: CachePayload,
}

/// The `analytics` view: what a dashboard needs without the full statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub symbol: Symbol,
    pub last_updated: DateTime<Utc>,
    pub current_price: f64,
    pub signal_mean: f64,
    pub indicators: TechnicalIndicators,
    pub classification: SignalClassification,
    pub data_available: bool,
}

impl From<&AnalyticsResult> for AnalyticsSummary {
    fn from(result: &AnalyticsResult) -> Self {
        Self {
            symbol: result.symbol.clone(),
            last_updated: result.processed_at,
            current_price: result.latest_price,
            signal_mean: result.signal_mean,
            indicators: result.indicators,
            classification: result.classification,
            data_available: result.indicators.sma_5.is_some()
                || result.indicators.momentum.is_some(),
        }
    }
}

/// Builds cache records for analytics results under one key space.
#[derive(Debug, Clone, Default)]
pub struct ProjectionBuilder {
    keys: KeySpace,
}

impl ProjectionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.keys = KeySpace::new(prefix);
        self
    }

    /// Snapshot, latest, analytics and registry records, in that order.
    /// Deterministic: the same result always yields the same records.
    pub fn project(&self, result: &AnalyticsResult) -> Result<Vec<CacheRecord>, ProjectionError> {
        let symbol = &result.symbol;
        let full = encode(CacheView::Snapshot, symbol, result)?;
        let summary = encode(CacheView::Analytics, symbol, &AnalyticsSummary::from(result))?;

        Ok(vec![
            CacheRecord {
                view: CacheView::Snapshot,
                key: self.keys.snapshot(symbol, result.processed_at),
                ttl: SNAPSHOT_TTL,
                payload: CachePayload::Json(full.clone()),
            },
            CacheRecord {
                view: CacheView::Latest,
                key: self.keys.latest(symbol),
                ttl: LATEST_TTL,
                payload: CachePayload::Json(full),
            },
            CacheRecord {
                view: CacheView::Analytics,
                key: self.keys.analytics(symbol),
                ttl: ANALYTICS_TTL,
                payload: CachePayload::Json(summary),
            },
            CacheRecord {
                view: CacheView::SymbolRegistry,
                key: self.keys.symbols(),
                ttl: SYMBOLS_TTL,
                payload: CachePayload::SetMember(symbol.to_string()),
            },
        ])
    }
}

fn encode<T: Serialize>(
    view: CacheView,
    symbol: &Symbol,
    value: &T,
) -> Result<String, ProjectionError> {
    serde_json::to_string(value).map_err(|source| ProjectionError::Serialization {
        view: view.as_str(),
        symbol: symbol.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use common::{
        AnalyticsMetadata, Confidence, Direction, PriceStatistics, StrengthCategory,
        VolumeStatistics,
    };

    fn result(momentum: Option<f64>) -> AnalyticsResult {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 15, 0, 0).unwrap();
        AnalyticsResult {
            symbol: Symbol::parse("AAPL").unwrap(),
            record_count: 2,
            processed_at: at,
            first_tick_at: at,
            last_tick_at: at,
            latest_price: 152.0,
            signal_mean: 0.875,
            price: PriceStatistics {
                mean: 151.0,
                median: 151.0,
                stdev: 1.414,
                range: 2.0,
                pct_change: 1.333,
            },
            volume: VolumeStatistics {
                mean: 1050.0,
                median: 1050.0,
                total: 2100.0,
                stdev: 70.7,
            },
            indicators: TechnicalIndicators {
                sma_5: None,
                sma_10: None,
                momentum,
            },
            classification: SignalClassification {
                strength_category: StrengthCategory::VeryStrong,
                confidence: Confidence::High,
                direction: Direction::Buy,
            },
            metadata: AnalyticsMetadata::default(),
        }
    }

    #[test]
    fn projects_four_records_with_fixed_ttls() {
        let records = ProjectionBuilder::new().project(&result(Some(2.0))).unwrap();

        let layout: Vec<_> = records
            .iter()
            .map(|r| (r.view, r.key.as_str(), r.ttl.as_secs()))
            .collect();
        assert_eq!(
            layout,
            vec![
                (CacheView::Snapshot, "bavest:AAPL:2024-01-02T15:00:00.000000Z", 3600),
                (CacheView::Latest, "bavest:latest:AAPL", 3600),
                (CacheView::Analytics, "bavest:analytics:AAPL", 1800),
                (CacheView::SymbolRegistry, "bavest:symbols", 86_400),
            ]
        );
        assert_eq!(records[3].payload, CachePayload::SetMember("AAPL".to_string()));
    }

    #[test]
    fn snapshot_and_latest_hold_the_full_result() {
        let source = result(Some(2.0));
        let records = ProjectionBuilder::new().project(&source).unwrap();

        for record in &records[..2] {
            let CachePayload::Json(json) = &record.payload else {
                panic!("expected a JSON payload");
            };
            let decoded: AnalyticsResult = serde_json::from_str(json).unwrap();
            assert_eq!(decoded, source);
        }
    }

    #[test]
    fn analytics_view_fields() {
        let records = ProjectionBuilder::new().project(&result(Some(2.0))).unwrap();
        let CachePayload::Json(json) = &records[2].payload else {
            panic!("expected a JSON payload");
        };
        let view: serde_json::Value = serde_json::from_str(json).unwrap();

        assert_eq!(view["symbol"], "AAPL");
        assert_eq!(view["current_price"], 152.0);
        assert_eq!(view["classification"]["direction"], "buy");
        assert_eq!(view["data_available"], true);
        assert!(view.get("price").is_none());
    }

    #[test]
    fn data_unavailable_without_sma5_or_momentum() {
        let summary = AnalyticsSummary::from(&result(None));
        assert!(!summary.data_available);
    }

    #[test]
    fn projection_is_deterministic_and_prefix_aware() {
        let builder = ProjectionBuilder::new().with_key_prefix("test");
        let source = result(Some(2.0));

        let first = builder.project(&source).unwrap();
        let second = builder.project(&source).unwrap();
        assert_eq!(first, second);
        assert!(first.iter().all(|r| r.key.starts_with("test:")));
    }
}
