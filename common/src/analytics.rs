use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Symbol;

pub const PROCESSOR_VERSION: &str = "2.0";
pub const PROCESSING_SOURCE: &str = "stream-processor";

/// Descriptive statistics over a symbol's prices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceStatistics {
    pub mean: f64,
    pub median: f64,
    pub stdev: f64,
    pub range: f64,
    pub pct_change: f64,
}

/// Descriptive statistics over a symbol's volumes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeStatistics {
    pub mean: f64,
    pub median: f64,
    pub total: f64,
    pub stdev: f64,
}

/// Technical indicators. An indicator the batch is too short for is `None`
/// and left out of the serialized form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TechnicalIndicators {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sma_5: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sma_10: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub momentum: Option<f64>,
}

/// Signal strength bucket, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrengthCategory {
    VeryStrong,
    Strong,
    Moderate,
    Weak,
    VeryWeak,
}

impl StrengthCategory {
    /// `strong` or `very_strong`.
    pub fn is_strong_or_better(self) -> bool {
        matches!(self, Self::VeryStrong | Self::Strong)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::VeryStrong => "very_strong",
            Self::Strong => "strong",
            Self::Moderate => "moderate",
            Self::Weak => "weak",
            Self::VeryWeak => "very_weak",
        }
    }
}

impl Display for StrengthCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl Display for Confidence {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directional recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Buy,
    Sell,
    Hold,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
            Self::Hold => "hold",
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignalClassification {
    pub strength_category: StrengthCategory,
    pub confidence: Confidence,
    pub direction: Direction,
}

/// Provenance stamped onto every result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsMetadata {
    pub processor_version: String,
    pub processing_source: String,
}

impl Default for AnalyticsMetadata {
    fn default() -> Self {
        Self {
            processor_version: PROCESSOR_VERSION.to_string(),
            processing_source: PROCESSING_SOURCE.to_string(),
        }
    }
}

/// Everything derived for one symbol in one invocation. This is the unit
/// written into the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsResult {
    pub symbol: Symbol,
    pub record_count: usize,
    pub processed_at: DateTime<Utc>,
    pub first_tick_at: DateTime<Utc>,
    pub last_tick_at: DateTime<Utc>,
    pub latest_price: f64,
    /// Mean of every `signal_value` in the batch; drives the classification.
    pub signal_mean: f64,
    pub price: PriceStatistics,
    pub volume: VolumeStatistics,
    pub indicators: TechnicalIndicators,
    pub classification: SignalClassification,
    #[serde(default)]
    pub metadata: AnalyticsMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strength_ordering_helpers() {
        assert!(StrengthCategory::VeryStrong.is_strong_or_better());
        assert!(StrengthCategory::Strong.is_strong_or_better());
        assert!(!StrengthCategory::Moderate.is_strong_or_better());
        assert!(!StrengthCategory::VeryWeak.is_strong_or_better());
    }

    #[test]
    fn enums_serialize_snake_case() {
        let classification = SignalClassification {
            strength_category: StrengthCategory::VeryStrong,
            confidence: Confidence::High,
            direction: Direction::Buy,
        };
        let json = serde_json::to_value(classification).unwrap();
        assert_eq!(json["strength_category"], "very_strong");
        assert_eq!(json["confidence"], "high");
        assert_eq!(json["direction"], "buy");
    }

    #[test]
    fn absent_indicators_are_omitted() {
        let indicators = TechnicalIndicators {
            sma_5: None,
            sma_10: None,
            momentum: Some(2.0),
        };
        let json = serde_json::to_value(indicators).unwrap();
        assert!(json.get("sma_5").is_none());
        assert!(json.get("sma_10").is_none());
        assert_eq!(json["momentum"], 2.0);
    }
}
