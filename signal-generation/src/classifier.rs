// Signal Classifier
// Maps the batch's representative signal strength and price momentum to a
// strength category, confidence level and directional recommendation

use common::{Confidence, Direction, SignalClassification, StrengthCategory};

const VERY_STRONG_THRESHOLD: f64 = 0.8;
const STRONG_THRESHOLD: f64 = 0.6;
const MODERATE_THRESHOLD: f64 = 0.4;
const WEAK_THRESHOLD: f64 = 0.2;

/// Bucket a signal strength. Lower bounds are inclusive; anything below 0.2,
/// including NaN, is `very_weak`.
///
/// Comparisons are exact, so callers pass a mean already rounded to 12
/// decimals; otherwise float error can drop a value sitting on a boundary.
pub fn strength_category(signal: f64) -> StrengthCategory {
    if signal >= VERY_STRONG_THRESHOLD {
        StrengthCategory::VeryStrong
    } else if signal >= STRONG_THRESHOLD {
        StrengthCategory::Strong
    } else if signal >= MODERATE_THRESHOLD {
        StrengthCategory::Moderate
    } else if signal >= WEAK_THRESHOLD {
        StrengthCategory::Weak
    } else {
        StrengthCategory::VeryWeak
    }
}

pub fn confidence_for(category: StrengthCategory) -> Confidence {
    match category {
        StrengthCategory::VeryStrong | StrengthCategory::Strong => Confidence::High,
        StrengthCategory::Moderate => Confidence::Medium,
        StrengthCategory::Weak | StrengthCategory::VeryWeak => Confidence::Low,
    }
}

/// Only a `strong` or better signal takes a side; absent momentum counts as flat.
pub fn direction_for(category: StrengthCategory, momentum: Option<f64>) -> Direction {
    if !category.is_strong_or_better() {
        return Direction::Hold;
    }

    match momentum.unwrap_or(0.0) {
        m if m > 0.0 => Direction::Buy,
        m if m < 0.0 => Direction::Sell,
        _ => Direction::Hold,
    }
}

pub fn classify(signal_mean: f64, momentum: Option<f64>) -> SignalClassification {
    let strength_category = strength_category(signal_mean);

    SignalClassification {
        strength_category,
        confidence: confidence_for(strength_category),
        direction: direction_for(strength_category, momentum),
    }
}
