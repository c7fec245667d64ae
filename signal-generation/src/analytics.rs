// Analytics Assembly
// Combines statistics and classification into the AnalyticsResult written to the cache

use chrono::{DateTime, Utc};
use common::{AnalyticsMetadata, AnalyticsResult, SignalClassification, SymbolBatch};
use tracing::debug;

use crate::error::AnalyticsError;
use crate::statistics::BatchStatistics;

/// Build the result from the statistics and classification stages.
pub fn assemble_result(
    batch: &SymbolBatch,
    stats: &BatchStatistics,
    classification: SignalClassification,
    processed_at: DateTime<Utc>,
) -> Result<AnalyticsResult, AnalyticsError> {
    let (first, last) = match (batch.first(), batch.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(AnalyticsError::EmptyBatch),
    };

    debug!(
        "Analytics for {}: n={}, mean={:.4}, signal={:.3} -> {} / {}",
        batch.symbol(),
        batch.len(),
        stats.price.mean,
        stats.signal_mean,
        classification.strength_category,
        classification.direction
    );

    Ok(AnalyticsResult {
        symbol: batch.symbol().clone(),
        record_count: batch.len(),
        processed_at,
        first_tick_at: first.timestamp,
        last_tick_at: last.timestamp,
        latest_price: last.price,
        signal_mean: stats.signal_mean,
        price: stats.price,
        volume: stats.volume,
        indicators: stats.indicators,
        classification,
        metadata: AnalyticsMetadata::default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify;
    use crate::statistics::compute_statistics;
    use chrono::TimeZone;
    use common::{Confidence, Direction, RawTick, StrengthCategory, Symbol};

    fn batch(symbol: &str, points: &[(f64, f64, f64)]) -> SymbolBatch {
        let symbol = Symbol::parse(symbol).unwrap();
        let mut batch = SymbolBatch::new(symbol.clone());
        for (i, (price, volume, signal)) in points.iter().enumerate() {
            let ts = Utc.timestamp_opt(1_704_205_800 + i as i64 * 60, 0).unwrap();
            batch
                .try_push(RawTick::new(symbol.clone(), *price, *volume, *signal, ts).unwrap())
                .unwrap();
        }
        batch
    }

    fn analyze(
        batch: &SymbolBatch,
        processed_at: DateTime<Utc>,
    ) -> Result<AnalyticsResult, AnalyticsError> {
        let stats = compute_statistics(batch)?;
        let classification = classify(stats.signal_mean, stats.indicators.momentum);
        assemble_result(batch, &stats, classification, processed_at)
    }

    #[test]
    fn empty_batch_cannot_be_assembled() {
        let full = batch("AAPL", &[(1.0, 1.0, 0.5)]);
        let stats = compute_statistics(&full).unwrap();
        let classification = classify(stats.signal_mean, stats.indicators.momentum);
        let empty = SymbolBatch::new(Symbol::parse("AAPL").unwrap());

        assert_eq!(
            assemble_result(&empty, &stats, classification, Utc::now()),
            Err(AnalyticsError::EmptyBatch)
        );
    }

    #[test]
    fn aapl_two_tick_scenario() {
        let processed_at = Utc.with_ymd_and_hms(2024, 1, 2, 15, 0, 0).unwrap();
        let result = analyze(
            &batch("AAPL", &[(150.0, 1000.0, 0.85), (152.0, 1100.0, 0.9)]),
            processed_at,
        )
        .unwrap();

        assert_eq!(result.symbol.as_str(), "AAPL");
        assert_eq!(result.record_count, 2);
        assert_eq!(result.processed_at, processed_at);
        assert_eq!(result.latest_price, 152.0);
        assert!((result.price.mean - 151.0).abs() < 1e-9);
        assert!((result.price.pct_change - 1.3333).abs() < 1e-3);
        assert_eq!(result.indicators.momentum, Some(2.0));
        assert_eq!(result.classification.strength_category, StrengthCategory::VeryStrong);
        assert_eq!(result.classification.confidence, Confidence::High);
        assert_eq!(result.classification.direction, Direction::Buy);
        assert_eq!(result.first_tick_at.timestamp(), 1_704_205_800);
        assert_eq!(result.last_tick_at.timestamp(), 1_704_205_860);
    }

    #[test]
    fn strictly_increasing_prices_with_strong_signal_buy() {
        let result = analyze(
            &batch(
                "MSFT",
                &[(10.0, 1.0, 0.7), (11.0, 1.0, 0.65), (12.5, 1.0, 0.7)],
            ),
            Utc::now(),
        )
        .unwrap();

        assert!(result.indicators.momentum.unwrap() > 0.0);
        assert_eq!(result.classification.strength_category, StrengthCategory::Strong);
        assert_eq!(result.classification.direction, Direction::Buy);
    }

    #[test]
    fn falling_prices_with_weak_signal_hold() {
        let result = analyze(&batch("TSLA", &[(20.0, 1.0, 0.3), (19.0, 1.0, 0.25)]), Utc::now())
            .unwrap();

        assert_eq!(result.classification.strength_category, StrengthCategory::Weak);
        assert_eq!(result.classification.confidence, Confidence::Low);
        assert_eq!(result.classification.direction, Direction::Hold);
    }

    #[test]
    fn single_tick_never_errors() {
        let result = analyze(&batch("NVDA", &[(0.0, 0.0, 0.0)]), Utc::now()).unwrap();

        assert_eq!(result.price.stdev, 0.0);
        assert_eq!(result.price.pct_change, 0.0);
        assert_eq!(result.indicators.momentum, None);
        assert_eq!(result.indicators.sma_5, None);
        assert_eq!(result.classification.direction, Direction::Hold);
    }
}
