// Statistics Engine
// Descriptive statistics over one symbol's ordered tick sequence

use common::{PriceStatistics, SymbolBatch, TechnicalIndicators, VolumeStatistics};
use statrs::statistics::{Data, Median, OrderStatistics, Statistics};

use crate::error::AnalyticsError;
use crate::indicators::technical_indicators;

/// Everything the statistics stage derives for one batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchStatistics {
    pub price: PriceStatistics,
    pub volume: VolumeStatistics,
    pub indicators: TechnicalIndicators,
    /// Mean of every `signal_value`; the representative value the classifier uses.
    pub signal_mean: f64,
}

/// Compute price, volume and indicator statistics over the batch exactly as
/// received. Batches shorter than an indicator's window get `0.0` or `None`,
/// never an error.
pub fn compute_statistics(batch: &SymbolBatch) -> Result<BatchStatistics, AnalyticsError> {
    if batch.is_empty() {
        return Err(AnalyticsError::EmptyBatch);
    }

    let prices = batch.prices();
    let volumes = batch.volumes();
    let signals = batch.signal_values();

    let signal_mean = ensure_finite("signal_mean", snap(signals.iter().mean()))?;

    Ok(BatchStatistics {
        price: price_statistics(&prices)?,
        volume: volume_statistics(&volumes)?,
        indicators: technical_indicators(&prices),
        signal_mean,
    })
}

pub fn price_statistics(prices: &[f64]) -> Result<PriceStatistics, AnalyticsError> {
    let (first, last) = match (prices.first(), prices.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Err(AnalyticsError::EmptyBatch),
    };

    let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = prices.iter().copied().fold(f64::INFINITY, f64::min);

    // Never divide by a zero opening price
    let pct_change = if prices.len() >= 2 && first != 0.0 {
        (last - first) / first * 100.0
    } else {
        0.0
    };

    Ok(PriceStatistics {
        mean: ensure_finite("price.mean", prices.iter().mean())?,
        median: ensure_finite("price.median", median(prices))?,
        stdev: ensure_finite("price.stdev", sample_stdev(prices))?,
        range: ensure_finite("price.range", max - min)?,
        pct_change: ensure_finite("price.pct_change", pct_change)?,
    })
}

pub fn volume_statistics(volumes: &[f64]) -> Result<VolumeStatistics, AnalyticsError> {
    if volumes.is_empty() {
        return Err(AnalyticsError::EmptyBatch);
    }

    Ok(VolumeStatistics {
        mean: ensure_finite("volume.mean", volumes.iter().mean())?,
        median: ensure_finite("volume.median", median(volumes))?,
        total: ensure_finite("volume.total", volumes.iter().sum())?,
        stdev: ensure_finite("volume.stdev", sample_stdev(volumes))?,
    })
}

/// Sample standard deviation; a single point has none and reports `0.0`.
fn sample_stdev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    values.iter().std_dev()
}

/// Middle pair is halved before adding so two large finite values cannot overflow.
fn median(values: &[f64]) -> f64 {
    let n = values.len();
    let mut data = Data::new(values.to_vec());
    if n == 0 || n % 2 == 1 {
        return data.median();
    }
    let lower = data.order_statistic(n / 2);
    let upper = data.order_statistic(n / 2 + 1);
    lower / 2.0 + upper / 2.0
}

/// Signal means are compared against exact thresholds; round away the
/// accumulated float error first (0.6, 0.8, 1.0 averages to 0.8, not 0.7999...).
fn snap(value: f64) -> f64 {
    const SCALE: f64 = 1e12;
    (value * SCALE).round() / SCALE
}

fn ensure_finite(field: &'static str, value: f64) -> Result<f64, AnalyticsError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(AnalyticsError::NonFiniteStatistic { field })
    }
}
