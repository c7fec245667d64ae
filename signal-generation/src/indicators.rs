//! Technical indicators for signal generation

use common::TechnicalIndicators;

pub const SMA_SHORT_PERIOD: usize = 5;
pub const SMA_LONG_PERIOD: usize = 10;

/// Momentum compares the latest price with the price this many steps earlier.
pub const MOMENTUM_LOOKBACK: usize = 1;

/// Simple moving average of the last `period` prices in arrival order.
///
/// Returns `None` when there are fewer than `period` prices; the indicator
/// is omitted rather than approximated.
pub fn sma(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() < period {
        return None;
    }

    let window = &prices[prices.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}

/// Latest price minus the price `lookback` steps earlier.
pub fn momentum(prices: &[f64], lookback: usize) -> Option<f64> {
    if lookback == 0 || prices.len() <= lookback {
        return None;
    }

    let latest = prices[prices.len() - 1];
    let past = prices[prices.len() - 1 - lookback];
    Some(latest - past)
}

pub fn technical_indicators(prices: &[f64]) -> TechnicalIndicators {
    TechnicalIndicators {
        sma_5: sma(prices, SMA_SHORT_PERIOD),
        sma_10: sma(prices, SMA_LONG_PERIOD),
        momentum: momentum(prices, MOMENTUM_LOOKBACK),
    }
}
