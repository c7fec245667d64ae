use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::MalformedRecordError;

const MAX_SYMBOL_LEN: usize = 32;

/// Normalized ticker or ISIN, always upper-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Parse and normalize a symbol to uppercase.
    pub fn parse(input: &str) -> Result<Self, MalformedRecordError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(MalformedRecordError::EmptySymbol);
        }

        let normalized = trimmed.to_ascii_uppercase();
        let len = normalized.chars().count();
        if len > MAX_SYMBOL_LEN {
            return Err(MalformedRecordError::SymbolTooLong {
                len,
                max: MAX_SYMBOL_LEN,
            });
        }

        if let Some(first) = normalized.chars().next() {
            if !first.is_ascii_alphabetic() {
                return Err(MalformedRecordError::SymbolInvalidStart { ch: first });
            }
        }

        for (index, ch) in normalized.chars().enumerate() {
            let valid = ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-' | '_');
            if !valid {
                return Err(MalformedRecordError::SymbolInvalidChar { ch, index });
            }
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Symbol {
    type Error = MalformedRecordError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for Symbol {
    type Error = MalformedRecordError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Symbol> for String {
    fn from(value: Symbol) -> Self {
        value.0
    }
}

/// One decoded market tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTick {
    pub symbol: Symbol,
    pub price: f64,
    pub volume: f64,
    pub signal_value: f64, // 0.0 to 1.0
    pub timestamp: DateTime<Utc>,
}

impl RawTick {
    /// Build a tick, rejecting negative or non-finite price/volume and a
    /// signal outside `[0, 1]`. Nothing is clamped.
    pub fn new(
        symbol: Symbol,
        price: f64,
        volume: f64,
        signal_value: f64,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, MalformedRecordError> {
        validate_non_negative("price", price)?;
        validate_non_negative("volume", volume)?;

        if !signal_value.is_finite() {
            return Err(MalformedRecordError::NonFiniteValue {
                field: "signal_value",
            });
        }
        if !(0.0..=1.0).contains(&signal_value) {
            return Err(MalformedRecordError::SignalOutOfRange {
                value: signal_value,
            });
        }

        Ok(Self {
            symbol,
            price,
            volume,
            signal_value,
            timestamp,
        })
    }
}

/// Ticks for one symbol in the order they arrived in the source batch.
///
/// Built once per invocation by the grouper and dropped once analytics are
/// derived. Arrival order is the contract; ticks are never re-sorted.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolBatch {
    symbol: Symbol,
    ticks: Vec<RawTick>,
}

impl SymbolBatch {
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            ticks: Vec::new(),
        }
    }

    /// Append a tick. A tick for another symbol is handed back untouched.
    pub fn try_push(&mut self, tick: RawTick) -> Result<(), RawTick> {
        if tick.symbol != self.symbol {
            return Err(tick);
        }
        self.ticks.push(tick);
        Ok(())
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn ticks(&self) -> &[RawTick] {
        &self.ticks
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    pub fn first(&self) -> Option<&RawTick> {
        self.ticks.first()
    }

    pub fn last(&self) -> Option<&RawTick> {
        self.ticks.last()
    }

    pub fn prices(&self) -> Vec<f64> {
        self.ticks.iter().map(|t| t.price).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.ticks.iter().map(|t| t.volume).collect()
    }

    pub fn signal_values(&self) -> Vec<f64> {
        self.ticks.iter().map(|t| t.signal_value).collect()
    }
}

fn validate_non_negative(field: &'static str, value: f64) -> Result<(), MalformedRecordError> {
    if !value.is_finite() {
        return Err(MalformedRecordError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(MalformedRecordError::NegativeValue { field, value });
    }
    Ok(())
}
