// Record Decoder
// Parses one raw stream payload into a validated RawTick

use chrono::{DateTime, TimeZone, Utc};
use common::{MalformedRecordError, RawTick, Symbol};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::stream::{StreamEvent, StreamRecord};

const SYMBOL_FIELDS: &[&str] = &["symbol", "ticker", "instrument", "asset", "stock"];
const PRICE_FIELDS: &[&str] = &["price", "current_price", "last_price", "close"];
const VOLUME_FIELDS: &[&str] = &["volume", "trading_volume"];
const SIGNAL_FIELDS: &[&str] = &["signal_value", "signal_strength"];
const TIMESTAMP_FIELDS: &[&str] = &["timestamp", "t"];

/// Epoch values above this are read as milliseconds rather than seconds.
const EPOCH_MILLIS_THRESHOLD: f64 = 1e12;

/// A record that could not be decoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordFailure {
    pub record_id: String,
    #[serde(serialize_with = "serialize_display")]
    pub error: MalformedRecordError,
}

/// Result of decoding every record in one event.
#[derive(Debug, Clone, Default)]
pub struct DecodedBatch {
    /// Successfully decoded ticks, in arrival order.
    pub ticks: Vec<RawTick>,
    pub failures: Vec<RecordFailure>,
}

impl DecodedBatch {
    pub fn received(&self) -> usize {
        self.ticks.len() + self.failures.len()
    }
}

/// Decode all records of an event. Malformed records are logged and
/// collected; they never stop the remaining records from decoding.
pub fn decode_event(event: &StreamEvent) -> DecodedBatch {
    let mut batch = DecodedBatch::default();

    for record in &event.records {
        match decode_record(record) {
            Ok(tick) => {
                debug!(
                    "Decoded record {} for {} (partition key: {})",
                    record.record_id(),
                    tick.symbol,
                    record.partition_key().unwrap_or("unknown")
                );
                batch.ticks.push(tick);
            }
            Err(e) => {
                warn!("Skipping malformed record {}: {}", record.record_id(), e);
                batch.failures.push(RecordFailure {
                    record_id: record.record_id().to_string(),
                    error: e,
                });
            }
        }
    }

    batch
}

pub fn decode_record(record: &StreamRecord) -> Result<RawTick, MalformedRecordError> {
    let payload = record.payload()?;
    decode_payload(&payload)
}

/// Decode one payload. Payloads wrapped by the upstream fetcher as
/// `{"data": {...}, "ingestion_timestamp": ..., "source": ...}` are unwrapped.
pub fn decode_payload(bytes: &[u8]) -> Result<RawTick, MalformedRecordError> {
    let text = std::str::from_utf8(bytes).map_err(|_| MalformedRecordError::InvalidUtf8)?;
    let value: Value = serde_json::from_str(text)
        .map_err(|e| MalformedRecordError::InvalidJson(e.to_string()))?;

    let outer = value.as_object().ok_or(MalformedRecordError::NotAnObject)?;
    let fields = match outer.get("data") {
        Some(Value::Object(inner)) => inner,
        _ => outer,
    };

    let symbol = extract_symbol(fields)?;
    let price = extract_number(fields, "price", PRICE_FIELDS)?;
    let volume = extract_number(fields, "volume", VOLUME_FIELDS)?;
    let signal_value = extract_number(fields, "signal_value", SIGNAL_FIELDS)?;
    let timestamp = extract_timestamp(fields)?;

    RawTick::new(symbol, price, volume, signal_value, timestamp)
}

fn extract_symbol(fields: &Map<String, Value>) -> Result<Symbol, MalformedRecordError> {
    let raw = SYMBOL_FIELDS
        .iter()
        .filter_map(|name| fields.get(*name))
        .filter_map(Value::as_str)
        .find(|s| !s.trim().is_empty())
        .ok_or(MalformedRecordError::MissingField { field: "symbol" })?;

    Symbol::parse(raw)
}

/// First present, non-null alias wins. Numeric strings are accepted.
fn extract_number(
    fields: &Map<String, Value>,
    field: &'static str,
    aliases: &[&str],
) -> Result<f64, MalformedRecordError> {
    let value = first_present(fields, aliases).ok_or(MalformedRecordError::MissingField { field })?;

    match value {
        Value::Number(n) => n.as_f64().ok_or(MalformedRecordError::NonFiniteValue { field }),
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| MalformedRecordError::InvalidField {
            field,
            reason: format!("'{s}' is not a number"),
        }),
        other => Err(MalformedRecordError::InvalidField {
            field,
            reason: format!("expected a number, got {other}"),
        }),
    }
}

fn extract_timestamp(fields: &Map<String, Value>) -> Result<DateTime<Utc>, MalformedRecordError> {
    let value = first_present(fields, TIMESTAMP_FIELDS)
        .ok_or(MalformedRecordError::MissingField { field: "timestamp" })?;

    let invalid = || MalformedRecordError::InvalidTimestamp {
        value: value.to_string(),
    };

    match value {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(parsed) = DateTime::parse_from_rfc3339(s) {
                return Ok(parsed.with_timezone(&Utc));
            }
            s.parse::<f64>()
                .ok()
                .and_then(from_epoch)
                .ok_or_else(invalid)
        }
        Value::Number(n) => n.as_f64().and_then(from_epoch).ok_or_else(invalid),
        _ => Err(invalid()),
    }
}

fn from_epoch(value: f64) -> Option<DateTime<Utc>> {
    if !value.is_finite() || value < 0.0 {
        return None;
    }

    if value >= EPOCH_MILLIS_THRESHOLD {
        Utc.timestamp_millis_opt(value as i64).single()
    } else {
        let secs = value.trunc() as i64;
        let nanos = ((value - value.trunc()) * 1e9).round() as u32;
        Utc.timestamp_opt(secs, nanos.min(999_999_999)).single()
    }
}

fn first_present<'a>(fields: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .filter_map(|name| fields.get(*name))
        .find(|v| !v.is_null())
}

fn serialize_display<S>(error: &MalformedRecordError, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_str(error)
}
