// Stream Transport Envelope
// One invocation delivers a document of Kinesis-style records whose `data`
// field carries the base64-encoded tick payload.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use common::MalformedRecordError;
use serde::{Deserialize, Serialize};

/// The event document handed to one processing invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<StreamRecord>,
}

/// One record as delivered by the transport. Every field is optional at this
/// level so a single broken record can be rejected without losing the batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamRecord {
    #[serde(rename = "eventID", default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kinesis: Option<KinesisPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KinesisPayload {
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_number: Option<String>,
}

impl StreamEvent {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Build an event from raw payloads, encoding them the way the transport does.
    pub fn from_payloads<I, P>(payloads: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<[u8]>,
    {
        let records = payloads
            .into_iter()
            .enumerate()
            .map(|(index, payload)| StreamRecord::from_payload(format!("record-{index}"), payload))
            .collect();
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl StreamRecord {
    pub fn from_payload(event_id: impl Into<String>, payload: impl AsRef<[u8]>) -> Self {
        Self {
            event_id: Some(event_id.into()),
            kinesis: Some(KinesisPayload {
                data: Some(STANDARD.encode(payload.as_ref())),
                partition_key: None,
                sequence_number: None,
            }),
        }
    }

    /// Identifier used when reporting this record: `eventID`, then the
    /// sequence number, then `"unknown"`.
    pub fn record_id(&self) -> &str {
        self.event_id
            .as_deref()
            .or_else(|| {
                self.kinesis
                    .as_ref()
                    .and_then(|k| k.sequence_number.as_deref())
            })
            .unwrap_or("unknown")
    }

    pub fn partition_key(&self) -> Option<&str> {
        self.kinesis.as_ref().and_then(|k| k.partition_key.as_deref())
    }

    /// Decode the base64 `data` field into the raw payload bytes.
    pub fn payload(&self) -> Result<Vec<u8>, MalformedRecordError> {
        let data = self
            .kinesis
            .as_ref()
            .and_then(|k| k.data.as_deref())
            .ok_or(MalformedRecordError::MissingField { field: "kinesis.data" })?;

        STANDARD
            .decode(data.trim())
            .map_err(|e| MalformedRecordError::InvalidEncoding(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_kinesis_event_document() {
        let doc = br#"{
            "Records": [
                {
                    "eventID": "shardId-000:1",
                    "kinesis": {
                        "data": "eyJzeW1ib2wiOiJBQVBMIn0=",
                        "partitionKey": "AAPL",
                        "sequenceNumber": "4959"
                    }
                },
                { "kinesis": { "sequenceNumber": "4960" } }
            ]
        }"#;

        let event = StreamEvent::from_slice(doc).expect("event should parse");
        assert_eq!(event.len(), 2);

        let first = &event.records[0];
        assert_eq!(first.record_id(), "shardId-000:1");
        assert_eq!(first.partition_key(), Some("AAPL"));
        assert_eq!(first.payload().unwrap(), br#"{"symbol":"AAPL"}"#.to_vec());

        let second = &event.records[1];
        assert_eq!(second.record_id(), "4960");
        assert_eq!(
            second.payload(),
            Err(MalformedRecordError::MissingField { field: "kinesis.data" })
        );
    }

    #[test]
    fn missing_records_is_an_empty_event() {
        let event = StreamEvent::from_slice(b"{}").unwrap();
        assert!(event.is_empty());
    }

    #[test]
    fn invalid_base64_is_malformed() {
        let record = StreamRecord {
            event_id: None,
            kinesis: Some(KinesisPayload {
                data: Some("not base64 !!".to_string()),
                partition_key: None,
                sequence_number: None,
            }),
        };
        assert_eq!(record.record_id(), "unknown");
        assert!(matches!(
            record.payload(),
            Err(MalformedRecordError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn from_payloads_round_trips_through_base64() {
        let event = StreamEvent::from_payloads([b"one".as_slice(), b"two".as_slice()]);
        assert_eq!(event.records[1].record_id(), "record-1");
        assert_eq!(event.records[1].payload().unwrap(), b"two".to_vec());
    }
}
