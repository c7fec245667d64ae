//! Data Ingestion (Layer 1)
//!
//! Turns one stream invocation into typed ticks:
//! - [`stream`] unwraps the transport envelope and its base64 payloads
//! - [`decoder`] parses each payload into a validated [`common::RawTick`]
//! - [`grouper`] partitions decoded ticks by symbol in arrival order
//!
//! A malformed record never aborts the batch; it is reported back as a
//! [`RecordFailure`] and the remaining records carry on.

pub mod decoder;
pub mod grouper;
pub mod stream;

pub use decoder::{decode_event, decode_payload, decode_record, DecodedBatch, RecordFailure};
pub use grouper::group_by_symbol;
pub use stream::{KinesisPayload, StreamEvent, StreamRecord};
