//! # refjson: HL7 v2 REF^I12 referral mapping
//!
//! refjson extracts a fixed set of fields from a parsed HL7 v2 REF^I12
//! (patient referral) message and projects them into a fixed-shape JSON
//! document for file delivery.
//!
//! ## Features
//!
//! - **Null-tolerant extraction**: every value is read through a
//!   `segment -> field -> component` address; anything absent becomes `""`
//! - **Fixed output shape**: the same key set for every message, whatever
//!   the source populated
//! - **Timestamp normalization**: HL7 `TS` tokens become `YYYY-MM-DDTHH:MM`
//! - **ER7 reader**: raw pipe-delimited messages index into the same tree
//! - **Delivery**: channel-map slots, a file writer and NDJSON output
//!
//! ## Example
//!
//! ```
//! use refjson::{er7, runtime::{ChannelMap, ReferralTransformer}};
//!
//! let message = er7::parse(
//!     "MSH|^~\\&|APP|FAC|||202511241015||REF^I12|1|P|2.5\r\
//!      SCH|P1|APT123||||30|MIN||||202511251000|202511251030||||BOOKED",
//! ).unwrap();
//!
//! let transformer = ReferralTransformer::default();
//! let mut channel_map = ChannelMap::new();
//! let output = transformer.process(&message, &mut channel_map).unwrap();
//!
//! assert_eq!(output.document.message_type, "REF^I12");
//! assert_eq!(output.document.appointment.start, "2025-11-25T10:00");
//! assert!(channel_map.contains("referralJson"));
//! ```

// Core modules
pub mod entity;
pub mod extraction;
pub mod message;
pub mod referral;
pub mod serialization;
pub mod timestamp;

// ER7 text ingestion
pub mod er7;

// Per-message pipeline, configuration and output slots
pub mod runtime;

// Re-export key types
pub use entity::{Entity, EntityError};
pub use extraction::{extract_all, Extractor, FieldPath};
pub use message::Hl7Message;
pub use referral::{
    coerce_duration, compose_message_type, Appointment, Patient, Provider, Referral,
    ReferralDocument, ReferralFields, Visit,
};
pub use serialization::{Delivery, FileWriter, NdjsonWriter, SerializationError};
pub use timestamp::hl7_datetime_to_iso;

pub use runtime::{ChannelConfig, ChannelMap, ReferralTransformer, TransformOutput};
