//! Core entity trait for output documents.
//!
//! An entity is a fixed-shape record that serializes to JSON. The referral
//! document and its groups implement it so the serialization helpers are
//! shared between the library, the writers and the CLI.

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fmt;

/// Error type for entity operations
#[derive(Debug)]
pub enum EntityError {
    /// JSON encoding failed.
    Encode(serde_json::Error),
    /// Encoded bytes were not valid UTF-8.
    Utf8(std::string::FromUtf8Error),
}

impl fmt::Display for EntityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityError::Encode(e) => write!(f, "JSON encoding error: {}", e),
            EntityError::Utf8(e) => write!(f, "Encoded JSON is not UTF-8: {}", e),
        }
    }
}

impl std::error::Error for EntityError {}

impl From<serde_json::Error> for EntityError {
    fn from(err: serde_json::Error) -> Self {
        EntityError::Encode(err)
    }
}

impl From<std::string::FromUtf8Error> for EntityError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        EntityError::Utf8(err)
    }
}

/// Core trait for all output entities.
///
/// # Example
///
/// ```
/// use refjson::Entity;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Visit {
///     patient_class: String,
/// }
///
/// impl Entity for Visit {}
///
/// let visit = Visit { patient_class: "O".to_string() };
/// assert_eq!(visit.to_json().unwrap(), r#"{"patient_class":"O"}"#);
/// ```
pub trait Entity: Serialize + Sized {
    /// Convert entity to a JSON value
    fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Convert entity to JSON string
    fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Convert entity to JSON indented with the given string (e.g. `"\t"`)
    fn to_json_indented(&self, indent: &str) -> Result<String, EntityError> {
        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(indent.as_bytes());
        let mut serializer = Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;
        Ok(String::from_utf8(buf)?)
    }

    /// Convert entity to NDJSON line (newline-delimited JSON)
    fn to_ndjson_line(&self) -> Result<String, serde_json::Error> {
        let json = self.to_json()?;
        Ok(format!("{}\n", json))
    }
}
