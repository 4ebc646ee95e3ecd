//! Read-only view over a parsed HL7 message.
//!
//! The message is a three-level tree keyed by segment name, field tag and
//! component tag:
//!
//! ```json
//! {
//!   "PID": {
//!     "PID.3": { "PID.3.1": "12345", "PID.3.4": "CLINIC_A" },
//!     "PID.5": { "PID.5.1": "CLARK", "PID.5.2": "ANNA" }
//!   }
//! }
//! ```
//!
//! Any level may be missing. Lookups never fail; see [`Extractor`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::extraction::{Extractor, FieldPath};

/// A parsed HL7 message addressed by `segment -> field -> component`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hl7Message {
    root: JsonValue,
}

impl Hl7Message {
    /// Wrap an already-built tree.
    pub fn new(root: JsonValue) -> Self {
        Self { root }
    }

    /// An empty message; every lookup resolves to absent.
    pub fn empty() -> Self {
        Self {
            root: JsonValue::Object(Map::new()),
        }
    }

    /// Load the tree form from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text).map(Self::new)
    }

    /// Set a component value, creating the segment and field levels as needed.
    ///
    /// Used by the ER7 reader while building a message. Replacing a
    /// non-object level discards it.
    pub fn set_component(&mut self, path: &FieldPath, value: impl Into<String>) {
        let segment = child_object(&mut self.root, path.segment_key());
        let field = child_object(segment, &path.field_tag());

        if let JsonValue::Object(components) = field {
            components.insert(path.component_tag(), JsonValue::String(value.into()));
        }
    }

    /// Whether a segment with this name is present.
    pub fn has_segment(&self, name: &str) -> bool {
        self.root.get(name).is_some()
    }

    /// Raw leaf node at an address, if every level is present.
    pub fn get(&self, path: &FieldPath) -> Option<&JsonValue> {
        self.root
            .get(path.segment_key())
            .and_then(|segment| segment.get(path.field_tag()))
            .and_then(|field| field.get(path.component_tag()))
    }

    /// Access the underlying tree.
    pub fn as_json(&self) -> &JsonValue {
        &self.root
    }
}

impl From<JsonValue> for Hl7Message {
    fn from(root: JsonValue) -> Self {
        Self::new(root)
    }
}

impl Extractor for Hl7Message {
    fn extract(&self, path: &FieldPath) -> Option<String> {
        let value = self.get(path).and_then(display_string);

        if value.is_none() {
            tracing::trace!(address = %path, "address not present in message");
        }

        value
    }
}

/// Display string of a leaf node. `null` is the "nothing" marker.
fn display_string(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        // Structured leaves keep their JSON text so nothing is lost silently.
        other => Some(other.to_string()),
    }
}

fn child_object<'a>(parent: &'a mut JsonValue, key: &str) -> &'a mut JsonValue {
    if !parent.is_object() {
        *parent = JsonValue::Object(Map::new());
    }

    let child = &mut parent[key];
    if !child.is_object() {
        *child = JsonValue::Object(Map::new());
    }
    child
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message() -> Hl7Message {
        Hl7Message::new(json!({
            "PID": {
                "PID.3": { "PID.3.1": "12345", "PID.3.4": null },
                "PID.5": { "PID.5.1": "CLARK" },
                "PID.7": { "PID.7.1": 19900115 },
                "PID.9": "not-an-object"
            },
            "SCH": {}
        }))
    }

    #[test]
    fn test_present_component() {
        let msg = message();
        assert_eq!(msg.extract(&FieldPath::new("PID", 3, 1)), Some("12345".to_string()));
        assert_eq!(msg.extract_or_empty(&FieldPath::new("PID", 5, 1)), "CLARK");
    }

    #[test]
    fn test_absent_at_every_level() {
        let msg = message();

        // segment
        assert_eq!(msg.extract_or_empty(&FieldPath::new("AIG", 3, 1)), "");
        // field
        assert_eq!(msg.extract_or_empty(&FieldPath::new("SCH", 2, 1)), "");
        // component
        assert_eq!(msg.extract_or_empty(&FieldPath::new("PID", 5, 2)), "");
        // null marker
        assert_eq!(msg.extract_or_empty(&FieldPath::new("PID", 3, 4)), "");
        // field is a scalar, not a component map
        assert_eq!(msg.extract_or_empty(&FieldPath::new("PID", 9, 1)), "");
    }

    #[test]
    fn test_non_string_leaf_uses_display_form() {
        let msg = message();
        assert_eq!(msg.extract_or_empty(&FieldPath::new("PID", 7, 1)), "19900115");
    }

    #[test]
    fn test_values_are_not_trimmed() {
        let msg = Hl7Message::new(json!({ "PV1": { "PV1.3": { "PV1.3.2": " Room 1 " } } }));
        assert_eq!(msg.extract_or_empty(&FieldPath::new("PV1", 3, 2)), " Room 1 ");
    }

    #[test]
    fn test_non_object_root_is_empty() {
        let msg = Hl7Message::new(json!("MSH|^~\\&"));
        assert_eq!(msg.extract_or_empty(&FieldPath::new("MSH", 9, 1)), "");
        assert!(!msg.has_segment("MSH"));
    }

    #[test]
    fn test_set_component_builds_levels() {
        let mut msg = Hl7Message::empty();
        msg.set_component(&FieldPath::new("AIG", 3, 1), "CARD_CLINIC");
        msg.set_component(&FieldPath::new("AIG", 3, 2), "Cardiology");

        assert!(msg.has_segment("AIG"));
        assert_eq!(
            msg.as_json(),
            &json!({ "AIG": { "AIG.3": { "AIG.3.1": "CARD_CLINIC", "AIG.3.2": "Cardiology" } } })
        );
    }

    #[test]
    fn test_from_json_str() {
        let msg = Hl7Message::from_json_str(r#"{"MSH":{"MSH.9":{"MSH.9.1":"REF"}}}"#).unwrap();
        assert_eq!(msg.extract_or_empty(&FieldPath::new("MSH", 9, 1)), "REF");

        assert!(Hl7Message::from_json_str("{not json").is_err());
    }
}
