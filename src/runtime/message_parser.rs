//! Per-message referral pipeline.
//!
//! Runs extraction and document building for one message, then hands the
//! serialized document to the channel map and the log. The transform step is
//! pure; only [`ReferralTransformer::deliver`] touches the outside world.

use crate::entity::{Entity, EntityError};
use crate::extraction::Extractor;
use crate::referral::{ReferralDocument, ReferralFields};
use crate::runtime::config_loader::ChannelConfig;
use crate::runtime::context::ChannelMap;

/// Result of transforming one message.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformOutput {
    /// The built document
    pub document: ReferralDocument,

    /// The document serialized with the configured indentation
    pub json: String,
}

/// Transforms REF^I12 messages into referral documents.
///
/// # Example Flow
/// 1. Extract the fixed leaf values from the message (absent values become `""`)
/// 2. Build the fixed-shape document
/// 3. Serialize it with the channel's indentation
/// 4. Store it in the channel map under the output key and log it
#[derive(Debug, Clone, Default)]
pub struct ReferralTransformer {
    config: ChannelConfig,
}

impl ReferralTransformer {
    /// Create a transformer with channel configuration.
    pub fn new(config: ChannelConfig) -> Self {
        Self { config }
    }

    /// Channel configuration in use.
    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    /// Extract, build and serialize one message.
    ///
    /// Missing segments, fields or components never cause an error; the
    /// only failure is JSON encoding.
    ///
    /// # Example
    /// ```
    /// use refjson::{Hl7Message, runtime::ReferralTransformer};
    ///
    /// let transformer = ReferralTransformer::default();
    /// let output = transformer.transform(&Hl7Message::empty()).unwrap();
    ///
    /// assert_eq!(output.document.message_type, "^");
    /// assert!(output.json.contains("\"duration\": null"));
    /// ```
    pub fn transform<E: Extractor + ?Sized>(&self, message: &E) -> Result<TransformOutput, EntityError> {
        let fields = ReferralFields::extract(message);
        let document = ReferralDocument::build(&fields);
        let json = document.to_json_indented(&self.config.indent)?;

        tracing::debug!(
            message_type = %document.message_type,
            mrn = %document.patient.mrn,
            "built referral document"
        );

        Ok(TransformOutput { document, json })
    }

    /// Hand the serialized document to the channel map and mirror it to the log.
    pub fn deliver(&self, output: &TransformOutput, channel_map: &mut ChannelMap) {
        channel_map.put(self.config.output_key.clone(), output.json.clone());
        tracing::info!("{}:\n{}", self.config.log_label, output.json);
    }

    /// Transform and deliver in one step.
    pub fn process<E: Extractor + ?Sized>(
        &self,
        message: &E,
        channel_map: &mut ChannelMap,
    ) -> Result<TransformOutput, EntityError> {
        let output = self.transform(message)?;
        self.deliver(&output, channel_map);
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Hl7Message;
    use serde_json::json;

    fn message() -> Hl7Message {
        Hl7Message::new(json!({
            "MSH": { "MSH.9": { "MSH.9.1": "REF", "MSH.9.2": "I12" } },
            "PID": { "PID.3": { "PID.3.1": "12345" } },
            "SCH": { "SCH.6": { "SCH.6.1": "30" } }
        }))
    }

    #[test]
    fn test_transform_uses_configured_indent() {
        let transformer = ReferralTransformer::default();
        let output = transformer.transform(&message()).unwrap();

        assert!(output.json.starts_with("{\n\t\"message_type\": \"REF^I12\""));
        assert!(output.json.contains("\n\t\t\"duration\": 30,"));
    }

    #[test]
    fn test_json_matches_document() {
        let transformer = ReferralTransformer::default();
        let output = transformer.transform(&message()).unwrap();

        let parsed: ReferralDocument = serde_json::from_str(&output.json).unwrap();
        assert_eq!(parsed, output.document);
    }

    #[test]
    fn test_transform_is_repeatable() {
        let transformer = ReferralTransformer::default();
        let msg = message();

        let first = transformer.transform(&msg).unwrap();
        let second = transformer.transform(&msg).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_deliver_puts_output_key() {
        let transformer = ReferralTransformer::new(ChannelConfig {
            output_key: "customSlot".to_string(),
            ..Default::default()
        });
        let mut channel_map = ChannelMap::new();

        let output = transformer.process(&message(), &mut channel_map).unwrap();

        assert_eq!(channel_map.get("customSlot"), Some(output.json.as_str()));
        assert!(!channel_map.contains("referralJson"));
    }

    #[test]
    fn test_empty_message_still_delivers() {
        let transformer = ReferralTransformer::default();
        let mut channel_map = ChannelMap::new();

        let output = transformer.process(&Hl7Message::empty(), &mut channel_map).unwrap();

        assert_eq!(output.document.message_type, "^");
        assert_eq!(output.document.appointment.duration, None);
        assert!(channel_map.contains("referralJson"));
    }
}
