//! Channel configuration loader.
//!
//! Loads the delivery settings (output slot, log label, indentation, output
//! directory and file naming) from YAML. Every key is optional and falls back
//! to the defaults of a plain REF^I12 channel. Environment variables override
//! the file for the settings that differ between deployments.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::referral::ReferralDocument;

/// Overrides `output_dir`
pub const ENV_OUTPUT_DIR: &str = "REFERRAL_OUTPUT_DIR";
/// Overrides `output_key`
pub const ENV_OUTPUT_KEY: &str = "REFERRAL_OUTPUT_KEY";

/// Delivery settings for the referral channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Channel-map slot the serialized document is stored under
    pub output_key: String,

    /// Label prefixed to the payload when it is logged
    pub log_label: String,

    /// Indentation used when serializing the document
    pub indent: String,

    /// Directory the file writer delivers into
    pub output_dir: PathBuf,

    /// File name with `{mrn}`, `{appointment_id}` and `{message_type}` placeholders
    pub file_name_template: String,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            output_key: "referralJson".to_string(),
            log_label: "REF_I12 JSON Output".to_string(),
            indent: "\t".to_string(),
            output_dir: PathBuf::from("out"),
            file_name_template: "{mrn}_{appointment_id}.json".to_string(),
        }
    }
}

impl ChannelConfig {
    /// Load channel configuration from a YAML file.
    ///
    /// # Errors
    /// Returns error if the file can't be read or isn't valid YAML for this
    /// structure.
    ///
    /// # Example
    /// ```ignore
    /// use refjson::runtime::ChannelConfig;
    ///
    /// let config = ChannelConfig::load_from_file("config/channel.yaml")?;
    /// println!("Delivering to {}", config.output_dir.display());
    /// ```
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();

        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {}", path.display(), e))?;

        Self::from_yaml_str(&contents)
            .map_err(|e| format!("Failed to parse config file {}: {}", path.display(), e))
    }

    /// Parse channel configuration from YAML text.
    ///
    /// An empty document yields the defaults.
    pub fn from_yaml_str(contents: &str) -> Result<Self, String> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(contents).map_err(|e| format!("Failed to parse YAML: {}", e))
    }

    /// Apply `REFERRAL_OUTPUT_DIR` / `REFERRAL_OUTPUT_KEY` from the process
    /// environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup. Empty values are ignored.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_OUTPUT_DIR).filter(|v| !v.is_empty()) {
            tracing::debug!(output_dir = %dir, "output directory overridden from environment");
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(key) = lookup(ENV_OUTPUT_KEY).filter(|v| !v.is_empty()) {
            tracing::debug!(output_key = %key, "output key overridden from environment");
            self.output_key = key;
        }
        self
    }

    /// Render the output file name for a document.
    ///
    /// Empty placeholder values render as `unknown`; characters outside
    /// `[A-Za-z0-9._-]` become `_`.
    pub fn render_file_name(&self, document: &ReferralDocument) -> String {
        let rendered = self
            .file_name_template
            .replace("{mrn}", or_unknown(&document.patient.mrn))
            .replace("{appointment_id}", or_unknown(&document.appointment.id))
            .replace("{message_type}", or_unknown(&document.message_type));

        unsafe_chars().replace_all(&rendered, "_").into_owned()
    }
}

fn or_unknown(value: &str) -> &str {
    if value.is_empty() {
        "unknown"
    } else {
        value
    }
}

fn unsafe_chars() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^A-Za-z0-9._-]").expect("static pattern is valid"))
}
