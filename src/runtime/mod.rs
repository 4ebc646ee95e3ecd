//! Runtime for processing referral messages.
//!
//! This module wires extraction and document building into a per-message
//! pipeline and provides the delivery side: channel configuration and the
//! channel map that destination writers read from.

pub mod context;
pub mod message_parser;
pub mod config_loader;

// Re-export key types
pub use context::ChannelMap;
pub use message_parser::{ReferralTransformer, TransformOutput};
pub use config_loader::{ChannelConfig, ENV_OUTPUT_DIR, ENV_OUTPUT_KEY};
