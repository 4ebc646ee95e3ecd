//! Output slots for one processed message.
//!
//! The channel map is where a transformed payload is handed over to the
//! destination writers. Keys are slot names such as `referralJson`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Named payload slots filled while processing one message.
///
/// Insertion order is kept so slots are written out in the order they were
/// produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMap {
    #[serde(default)]
    slots: IndexMap<String, String>,
}

impl ChannelMap {
    /// Create an empty channel map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a payload under a slot name, replacing any previous payload.
    ///
    /// # Example
    /// ```
    /// use refjson::runtime::ChannelMap;
    ///
    /// let mut map = ChannelMap::new();
    /// map.put("referralJson", "{}");
    /// assert_eq!(map.get("referralJson"), Some("{}"));
    /// ```
    pub fn put(&mut self, key: impl Into<String>, payload: impl Into<String>) -> Option<String> {
        self.slots.insert(key.into(), payload.into())
    }

    /// Payload stored under a slot name.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.slots.get(key).map(|s| s.as_str())
    }

    /// Check if a slot has been filled.
    pub fn contains(&self, key: &str) -> bool {
        self.slots.contains_key(key)
    }

    /// Number of filled slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Iterate over `(slot, payload)` in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.slots.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_and_get() {
        let mut map = ChannelMap::new();

        assert!(map.is_empty());
        assert_eq!(map.put("referralJson", "{\"a\":1}"), None);

        assert!(map.contains("referralJson"));
        assert!(!map.contains("other"));
        assert_eq!(map.get("referralJson"), Some("{\"a\":1}"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_put_replaces() {
        let mut map = ChannelMap::new();
        map.put("referralJson", "first");

        assert_eq!(map.put("referralJson", "second"), Some("first".to_string()));
        assert_eq!(map.get("referralJson"), Some("second"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_iteration_keeps_insertion_order() {
        let mut map = ChannelMap::new();
        map.put("zeta", "1");
        map.put("alpha", "2");
        map.put("mid", "3");

        let keys: Vec<&str> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_serialization() {
        let mut map = ChannelMap::new();
        map.put("referralJson", "{}");

        let json = serde_json::to_value(&map).expect("Should serialize");
        let back: ChannelMap = serde_json::from_value(json).expect("Should deserialize");

        assert_eq!(back, map);
    }
}
