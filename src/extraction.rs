//! Field extraction over three-level HL7 addresses.
//!
//! Every value consulted by the referral mapping lives at a
//! `segment -> field -> component` address such as `PID.3.1`. This module
//! provides the address type and the null-tolerant lookup contract that
//! message representations implement.

use std::fmt;

/// Address of a single component inside a parsed HL7 message.
///
/// # Examples
///
/// - `PID.3.1` - segment `PID`, field `PID.3`, component `PID.3.1`
/// - `MSH.9.2` - segment `MSH`, field `MSH.9`, component `MSH.9.2`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    /// Segment name (e.g. "PID")
    pub segment: String,
    /// Field position within the segment, 1-based
    pub field: usize,
    /// Component position within the field, 1-based
    pub component: usize,
}

impl FieldPath {
    /// Build an address from its parts.
    ///
    /// ```
    /// use refjson::FieldPath;
    ///
    /// let path = FieldPath::new("PID", 5, 2);
    /// assert_eq!(path.component_tag(), "PID.5.2");
    /// ```
    pub fn new(segment: impl Into<String>, field: usize, component: usize) -> Self {
        Self {
            segment: segment.into(),
            field,
            component,
        }
    }

    /// Parse a dotted component tag (`"SCH.11.1"`).
    ///
    /// Returns `None` unless the tag has exactly three parts, a non-empty
    /// segment name and two positive positions.
    pub fn parse(tag: &str) -> Option<Self> {
        let mut parts = tag.split('.');
        let segment = parts.next().filter(|s| !s.is_empty())?;
        let field = parts.next()?.parse::<usize>().ok().filter(|n| *n > 0)?;
        let component = parts.next()?.parse::<usize>().ok().filter(|n| *n > 0)?;

        if parts.next().is_some() {
            return None;
        }

        Some(Self::new(segment, field, component))
    }

    /// Key of the segment level (`"PID"`).
    pub fn segment_key(&self) -> &str {
        &self.segment
    }

    /// Key of the field level (`"PID.3"`).
    pub fn field_tag(&self) -> String {
        format!("{}.{}", self.segment, self.field)
    }

    /// Key of the component level (`"PID.3.1"`).
    pub fn component_tag(&self) -> String {
        format!("{}.{}.{}", self.segment, self.field, self.component)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.segment, self.field, self.component)
    }
}

/// Lookup of leaf values by [`FieldPath`].
///
/// Implementations report presence through `Option`; callers that need a
/// total lookup use [`Extractor::extract_or_empty`], which never fails.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use refjson::{Extractor, FieldPath};
///
/// struct Flat(HashMap<String, String>);
///
/// impl Extractor for Flat {
///     fn extract(&self, path: &FieldPath) -> Option<String> {
///         self.0.get(&path.component_tag()).cloned()
///     }
/// }
///
/// let mut values = HashMap::new();
/// values.insert("PID.5.1".to_string(), "CLARK".to_string());
/// let flat = Flat(values);
///
/// assert_eq!(flat.extract_or_empty(&FieldPath::new("PID", 5, 1)), "CLARK");
/// assert_eq!(flat.extract_or_empty(&FieldPath::new("PID", 5, 2)), "");
/// ```
pub trait Extractor {
    /// Extract the display string at the given address.
    ///
    /// Returns `None` when any level of the address is absent or the leaf
    /// holds the "nothing" marker.
    fn extract(&self, path: &FieldPath) -> Option<String>;

    /// Extract a value, degenerating absence to the empty string.
    fn extract_or_empty(&self, path: &FieldPath) -> String {
        self.extract(path).unwrap_or_default()
    }
}

/// Resolve one leaf value per address, in order.
pub fn extract_all<E: Extractor + ?Sized>(source: &E, paths: &[FieldPath]) -> Vec<String> {
    paths.iter().map(|path| source.extract_or_empty(path)).collect()
}
