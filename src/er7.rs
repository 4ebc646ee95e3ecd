//! ER7 (pipe-delimited) HL7 reader.
//!
//! Turns raw HL7 v2 text into the three-level [`Hl7Message`] tree used by the
//! extractor. This is intentionally a thin indexer, not a validator:
//!
//! - separators come from the MSH header (`|^~\&` when there is no MSH)
//! - `MSH.1` is the field separator and `MSH.2` the encoding characters
//! - only the first occurrence of a segment and the first repetition of a
//!   field are kept
//! - empty fields and components are left out so they resolve to absent
//! - escape sequences and subcomponents are kept verbatim

use std::fmt;

use indexmap::IndexSet;

use crate::extraction::FieldPath;
use crate::message::Hl7Message;

/// Error type for ER7 parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Er7Error {
    /// The input contained no segments.
    Empty,
    /// The MSH segment is too short to carry a field separator.
    InvalidHeader(String),
}

impl fmt::Display for Er7Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Er7Error::Empty => write!(f, "HL7 message contains no segments"),
            Er7Error::InvalidHeader(line) => write!(f, "Invalid MSH header: '{}'", line),
        }
    }
}

impl std::error::Error for Er7Error {}

/// HL7 separator characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiters {
    pub field: char,
    pub component: char,
    pub repetition: char,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            field: '|',
            component: '^',
            repetition: '~',
        }
    }
}

impl Delimiters {
    /// Read separators from an MSH segment line.
    fn from_header(line: &str) -> Result<Self, Er7Error> {
        let field = line
            .chars()
            .nth(3)
            .ok_or_else(|| Er7Error::InvalidHeader(line.to_string()))?;

        let defaults = Self::default();
        let mut encoding = line.chars().skip(4).take_while(|c| *c != field);

        Ok(Self {
            field,
            component: encoding.next().unwrap_or(defaults.component),
            repetition: encoding.next().unwrap_or(defaults.repetition),
        })
    }
}

/// Parse ER7 text into an [`Hl7Message`].
///
/// ```
/// use refjson::{er7, Extractor, FieldPath};
///
/// let msg = er7::parse("MSH|^~\\&|APP|FAC|||20251124||REF^I12|1|P|2.5\rPID|1||12345^^^CLINIC_A^MR").unwrap();
/// assert_eq!(msg.extract_or_empty(&FieldPath::new("MSH", 9, 2)), "I12");
/// assert_eq!(msg.extract_or_empty(&FieldPath::new("PID", 3, 4)), "CLINIC_A");
/// ```
pub fn parse(text: &str) -> Result<Hl7Message, Er7Error> {
    let lines: Vec<&str> = text
        .split(['\r', '\n'])
        .map(str::trim_start)
        .filter(|line| !line.trim_end().is_empty())
        .collect();

    let first = lines.first().ok_or(Er7Error::Empty)?;
    let delimiters = if first.starts_with("MSH") {
        Delimiters::from_header(first)?
    } else {
        tracing::debug!("message does not start with MSH, using default separators");
        Delimiters::default()
    };

    let mut message = Hl7Message::empty();
    let mut seen = IndexSet::new();
    for line in lines {
        let name = line.split(delimiters.field).next().unwrap_or_default();
        if name.is_empty() {
            continue;
        }
        // A segment with only empty fields never reaches the tree, so
        // repeats are tracked by name rather than by tree presence.
        if !seen.insert(name) {
            tracing::debug!(segment = name, "skipping repeated segment");
            continue;
        }

        if name == "MSH" {
            read_header(&mut message, line, &delimiters);
        } else {
            for (index, value) in line.split(delimiters.field).enumerate().skip(1) {
                read_field(&mut message, name, index, value, &delimiters);
            }
        }
    }

    Ok(message)
}

fn read_header(message: &mut Hl7Message, line: &str, delimiters: &Delimiters) {
    message.set_component(&FieldPath::new("MSH", 1, 1), delimiters.field.to_string());

    let rest: String = line.chars().skip(4).collect();
    let mut fields = rest.split(delimiters.field);

    // MSH.2 holds the encoding characters and is never split.
    if let Some(encoding) = fields.next().filter(|e| !e.is_empty()) {
        message.set_component(&FieldPath::new("MSH", 2, 1), encoding);
    }

    for (offset, value) in fields.enumerate() {
        read_field(message, "MSH", offset + 3, value, delimiters);
    }
}

fn read_field(
    message: &mut Hl7Message,
    segment: &str,
    field: usize,
    value: &str,
    delimiters: &Delimiters,
) {
    let first_repetition = value.split(delimiters.repetition).next().unwrap_or_default();

    for (offset, component) in first_repetition.split(delimiters.component).enumerate() {
        if component.is_empty() {
            continue;
        }
        message.set_component(&FieldPath::new(segment, field, offset + 1), component);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::Extractor;

    fn get(msg: &Hl7Message, tag: &str) -> String {
        msg.extract_or_empty(&FieldPath::parse(tag).unwrap())
    }

    #[test]
    fn test_parse_header_numbering() {
        let msg = parse("MSH|^~\\&|SENDAPP|SENDFAC|RECVAPP|RECVFAC|202511241015||REF^I12|MSG0001|P|2.5").unwrap();

        assert_eq!(get(&msg, "MSH.1.1"), "|");
        assert_eq!(get(&msg, "MSH.2.1"), "^~\\&");
        assert_eq!(get(&msg, "MSH.3.1"), "SENDAPP");
        assert_eq!(get(&msg, "MSH.9.1"), "REF");
        assert_eq!(get(&msg, "MSH.9.2"), "I12");
        assert_eq!(get(&msg, "MSH.12.1"), "2.5");
    }

    #[test]
    fn test_parse_components_and_empty_slots() {
        let msg = parse("MSH|^~\\&|A\rPID|1||12345^^^CLINIC_A^MR||CLARK^ANNA||19900115|F").unwrap();

        assert_eq!(get(&msg, "PID.3.1"), "12345");
        assert_eq!(get(&msg, "PID.3.2"), "");
        assert_eq!(get(&msg, "PID.3.4"), "CLINIC_A");
        assert_eq!(get(&msg, "PID.3.5"), "MR");
        assert_eq!(get(&msg, "PID.5.2"), "ANNA");
        assert_eq!(get(&msg, "PID.8.1"), "F");
        assert_eq!(msg.get(&FieldPath::new("PID", 2, 1)), None);
        assert_eq!(msg.get(&FieldPath::new("PID", 3, 2)), None);
    }

    #[test]
    fn test_line_endings() {
        for sep in ["\r", "\n", "\r\n"] {
            let text = format!("MSH|^~\\&|A{sep}AIG|1||CARD_CLINIC{sep}");
            let msg = parse(&text).unwrap();
            assert_eq!(get(&msg, "AIG.3.1"), "CARD_CLINIC");
        }
    }

    #[test]
    fn test_first_repetition_and_segment_only() {
        let msg = parse("MSH|^~\\&|A\rPID|1||111~222\rPID|2||333").unwrap();
        assert_eq!(get(&msg, "PID.3.1"), "111");
        assert_eq!(get(&msg, "PID.1.1"), "1");

        let msg = parse("MSH|^~\\&|A\rPID|\rPID|1||999").unwrap();
        assert_eq!(get(&msg, "PID.3.1"), "");
        assert!(!msg.has_segment("PID"));
    }

    #[test]
    fn test_leading_whitespace_before_segment() {
        let msg = parse("MSH|^~\\&|A\n SCH|P1|APT123\n\t AIG|1||CARD_CLINIC\n   \n").unwrap();
        assert_eq!(get(&msg, "SCH.2.1"), "APT123");
        assert_eq!(get(&msg, "AIG.3.1"), "CARD_CLINIC");
        assert!(!msg.has_segment(" SCH"));
    }

    #[test]
    fn test_custom_separators() {
        let msg = parse("MSH#*~\\&#APP#FAC#####REF*I12\rPID#1##12345*X").unwrap();
        assert_eq!(get(&msg, "MSH.1.1"), "#");
        assert_eq!(get(&msg, "MSH.9.1"), "REF");
        assert_eq!(get(&msg, "MSH.9.2"), "I12");
        assert_eq!(get(&msg, "PID.3.2"), "X");
    }

    #[test]
    fn test_without_header_uses_defaults() {
        let msg = parse("PID|1||12345").unwrap();
        assert_eq!(get(&msg, "PID.3.1"), "12345");
        assert!(!msg.has_segment("MSH"));
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse(""), Err(Er7Error::Empty));
        assert_eq!(parse("\r\n\r\n"), Err(Er7Error::Empty));
        assert!(matches!(parse("MSH"), Err(Er7Error::InvalidHeader(_))));
    }
}
