//! HL7 `TS` timestamp normalization.
//!
//! HL7 encodes date-times as truncatable digit strings,
//! `YYYY[MM[DD[HHMM[SS]]]]`. The referral document carries them as
//! `YYYY-MM-DDTHH:MM`.

/// Convert an HL7 timestamp token to `YYYY-MM-DDTHH:MM`.
///
/// Slicing clamps at the end of the token and never fails. Seconds and
/// anything after them are ignored, and no calendar validation is applied.
/// Tokens shorter than eight characters produce a malformed but stable
/// result: the first missing date part after the year becomes `01` and
/// anything after it stays empty.
///
/// ```
/// use refjson::hl7_datetime_to_iso;
///
/// assert_eq!(hl7_datetime_to_iso(""), "");
/// assert_eq!(hl7_datetime_to_iso("19900115"), "1990-01-15T00:00");
/// assert_eq!(hl7_datetime_to_iso("202511251000"), "2025-11-25T10:00");
/// assert_eq!(hl7_datetime_to_iso("2025"), "2025-01-T00:00");
/// ```
pub fn hl7_datetime_to_iso(token: &str) -> String {
    if token.is_empty() {
        return String::new();
    }

    let chars: Vec<char> = token.chars().collect();
    let len = chars.len();

    let year = slice(&chars, 0, 4);
    // A year-only token takes the "01" default in the month slot and keeps
    // the day empty: "2025" must read back as "2025-01-T00:00".
    let (month, day) = match (slice(&chars, 4, 6), slice(&chars, 6, 8)) {
        (m, d) if m.is_empty() => ("01".to_string(), d),
        (m, d) if d.is_empty() => (m, "01".to_string()),
        (m, d) => (m, d),
    };
    let hour = if len >= 10 { slice(&chars, 8, 10) } else { "00".to_string() };
    let minute = if len >= 12 { slice(&chars, 10, 12) } else { "00".to_string() };

    format!("{year}-{month}-{day}T{hour}:{minute}")
}

/// Characters `[start, end)` clamped to the token length.
fn slice(chars: &[char], start: usize, end: usize) -> String {
    let end = end.min(chars.len());
    let start = start.min(end);
    chars[start..end].iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_token() {
        assert_eq!(hl7_datetime_to_iso(""), "");
    }

    #[test]
    fn test_date_only() {
        assert_eq!(hl7_datetime_to_iso("19900115"), "1990-01-15T00:00");
    }

    #[test]
    fn test_date_and_minutes() {
        assert_eq!(hl7_datetime_to_iso("202511251000"), "2025-11-25T10:00");
        assert_eq!(hl7_datetime_to_iso("202511241015"), "2025-11-24T10:15");
    }

    #[test]
    fn test_seconds_are_dropped() {
        assert_eq!(hl7_datetime_to_iso("20251125103045"), "2025-11-25T10:30");
        assert_eq!(hl7_datetime_to_iso("20251125103045.1234+0100"), "2025-11-25T10:30");
    }

    #[test]
    fn test_short_tokens_keep_substring_behavior() {
        assert_eq!(hl7_datetime_to_iso("2025"), "2025-01-T00:00");
        assert_eq!(hl7_datetime_to_iso("20"), "20-01-T00:00");
        assert_eq!(hl7_datetime_to_iso("202511"), "2025-11-01T00:00");
        assert_eq!(hl7_datetime_to_iso("2025112"), "2025-11-2T00:00");
    }

    #[test]
    fn test_partial_time() {
        // hour present, minutes missing
        assert_eq!(hl7_datetime_to_iso("2025112510"), "2025-11-25T10:00");
        // single minute digit is not enough to be read
        assert_eq!(hl7_datetime_to_iso("20251125103"), "2025-11-25T10:00");
    }

    #[test]
    fn test_no_calendar_validation() {
        assert_eq!(hl7_datetime_to_iso("20251399"), "2025-13-99T00:00");
    }

    #[test]
    fn test_non_ascii_does_not_panic() {
        assert_eq!(hl7_datetime_to_iso("2025é1"), "2025-é1-01T00:00");
    }
}
