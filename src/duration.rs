//! Duration lexing: interpret a loosely-formatted string as a span of time.
//!
//! Accepts compound unit strings (`"2h 30m"`, `"1.5 days"`, `"3 days 2 hours"`),
//! colon-delimited clock spans (`"1:30:00"`), and bare numbers. A bare integer
//! is read as whole **minutes** (`"5"` → 5 minutes) — callers of a countdown
//! timer overwhelmingly mean minutes, not seconds, and this reading must not
//! change.
//!
//! Parts with no unit suffix are filled in by inference along the
//! days → hours → minutes → seconds chain; see [`parse_duration`].

use serde::Serialize;

use crate::error::ParseError;

/// A non-negative span of elapsed time, stored as whole milliseconds.
///
/// Millisecond storage keeps fractional inputs exact across unit arithmetic:
/// `"1.5 hours"` is 5 400 000 ms, not a float that drifts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ParsedDuration {
    millis: i64,
}

impl ParsedDuration {
    /// The zero-length duration.
    pub const ZERO: ParsedDuration = ParsedDuration { millis: 0 };

    /// Build from a number of seconds, rounded to the nearest millisecond.
    /// Returns `None` for negative or non-finite input.
    pub fn from_seconds_f64(seconds: f64) -> Option<Self> {
        if !seconds.is_finite() || seconds < 0.0 {
            return None;
        }
        Some(ParsedDuration {
            millis: (seconds * 1000.0).round() as i64,
        })
    }

    /// Build from a non-negative number of whole seconds.
    pub fn from_whole_seconds(seconds: i64) -> Option<Self> {
        if seconds < 0 {
            return None;
        }
        Some(ParsedDuration {
            millis: seconds.checked_mul(1000)?,
        })
    }

    /// Total milliseconds.
    pub fn millis(&self) -> i64 {
        self.millis
    }

    /// Whole seconds, truncating any sub-second remainder.
    pub fn whole_seconds(&self) -> i64 {
        self.millis / 1000
    }

    pub fn is_zero(&self) -> bool {
        self.millis == 0
    }

    /// View as a [`chrono::Duration`] for datetime arithmetic.
    pub fn to_chrono(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.millis)
    }
}

// ── Unit buckets ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Days,
    Hours,
    Minutes,
    Seconds,
}

impl Unit {
    fn seconds(self) -> f64 {
        match self {
            Unit::Days => 86_400.0,
            Unit::Hours => 3_600.0,
            Unit::Minutes => 60.0,
            Unit::Seconds => 1.0,
        }
    }

    fn next_smaller(self) -> Option<Unit> {
        match self {
            Unit::Days => Some(Unit::Hours),
            Unit::Hours => Some(Unit::Minutes),
            Unit::Minutes => Some(Unit::Seconds),
            Unit::Seconds => None,
        }
    }

    fn next_larger(self) -> Option<Unit> {
        match self {
            Unit::Days => None,
            Unit::Hours => Some(Unit::Days),
            Unit::Minutes => Some(Unit::Hours),
            Unit::Seconds => Some(Unit::Minutes),
        }
    }
}

const UNIT_SUFFIXES: &[(&str, Unit)] = &[
    ("d", Unit::Days),
    ("dy", Unit::Days),
    ("dys", Unit::Days),
    ("day", Unit::Days),
    ("days", Unit::Days),
    ("h", Unit::Hours),
    ("hr", Unit::Hours),
    ("hrs", Unit::Hours),
    ("hour", Unit::Hours),
    ("hours", Unit::Hours),
    ("m", Unit::Minutes),
    ("min", Unit::Minutes),
    ("mins", Unit::Minutes),
    ("minute", Unit::Minutes),
    ("minutes", Unit::Minutes),
    ("s", Unit::Seconds),
    ("sec", Unit::Seconds),
    ("secs", Unit::Seconds),
    ("second", Unit::Seconds),
    ("seconds", Unit::Seconds),
];

fn classify_unit(suffix: &str) -> Option<Unit> {
    UNIT_SUFFIXES
        .iter()
        .find(|(name, _)| *name == suffix)
        .map(|(_, unit)| *unit)
}

/// One lexed part: a numeric value and its (possibly unspecified) unit bucket.
#[derive(Debug, Clone, Copy)]
struct Part {
    value: f64,
    unit: Option<Unit>,
}

// ── parse_duration ──────────────────────────────────────────────────────────

/// Interpret a string as a span of time.
///
/// # Grammar
///
/// - A bare integer is whole minutes: `"5"` → 5 minutes.
/// - A string of digits and the separators `. , ; :` is a compound clock
///   span split on those separators: `"1:30:00"` → 1 hour 30 minutes.
/// - Anything else is split where a run of letters meets a run of digits,
///   giving value+suffix parts: `"2h30m"` → `"2h"`, `"30m"`.
/// - Recognized suffixes: `d`/`day(s)`/`dy(s)`, `h`/`hr(s)`/`hour(s)`,
///   `m`/`min(s)`/`minute(s)`, `s`/`sec(s)`/`second(s)`.
/// - Suffix-less parts are inferred: left to right each takes the unit one
///   step smaller than the part before it; a still-unspecified final part
///   anchors at seconds; remaining gaps fill right to left, one step larger
///   than the part after.
///
/// # Errors
///
/// [`ParseError::Empty`] for blank input, [`ParseError::InvalidNumber`] when
/// a part has no leading decimal number, [`ParseError::NegativeNotAllowed`]
/// for a signed-negative part, [`ParseError::NoMatch`] for an unrecognized
/// unit suffix, and [`ParseError::AmbiguousUnits`] when inference runs off
/// either end of the unit chain.
///
/// # Examples
///
/// ```
/// use timeword::parse_duration;
///
/// assert_eq!(parse_duration("5").unwrap().whole_seconds(), 300);
/// assert_eq!(parse_duration("1.5 hours").unwrap().whole_seconds(), 5400);
/// assert_eq!(parse_duration("2h30m").unwrap().whole_seconds(), 9000);
/// ```
pub fn parse_duration(text: &str) -> Result<ParsedDuration, ParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ParseError::Empty);
    }

    // Bare integer: whole minutes.
    if text.bytes().all(|b| b.is_ascii_digit()) {
        let minutes: f64 = text
            .parse()
            .map_err(|_| ParseError::InvalidNumber(text.to_string()))?;
        return ParsedDuration::from_seconds_f64(minutes * 60.0)
            .ok_or_else(|| ParseError::InvalidNumber(text.to_string()));
    }

    let mut parts = Vec::new();
    for raw in split_parts(text) {
        parts.push(lex_part(&raw)?);
    }
    if parts.is_empty() {
        return Err(ParseError::Empty);
    }

    let resolved = infer_units(&parts, text)?;

    let total: f64 = resolved
        .iter()
        .map(|(value, unit)| value * unit.seconds())
        .sum();

    ParsedDuration::from_seconds_f64(total)
        .ok_or_else(|| ParseError::NegativeNotAllowed(text.to_string()))
}

/// Split the input into value+suffix parts.
///
/// A string of digits and `. , ; :` splits strictly on those separators.
/// Otherwise a new part starts wherever a letter run is followed by the
/// start of a number, so `"2h30m"` splits before the `3` and
/// `"3 days 2 hours"` before the `2`.
fn split_parts(text: &str) -> Vec<String> {
    let is_sep = |c: char| matches!(c, '.' | ',' | ';' | ':');
    if text.chars().all(|c| c.is_ascii_digit() || is_sep(c)) {
        return text
            .split(is_sep)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
    }

    let mut parts = Vec::new();
    let mut current = String::new();
    let mut last_was_letter = false;
    for ch in text.chars() {
        let starts_number = ch.is_ascii_digit() || matches!(ch, '.' | '+' | '-');
        if last_was_letter && starts_number && !current.trim().is_empty() {
            parts.push(std::mem::take(&mut current));
        }
        current.push(ch);
        if !ch.is_whitespace() {
            last_was_letter = ch.is_alphabetic();
        }
    }
    if !current.trim().is_empty() {
        parts.push(current);
    }
    parts
}

/// Extract the leading signed decimal number from a part and classify its
/// suffix into a unit bucket.
fn lex_part(raw: &str) -> Result<Part, ParseError> {
    let raw = raw.trim();
    let bytes = raw.as_bytes();

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let mut seen_digit = false;
    let mut seen_dot = false;
    while end < bytes.len() {
        match bytes[end] {
            b'0'..=b'9' => {
                seen_digit = true;
                end += 1;
            }
            b'.' if !seen_dot => {
                seen_dot = true;
                end += 1;
            }
            _ => break,
        }
    }
    if !seen_digit {
        return Err(ParseError::InvalidNumber(raw.to_string()));
    }

    let value: f64 = raw[..end]
        .parse()
        .map_err(|_| ParseError::InvalidNumber(raw.to_string()))?;
    if raw.starts_with('-') {
        return Err(ParseError::NegativeNotAllowed(raw.to_string()));
    }

    let suffix = raw[end..].trim().to_ascii_lowercase();
    let unit = if suffix.is_empty() {
        None
    } else {
        Some(classify_unit(&suffix).ok_or_else(|| ParseError::NoMatch(raw.to_string()))?)
    };

    Ok(Part { value, unit })
}

/// Fill unspecified unit buckets.
///
/// Left to right, a suffix-less part takes the unit one step smaller than the
/// nearest resolved part before it. The final part, if still unspecified,
/// anchors the chain at seconds. Right to left, remaining gaps take the unit
/// one step larger than the nearest resolved part after them.
fn infer_units(parts: &[Part], text: &str) -> Result<Vec<(f64, Unit)>, ParseError> {
    let ambiguous = || ParseError::AmbiguousUnits(text.to_string());
    let mut units: Vec<Option<Unit>> = parts.iter().map(|p| p.unit).collect();

    let mut prev: Option<Unit> = None;
    for slot in units.iter_mut() {
        match *slot {
            Some(unit) => prev = Some(unit),
            None => {
                if let Some(p) = prev {
                    let inferred = p.next_smaller().ok_or_else(ambiguous)?;
                    *slot = Some(inferred);
                    prev = Some(inferred);
                }
            }
        }
    }

    if let Some(last) = units.last_mut() {
        if last.is_none() {
            *last = Some(Unit::Seconds);
        }
    }

    let mut next: Option<Unit> = None;
    for slot in units.iter_mut().rev() {
        match *slot {
            Some(unit) => next = Some(unit),
            None => {
                let inferred = next
                    .and_then(Unit::next_larger)
                    .ok_or_else(ambiguous)?;
                *slot = Some(inferred);
                next = Some(inferred);
            }
        }
    }

    Ok(parts
        .iter()
        .zip(units)
        .map(|(part, unit)| (part.value, unit.unwrap_or(Unit::Seconds)))
        .collect())
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_integer_is_minutes() {
        assert_eq!(parse_duration("5").unwrap().whole_seconds(), 300);
        assert_eq!(parse_duration("90").unwrap().whole_seconds(), 5400);
        assert_eq!(parse_duration("0").unwrap().whole_seconds(), 0);
    }

    #[test]
    fn test_fractional_hours_exact() {
        let d = parse_duration("1.5 hours").unwrap();
        assert_eq!(d.whole_seconds(), 5400);
        assert_eq!(d.millis(), 5_400_000);
    }

    #[test]
    fn test_compact_compound() {
        assert_eq!(parse_duration("2h30m").unwrap().whole_seconds(), 9000);
        assert_eq!(parse_duration("1d2h30m").unwrap().whole_seconds(), 95400);
    }

    #[test]
    fn test_spaced_compound() {
        assert_eq!(
            parse_duration("3 days 2 hours").unwrap().whole_seconds(),
            3 * 86400 + 2 * 3600
        );
    }

    #[test]
    fn test_colon_delimited_clock_span() {
        assert_eq!(parse_duration("1:30:00").unwrap().whole_seconds(), 5400);
        assert_eq!(parse_duration("0:05:30").unwrap().whole_seconds(), 330);
    }

    #[test]
    fn test_other_compound_separators() {
        // Comma and semicolon behave like colons.
        assert_eq!(parse_duration("1,30,00").unwrap().whole_seconds(), 5400);
        assert_eq!(parse_duration("1;30").unwrap().whole_seconds(), 90);
    }

    #[test]
    fn test_two_part_defaults_to_minutes_seconds() {
        // "1:30" = 1 minute 30 seconds: last part anchors at seconds.
        assert_eq!(parse_duration("1:30").unwrap().whole_seconds(), 90);
        assert_eq!(parse_duration("1.5").unwrap().whole_seconds(), 65);
    }

    #[test]
    fn test_inference_steps_down_after_specified_unit() {
        // Unspecified trailing part steps down from hours to minutes.
        assert_eq!(parse_duration("2h 30").unwrap().whole_seconds(), 9000);
        assert_eq!(
            parse_duration("1d 2h 3").unwrap().whole_seconds(),
            86400 + 2 * 3600 + 3 * 60
        );
    }

    #[test]
    fn test_inference_below_seconds_fails() {
        let err = parse_duration("5s 3").unwrap_err();
        assert!(matches!(err, ParseError::AmbiguousUnits(_)), "got: {err}");
    }

    #[test]
    fn test_inference_above_days_fails() {
        let err = parse_duration("1:2:3:4:5").unwrap_err();
        assert!(matches!(err, ParseError::AmbiguousUnits(_)), "got: {err}");
    }

    #[test]
    fn test_suffix_spellings() {
        assert_eq!(parse_duration("2 hrs").unwrap().whole_seconds(), 7200);
        assert_eq!(parse_duration("10 mins").unwrap().whole_seconds(), 600);
        assert_eq!(parse_duration("45 secs").unwrap().whole_seconds(), 45);
        assert_eq!(parse_duration("2 dys").unwrap().whole_seconds(), 172800);
        assert_eq!(parse_duration("1 minute").unwrap().whole_seconds(), 60);
    }

    #[test]
    fn test_case_insensitive_suffixes() {
        assert_eq!(parse_duration("2H30M").unwrap().whole_seconds(), 9000);
        assert_eq!(parse_duration("1 Hour").unwrap().whole_seconds(), 3600);
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(parse_duration(""), Err(ParseError::Empty)));
        assert!(matches!(parse_duration("   "), Err(ParseError::Empty)));
    }

    #[test]
    fn test_no_number_is_invalid() {
        let err = parse_duration("hours").unwrap_err();
        assert!(matches!(err, ParseError::InvalidNumber(_)), "got: {err}");
    }

    #[test]
    fn test_unknown_suffix_is_no_match() {
        let err = parse_duration("5 fortnights").unwrap_err();
        assert!(matches!(err, ParseError::NoMatch(_)), "got: {err}");
    }

    #[test]
    fn test_negative_part_rejected() {
        // The lexer recognizes the sign but the crate never emits negative
        // durations, so a signed part is a hard error rather than a clamp.
        let err = parse_duration("-5m").unwrap_err();
        assert!(matches!(err, ParseError::NegativeNotAllowed(_)), "got: {err}");
        let err = parse_duration("1h -30m").unwrap_err();
        assert!(matches!(err, ParseError::NegativeNotAllowed(_)), "got: {err}");
    }

    #[test]
    fn test_whole_string_fails_on_any_bad_part() {
        // No partial results: one bad part poisons the whole string.
        assert!(parse_duration("1h junk 30m").is_err());
    }

    #[test]
    fn test_fractional_minutes() {
        assert_eq!(parse_duration("0.5m").unwrap().whole_seconds(), 30);
        assert_eq!(parse_duration("2.5 min").unwrap().millis(), 150_000);
    }

    #[test]
    fn test_parsed_duration_accessors() {
        let d = parse_duration("1.5s").unwrap();
        assert_eq!(d.millis(), 1500);
        assert_eq!(d.whole_seconds(), 1);
        assert!(!d.is_zero());
        assert_eq!(d.to_chrono(), chrono::Duration::milliseconds(1500));
        assert!(ParsedDuration::ZERO.is_zero());
        assert_eq!(ParsedDuration::from_whole_seconds(-1), None);
    }
}
