//! Ambiguity resolution between the duration and moment readings of a
//! string.
//!
//! Plenty of inputs are valid under both grammars ("5" is five minutes or
//! five o'clock), so attempt order is the contract: duration first by
//! default, moment first when a leading "until"/"till" marker or a bare
//! 20xx year signals an absolute target. Exactly two attempts, never a
//! guess.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::duration::{parse_duration, ParsedDuration};
use crate::error::ParseError;
use crate::moment::{parse_moment_with_options, MomentOptions};

/// The two interpretations a timer input string can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TimerInput {
    /// A span of time to count down.
    Duration(ParsedDuration),
    /// An absolute point in time to count down to.
    Moment(NaiveDateTime),
}

/// Decide whether a string is a duration or a moment, with default options.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use timeword::{resolve, TimerInput};
///
/// let reference = NaiveDate::from_ymd_opt(2024, 3, 1)
///     .unwrap()
///     .and_hms_opt(8, 0, 0)
///     .unwrap();
/// match resolve("2h30m", reference).unwrap() {
///     TimerInput::Duration(d) => assert_eq!(d.whole_seconds(), 9000),
///     TimerInput::Moment(_) => unreachable!(),
/// }
/// ```
pub fn resolve(text: &str, reference: NaiveDateTime) -> Result<TimerInput, ParseError> {
    resolve_with_options(text, reference, &MomentOptions::default())
}

/// Decide whether a string is a duration or a moment.
///
/// A leading "until"/"till" marker (misspellings included) is stripped and
/// forces the moment reading first, falling back to duration; a bare
/// four-digit year starting "20" also goes moment-first. Everything else is
/// tried duration-first, falling back to moment.
///
/// # Errors
///
/// [`ParseError::Empty`] for blank input; [`ParseError::NoMatch`] when both
/// interpretations fail.
pub fn resolve_with_options(
    text: &str,
    reference: NaiveDateTime,
    options: &MomentOptions,
) -> Result<TimerInput, ParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }

    let (moment_first, input) = match strip_until_marker(trimmed) {
        Some(rest) => (true, rest),
        None => (is_bare_recent_year(trimmed), trimmed),
    };

    if moment_first {
        if let Ok(moment) = parse_moment_with_options(input, reference, options) {
            return Ok(TimerInput::Moment(moment));
        }
        if let Ok(duration) = parse_duration(input) {
            return Ok(TimerInput::Duration(duration));
        }
    } else {
        if let Ok(duration) = parse_duration(input) {
            return Ok(TimerInput::Duration(duration));
        }
        if let Ok(moment) = parse_moment_with_options(input, reference, options) {
            return Ok(TimerInput::Moment(moment));
        }
    }

    Err(ParseError::NoMatch(trimmed.to_string()))
}

/// Strip a leading "until"/"till" word (misspellings included). Returns the
/// remainder only when something follows the marker.
fn strip_until_marker(text: &str) -> Option<&str> {
    const MARKERS: [&str; 4] = ["until", "till", "til", "untill"];
    let mut split = text.splitn(2, char::is_whitespace);
    let first = split.next()?;
    let rest = split.next()?.trim_start();
    if MARKERS.contains(&first.to_lowercase().as_str()) && !rest.is_empty() {
        Some(rest)
    } else {
        None
    }
}

/// A bare four-digit year beginning "20" reads as a moment, not as
/// thousands of minutes.
fn is_bare_recent_year(text: &str) -> bool {
    text.len() == 4 && text.starts_with("20") && text.bytes().all(|b| b.is_ascii_digit())
}

// ── Tests ───────────────────────────────────────────────────────────────────
