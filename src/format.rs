//! Natural-language rendering of durations and moments.
//!
//! The inverse of the lexers: stateless, safe to call on every UI tick.
//! English vocabulary only; [`FormatLocale`] affects field order, nothing
//! else.

use chrono::{Duration, NaiveDateTime, NaiveTime, Timelike};

use crate::error::ParseError;
use crate::moment::FormatLocale;

/// Render a duration as a full phrase: every unit from the most significant
/// nonzero one down to seconds, so a counting-down display keeps a stable
/// shape ("5 minutes 0 seconds", not "5 minutes").
///
/// # Errors
///
/// [`ParseError::InvalidRange`] for a negative duration.
///
/// # Examples
///
/// ```
/// use chrono::Duration;
/// use timeword::format_duration;
///
/// assert_eq!(format_duration(Duration::seconds(300)).unwrap(), "5 minutes 0 seconds");
/// assert_eq!(format_duration(Duration::zero()).unwrap(), "0 seconds");
/// ```
pub fn format_duration(duration: Duration) -> Result<String, ParseError> {
    let (days, hours, minutes, seconds) = decompose(duration)?;
    let mut parts = Vec::new();
    let mut started = false;
    for (value, name) in [
        (days, "day"),
        (hours, "hour"),
        (minutes, "minute"),
        (seconds, "second"),
    ] {
        started = started || value != 0;
        if started || name == "second" {
            parts.push(unit_phrase(value, name));
        }
    }
    Ok(parts.join(" "))
}

/// Render a duration compactly: zero-valued units are omitted entirely,
/// except that a zero duration reads "0 seconds".
///
/// # Errors
///
/// [`ParseError::InvalidRange`] for a negative duration.
pub fn format_duration_short(duration: Duration) -> Result<String, ParseError> {
    let (days, hours, minutes, seconds) = decompose(duration)?;
    let parts: Vec<String> = [
        (days, "day"),
        (hours, "hour"),
        (minutes, "minute"),
        (seconds, "second"),
    ]
    .iter()
    .filter(|(value, _)| *value != 0)
    .map(|(value, name)| unit_phrase(*value, name))
    .collect();

    if parts.is_empty() {
        return Ok("0 seconds".to_string());
    }
    Ok(parts.join(" "))
}

/// Render a moment in the locale's field order, with a 12-hour time suffix
/// only when the time of day is not midnight, and seconds only when
/// nonzero.
pub fn format_moment(moment: NaiveDateTime, locale: FormatLocale) -> String {
    let date = match locale {
        FormatLocale::DayFirst => moment.format("%-d %B %Y"),
        FormatLocale::MonthFirst => moment.format("%B %-d, %Y"),
        FormatLocale::YearFirst => moment.format("%Y %B %-d"),
    };
    let time = moment.time();
    if time == NaiveTime::MIN {
        date.to_string()
    } else if time.second() != 0 {
        format!("{} {}", date, moment.format("%-I:%M:%S %p"))
    } else {
        format!("{} {}", date, moment.format("%-I:%M %p"))
    }
}

/// Break a non-negative duration into whole days/hours/minutes/seconds.
fn decompose(duration: Duration) -> Result<(i64, i64, i64, i64), ParseError> {
    if duration < Duration::zero() {
        return Err(ParseError::InvalidRange(format!(
            "negative duration ({} seconds)",
            duration.num_seconds()
        )));
    }
    let total = duration.num_seconds();
    Ok((
        total / 86400,
        total % 86400 / 3600,
        total % 3600 / 60,
        total % 60,
    ))
}

fn unit_phrase(value: i64, name: &str) -> String {
    if value == 1 {
        format!("1 {name}")
    } else {
        format!("{value} {name}s")
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
