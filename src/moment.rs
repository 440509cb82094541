//! Moment lexing: interpret a string as an absolute calendar date and/or
//! time of day, resolved against a caller-supplied reference moment.
//!
//! The grammar is an ordered list of hand-written matchers tried in priority
//! order — date-only, time-only, "date [at] time", "time [on] date" — where
//! the first full match wins and no backtracking happens afterwards. Fields
//! the grammar did not capture are filled by a significance cascade and then
//! inherited from the reference, and an ambiguous result in the past is
//! nudged forward (future bias) by the smallest unmatched calendar field.
//!
//! All resolution is pure: the caller supplies the "now" anchor, so these
//! functions never read a clock.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use serde::Serialize;

use crate::error::ParseError;

// ── Options ─────────────────────────────────────────────────────────────────

/// Field-ordering preference for numeric dates.
///
/// Selects which numeric-date reading the moment grammar tries first and the
/// field order of [`format_moment`](crate::format_moment); nothing else.
/// Vocabulary stays English in every locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum FormatLocale {
    /// day/month/year (most of Europe).
    DayFirst,
    /// month/day/year (US convention).
    #[default]
    MonthFirst,
    /// year/month/day (ISO 8601, East Asia).
    YearFirst,
}

/// Options for [`parse_moment_with_options`].
#[derive(Debug, Clone, Default)]
pub struct MomentOptions {
    /// Numeric-date field ordering to prefer.
    pub locale: FormatLocale,
    /// Bias ambiguous bare times toward daytime: a time-only match with no
    /// AM/PM indicator that lands before 08:00 on a date other than the
    /// reference date gains 12 hours. Off by default.
    pub daytime_bias: bool,
}

// ── Intermediate parse products ─────────────────────────────────────────────

/// One optional calendar/time field: unset, defaulted, or explicitly matched
/// by the grammar.
#[derive(Debug, Clone, Copy)]
struct Field<T> {
    value: Option<T>,
    matched: bool,
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field {
            value: None,
            matched: false,
        }
    }
}

impl<T: Copy> Field<T> {
    fn matched(value: T) -> Self {
        Field {
            value: Some(value),
            matched: true,
        }
    }

    fn set(&self) -> bool {
        self.value.is_some()
    }

    fn default_to(&mut self, value: T) {
        if self.value.is_none() {
            self.value = Some(value);
        }
    }
}

/// Partially-filled calendar/time record built during a single match.
#[derive(Debug, Clone, Copy, Default)]
struct FieldSet {
    year: Field<i32>,
    month: Field<u32>,
    day: Field<u32>,
    hour: Field<u32>,
    minute: Field<u32>,
    second: Field<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Meridiem {
    Am,
    Pm,
}

/// Result of the time sub-grammar.
#[derive(Debug, Clone, Copy)]
struct TimeMatch {
    hour: u32,
    minute: Option<u32>,
    second: Option<u32>,
    meridiem: Option<Meridiem>,
}

/// Result of the date sub-grammar. Weekday patterns resolve to a concrete
/// date before this point, so every variant is plain fields.
#[derive(Debug, Clone, Copy, Default)]
struct DateMatch {
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
}

/// A full grammar match: date part, time part, or both.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    date: Option<DateMatch>,
    time: Option<TimeMatch>,
}

// ── Static tables ───────────────────────────────────────────────────────────

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

const WEEKDAY_NAMES: [(&str, Weekday); 7] = [
    ("monday", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("saturday", Weekday::Sat),
    ("sunday", Weekday::Sun),
];

/// Month name or ≥3-letter prefix, case already lowered.
fn parse_month_name(s: &str) -> Option<u32> {
    if s.len() < 3 || !s.bytes().all(|b| b.is_ascii_alphabetic()) {
        return None;
    }
    MONTH_NAMES
        .iter()
        .position(|name| name.starts_with(s))
        .map(|i| i as u32 + 1)
}

/// Weekday name or ≥3-letter prefix, case already lowered.
fn parse_weekday_name(s: &str) -> Option<Weekday> {
    if s.len() < 3 || !s.bytes().all(|b| b.is_ascii_alphabetic()) {
        return None;
    }
    WEEKDAY_NAMES
        .iter()
        .find(|(name, _)| name.starts_with(s))
        .map(|(_, weekday)| *weekday)
}

// ── parse_moment ────────────────────────────────────────────────────────────

/// Interpret a string as an absolute point in time, resolved against
/// `reference`, with default options (month-first numeric dates, no
/// daytime bias).
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use timeword::parse_moment;
///
/// let reference = NaiveDate::from_ymd_opt(2024, 3, 1)
///     .unwrap()
///     .and_hms_opt(8, 0, 0)
///     .unwrap();
/// let noon = parse_moment("noon", reference).unwrap();
/// assert_eq!(noon.to_string(), "2024-03-01 12:00:00");
/// ```
pub fn parse_moment(text: &str, reference: NaiveDateTime) -> Result<NaiveDateTime, ParseError> {
    parse_moment_with_options(text, reference, &MomentOptions::default())
}

/// Interpret a string as an absolute point in time with explicit options.
///
/// # Grammar
///
/// Idiomatic literals are checked first: `"nye"` / `"new year's eve"` maps
/// to January 1 of the year after the reference, and a bare month name maps
/// to the 1st of that month, rolled forward a year if already past. Then
/// noon/midnight/today/tomorrow words are normalized into explicit tokens,
/// and the candidate grammars are tried in priority order: date-only,
/// time-only, `date [at] time`, `time [on] date`.
///
/// Date patterns, in priority order: weekday (optionally with `next`,
/// `after next`, or `next week`), ordinal day of month (`"14th"`), spelled
/// dates day-first then month-first (`"14 Feb 2004"`, `"Feb 14th"`), numeric
/// dates in the locale's field order then the alternates, and a bare
/// four-digit year.
///
/// A resolved moment at or before `reference` is pushed forward by the first
/// applicable fallback: the 12-hour reading of a bare hour, one day if no
/// day was matched, one month if no month was matched, one year if no year
/// was matched. A fully-explicit past moment is returned as-is.
///
/// # Errors
///
/// [`ParseError::Empty`] for blank input, [`ParseError::NoMatch`] when no
/// candidate pattern matches (or the matched fields form an invalid date).
pub fn parse_moment_with_options(
    text: &str,
    reference: NaiveDateTime,
    options: &MomentOptions,
) -> Result<NaiveDateTime, ParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }
    let lowered = trimmed.to_lowercase();

    if let Some(moment) = try_new_years(&lowered, reference) {
        return Ok(moment);
    }
    if let Some(moment) = try_bare_month(&lowered, reference) {
        return Ok(moment);
    }

    let tokens = normalize_tokens(&lowered, reference);
    if tokens.is_empty() {
        return Err(ParseError::Empty);
    }

    let candidate = try_date_only(&tokens, reference, options.locale)
        .or_else(|| try_time_only(&tokens))
        .or_else(|| try_date_then_time(&tokens, reference, options.locale))
        .or_else(|| try_time_then_date(&tokens, reference, options.locale))
        .ok_or_else(|| ParseError::NoMatch(trimmed.to_string()))?;

    let fields = build_fields(&candidate);
    let resolved = resolve_fields(&fields, reference)
        .ok_or_else(|| ParseError::NoMatch(trimmed.to_string()))?;
    let adjusted = future_bias(resolved, &fields, &candidate, reference);

    if options.daytime_bias {
        Ok(apply_daytime_bias(adjusted, &candidate, reference))
    } else {
        Ok(adjusted)
    }
}

// ── Idiomatic literals ──────────────────────────────────────────────────────

/// "nye" and "new year('s) (eve)" → January 1 of the year after the reference.
fn try_new_years(lowered: &str, reference: NaiveDateTime) -> Option<NaiveDateTime> {
    let compact: String = lowered.chars().filter(|c| c.is_alphanumeric()).collect();
    let hit = matches!(
        compact.as_str(),
        "nye" | "newyear" | "newyears" | "newyeareve" | "newyearseve"
    );
    if !hit {
        return None;
    }
    NaiveDate::from_ymd_opt(reference.year() + 1, 1, 1).map(|d| d.and_time(NaiveTime::MIN))
}

/// A bare month name: the 1st of that month in the reference year, rolled
/// forward one year when that date is not after the reference moment.
fn try_bare_month(lowered: &str, reference: NaiveDateTime) -> Option<NaiveDateTime> {
    let month = parse_month_name(lowered)?;
    let mut date = NaiveDate::from_ymd_opt(reference.year(), month, 1)?;
    if date.and_time(NaiveTime::MIN) <= reference {
        date = NaiveDate::from_ymd_opt(reference.year() + 1, month, 1)?;
    }
    Some(date.and_time(NaiveTime::MIN))
}

// ── Normalization ───────────────────────────────────────────────────────────

/// Textual normalization ahead of grammar matching: noon/midnight words
/// become explicit clock tokens and today/tomorrow become concrete dates.
/// Works on whole whitespace-delimited tokens, so a substring of a longer
/// word is never touched. Trailing commas are stripped ("Feb 14, 2004").
fn normalize_tokens(lowered: &str, reference: NaiveDateTime) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for raw in lowered.split_whitespace() {
        let raw = raw.trim_matches(',');
        if raw.is_empty() {
            continue;
        }
        match raw {
            "noon" | "midday" => {
                pop_twelve_prefix(&mut out);
                out.push("12:00:00".to_string());
                out.push("pm".to_string());
            }
            "midnight" | "midnite" => {
                pop_twelve_prefix(&mut out);
                out.push("12:00:00".to_string());
                out.push("am".to_string());
            }
            "today" | "2day" | "tday" => {
                out.push(reference.date().format("%Y-%m-%d").to_string());
            }
            "tomorrow" | "tommorow" | "tomorow" | "tommorrow" | "tmrw" => {
                let next = reference.date() + Duration::days(1);
                out.push(next.format("%Y-%m-%d").to_string());
            }
            _ => out.push(raw.to_string()),
        }
    }
    out
}

/// Drop a redundant "12", "12:00", or "12:00:00" left of a noon/midnight word.
fn pop_twelve_prefix(out: &mut Vec<String>) {
    if matches!(
        out.last().map(String::as_str),
        Some("12") | Some("12:00") | Some("12:00:00")
    ) {
        out.pop();
    }
}

fn strip_leading<'a>(tokens: &'a [String], word: &str) -> &'a [String] {
    match tokens.first() {
        Some(t) if t.as_str() == word => &tokens[1..],
        _ => tokens,
    }
}

// ── Candidate grammars (priority order) ─────────────────────────────────────

fn try_date_only(
    tokens: &[String],
    reference: NaiveDateTime,
    locale: FormatLocale,
) -> Option<Candidate> {
    match_date(tokens, reference, locale).map(|date| Candidate {
        date: Some(date),
        time: None,
    })
}

fn try_time_only(tokens: &[String]) -> Option<Candidate> {
    match_time(tokens).map(|time| Candidate {
        date: None,
        time: Some(time),
    })
}

/// "date [at] time": every split point is tried, left part as date, right
/// part (after an optional "at") as time.
fn try_date_then_time(
    tokens: &[String],
    reference: NaiveDateTime,
    locale: FormatLocale,
) -> Option<Candidate> {
    for split in 1..tokens.len() {
        let (left, right) = tokens.split_at(split);
        let right = strip_leading(right, "at");
        if right.is_empty() {
            continue;
        }
        if let (Some(date), Some(time)) = (match_date(left, reference, locale), match_time(right)) {
            return Some(Candidate {
                date: Some(date),
                time: Some(time),
            });
        }
    }
    None
}

/// "time [on] date": mirror of [`try_date_then_time`].
fn try_time_then_date(
    tokens: &[String],
    reference: NaiveDateTime,
    locale: FormatLocale,
) -> Option<Candidate> {
    for split in 1..tokens.len() {
        let (left, right) = tokens.split_at(split);
        let right = strip_leading(right, "on");
        if right.is_empty() {
            continue;
        }
        if let (Some(time), Some(date)) = (match_time(left), match_date(right, reference, locale)) {
            return Some(Candidate {
                date: Some(date),
                time: Some(time),
            });
        }
    }
    None
}

// ── Date sub-grammar ────────────────────────────────────────────────────────

fn match_date(
    tokens: &[String],
    reference: NaiveDateTime,
    locale: FormatLocale,
) -> Option<DateMatch> {
    match_weekday_date(tokens, reference)
        .or_else(|| match_day_of_month(tokens))
        .or_else(|| match_spelled_day_first(tokens, reference))
        .or_else(|| match_spelled_month_first(tokens, reference))
        .or_else(|| match_numeric_date(tokens, reference, locale))
        .or_else(|| match_bare_year(tokens))
}

/// Weekday patterns: bare weekday, "next <wd>", "<wd> after next",
/// "<wd> next week".
///
/// Resolution walks forward day by day from the day after the reference
/// until the weekday matches, so the bare form is always strictly in the
/// future. "next" pushes a further 7 days, "after next" 14; "next week"
/// pushes 7 only when the weekday falls later in the week than the
/// reference's own weekday (otherwise the nearest occurrence already lies
/// in the next week).
fn match_weekday_date(tokens: &[String], reference: NaiveDateTime) -> Option<DateMatch> {
    let (weekday, extra_days) = match tokens {
        [wd] => (parse_weekday_name(wd.as_str())?, 0),
        [next, wd] if next.as_str() == "next" => (parse_weekday_name(wd.as_str())?, 7),
        [wd, after, next] if after.as_str() == "after" && next.as_str() == "next" => {
            (parse_weekday_name(wd.as_str())?, 14)
        }
        [wd, next, week] if next.as_str() == "next" && week.as_str() == "week" => {
            let weekday = parse_weekday_name(wd.as_str())?;
            let later_in_week =
                weekday.num_days_from_monday() > reference.weekday().num_days_from_monday();
            (weekday, if later_in_week { 7 } else { 0 })
        }
        _ => return None,
    };

    let mut date = reference.date() + Duration::days(1);
    while date.weekday() != weekday {
        date += Duration::days(1);
    }
    date += Duration::days(extra_days);

    Some(DateMatch {
        year: Some(date.year()),
        month: Some(date.month()),
        day: Some(date.day()),
    })
}

/// Day of month alone: "14th", "the 3rd". The ordinal suffix is required so
/// a bare number stays available to the time sub-grammar.
fn match_day_of_month(tokens: &[String]) -> Option<DateMatch> {
    let tokens = strip_leading(tokens, "the");
    let [tok] = tokens else {
        return None;
    };
    let day = parse_ordinal_day(tok.as_str())?;
    Some(DateMatch {
        day: Some(day),
        ..Default::default()
    })
}

/// Spelled date, day first: "14 feb", "14th of february 2004".
fn match_spelled_day_first(tokens: &[String], reference: NaiveDateTime) -> Option<DateMatch> {
    let tokens = strip_leading(tokens, "the");
    if tokens.len() < 2 || tokens.len() > 4 {
        return None;
    }
    let day = parse_day_token(tokens[0].as_str())?;
    let rest = strip_leading(&tokens[1..], "of");
    let (month_tok, year_tok) = match rest {
        [m] => (m, None),
        [m, y] => (m, Some(y)),
        _ => return None,
    };
    let month = parse_month_name(month_tok.as_str())?;
    let year = match year_tok {
        Some(y) => Some(parse_year_token(y.as_str(), reference)?),
        None => None,
    };
    Some(DateMatch {
        year,
        month: Some(month),
        day: Some(day),
    })
}

/// Spelled date, month first: "feb 14", "february 14th 2004".
fn match_spelled_month_first(tokens: &[String], reference: NaiveDateTime) -> Option<DateMatch> {
    let (month_tok, rest) = tokens.split_first()?;
    let month = parse_month_name(month_tok.as_str())?;
    let (day_tok, year_tok) = match rest {
        [d] => (d, None),
        [d, y] => (d, Some(y)),
        _ => return None,
    };
    let day = parse_day_token(day_tok.as_str())?;
    let year = match year_tok {
        Some(y) => Some(parse_year_token(y.as_str(), reference)?),
        None => None,
    };
    Some(DateMatch {
        year,
        month: Some(month),
        day: Some(day),
    })
}

#[derive(Debug, Clone, Copy)]
enum NumericOrder {
    DayMonthYear,
    MonthDayYear,
    YearMonthDay,
}

impl FormatLocale {
    /// Numeric-date interpretations in priority order for this locale.
    fn numeric_orders(self) -> &'static [NumericOrder] {
        use NumericOrder::*;
        match self {
            FormatLocale::DayFirst => &[DayMonthYear, MonthDayYear, YearMonthDay],
            FormatLocale::MonthFirst => &[MonthDayYear, DayMonthYear, YearMonthDay],
            FormatLocale::YearFirst => &[YearMonthDay, DayMonthYear, MonthDayYear],
        }
    }
}

/// Numeric date: two or three fields separated by `/`, `.`, or `-`, read in
/// the locale's preferred order first and the alternates after. Field range
/// checks reject the wrong readings ("2/14" cannot be day-month).
fn match_numeric_date(
    tokens: &[String],
    reference: NaiveDateTime,
    locale: FormatLocale,
) -> Option<DateMatch> {
    let [tok] = tokens else {
        return None;
    };
    let fields: Vec<&str> = tok.split(['/', '.', '-']).collect();
    if fields.len() != 2 && fields.len() != 3 {
        return None;
    }
    if fields
        .iter()
        .any(|f| f.is_empty() || !f.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }

    locale
        .numeric_orders()
        .iter()
        .find_map(|order| try_numeric_order(&fields, *order, reference))
}

fn try_numeric_order(
    fields: &[&str],
    order: NumericOrder,
    reference: NaiveDateTime,
) -> Option<DateMatch> {
    let (d, m, y) = match (order, fields) {
        (NumericOrder::DayMonthYear, [d, m]) => (*d, *m, None),
        (NumericOrder::DayMonthYear, [d, m, y]) => (*d, *m, Some(*y)),
        (NumericOrder::MonthDayYear, [m, d]) => (*d, *m, None),
        (NumericOrder::MonthDayYear, [m, d, y]) => (*d, *m, Some(*y)),
        // Year-first without a year field reads as month/day.
        (NumericOrder::YearMonthDay, [m, d]) => (*d, *m, None),
        (NumericOrder::YearMonthDay, [y, m, d]) => (*d, *m, Some(*y)),
        _ => return None,
    };
    let day = parse_day_number(d)?;
    let month = parse_month_number(m)?;
    let year = match y {
        Some(y) => Some(parse_year_token(y, reference)?),
        None => None,
    };
    Some(DateMatch {
        year,
        month: Some(month),
        day: Some(day),
    })
}

/// Bare four-digit year.
fn match_bare_year(tokens: &[String]) -> Option<DateMatch> {
    let [tok] = tokens else {
        return None;
    };
    if tok.len() != 4 || !tok.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(DateMatch {
        year: tok.parse().ok(),
        ..Default::default()
    })
}

// ── Date token helpers ──────────────────────────────────────────────────────

fn parse_day_number(s: &str) -> Option<u32> {
    if s.is_empty() || s.len() > 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let day: u32 = s.parse().ok()?;
    (1..=31).contains(&day).then_some(day)
}

fn parse_month_number(s: &str) -> Option<u32> {
    if s.is_empty() || s.len() > 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let month: u32 = s.parse().ok()?;
    (1..=12).contains(&month).then_some(month)
}

/// "14th", "3rd": day number with a required ordinal suffix.
fn parse_ordinal_day(tok: &str) -> Option<u32> {
    let digits = tok
        .strip_suffix("st")
        .or_else(|| tok.strip_suffix("nd"))
        .or_else(|| tok.strip_suffix("rd"))
        .or_else(|| tok.strip_suffix("th"))?;
    parse_day_number(digits)
}

/// Day number, with or without ordinal suffix.
fn parse_day_token(tok: &str) -> Option<u32> {
    parse_ordinal_day(tok).or_else(|| parse_day_number(tok))
}

/// Four-digit year taken verbatim; two-digit year windowed into the
/// reference's century.
fn parse_year_token(tok: &str, reference: NaiveDateTime) -> Option<i32> {
    if !tok.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match tok.len() {
        4 => tok.parse().ok(),
        2 => {
            let yy: i32 = tok.parse().ok()?;
            Some(reference.year() / 100 * 100 + yy)
        }
        _ => None,
    }
}

// ── Time sub-grammar ────────────────────────────────────────────────────────

/// Time of day: "5", "5:30", "17:30:00", "5pm", "5:30 pm", "12:00:00 am".
fn match_time(tokens: &[String]) -> Option<TimeMatch> {
    match tokens {
        [tok] => {
            let (core, meridiem) = split_meridiem_suffix(tok.as_str());
            parse_clock(core, meridiem)
        }
        [tok, m] => {
            let meridiem = parse_meridiem(m.as_str())?;
            parse_clock(tok.as_str(), Some(meridiem))
        }
        _ => None,
    }
}

fn parse_meridiem(tok: &str) -> Option<Meridiem> {
    match tok {
        "am" | "a.m." | "a" => Some(Meridiem::Am),
        "pm" | "p.m." | "p" => Some(Meridiem::Pm),
        _ => None,
    }
}

/// Split a glued meridiem indicator off a token: "5pm" → ("5", PM).
fn split_meridiem_suffix(tok: &str) -> (&str, Option<Meridiem>) {
    const SUFFIXES: [(&str, Meridiem); 6] = [
        ("a.m.", Meridiem::Am),
        ("p.m.", Meridiem::Pm),
        ("am", Meridiem::Am),
        ("pm", Meridiem::Pm),
        ("a", Meridiem::Am),
        ("p", Meridiem::Pm),
    ];
    for (suffix, meridiem) in SUFFIXES {
        if let Some(core) = tok.strip_suffix(suffix) {
            if !core.is_empty() {
                return (core, Some(meridiem));
            }
        }
    }
    (tok, None)
}

fn parse_clock(core: &str, meridiem: Option<Meridiem>) -> Option<TimeMatch> {
    let fields: Vec<&str> = core.split(':').collect();
    if fields.is_empty() || fields.len() > 3 {
        return None;
    }
    if fields
        .iter()
        .any(|f| f.is_empty() || f.len() > 2 || !f.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }

    let hour: u32 = fields[0].parse().ok()?;
    let minute: Option<u32> = match fields.get(1) {
        Some(f) => Some(f.parse().ok()?),
        None => None,
    };
    let second: Option<u32> = match fields.get(2) {
        Some(f) => Some(f.parse().ok()?),
        None => None,
    };

    match meridiem {
        Some(_) if !(1..=12).contains(&hour) => return None,
        None if hour > 23 => return None,
        _ => {}
    }
    if minute.is_some_and(|m| m > 59) || second.is_some_and(|s| s > 59) {
        return None;
    }

    Some(TimeMatch {
        hour,
        minute,
        second,
        meridiem,
    })
}

/// "PM" adds 12 hours unless the hour is already 12; "AM" or no indicator
/// forces hour 12 to 0.
fn apply_meridiem(hour: u32, meridiem: Option<Meridiem>) -> u32 {
    match meridiem {
        Some(Meridiem::Pm) if hour != 12 => hour + 12,
        Some(Meridiem::Pm) => 12,
        _ if hour == 12 => 0,
        _ => hour,
    }
}

// ── Field resolution ────────────────────────────────────────────────────────

/// Populate matched fields from the candidate and run the significance
/// cascade: a matched year defaults the month, a set month defaults the day,
/// a set day defaults the hour, and so on down to seconds. Fields still
/// unset after the cascade will inherit from the reference.
fn build_fields(candidate: &Candidate) -> FieldSet {
    let mut fields = FieldSet::default();

    if let Some(date) = &candidate.date {
        if let Some(year) = date.year {
            fields.year = Field::matched(year);
        }
        if let Some(month) = date.month {
            fields.month = Field::matched(month);
        }
        if let Some(day) = date.day {
            fields.day = Field::matched(day);
        }
    }
    if let Some(time) = &candidate.time {
        fields.hour = Field::matched(apply_meridiem(time.hour, time.meridiem));
        if let Some(minute) = time.minute {
            fields.minute = Field::matched(minute);
        }
        if let Some(second) = time.second {
            fields.second = Field::matched(second);
        }
    }

    if fields.year.matched {
        fields.month.default_to(1);
    }
    if fields.month.set() {
        fields.day.default_to(1);
    }
    if fields.day.set() {
        fields.hour.default_to(0);
    }
    if fields.hour.set() {
        fields.minute.default_to(0);
    }
    if fields.minute.set() {
        fields.second.default_to(0);
    }
    fields
}

/// Combine the field set with the reference for anything still unset.
/// Returns `None` when the matched fields form an invalid calendar date.
fn resolve_fields(fields: &FieldSet, reference: NaiveDateTime) -> Option<NaiveDateTime> {
    let date = NaiveDate::from_ymd_opt(
        fields.year.value.unwrap_or(reference.year()),
        fields.month.value.unwrap_or(reference.month()),
        fields.day.value.unwrap_or(reference.day()),
    )?;
    let time = NaiveTime::from_hms_opt(
        fields.hour.value.unwrap_or(reference.hour()),
        fields.minute.value.unwrap_or(reference.minute()),
        fields.second.value.unwrap_or(reference.second()),
    )?;
    Some(date.and_time(time))
}

/// Future bias: a resolved moment at or before the reference is pushed
/// forward by exactly one fallback, the first applicable of: the 12-hour
/// reading of a meridiem-less hour, +1 day if no day was matched, +1 month
/// if no month was matched, +1 year if no year was matched. A fully
/// explicit past moment comes back unchanged.
fn future_bias(
    resolved: NaiveDateTime,
    fields: &FieldSet,
    candidate: &Candidate,
    reference: NaiveDateTime,
) -> NaiveDateTime {
    if resolved > reference {
        return resolved;
    }

    if let Some(time) = &candidate.time {
        if time.meridiem.is_none() && resolved.hour() < 12 {
            let evening = resolved + Duration::hours(12);
            if evening > reference {
                return evening;
            }
        }
    }
    if !fields.day.matched {
        return resolved + Duration::days(1);
    }
    if !fields.month.matched {
        return add_months(resolved, 1);
    }
    if !fields.year.matched {
        return add_years(resolved, 1);
    }
    resolved
}

/// Optional refinement: a meridiem-less time-only match with a nonzero
/// time of day, resolved before 08:00 on a date other than the reference
/// date, reads as the afternoon/evening instead of the small hours.
fn apply_daytime_bias(
    moment: NaiveDateTime,
    candidate: &Candidate,
    reference: NaiveDateTime,
) -> NaiveDateTime {
    let Some(time) = &candidate.time else {
        return moment;
    };
    if candidate.date.is_some() || time.meridiem.is_some() {
        return moment;
    }
    if moment.date() == reference.date() || moment.time() == NaiveTime::MIN {
        return moment;
    }
    if moment.hour() < 8 {
        moment + Duration::hours(12)
    } else {
        moment
    }
}

// ── Calendar arithmetic ─────────────────────────────────────────────────────

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(28)
}

/// Add calendar months, clamping the day to the target month's last day.
fn add_months(moment: NaiveDateTime, months: u32) -> NaiveDateTime {
    let total = moment.month0() + months;
    let year = moment.year() + (total / 12) as i32;
    let month = total % 12 + 1;
    let day = moment.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day)
        .map(|d| d.and_time(moment.time()))
        .unwrap_or(moment)
}

/// Add calendar years, clamping February 29 to the 28th off leap years.
fn add_years(moment: NaiveDateTime, years: i32) -> NaiveDateTime {
    let year = moment.year() + years;
    let day = moment.day().min(days_in_month(year, moment.month()));
    NaiveDate::from_ymd_opt(year, moment.month(), day)
        .map(|d| d.and_time(moment.time()))
        .unwrap_or(moment)
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// Friday, March 1, 2024, 08:00:00.
    fn reference() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn moment(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(
            parse_moment("", reference()),
            Err(ParseError::Empty)
        ));
        assert!(matches!(
            parse_moment("  \t", reference()),
            Err(ParseError::Empty)
        ));
    }

    #[test]
    fn test_gibberish_no_match() {
        let err = parse_moment("gobbledygook", reference()).unwrap_err();
        assert!(matches!(err, ParseError::NoMatch(_)), "got: {err}");
    }

    // ── Idiomatic literals ──────────────────────────────────────────────

    #[test]
    fn test_new_years_eve() {
        let expected = moment(2025, 1, 1, 0, 0, 0);
        assert_eq!(parse_moment("nye", reference()).unwrap(), expected);
        assert_eq!(parse_moment("new year", reference()).unwrap(), expected);
        assert_eq!(
            parse_moment("New Year's Eve", reference()).unwrap(),
            expected
        );
    }

    #[test]
    fn test_bare_month_rolls_forward() {
        // March 1 is not after the reference (it *is* the reference date),
        // so "march" means next year's March.
        assert_eq!(
            parse_moment("march", reference()).unwrap(),
            moment(2025, 3, 1, 0, 0, 0)
        );
        assert_eq!(
            parse_moment("april", reference()).unwrap(),
            moment(2024, 4, 1, 0, 0, 0)
        );
        assert_eq!(
            parse_moment("Jan", reference()).unwrap(),
            moment(2025, 1, 1, 0, 0, 0)
        );
    }

    // ── Normalization ───────────────────────────────────────────────────

    #[test]
    fn test_noon() {
        let expected = moment(2024, 3, 1, 12, 0, 0);
        assert_eq!(parse_moment("noon", reference()).unwrap(), expected);
        assert_eq!(parse_moment("midday", reference()).unwrap(), expected);
        assert_eq!(parse_moment("12 noon", reference()).unwrap(), expected);
        assert_eq!(parse_moment("12:00 noon", reference()).unwrap(), expected);
    }

    #[test]
    fn test_midnight_is_tomorrow_from_morning() {
        // 00:00 today is already past an 08:00 reference; day was not
        // matched, so the fallback adds a day.
        assert_eq!(
            parse_moment("midnight", reference()).unwrap(),
            moment(2024, 3, 2, 0, 0, 0)
        );
    }

    #[test]
    fn test_today_and_tomorrow() {
        assert_eq!(
            parse_moment("tomorrow", reference()).unwrap(),
            moment(2024, 3, 2, 0, 0, 0)
        );
        assert_eq!(
            parse_moment("tommorow", reference()).unwrap(),
            moment(2024, 3, 2, 0, 0, 0)
        );
        assert_eq!(
            parse_moment("today at 9pm", reference()).unwrap(),
            moment(2024, 3, 1, 21, 0, 0)
        );
        assert_eq!(
            parse_moment("tomorrow at 6:15", reference()).unwrap(),
            moment(2024, 3, 2, 6, 15, 0)
        );
    }

    // ── Weekdays ────────────────────────────────────────────────────────

    #[test]
    fn test_weekday_nearest_future() {
        // Reference is Friday March 1; nearest Sunday is March 3.
        assert_eq!(
            parse_moment("sunday", reference()).unwrap(),
            moment(2024, 3, 3, 0, 0, 0)
        );
        // Nearest Friday is strictly after the reference: March 8.
        assert_eq!(
            parse_moment("friday", reference()).unwrap(),
            moment(2024, 3, 8, 0, 0, 0)
        );
        assert_eq!(
            parse_moment("Thurs", reference()).unwrap(),
            moment(2024, 3, 7, 0, 0, 0)
        );
    }

    #[test]
    fn test_weekday_next() {
        assert_eq!(
            parse_moment("next sunday", reference()).unwrap(),
            moment(2024, 3, 10, 0, 0, 0)
        );
        assert_eq!(
            parse_moment("sunday after next", reference()).unwrap(),
            moment(2024, 3, 17, 0, 0, 0)
        );
    }

    #[test]
    fn test_weekday_next_week() {
        // Monday is earlier in the week than the Friday reference, so the
        // nearest Monday (March 4) is already next week.
        assert_eq!(
            parse_moment("monday next week", reference()).unwrap(),
            moment(2024, 3, 4, 0, 0, 0)
        );
        // Saturday is later in the week, so the nearest one (March 2) gets
        // pushed a week out.
        assert_eq!(
            parse_moment("saturday next week", reference()).unwrap(),
            moment(2024, 3, 9, 0, 0, 0)
        );
    }

    #[test]
    fn test_weekday_with_time() {
        assert_eq!(
            parse_moment("friday at 5pm", reference()).unwrap(),
            moment(2024, 3, 8, 17, 0, 0)
        );
        assert_eq!(
            parse_moment("next friday 8", reference()).unwrap(),
            moment(2024, 3, 15, 8, 0, 0)
        );
    }

    // ── Dates ───────────────────────────────────────────────────────────

    #[test]
    fn test_day_of_month_alone() {
        assert_eq!(
            parse_moment("14th", reference()).unwrap(),
            moment(2024, 3, 14, 0, 0, 0)
        );
        assert_eq!(
            parse_moment("the 3rd", reference()).unwrap(),
            moment(2024, 3, 3, 0, 0, 0)
        );
        // The 1st at midnight is past the 08:00 reference; day was matched
        // but month was not, so the fallback moves a month out.
        assert_eq!(
            parse_moment("1st", reference()).unwrap(),
            moment(2024, 4, 1, 0, 0, 0)
        );
    }

    #[test]
    fn test_spelled_dates() {
        assert_eq!(
            parse_moment("14 Feb 2004", reference()).unwrap(),
            moment(2004, 2, 14, 0, 0, 0)
        );
        assert_eq!(
            parse_moment("14th of February 2004", reference()).unwrap(),
            moment(2004, 2, 14, 0, 0, 0)
        );
        assert_eq!(
            parse_moment("Feb 14, 2004", reference()).unwrap(),
            moment(2004, 2, 14, 0, 0, 0)
        );
        // Year-less and already past: rolls forward a year.
        assert_eq!(
            parse_moment("Feb 14", reference()).unwrap(),
            moment(2025, 2, 14, 0, 0, 0)
        );
        // Year-less and still ahead: stays in the reference year.
        assert_eq!(
            parse_moment("July 4", reference()).unwrap(),
            moment(2024, 7, 4, 0, 0, 0)
        );
    }

    #[test]
    fn test_explicit_past_moment_returned_as_is() {
        // Every calendar field matched: no fallback applies.
        let parsed = parse_moment("14 Feb 2004", reference()).unwrap();
        assert!(parsed < reference());
    }

    #[test]
    fn test_numeric_dates_locale_order() {
        // Default locale is month-first: 3/4 is March 4.
        assert_eq!(
            parse_moment("3/4", reference()).unwrap(),
            moment(2024, 3, 4, 0, 0, 0)
        );
        let day_first = MomentOptions {
            locale: FormatLocale::DayFirst,
            ..Default::default()
        };
        assert_eq!(
            parse_moment_with_options("3/4", reference(), &day_first).unwrap(),
            moment(2024, 4, 3, 0, 0, 0)
        );
    }

    #[test]
    fn test_numeric_date_falls_back_to_alternate_order() {
        // 2/14 cannot be day-month (month 14), so the day-first locale
        // still reads it as February 14 — and rolls the year forward since
        // that date is past.
        let day_first = MomentOptions {
            locale: FormatLocale::DayFirst,
            ..Default::default()
        };
        assert_eq!(
            parse_moment_with_options("2/14", reference(), &day_first).unwrap(),
            moment(2025, 2, 14, 0, 0, 0)
        );
    }

    #[test]
    fn test_iso_numeric_date_any_locale() {
        assert_eq!(
            parse_moment("2024-12-25", reference()).unwrap(),
            moment(2024, 12, 25, 0, 0, 0)
        );
        let day_first = MomentOptions {
            locale: FormatLocale::DayFirst,
            ..Default::default()
        };
        assert_eq!(
            parse_moment_with_options("2024-12-25", reference(), &day_first).unwrap(),
            moment(2024, 12, 25, 0, 0, 0)
        );
    }

    #[test]
    fn test_two_digit_year_windowed() {
        // Month-first cannot read "14" as a month, so the alternate
        // day-first order applies; "99" windows into the reference century.
        assert_eq!(
            parse_moment("14/2/99", reference()).unwrap(),
            moment(2099, 2, 14, 0, 0, 0)
        );
    }

    #[test]
    fn test_bare_year() {
        assert_eq!(
            parse_moment("2026", reference()).unwrap(),
            moment(2026, 1, 1, 0, 0, 0)
        );
    }

    #[test]
    fn test_invalid_calendar_date_no_match() {
        let err = parse_moment("Feb 30", reference()).unwrap_err();
        assert!(matches!(err, ParseError::NoMatch(_)), "got: {err}");
    }

    // ── Times and future bias ───────────────────────────────────────────

    #[test]
    fn test_bare_hour_prefers_same_day_evening() {
        // "5" at 08:00: 05:00 is past, but the 12-hour reading 17:00 is
        // still ahead today.
        assert_eq!(
            parse_moment("5", reference()).unwrap(),
            moment(2024, 3, 1, 17, 0, 0)
        );
        let afternoon = moment(2024, 3, 1, 14, 0, 0);
        assert_eq!(
            parse_moment("5:30", afternoon).unwrap(),
            moment(2024, 3, 1, 17, 30, 0)
        );
    }

    #[test]
    fn test_bare_hour_future_stays_morning() {
        assert_eq!(
            parse_moment("9", reference()).unwrap(),
            moment(2024, 3, 1, 9, 0, 0)
        );
    }

    #[test]
    fn test_past_meridiem_time_moves_to_tomorrow() {
        let evening = moment(2024, 3, 1, 18, 0, 0);
        assert_eq!(
            parse_moment("5pm", evening).unwrap(),
            moment(2024, 3, 2, 17, 0, 0)
        );
    }

    #[test]
    fn test_bare_hour_exhausts_twelve_hour_reading() {
        // "5" at 18:00: neither 05:00 nor 17:00 is ahead, so the day
        // fallback applies and the morning reading stands.
        let evening = moment(2024, 3, 1, 18, 0, 0);
        assert_eq!(
            parse_moment("5", evening).unwrap(),
            moment(2024, 3, 2, 5, 0, 0)
        );
    }

    #[test]
    fn test_twelve_without_meridiem_is_zero_hour() {
        // Hour 12 with no indicator reads as 0, then the 12-hour fallback
        // lands it at 12:30 today.
        assert_eq!(
            parse_moment("12:30", reference()).unwrap(),
            moment(2024, 3, 1, 12, 30, 0)
        );
    }

    #[test]
    fn test_twelve_am() {
        assert_eq!(
            parse_moment("12am", reference()).unwrap(),
            moment(2024, 3, 2, 0, 0, 0)
        );
    }

    #[test]
    fn test_24_hour_clock() {
        assert_eq!(
            parse_moment("17:30", reference()).unwrap(),
            moment(2024, 3, 1, 17, 30, 0)
        );
        assert_eq!(
            parse_moment("17:30:09", reference()).unwrap(),
            moment(2024, 3, 1, 17, 30, 9)
        );
    }

    #[test]
    fn test_meridiem_spellings() {
        let expected = moment(2024, 3, 1, 17, 0, 0);
        assert_eq!(parse_moment("5pm", reference()).unwrap(), expected);
        assert_eq!(parse_moment("5 pm", reference()).unwrap(), expected);
        assert_eq!(parse_moment("5 p.m.", reference()).unwrap(), expected);
        assert_eq!(parse_moment("5p", reference()).unwrap(), expected);
    }

    #[test]
    fn test_time_on_date() {
        assert_eq!(
            parse_moment("5:30 pm on 3/15", reference()).unwrap(),
            moment(2024, 3, 15, 17, 30, 0)
        );
        assert_eq!(
            parse_moment("noon on the 14th", reference()).unwrap(),
            moment(2024, 3, 14, 12, 0, 0)
        );
    }

    #[test]
    fn test_date_at_time() {
        assert_eq!(
            parse_moment("3/15 at 5:30 pm", reference()).unwrap(),
            moment(2024, 3, 15, 17, 30, 0)
        );
        assert_eq!(
            parse_moment("Feb 14 2025 at noon", reference()).unwrap(),
            moment(2025, 2, 14, 12, 0, 0)
        );
    }

    // ── Daytime bias ────────────────────────────────────────────────────

    #[test]
    fn test_daytime_bias_off_by_default() {
        let evening = moment(2024, 3, 1, 18, 0, 0);
        assert_eq!(
            parse_moment("5", evening).unwrap(),
            moment(2024, 3, 2, 5, 0, 0)
        );
    }

    #[test]
    fn test_daytime_bias_shifts_small_hours() {
        let evening = moment(2024, 3, 1, 18, 0, 0);
        let options = MomentOptions {
            daytime_bias: true,
            ..Default::default()
        };
        assert_eq!(
            parse_moment_with_options("5", evening, &options).unwrap(),
            moment(2024, 3, 2, 17, 0, 0)
        );
    }

    #[test]
    fn test_daytime_bias_leaves_reference_date_alone() {
        let options = MomentOptions {
            daytime_bias: true,
            ..Default::default()
        };
        // "9" resolves to 09:00 on the reference date itself: untouched.
        assert_eq!(
            parse_moment_with_options("9", reference(), &options).unwrap(),
            moment(2024, 3, 1, 9, 0, 0)
        );
    }

    #[test]
    fn test_daytime_bias_leaves_midnight_alone() {
        let options = MomentOptions {
            daytime_bias: true,
            ..Default::default()
        };
        assert_eq!(
            parse_moment_with_options("midnight", reference(), &options).unwrap(),
            moment(2024, 3, 2, 0, 0, 0)
        );
    }

    // ── Calendar arithmetic ─────────────────────────────────────────────

    #[test]
    fn test_add_months_clamps_day() {
        let jan31 = moment(2024, 1, 31, 10, 0, 0);
        assert_eq!(add_months(jan31, 1), moment(2024, 2, 29, 10, 0, 0));
        let dec15 = moment(2024, 12, 15, 0, 0, 0);
        assert_eq!(add_months(dec15, 1), moment(2025, 1, 15, 0, 0, 0));
    }

    #[test]
    fn test_add_years_clamps_leap_day() {
        let leap = moment(2024, 2, 29, 0, 0, 0);
        assert_eq!(add_years(leap, 1), moment(2025, 2, 28, 0, 0, 0));
    }
}
