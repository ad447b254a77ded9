//! Field-level grammar of tz source lines.
//!
//! Each parser takes one whitespace-delimited token (or a short run of them
//! for UNTIL) and reports a [`FieldError`]. The line parser decides whether
//! a given failure skips the line or aborts the source.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta, Weekday};

use crate::model::{ClockReference, DayRule, RuleReference, TimeOfDay, YearBound};

/// Why a field could not be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    /// A month or weekday name that matches nothing, or a bad year token.
    UnknownName,
    /// Content that breaks the field's grammar.
    Malformed,
}

const MONTHS: [&str; 12] = [
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

const WEEKDAYS: [(&str, Weekday); 7] = [
    ("monday", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("saturday", Weekday::Sat),
    ("sunday", Weekday::Sun),
];

const MIN_NAME_PREFIX: usize = 3;

/// Case-insensitive "is `token` an abbreviation of `word`" check, as zic
/// matches keywords. `min_len` is the shortest accepted abbreviation.
pub fn is_abbreviation(token: &str, word: &str, min_len: usize) -> bool {
    token.len() >= min_len
        && token.len() <= word.len()
        && word
            .get(..token.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(token))
}

/// Parse a month name into its 1-based number.
pub fn parse_month(token: &str) -> Result<u32, FieldError> {
    let mut matches = (1_u32..).zip(MONTHS).filter(|(_, name)| is_abbreviation(token, name, MIN_NAME_PREFIX));
    match (matches.next(), matches.next()) {
        (Some((number, _)), None) => Ok(number),
        _ => Err(FieldError::UnknownName),
    }
}

/// Parse a weekday name.
pub fn parse_weekday(token: &str) -> Result<Weekday, FieldError> {
    let mut matches = WEEKDAYS
        .iter()
        .filter(|(name, _)| is_abbreviation(token, name, MIN_NAME_PREFIX));
    match (matches.next(), matches.next()) {
        (Some((_, weekday)), None) => Ok(*weekday),
        _ => Err(FieldError::UnknownName),
    }
}

/// Parse a FROM year: an integer, `minimum` or `maximum`.
pub fn parse_from_year(token: &str) -> Result<YearBound, FieldError> {
    if is_abbreviation(token, "minimum", 2) {
        Ok(YearBound::Min)
    } else if is_abbreviation(token, "maximum", 2) {
        Ok(YearBound::Max)
    } else {
        token
            .parse::<i32>()
            .ok()
            .map(YearBound::Year)
            .ok_or(FieldError::UnknownName)
    }
}

/// Parse a TO year: like FROM, plus `only` which repeats `from`.
pub fn parse_to_year(token: &str, from: YearBound) -> Result<YearBound, FieldError> {
    if is_abbreviation(token, "only", 1) {
        Ok(from)
    } else {
        parse_from_year(token)
    }
}

/// Parse the ON day expression: `15`, `lastSun`, `Sun>=8` or `Sun<=25`.
pub fn parse_day(token: &str) -> Result<DayRule, FieldError> {
    if let Some((name, day)) = token.split_once(">=") {
        return Ok(DayRule::WeekdayOnOrAfter {
            weekday: parse_weekday(name)?,
            day: parse_day_number(day)?,
        });
    }
    if let Some((name, day)) = token.split_once("<=") {
        return Ok(DayRule::WeekdayOnOrBefore {
            weekday: parse_weekday(name)?,
            day: parse_day_number(day)?,
        });
    }
    if token.len() > 4 && is_abbreviation(token.get(..4).unwrap_or_default(), "last", 4) {
        let name = token.get(4..).unwrap_or_default();
        return parse_weekday(name).map(DayRule::LastWeekday);
    }
    parse_day_number(token).map(DayRule::DayOfMonth)
}

fn parse_day_number(token: &str) -> Result<u32, FieldError> {
    match token.parse::<u32>() {
        Ok(day) if (1..=31).contains(&day) => Ok(day),
        _ => Err(FieldError::Malformed),
    }
}

/// Parse `[-]h[:mm[:ss]]` into a signed duration. Hours may exceed 24.
pub fn parse_hms(token: &str) -> Result<TimeDelta, FieldError> {
    let (negative, body) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token),
    };
    if body.is_empty() {
        return Err(FieldError::Malformed);
    }

    let mut parts = body.split(':');
    let hours = parse_component(parts.next(), u32::MAX)?;
    let minutes = parts.next().map_or(Ok(0), |m| parse_component(Some(m), 59))?;
    let seconds = parts.next().map_or(Ok(0), |s| parse_component(Some(s), 59))?;
    if parts.next().is_some() {
        return Err(FieldError::Malformed);
    }

    let total = i64::from(hours)
        .checked_mul(3600)
        .and_then(|h| h.checked_add(i64::from(minutes).checked_mul(60)?))
        .and_then(|hm| hm.checked_add(i64::from(seconds)))
        .ok_or(FieldError::Malformed)?;
    let signed = if negative { total.checked_neg() } else { Some(total) };
    signed
        .and_then(TimeDelta::try_seconds)
        .ok_or(FieldError::Malformed)
}

fn parse_component(part: Option<&str>, max: u32) -> Result<u32, FieldError> {
    let part = part.ok_or(FieldError::Malformed)?;
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FieldError::Malformed);
    }
    match part.parse::<u32>() {
        Ok(value) if value <= max => Ok(value),
        _ => Err(FieldError::Malformed),
    }
}

/// Parse an AT or UNTIL time-of-day with its optional clock suffix.
///
/// A bare `-` means midnight.
pub fn parse_time_of_day(token: &str) -> Result<TimeOfDay, FieldError> {
    if token == "-" {
        return Ok(TimeOfDay::MIDNIGHT);
    }
    let (body, clock) = match token.chars().last() {
        Some('s' | 'S') => (trim_last(token), ClockReference::LocalStandard),
        Some('w' | 'W') => (trim_last(token), ClockReference::Wall),
        Some('u' | 'U' | 'g' | 'G' | 'z' | 'Z') => (trim_last(token), ClockReference::Universal),
        _ => (token, ClockReference::Unspecified),
    };
    Ok(TimeOfDay {
        offset: parse_hms(body)?,
        clock,
    })
}

/// Parse a SAVE amount. A trailing `s`/`d` standard/daylight marker is
/// accepted and ignored.
pub fn parse_save(token: &str) -> Result<TimeDelta, FieldError> {
    let body = match token.chars().last() {
        Some('s' | 'd') => trim_last(token),
        _ => token,
    };
    parse_hms(body)
}

/// Parse the RULES column of a zone line.
pub fn parse_rule_reference(token: &str) -> Result<RuleReference, FieldError> {
    if token == "-" {
        return Ok(RuleReference::None);
    }
    let looks_numeric = token
        .trim_start_matches('-')
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit());
    if looks_numeric {
        parse_save(token).map(RuleReference::FixedSave)
    } else {
        Ok(RuleReference::Named(token.to_owned()))
    }
}

/// Parse an UNTIL run, `year [month [day [time]]]`, into a naive local
/// date-time and the clock it is expressed on.
pub fn parse_until(tokens: &[&str]) -> Result<(NaiveDateTime, ClockReference), FieldError> {
    let [year, rest @ ..] = tokens else {
        return Err(FieldError::Malformed);
    };
    if rest.len() > 3 {
        return Err(FieldError::Malformed);
    }
    let year = year.parse::<i32>().ok().ok_or(FieldError::Malformed)?;
    let month = rest.first().map_or(Ok(1), |token| parse_month(token))?;
    let day = rest.get(1).map_or(Ok(DayRule::DayOfMonth(1)), |token| parse_day(token))?;
    let time = rest
        .get(2)
        .map_or(Ok(TimeOfDay::MIDNIGHT), |token| parse_time_of_day(token))?;

    let date: NaiveDate = day.resolve(year, month).ok_or(FieldError::Malformed)?;
    let local = time.on(date).ok_or(FieldError::Malformed)?;
    Ok((local, time.clock))
}

fn trim_last(token: &str) -> &str {
    token
        .char_indices()
        .last()
        .and_then(|(index, _)| token.get(..index))
        .unwrap_or_default()
}
