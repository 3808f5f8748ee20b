//! `$fromNow` offset parsing and ISO-8601 formatting, grounded on
//! `jsone/builtins.py`'s `fromNow`/`fromNowJSON` pair. The day/month/year
//! durations use whole-day arithmetic (years = 365 days, months = 30 days)
//! rather than the original's fractional leap-year/DST corrections — a
//! deliberate simplification recorded in DESIGN.md.

use chrono::{DateTime, Duration, Utc};

use crate::error::{Error, InterpreterError};

/// Abstraction over "now" so rendering is deterministic in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to one instant, for reproducible tests and for snapshotting
/// `context.now` once per render.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Renders a datetime the way `$fromNow` and `context.now` do:
/// `YYYY-MM-DDTHH:MM:SS.mmmZ`.
pub fn format_iso(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Parses an ISO-8601 timestamp as produced by `format_iso`, used to read
/// back a `from` reference supplied as a string.
pub fn parse_iso(s: &str) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| InterpreterError::type_error(format!("'{}' is not a valid ISO-8601 timestamp", s)).into())
}

/// One recognized duration unit in an offset string, each tried in this
/// strictly descending order (`1 year 2 days` is valid, `1 day 2 years` is
/// not — matching the original's regex group ordering).
const UNITS: &[(&[&str], i64)] = &[
    (&["years", "year", "yr"], 365 * 24 * 3600),
    (&["months", "month", "mo"], 30 * 24 * 3600),
    (&["weeks", "week", "wk"], 7 * 24 * 3600),
    (&["days", "day", "d"], 24 * 3600),
    (&["hours", "hour", "hr", "h"], 3600),
    (&["minutes", "minute", "min", "m"], 60),
    (&["seconds", "second", "sec", "s"], 1),
];

/// Parses an offset like `"1 day"`, `"-2 hours 30 minutes"`, or `"1 yr"`
/// into a signed `Duration`. Units are whitespace-separated (an optional
/// comma between groups is tolerated too), matching the reference
/// `FROMNOW_RE` field order: years, months, weeks, days, hours, minutes,
/// seconds, each appearing at most once and never out of order. Hand-parsed
/// rather than built on `regex`: no such crate is carried in this workspace.
pub fn parse_offset(input: &str) -> Result<Duration, Error> {
    let trimmed = input.trim();
    let (sign, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1i64, rest),
        None => (1i64, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let mut total_seconds: i64 = 0;
    let mut next_unit_start = 0usize;
    let mut found_any = false;
    let mut rest = body.trim();

    while !rest.is_empty() {
        rest = rest.trim_start_matches([',', ' ', '\t']).trim_start();
        if rest.is_empty() {
            break;
        }
        let digit_end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        if digit_end == 0 {
            return Err(invalid_offset(input));
        }
        let (number_str, after_number) = rest.split_at(digit_end);
        let amount: i64 = number_str.parse().map_err(|_| invalid_offset(input))?;

        let after_number = after_number.trim_start();
        let unit_end = after_number.find(|c: char| !c.is_ascii_alphabetic()).unwrap_or(after_number.len());
        if unit_end == 0 {
            return Err(invalid_offset(input));
        }
        let (unit_str, remainder) = after_number.split_at(unit_end);

        let unit_index = UNITS
            .iter()
            .position(|(names, _)| names.contains(&unit_str))
            .ok_or_else(|| invalid_offset(input))?;
        if unit_index < next_unit_start {
            return Err(invalid_offset(input));
        }
        next_unit_start = unit_index + 1;

        total_seconds += amount * UNITS[unit_index].1;
        found_any = true;
        rest = remainder;
    }

    if !found_any {
        return Err(invalid_offset(input));
    }

    Ok(Duration::seconds(sign * total_seconds))
}

fn invalid_offset(input: &str) -> Error {
    InterpreterError::type_error(format!("'{}' is not a valid offset string", input)).into()
}
