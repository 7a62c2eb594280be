//! Lenient parsing of publication dates and track durations
//!
//! Source values are unreliable. Both parsers return `None` instead of
//! failing; an unparseable value never aborts extraction.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::time::Duration;

/// Exact GMT-suffixed formats, two-digit day first
const GMT_FORMATS: [&str; 2] = ["%d %b %Y %H:%M:%S GMT", "%e %b %Y %H:%M:%S GMT"];

/// Naive timestamp formats tried by the general fallback, assumed UTC
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

const SECS_PER_MINUTE: f64 = 60.0;
const SECS_PER_HOUR: f64 = 3600.0;
const SECS_PER_DAY: f64 = 86_400.0;

/// Designators allowed before `T`, in order, with their length in seconds
const DATE_UNITS: [(char, f64); 4] = [
    ('Y', 365.0 * SECS_PER_DAY),
    ('M', 30.0 * SECS_PER_DAY),
    ('W', 7.0 * SECS_PER_DAY),
    ('D', SECS_PER_DAY),
];

/// Designators allowed after `T`, in order
const TIME_UNITS: [(char, f64); 3] = [
    ('H', SECS_PER_HOUR),
    ('M', SECS_PER_MINUTE),
    ('S', 1.0),
];

/// Parse an album publication date.
///
/// Tries `"05 Jun 2020 00:00:00 GMT"` style timestamps (one- or two-digit
/// day) first, then RFC 2822, RFC 3339 and plain ISO dates assumed UTC.
pub fn parse_published_date(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    GMT_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .map(|naive| naive.and_utc())
        .or_else(|| parse_general_date(s))
}

fn parse_general_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
    {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Parse a track duration given as an ISO-8601 duration.
///
/// When the value does not parse and lacks the `P` designator, parsing is
/// retried with `P` prepended, so `"3M45S"` reads as 3 minutes 45 seconds.
pub fn parse_track_duration(raw: &str) -> Option<Duration> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    parse_iso8601_duration(s).or_else(|| {
        if s.starts_with(['P', 'p']) {
            None
        } else {
            parse_iso8601_duration(&format!("P{}", s))
        }
    })
}

/// Strict-ish ISO-8601 duration parser
///
/// Accepts `P[nY][nM][nW][nD][T[nH][nM][n[.f]S]]`. A section without `T` that
/// uses `H` or `S` designators (`P00H03M45S`) is read as a time section.
fn parse_iso8601_duration(s: &str) -> Option<Duration> {
    let body = s.strip_prefix('P')?;
    if body.is_empty() {
        return None;
    }

    let seconds = match body.split_once('T') {
        Some((_, "")) => return None,
        Some((date, time)) => {
            sum_components(date, &DATE_UNITS)? + sum_components(time, &TIME_UNITS)?
        }
        None if body.contains(['H', 'S']) => sum_components(body, &TIME_UNITS)?,
        None => sum_components(body, &DATE_UNITS)?,
    };

    Duration::try_from_secs_f64(seconds).ok()
}

/// Sum `<number><designator>` pairs; designators must follow `units` order
fn sum_components(section: &str, units: &[(char, f64)]) -> Option<f64> {
    let mut total = 0.0;
    let mut next_unit = 0;
    let mut number = String::new();

    for c in section.chars() {
        if c.is_ascii_digit() || c == '.' {
            number.push(c);
            continue;
        }

        let offset = units[next_unit..].iter().position(|(designator, _)| *designator == c)?;
        if number.is_empty() {
            return None;
        }
        let value: f64 = number.parse().ok()?;
        total += value * units[next_unit + offset].1;
        next_unit += offset + 1;
        number.clear();
    }

    // A trailing number without designator is malformed
    if number.is_empty() {
        Some(total)
    } else {
        None
    }
}
