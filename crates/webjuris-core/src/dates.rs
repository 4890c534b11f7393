//! Date conversion for records coming out of the object store.
//!
//! Deployments disagree on date encoding: some send RFC 3339 timestamps,
//! some bare `YYYY-MM-DD`, some `DD/MM/YYYY`, and some send nothing at all.
//! Everything is funnelled into ISO 8601 strings.
//!
//! # Rules
//!
//! 1. A string without `/` that already parses as a date is kept verbatim.
//! 2. `D/M/Y` (three numeric segments) is read day-first and re-encoded as
//!    `YYYY-MM-DDT00:00:00.000Z`.
//! 3. Anything else falls back to "now" and is flagged.
//!
//! Output of every rule satisfies rule 1, so converting twice is a no-op.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use tracing::warn;

const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Result of [`convert_date`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedDate {
    /// ISO 8601 string.
    pub value: String,
    /// True when the input could not be read and `value` is the current time.
    pub fallback: bool,
}

/// Convert a raw date string using the current time for the fallback.
pub fn convert_date(input: &str) -> ConvertedDate {
    convert_date_at(input, Utc::now())
}

/// Convert a raw date string, falling back to `now` if it cannot be read.
pub fn convert_date_at(input: &str, now: DateTime<Utc>) -> ConvertedDate {
    let trimmed = input.trim();

    if !trimmed.is_empty() && !trimmed.contains('/') && parse_iso(trimmed).is_some() {
        return ConvertedDate {
            value: trimmed.to_string(),
            fallback: false,
        };
    }

    if let Some(date) = parse_day_first(trimmed) {
        return ConvertedDate {
            value: iso_midnight(date),
            fallback: false,
        };
    }

    warn!(input = %input, "unreadable date, substituting current time");
    ConvertedDate {
        value: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        fallback: true,
    }
}

/// Interpret a date string as a UTC instant.
///
/// Accepts the same shapes as [`convert_date`] minus the fallback. Naive
/// timestamps and bare dates are taken to be UTC.
pub fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.contains('/') {
        return parse_day_first(trimmed)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc());
    }
    parse_iso(trimmed)
}

/// `DD/MM/YYYY` rendering for display; unreadable values pass through untouched.
pub fn display_date(value: &str) -> String {
    match parse_instant(value) {
        Some(instant) => instant.format("%d/%m/%Y").to_string(),
        None => value.to_string(),
    }
}

fn parse_iso(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn parse_day_first(s: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = s.split('/').collect();
    if parts.len() != 3 {
        return None;
    }
    if parts
        .iter()
        .any(|p| p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }
    let day: u32 = parts[0].parse().ok()?;
    let month: u32 = parts[1].parse().ok()?;
    let year: i32 = parts[2].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn iso_midnight(date: NaiveDate) -> String {
    date.format("%Y-%m-%dT00:00:00.000Z").to_string()
}
