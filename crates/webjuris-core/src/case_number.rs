//! Case numbers and sequential allocation.
//!
//! A case number has the shape `<year>/<classificationCode>/<sequence>`,
//! e.g. `2024/1501/4`. Sequences restart at 1 for every (year, code) pair.
//!
//! Allocation is a pure function over the cases the caller already knows
//! about: there is no counter and no reservation. Two callers looking at the
//! same snapshot compute the same number.

use std::fmt;

use chrono::Datelike;
use tracing::warn;

/// A parsed case number.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CaseNumber {
    pub year: i32,
    pub code: String,
    pub sequence: u64,
}

impl CaseNumber {
    pub fn new(year: i32, code: impl Into<String>, sequence: u64) -> Self {
        Self {
            year,
            code: code.into(),
            sequence,
        }
    }

    /// Parse `<year>/<code>/<sequence>`. Returns `None` unless there are
    /// exactly three segments with a numeric year and sequence and a
    /// non-empty code.
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.trim().split('/');
        let year = parts.next()?.parse().ok()?;
        let code = parts.next()?;
        let sequence = parts.next()?.parse().ok()?;
        if parts.next().is_some() || code.is_empty() {
            return None;
        }
        Some(Self::new(year, code, sequence))
    }

    /// The `<year>/<code>/` prefix shared by every number in this series.
    pub fn prefix(year: i32, code: &str) -> String {
        format!("{year}/{code}/")
    }
}

impl fmt::Display for CaseNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.year, self.code, self.sequence)
    }
}

/// Next unused number for `code` in `year`, given the known case numbers.
///
/// Only numbers starting with exactly `<year>/<code>/` count. The segment
/// after the second `/` is read as an integer; anything unparseable counts
/// as 0. The result is `max + 1` (1 for an empty series). A series already
/// at `u64::MAX` stays there, so the result collides with an existing number
/// and is rejected as a duplicate. The code is used verbatim and is not
/// checked against the classification table.
pub fn next_case_number_in<I>(year: i32, code: &str, existing: I) -> String
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let prefix = CaseNumber::prefix(year, code);
    let max = existing
        .into_iter()
        .filter(|n| n.as_ref().starts_with(&prefix))
        .map(|n| trailing_sequence(n.as_ref()))
        .max()
        .unwrap_or(0);
    let next = max.checked_add(1).unwrap_or_else(|| {
        warn!(year, code, "case number series exhausted");
        max
    });
    CaseNumber::new(year, code, next).to_string()
}

/// [`next_case_number_in`] for the current local calendar year.
pub fn next_case_number<I>(code: &str, existing: I) -> String
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    next_case_number_in(chrono::Local::now().year(), code, existing)
}

/// Whether `number` is already used by one of `existing`: an exact match, or
/// the same (year, code, sequence) written with different zero padding.
pub fn case_number_taken<I>(number: &str, existing: I) -> bool
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let parsed = CaseNumber::parse(number);
    existing.into_iter().any(|n| {
        let n = n.as_ref();
        n == number || (parsed.is_some() && CaseNumber::parse(n) == parsed)
    })
}

fn trailing_sequence(number: &str) -> u64 {
    number
        .split('/')
        .nth(2)
        .and_then(|seg| seg.trim().parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_max_plus_one_within_series() {
        let existing = ["2024/1501/1", "2024/1501/3", "2024/1502/9"];
        assert_eq!(next_case_number_in(2024, "1501", existing), "2024/1501/4");
    }

    #[test]
    fn empty_series_starts_at_one() {
        let none: [&str; 0] = [];
        assert_eq!(next_case_number_in(2025, "1504", none), "2025/1504/1");
    }

    #[test]
    fn other_years_are_ignored() {
        let existing = ["2023/1507/2", "2023/1507/12"];
        assert_eq!(next_case_number_in(2024, "1507", existing), "2024/1507/1");
    }

    #[test]
    fn prefix_must_match_exactly() {
        // "15010" shares a textual prefix with "1501" but is a different code.
        let existing = ["2024/15010/40", "2024/1501/2"];
        assert_eq!(next_case_number_in(2024, "1501", existing), "2024/1501/3");
    }

    #[test]
    fn unparseable_sequences_count_as_zero() {
        let existing = ["2024/1503/abc", "2024/1503/", "2024/1503/x7"];
        assert_eq!(next_case_number_in(2024, "1503", existing), "2024/1503/1");

        let mixed = ["2024/1503/abc", "2024/1503/5"];
        assert_eq!(next_case_number_in(2024, "1503", mixed), "2024/1503/6");
    }

    #[test]
    fn zero_padded_sequences_are_numeric() {
        let existing = ["2024/1504/001", "2024/1504/009"];
        assert_eq!(next_case_number_in(2024, "1504", existing), "2024/1504/10");
    }

    #[test]
    fn unknown_code_used_verbatim() {
        let none: [&str; 0] = [];
        assert_eq!(next_case_number_in(2024, "XYZ", none), "2024/XYZ/1");
    }

    #[test]
    fn repeated_calls_agree() {
        let existing = vec!["2024/1501/1".to_string(), "2024/1501/2".to_string()];
        let a = next_case_number_in(2024, "1501", &existing);
        let b = next_case_number_in(2024, "1501", &existing);
        assert_eq!(a, b);
    }

    #[test]
    fn current_year_is_used() {
        let year = chrono::Local::now().year();
        let none: [&str; 0] = [];
        assert_eq!(next_case_number("1502", none), format!("{year}/1502/1"));
    }

    #[test]
    fn taken_ignores_zero_padding() {
        let existing = ["2024/1501/1", "2024/1501/10", "not available"];
        assert!(case_number_taken("2024/1501/10", existing));
        assert!(case_number_taken("2024/1501/01", existing));
        assert!(case_number_taken("2024/1501/010", existing));
        assert!(!case_number_taken("2024/1501/2", existing));
        assert!(!case_number_taken("2025/1501/1", existing));
        assert!(case_number_taken("not available", existing));
    }

    #[test]
    fn exhausted_series_does_not_overflow() {
        let existing = ["2024/1501/18446744073709551615", "2024/1501/3"];
        let next = next_case_number_in(2024, "1501", existing);
        assert_eq!(next, "2024/1501/18446744073709551615");
        assert!(case_number_taken(&next, existing));
    }

    #[test]
    fn parse_and_display() {
        let n = CaseNumber::parse("2024/1501/4").unwrap();
        assert_eq!(n, CaseNumber::new(2024, "1501", 4));
        assert_eq!(n.to_string(), "2024/1501/4");
        assert!(CaseNumber::parse("2024/1501").is_none());
        assert!(CaseNumber::parse("2024//4").is_none());
        assert!(CaseNumber::parse("2024/1501/4/1").is_none());
        assert!(CaseNumber::parse("N/A").is_none());
    }
}
