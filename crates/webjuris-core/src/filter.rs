//! Visible subset of a case list for a free-text query and a status filter.

use std::fmt;
use std::str::FromStr;

use crate::case::{CaseRecord, CaseStatus, ParseLabelError};

/// Status restriction applied to a case list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(CaseStatus),
}

impl StatusFilter {
    pub fn matches(&self, status: CaseStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => *wanted == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse().map(Self::Only)
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(status) => f.write_str(status.as_str()),
        }
    }
}

/// Free-text query plus status filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaseQuery {
    pub text: String,
    pub status: StatusFilter,
}

impl CaseQuery {
    pub fn new(text: impl Into<String>, status: StatusFilter) -> Self {
        Self {
            text: text.into(),
            status,
        }
    }

    /// Case-insensitive substring match on title, client, or case number,
    /// combined with the status filter. An empty query text matches everything.
    pub fn matches(&self, case: &CaseRecord) -> bool {
        self.status.matches(case.status) && self.matches_text(case)
    }

    fn matches_text(&self, case: &CaseRecord) -> bool {
        let needle = self.text.to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [&case.title, &case.client, &case.case_number]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Matching cases, in input order.
pub fn filter_cases<'a>(cases: &'a [CaseRecord], query: &CaseQuery) -> Vec<&'a CaseRecord> {
    cases.iter().filter(|c| query.matches(c)).collect()
}

/// Per-status tallies for a case list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub total: usize,
    pub open: usize,
    pub pending: usize,
    pub closed: usize,
    pub cancelled: usize,
}

impl StatusCounts {
    pub fn get(&self, status: CaseStatus) -> usize {
        match status {
            CaseStatus::Open => self.open,
            CaseStatus::Pending => self.pending,
            CaseStatus::Closed => self.closed,
            CaseStatus::Cancelled => self.cancelled,
        }
    }
}

pub fn status_counts(cases: &[CaseRecord]) -> StatusCounts {
    let mut counts = StatusCounts {
        total: cases.len(),
        ..Default::default()
    };
    for case in cases {
        match case.status {
            CaseStatus::Open => counts.open += 1,
            CaseStatus::Pending => counts.pending += 1,
            CaseStatus::Closed => counts.closed += 1,
            CaseStatus::Cancelled => counts.cancelled += 1,
        }
    }
    counts
}
