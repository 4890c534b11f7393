//! The working set of cases owned by a single view or command.
//!
//! A `CaseBook` is created from whatever the object store returned for the
//! current view, mutated by the user's actions, and dropped with the view.
//! It is not shared and not persisted. Uniqueness checks only see the cases
//! held here; the object store rejects a second record with the same
//! external reference code.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use webjuris_core::{
    CaseDraft, CasePatch, CaseQuery, CaseRecord, StatusCounts, case_number_taken, filter_cases,
    next_case_number, status_counts,
};

use crate::StoreError;

#[derive(Debug, Clone, Default)]
pub struct CaseBook {
    cases: Vec<CaseRecord>,
}

impl CaseBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap cases loaded from the object store, keeping their order.
    pub fn from_cases(cases: Vec<CaseRecord>) -> Self {
        warn_on_duplicates(&cases);
        Self { cases }
    }

    /// Swap in a freshly loaded page, e.g. after a user-initiated refresh.
    pub fn replace_all(&mut self, cases: Vec<CaseRecord>) {
        warn_on_duplicates(&cases);
        self.cases = cases;
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn cases(&self) -> &[CaseRecord] {
        &self.cases
    }

    pub fn get(&self, id: &str) -> Option<&CaseRecord> {
        self.cases.iter().find(|c| c.id == id)
    }

    fn position(&self, id: &str) -> Result<usize, StoreError> {
        self.cases
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    // ── Mutations ──

    /// Validate a submission, allocate its number, and add it at the front.
    pub fn insert_draft(
        &mut self,
        draft: &CaseDraft,
        now: DateTime<Utc>,
    ) -> Result<&CaseRecord, StoreError> {
        let record = draft.validate(&self.cases, now)?;
        info!(id = %record.id, case_number = %record.case_number, "case added to working set");
        self.cases.insert(0, record);
        Ok(&self.cases[0])
    }

    /// Add an already-built record (e.g. one echoed back by the object store).
    pub fn insert_record(&mut self, record: CaseRecord) -> Result<(), StoreError> {
        if self.get(&record.id).is_some() {
            return Err(StoreError::DuplicateId(record.id));
        }
        if case_number_taken(&record.case_number, self.numbers()) {
            return Err(StoreError::DuplicateCaseNumber(record.case_number));
        }
        self.cases.insert(0, record);
        Ok(())
    }

    /// Replace the record stored under `id`, e.g. once the object store has
    /// assigned its own identifier to a locally created case. The case
    /// number must not change.
    pub fn replace(&mut self, id: &str, record: CaseRecord) -> Result<(), StoreError> {
        let idx = self.position(id)?;
        if self.cases[idx].case_number != record.case_number {
            warn!(
                id = %id,
                old = %self.cases[idx].case_number,
                new = %record.case_number,
                "replacement changes the case number"
            );
            let others = self
                .cases
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != idx)
                .map(|(_, c)| c.case_number.as_str());
            if case_number_taken(&record.case_number, others) {
                return Err(StoreError::DuplicateCaseNumber(record.case_number));
            }
        }
        self.cases[idx] = record;
        Ok(())
    }

    /// Apply an edit. The case number is never touched.
    pub fn update(
        &mut self,
        id: &str,
        patch: &CasePatch,
        now: DateTime<Utc>,
    ) -> Result<&CaseRecord, StoreError> {
        let idx = self.position(id)?;
        patch.apply(&mut self.cases[idx], now)?;
        info!(id = %id, "case updated");
        Ok(&self.cases[idx])
    }

    pub fn remove(&mut self, id: &str) -> Result<CaseRecord, StoreError> {
        let idx = self.position(id)?;
        let removed = self.cases.remove(idx);
        info!(id = %id, case_number = %removed.case_number, "case removed");
        Ok(removed)
    }

    // ── Views ──

    pub fn filter(&self, query: &CaseQuery) -> Vec<&CaseRecord> {
        filter_cases(&self.cases, query)
    }

    pub fn status_counts(&self) -> StatusCounts {
        status_counts(&self.cases)
    }

    /// Next free number for `code` in the current year, as far as this
    /// working set knows.
    pub fn next_case_number(&self, code: &str) -> String {
        next_case_number(code, self.numbers())
    }

    fn numbers(&self) -> impl Iterator<Item = &str> {
        self.cases.iter().map(|c| c.case_number.as_str())
    }
}

fn warn_on_duplicates(cases: &[CaseRecord]) {
    let mut seen = HashSet::new();
    for case in cases {
        if !seen.insert(case.case_number.as_str()) {
            warn!(case_number = %case.case_number, "duplicate case number in loaded cases");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};
    use webjuris_core::{CaseStatus, Priority, StatusFilter};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap()
    }

    fn draft(title: &str, code: &str) -> CaseDraft {
        CaseDraft {
            title: title.into(),
            client: "Marie Martin".into(),
            year: "2024".into(),
            classification_code: code.into(),
            status: CaseStatus::Open,
            priority: Priority::High,
            lawyer: "Me. Sophie Dubois".into(),
            court_of_appeal: "rabat".into(),
            ..Default::default()
        }
    }

    #[test]
    fn insert_allocates_sequentially_and_prepends() {
        let mut book = CaseBook::new();
        book.insert_draft(&draft("Divorce Martin", "1504"), now()).unwrap();
        book.insert_draft(&draft("Garde Martin", "1504"), now()).unwrap();
        book.insert_draft(&draft("Bail commercial", "1503"), now()).unwrap();

        let numbers: Vec<&str> = book.cases().iter().map(|c| c.case_number.as_str()).collect();
        assert_eq!(numbers, ["2024/1503/1", "2024/1504/2", "2024/1504/1"]);
    }

    #[test]
    fn duplicate_submission_is_blocked() {
        let mut book = CaseBook::new();
        book.insert_draft(&draft("Divorce Martin", "1504"), now()).unwrap();

        let mut dup = draft("Divorce Martin (bis)", "1504");
        dup.sequence = Some("1".into());
        let err = book.insert_draft(&dup, now()).unwrap_err();
        match err {
            StoreError::Invalid(errors) => assert_eq!(errors.duplicate(), Some("2024/1504/1")),
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn insert_record_rejects_duplicates() {
        let mut book = CaseBook::new();
        let rec = book.insert_draft(&draft("A", "1501"), now()).unwrap().clone();

        let mut same_id = rec.clone();
        same_id.case_number = "2024/1501/99".into();
        assert!(matches!(book.insert_record(same_id), Err(StoreError::DuplicateId(_))));

        let mut same_number = rec.clone();
        same_number.id = "other".into();
        assert!(matches!(
            book.insert_record(same_number),
            Err(StoreError::DuplicateCaseNumber(n)) if n == "2024/1501/1"
        ));
    }

    #[test]
    fn insert_record_treats_padded_numbers_as_duplicates() {
        let mut book = CaseBook::new();
        book.insert_draft(&draft("A", "1501"), now()).unwrap();

        let mut padded = book.cases()[0].clone();
        padded.id = "remote-7".into();
        padded.case_number = "2024/1501/001".into();
        assert!(matches!(
            book.insert_record(padded),
            Err(StoreError::DuplicateCaseNumber(n)) if n == "2024/1501/001"
        ));
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn replace_swaps_local_id_for_remote() {
        let mut book = CaseBook::new();
        let local = book.insert_draft(&draft("A", "1501"), now()).unwrap().clone();
        let mut remote = local.clone();
        remote.id = "40021".into();
        book.replace(&local.id, remote).unwrap();
        assert!(book.get(&local.id).is_none());
        assert_eq!(book.get("40021").unwrap().case_number, "2024/1501/1");
    }

    #[test]
    fn update_and_remove() {
        let mut book = CaseBook::new();
        let id = book.insert_draft(&draft("A", "1501"), now()).unwrap().id.clone();

        let patch = CasePatch {
            status: Some(CaseStatus::Closed),
            ..Default::default()
        };
        let updated = book.update(&id, &patch, now()).unwrap();
        assert_eq!(updated.status, CaseStatus::Closed);
        assert_eq!(book.status_counts().closed, 1);

        assert!(matches!(
            book.update("missing", &patch, now()),
            Err(StoreError::NotFound(_))
        ));

        let removed = book.remove(&id).unwrap();
        assert_eq!(removed.case_number, "2024/1501/1");
        assert!(book.is_empty());
        assert!(matches!(book.remove(&id), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn filter_through_book() {
        let mut book = CaseBook::new();
        book.insert_draft(&draft("Divorce Martin", "1504"), now()).unwrap();
        book.insert_draft(&draft("TechCorp Litigation", "1503"), now()).unwrap();
        let hits = book.filter(&CaseQuery::new("martin", StatusFilter::All));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Divorce Martin");
    }

    #[test]
    fn next_number_uses_current_year() {
        let year = chrono::Local::now().year();
        let mut book = CaseBook::from_cases(Vec::new());
        let mut d = draft("A", "1502");
        d.year = year.to_string();
        book.insert_draft(&d, now()).unwrap();
        assert_eq!(book.next_case_number("1502"), format!("{year}/1502/2"));
        assert_eq!(book.next_case_number("1508"), format!("{year}/1508/1"));
    }

    #[test]
    fn replace_all_resets_working_set() {
        let mut book = CaseBook::new();
        book.insert_draft(&draft("A", "1501"), now()).unwrap();
        book.replace_all(Vec::new());
        assert!(book.is_empty());
    }
}
