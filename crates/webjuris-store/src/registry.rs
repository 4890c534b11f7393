//! Registry of reserved case numbers.
//!
//! Numbers are reserved ahead of time and later picked up by a case. A
//! number counts as used while some case carries it, so the used/available
//! split is always computed against the cases the caller passes in. The
//! registry itself is persisted as a small JSON file.

use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use webjuris_core::{CaseNumber, CaseRecord, case_number_taken};

use crate::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservedNumber {
    pub id: u64,
    pub number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// A reserved number together with whether a case already carries it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberUse<'a> {
    pub entry: &'a ReservedNumber,
    pub used: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumberRegistry {
    entries: Vec<ReservedNumber>,
}

impl NumberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<ReservedNumber>) -> Self {
        Self { entries }
    }

    /// Read the registry file. A missing file is an empty registry.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no registry file yet");
                return Ok(Self::new());
            }
            Err(source) => {
                return Err(StoreError::RegistryFile {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let entries: Vec<ReservedNumber> = serde_json::from_str(&text)?;
        debug!(path = %path.display(), count = entries.len(), "registry loaded");
        Ok(Self { entries })
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(path, text).map_err(|source| StoreError::RegistryFile {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn entries(&self) -> &[ReservedNumber] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&ReservedNumber> {
        self.entries.iter().find(|e| e.id == id)
    }

    fn position(&self, id: u64) -> Result<usize, StoreError> {
        self.entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn next_id(&self) -> u64 {
        self.entries
            .iter()
            .map(|e| e.id)
            .max()
            .map_or(1, |max| max.saturating_add(1))
    }

    // ── Mutations ──

    /// Reserve a number. It is stored without zero padding and must not
    /// already be reserved.
    pub fn add(&mut self, number: &str, note: Option<String>) -> Result<&ReservedNumber, StoreError> {
        let number = canonical(number)?;
        if case_number_taken(&number, self.numbers()) {
            return Err(StoreError::DuplicateCaseNumber(number));
        }
        let entry = ReservedNumber {
            id: self.next_id(),
            number,
            note: note.filter(|n| !n.trim().is_empty()),
        };
        info!(id = entry.id, number = %entry.number, "number reserved");
        self.entries.push(entry);
        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Change an available number. A number some case already carries
    /// cannot be edited.
    pub fn edit(
        &mut self,
        id: u64,
        number: &str,
        cases: &[CaseRecord],
    ) -> Result<&ReservedNumber, StoreError> {
        let idx = self.position(id)?;
        if is_used(&self.entries[idx].number, cases) {
            return Err(StoreError::NumberInUse(self.entries[idx].number.clone()));
        }
        let number = canonical(number)?;
        let others = self
            .entries
            .iter()
            .filter(|e| e.id != id)
            .map(|e| e.number.as_str());
        if case_number_taken(&number, others) {
            return Err(StoreError::DuplicateCaseNumber(number));
        }
        info!(id, old = %self.entries[idx].number, new = %number, "reserved number edited");
        self.entries[idx].number = number;
        Ok(&self.entries[idx])
    }

    /// Drop a reservation. A number some case already carries is kept.
    pub fn delete(&mut self, id: u64, cases: &[CaseRecord]) -> Result<ReservedNumber, StoreError> {
        let idx = self.position(id)?;
        if is_used(&self.entries[idx].number, cases) {
            return Err(StoreError::NumberInUse(self.entries[idx].number.clone()));
        }
        let removed = self.entries.remove(idx);
        info!(id, number = %removed.number, "reserved number deleted");
        Ok(removed)
    }

    // ── Views ──

    /// Every reserved number with its used flag, in registry order.
    pub fn usage<'a>(&'a self, cases: &[CaseRecord]) -> Vec<NumberUse<'a>> {
        self.entries
            .iter()
            .map(|entry| NumberUse {
                entry,
                used: is_used(&entry.number, cases),
            })
            .collect()
    }

    pub fn available<'a>(&'a self, cases: &[CaseRecord]) -> Vec<&'a ReservedNumber> {
        self.usage(cases)
            .into_iter()
            .filter(|u| !u.used)
            .map(|u| u.entry)
            .collect()
    }

    pub fn used<'a>(&'a self, cases: &[CaseRecord]) -> Vec<&'a ReservedNumber> {
        self.usage(cases)
            .into_iter()
            .filter(|u| u.used)
            .map(|u| u.entry)
            .collect()
    }

    fn numbers(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.number.as_str())
    }
}

fn canonical(number: &str) -> Result<String, StoreError> {
    CaseNumber::parse(number)
        .map(|n| n.to_string())
        .ok_or_else(|| StoreError::InvalidCaseNumber(number.trim().to_string()))
}

fn is_used(number: &str, cases: &[CaseRecord]) -> bool {
    case_number_taken(number, cases.iter().map(|c| c.case_number.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use webjuris_core::{CaseStatus, NOT_AVAILABLE, Priority};

    fn case(number: &str) -> CaseRecord {
        CaseRecord {
            id: number.replace('/', "-"),
            title: "Divorce Martin".into(),
            client: "Marie Martin".into(),
            case_number: number.into(),
            status: CaseStatus::Open,
            priority: Priority::Medium,
            description: NOT_AVAILABLE.into(),
            lawyer: "Me. Sophie Dubois".into(),
            court: None,
            court_of_appeal: Some("rabat".into()),
            first_instance_tribunal: None,
            next_hearing: None,
            last_decision: None,
            created_date: "2024-01-15T00:00:00.000Z".into(),
            last_update: "2024-01-15T00:00:00.000Z".into(),
        }
    }

    fn registry() -> NumberRegistry {
        let mut reg = NumberRegistry::new();
        reg.add("2024/1504/1", Some("Divorce Martin".into())).unwrap();
        reg.add("2024/1504/2", None).unwrap();
        reg.add("2024/1503/5", None).unwrap();
        reg
    }

    #[test]
    fn used_follows_the_cases() {
        let reg = registry();
        let cases = [case("2024/1504/1"), case("2023/1508/1")];

        let used: Vec<&str> = reg.used(&cases).iter().map(|e| e.number.as_str()).collect();
        let available: Vec<&str> = reg.available(&cases).iter().map(|e| e.number.as_str()).collect();
        assert_eq!(used, ["2024/1504/1"]);
        assert_eq!(available, ["2024/1504/2", "2024/1503/5"]);

        let flags: Vec<bool> = reg.usage(&cases).iter().map(|u| u.used).collect();
        assert_eq!(flags, [true, false, false]);
        assert!(reg.used(&[]).is_empty());
    }

    #[test]
    fn padded_case_number_marks_reservation_used() {
        let reg = registry();
        let cases = [case("2024/1504/002")];
        assert_eq!(reg.used(&cases)[0].number, "2024/1504/2");
    }

    #[test]
    fn add_assigns_ids_and_strips_padding() {
        let mut reg = registry();
        let entry = reg.add(" 2025/1501/007 ", Some("  ".into())).unwrap();
        assert_eq!(entry.id, 4);
        assert_eq!(entry.number, "2025/1501/7");
        assert_eq!(entry.note, None);
        assert_eq!(reg.get(1).unwrap().note.as_deref(), Some("Divorce Martin"));
    }

    #[test]
    fn add_rejects_duplicates() {
        let mut reg = registry();
        let err = reg.add("2024/1504/01", None).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateCaseNumber(n) if n == "2024/1504/1"));
        assert_eq!(reg.len(), 3);
    }

    #[test]
    fn add_rejects_malformed_numbers() {
        let mut reg = NumberRegistry::new();
        for bad in ["2024-001", "2024/1501", "abcd/1501/1", ""] {
            assert!(
                matches!(reg.add(bad, None), Err(StoreError::InvalidCaseNumber(_))),
                "{bad}"
            );
        }
        assert!(reg.is_empty());
    }

    #[test]
    fn edit_rejects_number_held_by_another_entry() {
        let mut reg = registry();
        let err = reg.edit(3, "2024/1504/2", &[]).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateCaseNumber(_)));
        assert_eq!(reg.get(3).unwrap().number, "2024/1503/5");
    }

    #[test]
    fn edit_may_keep_its_own_number() {
        let mut reg = registry();
        let entry = reg.edit(2, "2024/1504/02", &[]).unwrap();
        assert_eq!(entry.number, "2024/1504/2");
        reg.edit(2, "2024/1504/9", &[]).unwrap();
        assert_eq!(reg.get(2).unwrap().number, "2024/1504/9");
    }

    #[test]
    fn used_numbers_cannot_be_edited_or_deleted() {
        let mut reg = registry();
        let cases = [case("2024/1504/1")];

        let err = reg.edit(1, "2024/1504/8", &cases).unwrap_err();
        assert!(matches!(err, StoreError::NumberInUse(n) if n == "2024/1504/1"));
        let err = reg.delete(1, &cases).unwrap_err();
        assert!(matches!(err, StoreError::NumberInUse(_)));
        assert_eq!(reg.len(), 3);

        let removed = reg.delete(2, &cases).unwrap();
        assert_eq!(removed.number, "2024/1504/2");
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn unknown_id_is_not_found() {
        let mut reg = registry();
        assert!(matches!(reg.delete(42, &[]), Err(StoreError::NotFound(id)) if id == "42"));
        assert!(matches!(reg.edit(42, "2024/1501/1", &[]), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn file_round_trip_and_missing_file() {
        let path = std::env::temp_dir().join(format!("webjuris-registry-{}.json", std::process::id()));
        let _ = std::fs::remove_file(&path);

        assert!(NumberRegistry::load(&path).unwrap().is_empty());

        let reg = registry();
        reg.save(&path).unwrap();
        let loaded = NumberRegistry::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, reg);
    }

    #[test]
    fn corrupt_file_is_reported() {
        let path = std::env::temp_dir().join(format!("webjuris-corrupt-{}.json", std::process::id()));
        std::fs::write(&path, "{not json").unwrap();
        let err = NumberRegistry::load(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(err, StoreError::RegistryJson(_)));
    }
}
