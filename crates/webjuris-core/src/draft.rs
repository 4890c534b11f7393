//! New-case submissions and edits, with field-level validation.
//!
//! A [`CaseDraft`] is what the creation form collects. Validation reports
//! every offending field at once and produces nothing on failure, so a
//! rejected submission never leaves a partial record behind.

use std::fmt;

use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::case::{CaseRecord, CaseStatus, Priority};
use crate::case_number::{CaseNumber, case_number_taken, next_case_number_in};
use crate::courts;
use crate::dates::convert_date_at;
use crate::nomenclature;

/// Form field a validation error is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftField {
    Title,
    Client,
    Year,
    ClassificationCode,
    Sequence,
    Lawyer,
    CourtOfAppeal,
    FirstInstanceTribunal,
    NextHearing,
}

impl DraftField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Client => "client",
            Self::Year => "year",
            Self::ClassificationCode => "classification_code",
            Self::Sequence => "sequence",
            Self::Lawyer => "lawyer",
            Self::CourtOfAppeal => "court_of_appeal",
            Self::FirstInstanceTribunal => "first_instance_tribunal",
            Self::NextHearing => "next_hearing",
        }
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("{field} is required")]
    Missing { field: DraftField },

    #[error("year must have exactly four digits, got '{0}'")]
    InvalidYear(String),

    #[error("unknown classification code '{0}'")]
    UnknownClassification(String),

    #[error("sequence must be a positive integer, got '{0}'")]
    InvalidSequence(String),

    #[error("case number {0} already exists")]
    DuplicateCaseNumber(String),

    #[error("unknown court of appeal '{0}'")]
    UnknownCourtOfAppeal(String),

    #[error("unknown first-instance tribunal '{0}'")]
    UnknownTribunal(String),

    #[error("tribunal '{tribunal}' does not sit under court of appeal '{court_of_appeal}'")]
    TribunalMismatch {
        tribunal: String,
        court_of_appeal: String,
    },

    #[error("next hearing '{0}' is not a readable date")]
    InvalidHearing(String),
}

impl DraftError {
    /// The form field this error should be displayed against.
    pub fn field(&self) -> DraftField {
        match self {
            Self::Missing { field } => *field,
            Self::InvalidYear(_) => DraftField::Year,
            Self::UnknownClassification(_) => DraftField::ClassificationCode,
            Self::InvalidSequence(_) | Self::DuplicateCaseNumber(_) => DraftField::Sequence,
            Self::UnknownCourtOfAppeal(_) => DraftField::CourtOfAppeal,
            Self::UnknownTribunal(_) | Self::TribunalMismatch { .. } => {
                DraftField::FirstInstanceTribunal
            }
            Self::InvalidHearing(_) => DraftField::NextHearing,
        }
    }
}

/// All errors found in one submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", join_errors(.0))]
pub struct ValidationErrors(pub Vec<DraftError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[DraftError] {
        &self.0
    }

    pub fn for_field(&self, field: DraftField) -> impl Iterator<Item = &DraftError> {
        self.0.iter().filter(move |e| e.field() == field)
    }

    /// The duplicate case number, if that is one of the failures.
    pub fn duplicate(&self) -> Option<&str> {
        self.0.iter().find_map(|e| match e {
            DraftError::DuplicateCaseNumber(n) => Some(n.as_str()),
            _ => None,
        })
    }
}

fn join_errors(errors: &[DraftError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {e}", e.field()))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Fields collected by the new-case form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaseDraft {
    pub title: String,
    pub client: String,
    pub year: String,
    pub classification_code: String,
    /// Explicit sequence; the next free one is allocated when absent.
    pub sequence: Option<String>,
    pub status: CaseStatus,
    pub priority: Priority,
    pub description: String,
    pub lawyer: String,
    pub court: Option<String>,
    pub court_of_appeal: String,
    pub first_instance_tribunal: Option<String>,
    pub next_hearing: Option<String>,
}

impl CaseDraft {
    /// An empty draft for the current calendar year.
    pub fn for_current_year() -> Self {
        Self {
            year: chrono::Local::now().year().to_string(),
            ..Default::default()
        }
    }

    /// The number this draft would receive, without checking the rest of the form.
    pub fn preview_case_number<'a, I>(&self, existing: I) -> Option<String>
    where
        I: IntoIterator<Item = &'a CaseRecord>,
    {
        let year = parse_year(&self.year)?;
        let code = self.classification_code.trim();
        if code.is_empty() {
            return None;
        }
        match blank_to_none(self.sequence.as_deref()) {
            Some(seq) => parse_sequence(seq).map(|n| CaseNumber::new(year, code, n).to_string()),
            None => Some(next_case_number_in(
                year,
                code,
                existing.into_iter().map(|c| c.case_number.as_str()),
            )),
        }
    }

    /// Validate against the known cases and build the record to submit.
    pub fn validate(
        &self,
        existing: &[CaseRecord],
        now: DateTime<Utc>,
    ) -> Result<CaseRecord, ValidationErrors> {
        let mut errors = Vec::new();

        require(&self.title, DraftField::Title, &mut errors);
        require(&self.client, DraftField::Client, &mut errors);
        require(&self.lawyer, DraftField::Lawyer, &mut errors);

        let year = if self.year.trim().is_empty() {
            errors.push(DraftError::Missing {
                field: DraftField::Year,
            });
            None
        } else {
            let year = parse_year(&self.year);
            if year.is_none() {
                errors.push(DraftError::InvalidYear(self.year.trim().to_string()));
            }
            year
        };

        let code = self.classification_code.trim();
        let code_ok = if code.is_empty() {
            errors.push(DraftError::Missing {
                field: DraftField::ClassificationCode,
            });
            false
        } else if !nomenclature::is_known(code) {
            errors.push(DraftError::UnknownClassification(code.to_string()));
            false
        } else {
            true
        };

        let explicit_sequence = match blank_to_none(self.sequence.as_deref()) {
            Some(seq) => match parse_sequence(seq) {
                Some(n) => Some(Some(n)),
                None => {
                    errors.push(DraftError::InvalidSequence(seq.to_string()));
                    None
                }
            },
            None => Some(None),
        };

        let case_number = match (year, code_ok, explicit_sequence) {
            (Some(year), true, Some(Some(n))) => Some(CaseNumber::new(year, code, n).to_string()),
            (Some(year), true, Some(None)) => Some(next_case_number_in(
                year,
                code,
                existing.iter().map(|c| c.case_number.as_str()),
            )),
            _ => None,
        };
        if let Some(number) = &case_number
            && is_duplicate(number, existing)
        {
            errors.push(DraftError::DuplicateCaseNumber(number.clone()));
        }

        let court_of_appeal = self.court_of_appeal.trim();
        if court_of_appeal.is_empty() {
            errors.push(DraftError::Missing {
                field: DraftField::CourtOfAppeal,
            });
        } else {
            check_court_of_appeal(court_of_appeal, &mut errors);
        }
        let tribunal = blank_to_none(self.first_instance_tribunal.as_deref());
        if let Some(tribunal) = tribunal {
            check_tribunal(tribunal, court_of_appeal, &mut errors);
        }

        let next_hearing = blank_to_none(self.next_hearing.as_deref())
            .and_then(|raw| convert_hearing(raw, now, &mut errors));

        if !errors.is_empty() {
            return Err(ValidationErrors(errors));
        }
        let Some(case_number) = case_number else {
            // Every path that leaves the number unset has already pushed an error.
            return Err(ValidationErrors(vec![DraftError::Missing {
                field: DraftField::Sequence,
            }]));
        };

        let stamp = now.to_rfc3339_opts(SecondsFormat::Millis, true);
        Ok(CaseRecord {
            id: uuid::Uuid::new_v4().to_string(),
            title: self.title.trim().to_string(),
            client: self.client.trim().to_string(),
            case_number,
            status: self.status,
            priority: self.priority,
            description: self.description.trim().to_string(),
            lawyer: self.lawyer.trim().to_string(),
            court: blank_to_none(self.court.as_deref()).map(str::to_string),
            court_of_appeal: Some(court_of_appeal.to_string()),
            first_instance_tribunal: tribunal.map(str::to_string),
            next_hearing,
            last_decision: None,
            created_date: stamp.clone(),
            last_update: stamp,
        })
    }
}

/// Changes to an existing case. `None` leaves a field untouched; an empty
/// string clears an optional field. The case number cannot be patched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CasePatch {
    pub title: Option<String>,
    pub client: Option<String>,
    pub status: Option<CaseStatus>,
    pub priority: Option<Priority>,
    pub description: Option<String>,
    pub lawyer: Option<String>,
    pub court: Option<String>,
    pub court_of_appeal: Option<String>,
    pub first_instance_tribunal: Option<String>,
    pub next_hearing: Option<String>,
}

impl CasePatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Validate and apply to `record`, refreshing its `lastUpdate`.
    /// On error `record` is left unchanged.
    pub fn apply(&self, record: &mut CaseRecord, now: DateTime<Utc>) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();

        for (value, field) in [
            (&self.title, DraftField::Title),
            (&self.client, DraftField::Client),
            (&self.lawyer, DraftField::Lawyer),
        ] {
            if let Some(v) = value {
                require(v, field, &mut errors);
            }
        }

        let court_of_appeal = match self.court_of_appeal.as_deref() {
            Some(v) => blank_to_none(Some(v)).map(str::to_string),
            None => record.court_of_appeal.clone(),
        };
        if let Some(coa) = blank_to_none(self.court_of_appeal.as_deref()) {
            check_court_of_appeal(coa, &mut errors);
        }
        let tribunal = match self.first_instance_tribunal.as_deref() {
            Some(v) => blank_to_none(Some(v)).map(str::to_string),
            None => record.first_instance_tribunal.clone(),
        };
        if (self.first_instance_tribunal.is_some() || self.court_of_appeal.is_some())
            && let Some(t) = tribunal.as_deref()
        {
            check_tribunal(t, court_of_appeal.as_deref().unwrap_or(""), &mut errors);
        }

        let next_hearing = match self.next_hearing.as_deref() {
            Some(raw) => match blank_to_none(Some(raw)) {
                Some(raw) => convert_hearing(raw, now, &mut errors).map(Some),
                None => Some(None),
            },
            None => Some(record.next_hearing.clone()),
        };

        if !errors.is_empty() {
            return Err(ValidationErrors(errors));
        }

        if let Some(v) = &self.title {
            record.title = v.trim().to_string();
        }
        if let Some(v) = &self.client {
            record.client = v.trim().to_string();
        }
        if let Some(v) = self.status {
            record.status = v;
        }
        if let Some(v) = self.priority {
            record.priority = v;
        }
        if let Some(v) = &self.description {
            record.description = v.trim().to_string();
        }
        if let Some(v) = &self.lawyer {
            record.lawyer = v.trim().to_string();
        }
        if let Some(v) = self.court.as_deref() {
            record.court = blank_to_none(Some(v)).map(str::to_string);
        }
        record.court_of_appeal = court_of_appeal;
        record.first_instance_tribunal = tribunal;
        if let Some(hearing) = next_hearing {
            record.next_hearing = hearing;
        }
        record.last_update = now.to_rfc3339_opts(SecondsFormat::Millis, true);
        Ok(())
    }

    /// The fields this patch sets, read back from `record` after
    /// [`apply`](Self::apply), plus `lastUpdate`. Cleared optional fields
    /// are `null`. Fields the patch leaves alone are absent, so values that
    /// were only filled in for display are never written back.
    pub fn changes(&self, record: &CaseRecord) -> Map<String, Value> {
        let mut out = Map::new();
        let text = |v: &str| Value::String(v.to_string());
        let optional = |v: &Option<String>| v.as_deref().map_or(Value::Null, text);

        if self.title.is_some() {
            out.insert("title".into(), text(&record.title));
        }
        if self.client.is_some() {
            out.insert("client".into(), text(&record.client));
        }
        if self.status.is_some() {
            out.insert("status".into(), text(record.status.as_str()));
        }
        if self.priority.is_some() {
            out.insert("priority".into(), text(record.priority.as_str()));
        }
        if self.description.is_some() {
            out.insert("description".into(), text(&record.description));
        }
        if self.lawyer.is_some() {
            out.insert("lawyer".into(), text(&record.lawyer));
        }
        if self.court.is_some() {
            out.insert("court".into(), optional(&record.court));
        }
        if self.court_of_appeal.is_some() {
            out.insert("courtOfAppeal".into(), optional(&record.court_of_appeal));
        }
        if self.first_instance_tribunal.is_some() {
            out.insert(
                "firstInstanceTribunal".into(),
                optional(&record.first_instance_tribunal),
            );
        }
        if self.next_hearing.is_some() {
            out.insert("nextHearing".into(), optional(&record.next_hearing));
        }
        out.insert("lastUpdate".into(), text(&record.last_update));
        out
    }
}

// ── Helpers ──

fn require(value: &str, field: DraftField, errors: &mut Vec<DraftError>) {
    if value.trim().is_empty() {
        errors.push(DraftError::Missing { field });
    }
}

fn blank_to_none(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_year(raw: &str) -> Option<i32> {
    let raw = raw.trim();
    if raw.len() != 4 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

fn parse_sequence(raw: &str) -> Option<u64> {
    raw.trim().parse().ok().filter(|n| *n > 0)
}

fn is_duplicate(number: &str, existing: &[CaseRecord]) -> bool {
    case_number_taken(number, existing.iter().map(|c| c.case_number.as_str()))
}

fn check_court_of_appeal(id: &str, errors: &mut Vec<DraftError>) {
    if courts::court_of_appeal(id).is_none() {
        errors.push(DraftError::UnknownCourtOfAppeal(id.to_string()));
    }
}

fn check_tribunal(tribunal: &str, court_of_appeal: &str, errors: &mut Vec<DraftError>) {
    match courts::first_instance_tribunal(tribunal) {
        None => errors.push(DraftError::UnknownTribunal(tribunal.to_string())),
        Some(t) if !court_of_appeal.is_empty() && t.court_of_appeal_id != court_of_appeal => {
            errors.push(DraftError::TribunalMismatch {
                tribunal: tribunal.to_string(),
                court_of_appeal: court_of_appeal.to_string(),
            })
        }
        Some(_) => {}
    }
}

fn convert_hearing(raw: &str, now: DateTime<Utc>, errors: &mut Vec<DraftError>) -> Option<String> {
    let converted = convert_date_at(raw, now);
    if converted.fallback {
        errors.push(DraftError::InvalidHearing(raw.to_string()));
        None
    } else {
        Some(converted.value)
    }
}
