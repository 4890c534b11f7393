//! Record normaliser: raw object-store records → [`CaseRecord`].
//!
//! Raw records are untyped JSON objects whose field names depend on the
//! deployment (English names, French registry names, flattened or relational
//! decision data). Each canonical field is read from an ordered list of
//! aliases; the first non-empty value wins.
//!
//! Nothing here fails. Missing text becomes [`NOT_AVAILABLE`], unreadable
//! dates fall back to "now" (see [`crate::dates`]), unknown enum values fall
//! back to their defaults, and each degradation is logged.
//!
//! Normalising the JSON form of an already-normalised record returns the
//! same record.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, warn};

use crate::case::{CaseRecord, CaseStatus, DecisionSummary, NOT_AVAILABLE, Priority};
use crate::dates::{convert_date_at, parse_instant};

/// An untyped record as returned by the object store.
pub type RawRecord = serde_json::Map<String, Value>;

// ── Field aliases ──

const ID: &[&str] = &["id", "externalReferenceCode"];
const TITLE: &[&str] = &["title", "titre", "intitule", "typeRequete"];
const CLIENT: &[&str] = &["client", "nomClient"];
const CASE_NUMBER: &[&str] = &[
    "caseNumber",
    "numeroDossier",
    "numeroCompletDossier2Instance",
    "numeroCompletDossier1Instance",
];
const STATUS: &[&str] = &["status", "statut", "etat"];
const PRIORITY: &[&str] = &["priority", "priorite"];
const DESCRIPTION: &[&str] = &["description"];
const LAWYER: &[&str] = &["lawyer", "assignedAttorney", "avocat"];
const COURT: &[&str] = &["court", "tribunal"];
const COURT_OF_APPEAL: &[&str] = &["courtOfAppeal", "juridiction2Instance"];
const FIRST_INSTANCE: &[&str] = &["firstInstanceTribunal", "juridiction1Instance"];
const NEXT_HEARING: &[&str] = &["nextHearing", "nextHearingDate", "dateProchaineAudience"];
const CREATED: &[&str] = &[
    "createdDate",
    "dateCreated",
    "dateOpened",
    "dateEnregistrementDossierDansRegistre",
];
const UPDATED: &[&str] = &["lastUpdate", "dateModified", "lastActivity", "dateDernierJugement"];
const LAST_DECISION: &str = "lastDecision";
const FLAT_DECISION_LABEL: &[&str] = &["libelleDernierJugement", "libelleDernierJugemen"];
const FLAT_DECISION_TYPE: &[&str] = &["typeDernierJugement"];
const FLAT_DECISION_DATE: &[&str] = &["dateDernierJugement"];

const PARTY_NAME: &[&str] = &["name", "nom", "partyName"];
const PARTY_ROLE: &[&str] = &["role", "qualite", "partyRole"];
const DECISION_TYPE: &[&str] = &["decisionType", "type", "typeDecision"];
const DECISION_CONTENT: &[&str] = &["content", "contenu", "libelle"];
const DECISION_DATE: &[&str] = &["decisionDate", "dateDecision"];
const DECISION_NEXT_HEARING: &[&str] = &["nextHearingDate", "dateProchaineAudience"];

// ── Relational sub-collections ──

/// A party attached to a case through the `relatedParties` relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedParty {
    pub name: String,
    pub role: String,
}

impl RelatedParty {
    /// Parse a raw party; parties without a name are dropped.
    pub fn from_raw(raw: &RawRecord) -> Option<Self> {
        let name = text(raw, PARTY_NAME)?;
        Some(Self {
            name,
            role: text(raw, PARTY_ROLE).unwrap_or_default(),
        })
    }

    /// `"<name> (<role>)"`, or the bare name when no role is recorded.
    pub fn display(&self) -> String {
        if self.role.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.role)
        }
    }
}

/// A decision attached to a case through the `relatedDecisions` relation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelatedDecision {
    pub decision_type: String,
    pub content: String,
    pub decision_date: Option<String>,
    pub next_hearing_date: Option<String>,
}

impl RelatedDecision {
    pub fn from_raw(raw: &RawRecord) -> Self {
        Self {
            decision_type: text(raw, DECISION_TYPE).unwrap_or_default(),
            content: text(raw, DECISION_CONTENT).unwrap_or_default(),
            decision_date: text(raw, DECISION_DATE),
            next_hearing_date: text(raw, DECISION_NEXT_HEARING),
        }
    }
}

/// Related data fetched alongside a record. Empty when the deployment has
/// no relations or the sub-fetches failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relations {
    pub parties: Vec<RelatedParty>,
    pub decisions: Vec<RelatedDecision>,
}

impl Relations {
    pub fn from_raw(parties: &[RawRecord], decisions: &[RawRecord]) -> Self {
        Self {
            parties: parties.iter().filter_map(RelatedParty::from_raw).collect(),
            decisions: decisions.iter().map(RelatedDecision::from_raw).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.parties.is_empty() && self.decisions.is_empty()
    }

    /// Party names joined as `"A (role) vs B (role)"`.
    pub fn client_display(&self) -> Option<String> {
        if self.parties.is_empty() {
            return None;
        }
        let joined: Vec<String> = self.parties.iter().map(RelatedParty::display).collect();
        Some(joined.join(" vs "))
    }

    /// Earliest hearing date at or after `now` across all decisions.
    pub fn next_hearing(&self, now: DateTime<Utc>) -> Option<String> {
        self.decisions
            .iter()
            .filter_map(|d| d.next_hearing_date.as_deref())
            .filter_map(|raw| parse_instant(raw).map(|at| (at, raw)))
            .filter(|(at, _)| *at >= now)
            .min_by_key(|(at, _)| *at)
            .map(|(_, raw)| convert_date_at(raw, now).value)
    }

    /// The decision with the most recent decision date. Decisions without a
    /// readable date are never chosen.
    pub fn last_decision(&self, now: DateTime<Utc>) -> Option<DecisionSummary> {
        let mut best: Option<(DateTime<Utc>, &RelatedDecision, &str)> = None;
        for decision in &self.decisions {
            let Some(raw) = decision.decision_date.as_deref() else {
                continue;
            };
            let Some(at) = parse_instant(raw) else {
                warn!(date = %raw, "decision date unreadable, skipping");
                continue;
            };
            if best.is_none_or(|(current, _, _)| at > current) {
                best = Some((at, decision, raw));
            }
        }
        best.map(|(_, decision, raw)| DecisionSummary {
            decision_type: or_placeholder(decision.decision_type.clone()),
            content: or_placeholder(decision.content.clone()),
            date: convert_date_at(raw, now).value,
        })
    }
}

// ── Entry points ──

/// Normalise a record with no related data, using the current time.
pub fn normalize(raw: &RawRecord) -> CaseRecord {
    normalize_at(raw, Utc::now())
}

/// Normalise a record with no related data.
pub fn normalize_at(raw: &RawRecord, now: DateTime<Utc>) -> CaseRecord {
    normalize_with_relations(raw, &Relations::default(), now)
}

/// Normalise a record, preferring relational data over flattened fields.
pub fn normalize_with_relations(
    raw: &RawRecord,
    relations: &Relations,
    now: DateTime<Utc>,
) -> CaseRecord {
    let id = text(raw, ID).unwrap_or_else(|| {
        let generated = uuid::Uuid::new_v4().to_string();
        warn!(id = %generated, "record has no identifier, generated one");
        generated
    });

    let client = relations
        .client_display()
        .or_else(|| text(raw, CLIENT))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let created_date = match text(raw, CREATED) {
        Some(s) => convert_date_at(&s, now).value,
        None => {
            warn!(id = %id, "record has no creation date, using current time");
            convert_date_at("", now).value
        }
    };
    let last_update = text(raw, UPDATED)
        .map(|s| convert_date_at(&s, now).value)
        .unwrap_or_else(|| created_date.clone());

    let next_hearing = relations.next_hearing(now).or_else(|| {
        text(raw, NEXT_HEARING).and_then(|s| {
            let converted = convert_date_at(&s, now);
            (!converted.fallback).then_some(converted.value)
        })
    });

    let last_decision = relations
        .last_decision(now)
        .or_else(|| embedded_decision(raw))
        .or_else(|| flat_decision(raw, now));

    let record = CaseRecord {
        title: text(raw, TITLE).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        client,
        case_number: case_number(raw).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        status: parse_or_default(raw, STATUS, &id),
        priority: parse_or_default(raw, PRIORITY, &id),
        description: text(raw, DESCRIPTION).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        lawyer: text(raw, LAWYER).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        court: text(raw, COURT),
        court_of_appeal: text(raw, COURT_OF_APPEAL),
        first_instance_tribunal: text(raw, FIRST_INSTANCE),
        next_hearing,
        last_decision,
        created_date,
        last_update,
        id,
    };
    debug!(id = %record.id, case_number = %record.case_number, "normalised record");
    record
}

// ── Helpers ──

/// First alias holding a usable scalar. Strings are trimmed, numbers and
/// booleans stringified, picklist objects read through `name` then `key`.
fn text(raw: &RawRecord, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| raw.get(*key).and_then(scalar))
}

fn scalar(value: &Value) -> Option<String> {
    let s = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Object(map) => return map.get("name").or_else(|| map.get("key")).and_then(scalar),
        Value::Null | Value::Array(_) => return None,
    };
    (!s.is_empty()).then_some(s)
}

/// Registry numbers in some deployments are internal GUIDs, which are
/// meaningless to users and skipped.
fn case_number(raw: &RawRecord) -> Option<String> {
    CASE_NUMBER
        .iter()
        .filter_map(|key| raw.get(*key).and_then(scalar))
        .find(|s| !is_guid(s))
}

fn is_guid(s: &str) -> bool {
    s.len() == 36 && uuid::Uuid::try_parse(s).is_ok()
}

fn parse_or_default<T>(raw: &RawRecord, keys: &[&str], id: &str) -> T
where
    T: std::str::FromStr + Default,
    T::Err: std::fmt::Display,
{
    match text(raw, keys) {
        Some(s) => s.parse().unwrap_or_else(|e| {
            warn!(id = %id, error = %e, "unrecognised value, using default");
            T::default()
        }),
        None => T::default(),
    }
}

fn embedded_decision(raw: &RawRecord) -> Option<DecisionSummary> {
    let value = raw.get(LAST_DECISION)?;
    if value.is_null() {
        return None;
    }
    match serde_json::from_value(value.clone()) {
        Ok(summary) => Some(summary),
        Err(e) => {
            warn!(error = %e, "malformed lastDecision object, ignoring");
            None
        }
    }
}

fn flat_decision(raw: &RawRecord, now: DateTime<Utc>) -> Option<DecisionSummary> {
    let content = text(raw, FLAT_DECISION_LABEL)?;
    let date = text(raw, FLAT_DECISION_DATE).unwrap_or_default();
    Some(DecisionSummary {
        decision_type: text(raw, FLAT_DECISION_TYPE).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        content,
        date: convert_date_at(&date, now).value,
    })
}

fn or_placeholder(s: String) -> String {
    if s.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        s
    }
}
