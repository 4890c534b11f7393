//! Canonical case ("dossier") model shared by every crate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Placeholder rendered for text fields the source record did not carry.
pub const NOT_AVAILABLE: &str = "not available";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognised {kind} '{value}'")]
pub struct ParseLabelError {
    pub kind: &'static str,
    pub value: String,
}

/// Lifecycle state of a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    #[default]
    Open,
    Pending,
    Closed,
    Cancelled,
}

impl CaseStatus {
    pub const ALL: [CaseStatus; 4] = [Self::Open, Self::Pending, Self::Closed, Self::Cancelled];

    /// Stable machine name, also the serialised form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Pending => "pending",
            Self::Closed => "closed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Label shown to users of the case list.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Open => "En cours",
            Self::Pending => "En attente",
            Self::Closed => "Terminé",
            Self::Cancelled => "Annulé",
        }
    }

    /// Colour family used for badges.
    pub fn tone(&self) -> &'static str {
        match self {
            Self::Open => "blue",
            Self::Pending => "yellow",
            Self::Closed => "green",
            Self::Cancelled => "red",
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CaseStatus {
    type Err = ParseLabelError;

    /// Accepts machine names, French labels, and the object store's own
    /// `Active` / `On Hold` spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" | "en cours" | "active" | "in progress" => Ok(Self::Open),
            "pending" | "en attente" | "on hold" | "on_hold" => Ok(Self::Pending),
            "closed" | "terminé" | "termine" | "done" => Ok(Self::Closed),
            "cancelled" | "canceled" | "annulé" | "annule" => Ok(Self::Cancelled),
            _ => Err(ParseLabelError {
                kind: "status",
                value: s.to_string(),
            }),
        }
    }
}

/// Urgency of a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "Haute",
            Self::Medium => "Moyenne",
            Self::Low => "Basse",
        }
    }

    pub fn tone(&self) -> &'static str {
        match self {
            Self::High => "red",
            Self::Medium => "orange",
            Self::Low => "gray",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Priority {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" | "haute" => Ok(Self::High),
            "medium" | "moyenne" => Ok(Self::Medium),
            "low" | "basse" => Ok(Self::Low),
            _ => Err(ParseLabelError {
                kind: "priority",
                value: s.to_string(),
            }),
        }
    }
}

/// Projection of the most recent decision handed down on a case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionSummary {
    pub decision_type: String,
    pub content: String,
    /// ISO 8601 date string.
    pub date: String,
}

/// A legal case as the rest of the application sees it.
///
/// Every text field is populated (possibly with [`NOT_AVAILABLE`]) so that
/// presentation code never has to branch on absence. Only the genuinely
/// optional references are `Option`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseRecord {
    pub id: String,
    pub title: String,
    pub client: String,
    /// `<year>/<classificationCode>/<sequence>`; immutable once assigned.
    pub case_number: String,
    pub status: CaseStatus,
    pub priority: Priority,
    pub description: String,
    pub lawyer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub court: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub court_of_appeal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_instance_tribunal: Option<String>,
    /// ISO 8601 timestamp string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_hearing: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_decision: Option<DecisionSummary>,
    /// ISO 8601 timestamp string.
    pub created_date: String,
    /// ISO 8601 timestamp string.
    pub last_update: String,
}
