//! Domain types and models

pub mod expansion;
pub mod query;
pub mod records;
pub mod token;

use serde::{Deserialize, Serialize};

// Re-export for convenience
pub use expansion::{ExpansionReport, ExpansionStep, ParamFamily};
pub use query::{CompanyQuery, ContactQuery, EnrichQuery, IntentQuery};
pub use records::{CompanyRecord, ContactRecord, FieldDescriptor, RecordId, UsageReport};
pub use token::ApiToken;

use crate::constants::{SIGNAL_HIGH_THRESHOLD, SIGNAL_MEDIUM_THRESHOLD};

/// Categorical confidence of an intent signal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SignalStrength {
    High,
    Medium,
    Low,
}

impl SignalStrength {
    /// Bucket a numeric signal score into a categorical strength
    #[must_use]
    pub fn from_score(score: u32) -> Self {
        if score >= SIGNAL_HIGH_THRESHOLD {
            Self::High
        } else if score >= SIGNAL_MEDIUM_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Minimum numeric score floor implied by this strength when the caller
    /// gave no explicit floor. `Low` implies no floor at all.
    #[must_use]
    pub fn min_score_floor(&self) -> Option<u32> {
        match self {
            Self::High => Some(SIGNAL_HIGH_THRESHOLD),
            Self::Medium => Some(SIGNAL_MEDIUM_THRESHOLD),
            Self::Low => None,
        }
    }

    /// Parse a provider-reported strength label
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Self::High),
            "medium" | "med" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

/// Seniority tier filter on contacts
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ManagementLevel {
    Manager,
    Director,
    VpAndCLevel,
}

impl ManagementLevel {
    /// Wire value expected by the provider (must not contain commas;
    /// list filters are comma-joined)
    pub fn wire_value(&self) -> &'static str {
        match self {
            Self::Manager => "Manager",
            Self::Director => "Director",
            Self::VpAndCLevel => "VP & C-Level",
        }
    }

    /// Parse an externally configured vocabulary label
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "manager" => Some(Self::Manager),
            "director" => Some(Self::Director),
            "vp" | "c-level" | "vp & c-level" | "vp and c-level" | "vp/c-level" => {
                Some(Self::VpAndCLevel)
            }
            _ => None,
        }
    }
}

/// Location-matching mode for contact searches
///
/// `PersonAndHq` matches either the person's own location or their company
/// headquarters; `PersonOnly` matches only the person's own location.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LocationMode {
    PersonAndHq,
    PersonOnly,
}

impl LocationMode {
    pub fn wire_value(&self) -> &'static str {
        match self {
            Self::PersonAndHq => "PersonAndHQ",
            Self::PersonOnly => "PersonOnly",
        }
    }

    /// Tag priority when a contact is discovered by both passes:
    /// person-and-headquarters always wins over person-only.
    #[must_use]
    pub fn outranks(&self, other: LocationMode) -> bool {
        matches!((self, other), (Self::PersonAndHq, Self::PersonOnly))
    }
}
