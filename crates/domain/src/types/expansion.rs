//! Expansion step and report types

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::query::ContactQuery;
use super::records::ContactRecord;

/// Parameter family touched by exactly one relaxation step
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ParamFamily {
    ManagementLevels,
    EmployeeCeiling,
    AccuracyThreshold,
    Radius,
}

impl ParamFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ManagementLevels => "management_levels",
            Self::EmployeeCeiling => "employee_ceiling",
            Self::AccuracyThreshold => "accuracy_threshold",
            Self::Radius => "radius",
        }
    }
}

/// One applied relaxation: a single parameter family changed from
/// `old_value` to `new_value`, plus what the re-search newly discovered
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpansionStep {
    pub family: ParamFamily,
    pub old_value: String,
    pub new_value: String,
    pub new_contacts: usize,
    pub new_companies: usize,
}

/// Outcome of one `run_expansion` call
///
/// After the first successful search, failures degrade into `error` rather
/// than propagating, so callers can still show partial progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpansionReport {
    pub target: usize,
    pub found: usize,
    pub target_met: bool,
    pub steps_applied: Vec<ExpansionStep>,
    pub searches_performed: usize,
    /// Cumulative parameters after the last applied step
    pub final_params: ContactQuery,
    pub contacts: Vec<ContactRecord>,
    /// Contacts grouped by company id, each group sorted by accuracy
    /// descending
    pub contacts_by_company: BTreeMap<String, Vec<ContactRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExpansionReport {
    /// Empty report for a run that has not yet found anything
    #[must_use]
    pub fn new(target: usize, base_params: ContactQuery) -> Self {
        Self {
            target,
            found: 0,
            target_met: false,
            steps_applied: Vec::new(),
            searches_performed: 0,
            final_params: base_params,
            contacts: Vec::new(),
            contacts_by_company: BTreeMap::new(),
            error: None,
        }
    }
}
