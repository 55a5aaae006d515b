//! Query value types for each search kind
//!
//! These are immutable value objects: every relaxation produces a *new*
//! value via a `with_*` builder, so a caller's original query is never
//! aliased or mutated by the expansion engine.

use serde::{Deserialize, Serialize};

use super::{LocationMode, ManagementLevel, SignalStrength};

/// Topic-based intent-signal search parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentQuery {
    pub topics: Vec<String>,
    /// Categorical strength filter; mapped to a numeric floor when no
    /// explicit `signal_score_min` is given
    pub signal_strength: Option<SignalStrength>,
    pub signal_score_min: Option<u32>,
    /// Industry whitelist; ICP defaults substituted when empty
    pub sic_codes: Vec<String>,
    pub employee_min: Option<u32>,
    /// `Some(0)` means "no ceiling" and is omitted from the wire body
    pub employee_max: Option<u32>,
}

/// Geography/ZIP-radius company search parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyQuery {
    pub zip_codes: Vec<String>,
    pub radius_miles: Option<u32>,
    pub sic_codes: Vec<String>,
    pub employee_min: Option<u32>,
    /// `Some(0)` means "no ceiling" and is omitted from the wire body
    pub employee_max: Option<u32>,
}

/// Location- or company-id-based contact search parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactQuery {
    pub zip_codes: Vec<String>,
    pub radius_miles: Option<u32>,
    /// Company ids (hashed or numeric); batched when over the cap
    pub company_ids: Vec<String>,
    pub management_levels: Vec<ManagementLevel>,
    pub employee_min: Option<u32>,
    /// `Some(0)` means "no ceiling" and is omitted from the wire body
    pub employee_max: Option<u32>,
    pub sic_codes: Vec<String>,
    /// Minimum contact accuracy score
    pub accuracy_min: Option<u32>,
    /// Fields a record must carry to be returned (comma-joined on the wire)
    pub required_fields: Vec<String>,
    pub location_mode: Option<LocationMode>,
    /// Run a person-and-headquarters pass plus a person-only supplement
    pub combined_location: bool,
}

impl ContactQuery {
    /// Copy with a management level appended (no-op if already present)
    #[must_use]
    pub fn with_management_level(&self, level: ManagementLevel) -> Self {
        let mut next = self.clone();
        if !next.management_levels.contains(&level) {
            next.management_levels.push(level);
        }
        next
    }

    /// Copy with the employee ceiling explicitly removed
    #[must_use]
    pub fn without_employee_ceiling(&self) -> Self {
        Self { employee_max: Some(0), ..self.clone() }
    }

    /// Copy with a lowered accuracy floor
    #[must_use]
    pub fn with_accuracy_min(&self, floor: u32) -> Self {
        Self { accuracy_min: Some(floor), ..self.clone() }
    }

    /// Copy with a different search radius
    #[must_use]
    pub fn with_radius(&self, miles: u32) -> Self {
        Self { radius_miles: Some(miles), ..self.clone() }
    }

    /// Copy restricted to one location-matching mode
    #[must_use]
    pub fn with_location_mode(&self, mode: LocationMode) -> Self {
        Self { location_mode: Some(mode), combined_location: false, ..self.clone() }
    }

    /// Copy with a different company-id list (used by batch splitting)
    #[must_use]
    pub fn with_company_ids(&self, ids: Vec<String>) -> Self {
        Self { company_ids: ids, ..self.clone() }
    }

    /// Copy with a different ZIP list (used by batch splitting)
    #[must_use]
    pub fn with_zip_codes(&self, zips: Vec<String>) -> Self {
        Self { zip_codes: zips, ..self.clone() }
    }
}

/// Credit-consuming full-record enrichment parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichQuery {
    pub person_ids: Vec<String>,
    /// Output fields to request; provider default set when empty
    pub output_fields: Vec<String>,
}

impl EnrichQuery {
    #[must_use]
    pub fn new(person_ids: Vec<String>) -> Self {
        Self { person_ids, output_fields: Vec::new() }
    }

    /// Copy with a different id list (used by enrich chunking)
    #[must_use]
    pub fn with_person_ids(&self, ids: Vec<String>) -> Self {
        Self { person_ids: ids, ..self.clone() }
    }
}
