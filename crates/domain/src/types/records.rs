//! Canonical flattened record types
//!
//! The normalizer reduces every provider response shape to these records.
//! The stable id (`person_id` / `company_id`) is the deduplication key used
//! by pagination, batch merging, and the expansion engine.

use serde::{Deserialize, Serialize};

use super::{LocationMode, SignalStrength};

/// Anything carrying a stable provider id usable as a dedupe key
pub trait RecordId {
    fn record_id(&self) -> &str;
}

/// Flattened contact representation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactRecord {
    /// Stable provider person id
    pub person_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub management_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    /// Provider-reported confidence in the record's correctness
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy_score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal_score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal_strength: Option<SignalStrength>,
    /// Which location-matching pass first discovered this contact
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discovered_by: Option<LocationMode>,
}

impl RecordId for ContactRecord {
    fn record_id(&self) -> &str {
        &self.person_id
    }
}

/// Flattened company representation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyRecord {
    /// Stable provider company id
    pub company_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub sic_codes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal_topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal_score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal_strength: Option<SignalStrength>,
}

impl RecordId for CompanyRecord {
    fn record_id(&self) -> &str {
        &self.company_id
    }
}

/// Account usage snapshot from `GET /lookup/usage`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requests_used: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requests_limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrich_credits_used: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrich_credits_remaining: Option<u64>,
}

/// One entry of the provider's field catalog metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
}
