//! Provider and ICP configuration structures
//!
//! Deserialized from environment variables or a config file by the infra
//! loader. Durations are stored as plain integer fields so both sources
//! parse uniformly; accessor methods convert to `std::time::Duration`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::*;

/// Connection and behavior configuration for the search provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL for the provider API (e.g., "https://api.provider.com/v2")
    pub base_url: String,
    /// Client id used by `POST /authenticate`
    pub client_id: String,
    /// Client secret used by `POST /authenticate`
    pub client_secret: String,

    /// Per-request HTTP timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Minimum interval between outbound requests in milliseconds
    #[serde(default = "default_pacing_ms")]
    pub pacing_interval_ms: u64,
    /// Retry budget for server/network errors (attempts after the first)
    #[serde(default = "default_retry_budget")]
    pub retry_budget: u32,
    /// Ceiling on honoring `Retry-After`; longer waits fail immediately
    #[serde(default = "default_rate_limit_max_wait")]
    pub rate_limit_max_wait_secs: u64,
    /// Refresh tokens this many seconds before expiry
    #[serde(default = "default_refresh_margin")]
    pub token_refresh_margin_secs: i64,

    /// Records requested per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Safety cap on pages walked per batch
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    #[serde(default)]
    pub batch: BatchCaps,
    #[serde(default)]
    pub expansion: ExpansionTuning,
}

/// Provider-legal sub-batch sizes for oversized filter lists
///
/// Inferred conservatively from the provider's request string-length limit;
/// treat as tunable, not as exact provider limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchCaps {
    #[serde(default = "default_zip_batch")]
    pub zip_codes: usize,
    #[serde(default = "default_company_id_batch")]
    pub company_ids: usize,
    #[serde(default = "default_enrich_batch")]
    pub enrich_ids: usize,
}

/// Tunables for the expansion ladder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpansionTuning {
    /// Fixed increasing radius sequence applied by the last four steps
    #[serde(default = "default_radius_ladder")]
    pub radius_ladder_miles: Vec<u32>,
    /// Relaxed accuracy-score floors, applied in order
    #[serde(default = "default_accuracy_tiers")]
    pub accuracy_tiers: Vec<u32>,
}

impl ProviderConfig {
    /// Construct a config with default tunables for the given connection
    #[must_use]
    pub fn new(base_url: String, client_id: String, client_secret: String) -> Self {
        Self {
            base_url,
            client_id,
            client_secret,
            request_timeout_secs: default_timeout_secs(),
            pacing_interval_ms: default_pacing_ms(),
            retry_budget: default_retry_budget(),
            rate_limit_max_wait_secs: default_rate_limit_max_wait(),
            token_refresh_margin_secs: default_refresh_margin(),
            page_size: default_page_size(),
            max_pages: default_max_pages(),
            batch: BatchCaps::default(),
            expansion: ExpansionTuning::default(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn pacing_interval(&self) -> Duration {
        Duration::from_millis(self.pacing_interval_ms)
    }

    pub fn rate_limit_max_wait(&self) -> Duration {
        Duration::from_secs(self.rate_limit_max_wait_secs)
    }
}

impl Default for BatchCaps {
    fn default() -> Self {
        Self {
            zip_codes: default_zip_batch(),
            company_ids: default_company_id_batch(),
            enrich_ids: default_enrich_batch(),
        }
    }
}

impl Default for ExpansionTuning {
    fn default() -> Self {
        Self {
            radius_ladder_miles: default_radius_ladder(),
            accuracy_tiers: default_accuracy_tiers(),
        }
    }
}

/// Static ICP (Ideal Customer Profile) filter defaults
///
/// Supplied externally; substituted by the query builder when the caller
/// omits employee bounds or an industry-code whitelist.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IcpConfig {
    #[serde(default)]
    pub employee_min: u32,
    /// `None` means the ICP imposes no ceiling
    #[serde(default)]
    pub employee_max: Option<u32>,
    #[serde(default)]
    pub sic_codes: Vec<String>,
    /// Management-level vocabulary accepted by the provider
    #[serde(default)]
    pub management_levels: Vec<String>,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}
fn default_pacing_ms() -> u64 {
    DEFAULT_PACING_INTERVAL_MS
}
fn default_retry_budget() -> u32 {
    DEFAULT_RETRY_BUDGET
}
fn default_rate_limit_max_wait() -> u64 {
    DEFAULT_RATE_LIMIT_MAX_WAIT_SECS
}
fn default_refresh_margin() -> i64 {
    TOKEN_REFRESH_MARGIN_SECS
}
fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}
fn default_max_pages() -> u32 {
    DEFAULT_MAX_PAGES
}
fn default_zip_batch() -> usize {
    DEFAULT_ZIP_BATCH_SIZE
}
fn default_company_id_batch() -> usize {
    DEFAULT_COMPANY_ID_BATCH_SIZE
}
fn default_enrich_batch() -> usize {
    DEFAULT_ENRICH_BATCH_SIZE
}
fn default_radius_ladder() -> Vec<u32> {
    DEFAULT_RADIUS_LADDER_MILES.to_vec()
}
fn default_accuracy_tiers() -> Vec<u32> {
    DEFAULT_ACCURACY_TIERS.to_vec()
}
