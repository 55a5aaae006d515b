//! Application constants
//!
//! Centralized location for all domain-level defaults used throughout the
//! engine. Provider-imposed limits (batch caps, page size) were inferred
//! conservatively from request-size limits and are surfaced as tunable
//! configuration in [`crate::config::ProviderConfig`], not consumed directly
//! by call sites.

// Token lifecycle
pub const TOKEN_REFRESH_MARGIN_SECS: i64 = 300; // refresh 5 minutes before expiry
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;
pub const TOKEN_STORE_KEY: &str = "provider.token";

// Request pacing and retries
pub const DEFAULT_PACING_INTERVAL_MS: u64 = 1500;
pub const DEFAULT_RETRY_BUDGET: u32 = 3;
pub const DEFAULT_RATE_LIMIT_MAX_WAIT_SECS: u64 = 120;
pub const DEFAULT_RATE_LIMIT_FALLBACK_SECS: u64 = 60; // 429 with no Retry-After header
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// Pagination
pub const DEFAULT_PAGE_SIZE: u32 = 25;
pub const DEFAULT_MAX_PAGES: u32 = 20;

// Batch splitting caps (conservative, tuned to the provider's string-length limit)
pub const DEFAULT_ZIP_BATCH_SIZE: usize = 75;
pub const DEFAULT_COMPANY_ID_BATCH_SIZE: usize = 40;
pub const DEFAULT_ENRICH_BATCH_SIZE: usize = 25;

// Signal score bucketing thresholds
pub const SIGNAL_HIGH_THRESHOLD: u32 = 90;
pub const SIGNAL_MEDIUM_THRESHOLD: u32 = 75;

// Expansion ladder defaults
pub const DEFAULT_RADIUS_LADDER_MILES: [u32; 4] = [25, 50, 100, 250];
pub const DEFAULT_ACCURACY_TIERS: [u32; 2] = [85, 70];
