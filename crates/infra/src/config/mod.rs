//! Configuration loader
//!
//! Loads provider and ICP configuration from environment variables or
//! files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables (after `.env`)
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports TOML and JSON formats (detected by extension)
//!
//! ## Environment Variables
//! - `PROSPECTARC_BASE_URL`: provider API base URL (required)
//! - `PROSPECTARC_CLIENT_ID` / `PROSPECTARC_CLIENT_SECRET`: credentials (required)
//! - `PROSPECTARC_PACING_INTERVAL_MS`, `PROSPECTARC_RETRY_BUDGET`,
//!   `PROSPECTARC_RATE_LIMIT_MAX_WAIT_SECS`, `PROSPECTARC_PAGE_SIZE`,
//!   `PROSPECTARC_MAX_PAGES`: request tunables (optional)
//! - `PROSPECTARC_ZIP_BATCH`, `PROSPECTARC_COMPANY_ID_BATCH`,
//!   `PROSPECTARC_ENRICH_BATCH`: batch caps (optional)
//! - `PROSPECTARC_ICP_EMPLOYEE_MIN`, `PROSPECTARC_ICP_EMPLOYEE_MAX`,
//!   `PROSPECTARC_ICP_SIC_CODES`, `PROSPECTARC_ICP_MANAGEMENT_LEVELS`:
//!   ICP defaults (optional; lists are comma-separated)

use std::path::{Path, PathBuf};
use std::str::FromStr;

use prospectarc_core::ports::IcpDefaults;
use prospectarc_domain::{IcpConfig, ProspectError, ProviderConfig, Result};
use serde::Deserialize;

/// Everything the engine needs to talk to the provider
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub provider: ProviderConfig,
    #[serde(default)]
    pub icp: IcpConfig,
}

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `ProspectError::Config` if neither source yields a complete
/// configuration.
pub fn load() -> Result<AppConfig> {
    dotenvy::dotenv().ok();

    match load_from_env() {
        Ok(config) => {
            tracing::info!("configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "environment incomplete, trying config file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `ProspectError::Config` if required variables are missing or
/// have invalid values.
pub fn load_from_env() -> Result<AppConfig> {
    let base_url = env_var("PROSPECTARC_BASE_URL")?;
    let client_id = env_var("PROSPECTARC_CLIENT_ID")?;
    let client_secret = env_var("PROSPECTARC_CLIENT_SECRET")?;

    let mut provider = ProviderConfig::new(base_url, client_id, client_secret);
    if let Some(v) = env_parse("PROSPECTARC_PACING_INTERVAL_MS")? {
        provider.pacing_interval_ms = v;
    }
    if let Some(v) = env_parse("PROSPECTARC_RETRY_BUDGET")? {
        provider.retry_budget = v;
    }
    if let Some(v) = env_parse("PROSPECTARC_RATE_LIMIT_MAX_WAIT_SECS")? {
        provider.rate_limit_max_wait_secs = v;
    }
    if let Some(v) = env_parse("PROSPECTARC_PAGE_SIZE")? {
        provider.page_size = v;
    }
    if let Some(v) = env_parse("PROSPECTARC_MAX_PAGES")? {
        provider.max_pages = v;
    }
    if let Some(v) = env_parse("PROSPECTARC_ZIP_BATCH")? {
        provider.batch.zip_codes = v;
    }
    if let Some(v) = env_parse("PROSPECTARC_COMPANY_ID_BATCH")? {
        provider.batch.company_ids = v;
    }
    if let Some(v) = env_parse("PROSPECTARC_ENRICH_BATCH")? {
        provider.batch.enrich_ids = v;
    }

    let icp = IcpConfig {
        employee_min: env_parse("PROSPECTARC_ICP_EMPLOYEE_MIN")?.unwrap_or(0),
        employee_max: env_parse("PROSPECTARC_ICP_EMPLOYEE_MAX")?,
        sic_codes: env_list("PROSPECTARC_ICP_SIC_CODES"),
        management_levels: env_list("PROSPECTARC_ICP_MANAGEMENT_LEVELS"),
    };

    Ok(AppConfig { provider, icp })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
///
/// # Errors
/// Returns `ProspectError::Config` if the file is missing, unparseable, or
/// incomplete.
pub fn load_from_file(path: Option<PathBuf>) -> Result<AppConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ProspectError::Config(format!(
                    "config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ProspectError::Config("no config file found in any standard location".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ProspectError::Config(format!("failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

fn parse_config(contents: &str, path: &Path) -> Result<AppConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ProspectError::Config(format!("invalid TOML config: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ProspectError::Config(format!("invalid JSON config: {e}"))),
        other => Err(ProspectError::Config(format!("unsupported config format: .{other}"))),
    }
}

fn probe_config_paths() -> Option<PathBuf> {
    let names = ["config.toml", "prospectarc.toml", "config.json", "prospectarc.json"];
    let roots = [".", "..", "../.."];

    for root in roots {
        for name in names {
            let candidate = Path::new(root).join(name);
            if candidate.exists() {
                return Some(candidate);
            }
        }
    }
    None
}

fn env_var(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| ProspectError::Config(format!("missing environment variable {name}")))
}

fn env_parse<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| ProspectError::Config(format!("invalid {name}: {e}"))),
        Err(_) => Ok(None),
    }
}

fn env_list(name: &str) -> Vec<String> {
    std::env::var(name)
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(ToString::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// ICP defaults backed by static configuration
pub struct StaticIcpDefaults {
    icp: IcpConfig,
}

impl StaticIcpDefaults {
    #[must_use]
    pub fn new(icp: IcpConfig) -> Self {
        Self { icp }
    }
}

impl IcpDefaults for StaticIcpDefaults {
    fn employee_bounds(&self) -> (u32, Option<u32>) {
        (self.icp.employee_min, self.icp.employee_max)
    }

    fn industry_codes(&self) -> Vec<String> {
        self.icp.sic_codes.clone()
    }

    fn management_vocabulary(&self) -> Vec<String> {
        if self.icp.management_levels.is_empty() {
            vec!["Manager".into(), "Director".into(), "VP & C-Level".into()]
        } else {
            self.icp.management_levels.clone()
        }
    }
}
