//! # ProspectArc Infra
//!
//! Adapters around the pure core: provider authentication, the resilient
//! HTTP request executor, the provider client implementing the core's
//! transport port, SQLite-backed stores, and configuration loading.

pub mod api;
pub mod config;
pub mod store;

use std::sync::Arc;

use prospectarc_common::{Clock, SystemClock};
use prospectarc_core::ports::{CompanyIdCache, TokenStore};
use prospectarc_core::{BatchSplitter, ExpansionEngine, QueryBuilder};
use prospectarc_domain::Result;

pub use api::auth::{AccessTokenProvider, TokenManager};
pub use api::client::ProviderClient;
pub use api::executor::{ExchangeRecord, RequestExecutor};
pub use config::{load, AppConfig, StaticIcpDefaults};
pub use store::{MemoryTokenStore, SqliteStore};

/// Wire the full stack: token manager -> executor -> provider client ->
/// batch splitter -> expansion engine.
///
/// # Errors
/// Returns a `Config` error if the HTTP client cannot be constructed.
pub fn build_expansion_engine(
    config: AppConfig,
    token_store: Arc<dyn TokenStore>,
    id_cache: Option<Arc<dyn CompanyIdCache>>,
) -> Result<ExpansionEngine> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let auth = Arc::new(TokenManager::new(config.provider.clone(), token_store)?);
    let executor =
        RequestExecutor::new(&config.provider, auth, Arc::clone(&clock))?;

    let defaults = Arc::new(StaticIcpDefaults::new(config.icp));
    let builder = QueryBuilder::new(defaults, config.provider.page_size);

    let mut client = ProviderClient::new(executor, builder);
    if let Some(cache) = id_cache {
        client = client.with_id_cache(cache);
    }

    let splitter = BatchSplitter::new(
        Arc::new(client),
        config.provider.batch.clone(),
        config.provider.max_pages,
    );
    Ok(ExpansionEngine::new(splitter, config.provider.expansion.clone()))
}
