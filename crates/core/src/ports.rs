//! Port interfaces for external collaborators
//!
//! The core never talks to HTTP or storage directly; adapters in the infra
//! crate (or test doubles) implement these traits.

use std::collections::HashMap;

use async_trait::async_trait;
use prospectarc_domain::{
    CompanyQuery, CompanyRecord, ContactQuery, EnrichQuery, IntentQuery, Result,
};
use serde_json::Value;

/// Opaque key-value persistence used only for the token cache
///
/// Failures are best-effort territory: callers swallow read/write errors
/// because authentication remains the source of truth.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Static ICP configuration supplied externally
///
/// Substituted by the query builder when a caller omits employee bounds or
/// an industry-code whitelist.
pub trait IcpDefaults: Send + Sync {
    /// Default employee-count bounds; `None` ceiling means unbounded
    fn employee_bounds(&self) -> (u32, Option<u32>);
    /// Whitelisted SIC/industry codes
    fn industry_codes(&self) -> Vec<String>;
    /// Management-level vocabulary accepted by the provider
    fn management_vocabulary(&self) -> Vec<String>;
}

/// Hashed-id to numeric-id memo for companies
#[async_trait]
pub trait CompanyIdCache: Send + Sync {
    /// Resolve any cached numeric ids for the given hashed ids
    async fn get_bulk(&self, ids: &[String]) -> Result<HashMap<String, i64>>;
    /// Record one hashed-id to numeric-id mapping (idempotent upsert)
    async fn set(&self, id: &str, numeric_id: i64) -> Result<()>;
}

/// Black-box fuzzy company-name deduplication collaborator
pub trait CompanyDeduper: Send + Sync {
    fn dedupe(&self, companies: Vec<CompanyRecord>) -> Vec<CompanyRecord>;
}

/// One raw provider call per search kind
///
/// Implementations return the parsed JSON body untouched; the core's
/// normalizer is responsible for making sense of its shape.
#[async_trait]
pub trait SearchTransport: Send + Sync {
    async fn search_intent(&self, query: &IntentQuery, page: u32) -> Result<Value>;
    async fn search_companies(&self, query: &CompanyQuery, page: u32) -> Result<Value>;
    async fn search_contacts(&self, query: &ContactQuery, page: u32) -> Result<Value>;
    async fn enrich_contacts(&self, query: &EnrichQuery) -> Result<Value>;
}
