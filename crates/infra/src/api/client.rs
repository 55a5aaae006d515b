//! Provider client mapping the core transport port onto endpoints
//!
//! Builds wire bodies with the core query builder, executes them through
//! the resilient executor, and exposes the metadata lookups. Hashed
//! company ids with cached numeric equivalents are swapped in before a
//! contact search; cache failures are best-effort and never block a
//! search.

use std::sync::Arc;

use async_trait::async_trait;
use prospectarc_core::ports::{CompanyIdCache, SearchTransport};
use prospectarc_core::QueryBuilder;
use prospectarc_domain::{
    CompanyQuery, ContactQuery, EnrichQuery, FieldDescriptor, IntentQuery, Result, UsageReport,
};
use reqwest::Method;
use serde_json::Value;
use tracing::warn;

use super::executor::{ExchangeRecord, RequestExecutor};

/// JSON-over-HTTPS client for the search provider
pub struct ProviderClient {
    executor: RequestExecutor,
    builder: QueryBuilder,
    id_cache: Option<Arc<dyn CompanyIdCache>>,
}

impl ProviderClient {
    #[must_use]
    pub fn new(executor: RequestExecutor, builder: QueryBuilder) -> Self {
        Self { executor, builder, id_cache: None }
    }

    /// Attach the hashed-to-numeric company-id memo
    #[must_use]
    pub fn with_id_cache(mut self, cache: Arc<dyn CompanyIdCache>) -> Self {
        self.id_cache = Some(cache);
        self
    }

    /// Diagnostics for the most recent exchange
    pub fn last_exchange(&self) -> Option<ExchangeRecord> {
        self.executor.last_exchange()
    }

    /// Record a hashed-to-numeric company-id mapping for future searches
    pub async fn remember_company_id(&self, hashed: &str, numeric_id: i64) {
        if let Some(cache) = &self.id_cache {
            if let Err(err) = cache.set(hashed, numeric_id).await {
                warn!(error = %err, "company-id cache write failed");
            }
        }
    }

    /// Account usage from `GET /lookup/usage`
    pub async fn usage(&self) -> Result<UsageReport> {
        let value = self.executor.execute(Method::GET, "/lookup/usage", None).await?;
        Ok(UsageReport {
            requests_used: u64_at(&value, &["requestsUsed", "totalRequests"]),
            requests_limit: u64_at(&value, &["requestsLimit", "requestLimit"]),
            enrich_credits_used: u64_at(&value, &["enrichCreditsUsed", "creditsUsed"]),
            enrich_credits_remaining: u64_at(
                &value,
                &["enrichCreditsRemaining", "creditsRemaining"],
            ),
        })
    }

    /// Field catalog for search requests from `GET /lookup/searchfields`
    pub async fn search_fields(&self) -> Result<Vec<FieldDescriptor>> {
        let value = self.executor.execute(Method::GET, "/lookup/searchfields", None).await?;
        Ok(field_descriptors(&value))
    }

    /// Field catalog for enrichment from `GET /lookup/enrichfields`
    pub async fn enrich_fields(&self) -> Result<Vec<FieldDescriptor>> {
        let value = self.executor.execute(Method::GET, "/lookup/enrichfields", None).await?;
        Ok(field_descriptors(&value))
    }

    /// Swap hashed company ids for cached numeric equivalents; ids with no
    /// cached mapping pass through unchanged.
    async fn resolve_company_ids(&self, ids: &[String]) -> Vec<String> {
        let Some(cache) = &self.id_cache else {
            return ids.to_vec();
        };
        if ids.is_empty() {
            return Vec::new();
        }

        match cache.get_bulk(ids).await {
            Ok(mapped) => ids
                .iter()
                .map(|id| mapped.get(id).map_or_else(|| id.clone(), ToString::to_string))
                .collect(),
            Err(err) => {
                warn!(error = %err, "company-id cache read failed; using ids as-is");
                ids.to_vec()
            }
        }
    }
}

#[async_trait]
impl SearchTransport for ProviderClient {
    async fn search_intent(&self, query: &IntentQuery, page: u32) -> Result<Value> {
        let body = self.builder.intent_body(query, page);
        self.executor.execute(Method::POST, "/search/intent", Some(&body)).await
    }

    async fn search_companies(&self, query: &CompanyQuery, page: u32) -> Result<Value> {
        let body = self.builder.company_body(query, page);
        self.executor.execute(Method::POST, "/search/company", Some(&body)).await
    }

    async fn search_contacts(&self, query: &ContactQuery, page: u32) -> Result<Value> {
        let resolved = self.resolve_company_ids(&query.company_ids).await;
        let query = query.with_company_ids(resolved);
        let body = self.builder.contact_body(&query, page);
        self.executor.execute(Method::POST, "/search/contact", Some(&body)).await
    }

    async fn enrich_contacts(&self, query: &EnrichQuery) -> Result<Value> {
        let body = self.builder.enrich_body(query);
        self.executor.execute(Method::POST, "/enrich/contact", Some(&body)).await
    }
}

fn u64_at(value: &Value, keys: &[&str]) -> Option<u64> {
    keys.iter().find_map(|key| value.get(key).and_then(Value::as_u64))
}

fn field_descriptors(value: &Value) -> Vec<FieldDescriptor> {
    let items = match value {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => match map.get("fields").and_then(Value::as_array) {
            Some(items) => items.as_slice(),
            None => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    items
        .iter()
        .filter_map(|item| {
            let name = item
                .get("name")
                .or_else(|| item.get("fieldName"))
                .and_then(Value::as_str)?
                .to_string();
            Some(FieldDescriptor {
                name,
                display_name: item
                    .get("displayName")
                    .and_then(Value::as_str)
                    .map(ToString::to_string),
                field_type: item
                    .get("type")
                    .or_else(|| item.get("fieldType"))
                    .and_then(Value::as_str)
                    .map(ToString::to_string),
            })
        })
        .collect()
}
