//! Shared test doubles for core integration tests

use async_trait::async_trait;
use parking_lot::Mutex;
use prospectarc_core::ports::SearchTransport;
use prospectarc_domain::{
    CompanyQuery, ContactQuery, EnrichQuery, IntentQuery, ProspectError, Result,
};
use serde_json::{json, Value};

type ContactHandler = dyn Fn(&ContactQuery, u32) -> Result<Value> + Send + Sync;
type EnrichHandler = dyn Fn(&EnrichQuery) -> Result<Value> + Send + Sync;

/// Scriptable in-memory transport recording every call
pub struct MockTransport {
    pub contact_calls: Mutex<Vec<(ContactQuery, u32)>>,
    pub enrich_calls: Mutex<Vec<EnrichQuery>>,
    contact_handler: Box<ContactHandler>,
    enrich_handler: Box<EnrichHandler>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            contact_calls: Mutex::new(Vec::new()),
            enrich_calls: Mutex::new(Vec::new()),
            contact_handler: Box::new(|_, _| Ok(empty_page())),
            enrich_handler: Box::new(|_| Ok(json!({ "result": [] }))),
        }
    }

    pub fn on_contacts<F>(mut self, handler: F) -> Self
    where
        F: Fn(&ContactQuery, u32) -> Result<Value> + Send + Sync + 'static,
    {
        self.contact_handler = Box::new(handler);
        self
    }

    pub fn on_enrich<F>(mut self, handler: F) -> Self
    where
        F: Fn(&EnrichQuery) -> Result<Value> + Send + Sync + 'static,
    {
        self.enrich_handler = Box::new(handler);
        self
    }

    /// Contact sub-batch queries that asked for page 1, in call order
    #[allow(dead_code)]
    pub fn first_page_queries(&self) -> Vec<ContactQuery> {
        self.contact_calls
            .lock()
            .iter()
            .filter(|(_, page)| *page == 1)
            .map(|(query, _)| query.clone())
            .collect()
    }
}

#[async_trait]
impl SearchTransport for MockTransport {
    async fn search_intent(&self, _query: &IntentQuery, _page: u32) -> Result<Value> {
        Ok(empty_page())
    }

    async fn search_companies(&self, _query: &CompanyQuery, _page: u32) -> Result<Value> {
        Ok(empty_page())
    }

    async fn search_contacts(&self, query: &ContactQuery, page: u32) -> Result<Value> {
        self.contact_calls.lock().push((query.clone(), page));
        (self.contact_handler)(query, page)
    }

    async fn enrich_contacts(&self, query: &EnrichQuery) -> Result<Value> {
        self.enrich_calls.lock().push(query.clone());
        (self.enrich_handler)(query)
    }
}

pub fn empty_page() -> Value {
    json!({ "data": [] })
}

/// One search page of contacts: (person id, company id) pairs
pub fn contact_page(entries: &[(&str, &str)]) -> Value {
    let data: Vec<Value> = entries
        .iter()
        .map(|(person_id, company_id)| {
            json!({
                "personId": person_id,
                "companyId": company_id,
                "contactAccuracyScore": 90
            })
        })
        .collect();
    json!({ "data": data })
}

#[allow(dead_code)]
pub fn server_error() -> ProspectError {
    ProspectError::Api { status: 500, message: "internal error".into() }
}
