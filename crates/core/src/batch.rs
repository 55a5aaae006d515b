//! Transparent batch splitting over provider request-size limits
//!
//! Oversized filter lists (ZIP codes, company ids, enrich ids) are split
//! into ordered provider-legal sub-batches; each sub-batch is paginated
//! independently and the union is merged with cross-batch deduplication by
//! stable id. Callers see a single search regardless of input size.

use std::collections::HashSet;
use std::sync::Arc;

use prospectarc_domain::{
    BatchCaps, CompanyQuery, CompanyRecord, ContactQuery, ContactRecord, EnrichQuery, IntentQuery,
    RecordId, Result,
};
use tracing::debug;

use crate::normalize::{self, EnrichOutcome};
use crate::paginate::Paginator;
use crate::ports::{CompanyDeduper, SearchTransport};

/// Size-transparent search facade over the transport
pub struct BatchSplitter {
    transport: Arc<dyn SearchTransport>,
    paginator: Paginator,
    caps: BatchCaps,
    deduper: Option<Arc<dyn CompanyDeduper>>,
}

impl BatchSplitter {
    #[must_use]
    pub fn new(transport: Arc<dyn SearchTransport>, caps: BatchCaps, max_pages: u32) -> Self {
        Self { transport, paginator: Paginator::new(max_pages), caps, deduper: None }
    }

    /// Attach the fuzzy company-name deduplication collaborator
    #[must_use]
    pub fn with_deduper(mut self, deduper: Arc<dyn CompanyDeduper>) -> Self {
        self.deduper = Some(deduper);
        self
    }

    /// Contact search, batch-split on company ids first, then ZIP codes
    pub async fn search_contacts(&self, query: &ContactQuery) -> Result<Vec<ContactRecord>> {
        let sub_queries = self.split_contact_query(query);
        if sub_queries.len() > 1 {
            debug!(sub_batches = sub_queries.len(), "contact filter list split into sub-batches");
        }

        let mut merged: Vec<ContactRecord> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for sub in &sub_queries {
            let transport = Arc::clone(&self.transport);
            let records = self
                .paginator
                .collect(move |page| {
                    let transport = Arc::clone(&transport);
                    let sub = sub.clone();
                    async move {
                        let body = transport.search_contacts(&sub, page).await?;
                        Ok(normalize::contacts_from_search(&body))
                    }
                })
                .await?;
            merge_unique(&mut merged, &mut seen, records);
        }

        Ok(merged)
    }

    /// Company search, batch-split on ZIP codes
    pub async fn search_companies(&self, query: &CompanyQuery) -> Result<Vec<CompanyRecord>> {
        let sub_queries: Vec<CompanyQuery> = if query.zip_codes.len() > self.caps.zip_codes {
            chunked(&query.zip_codes, self.caps.zip_codes)
                .into_iter()
                .map(|zips| CompanyQuery { zip_codes: zips, ..query.clone() })
                .collect()
        } else {
            vec![query.clone()]
        };

        let mut merged: Vec<CompanyRecord> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for sub in &sub_queries {
            let transport = Arc::clone(&self.transport);
            let records = self
                .paginator
                .collect(move |page| {
                    let transport = Arc::clone(&transport);
                    let sub = sub.clone();
                    async move {
                        let body = transport.search_companies(&sub, page).await?;
                        Ok(normalize::companies_from_search(&body))
                    }
                })
                .await?;
            merge_unique(&mut merged, &mut seen, records);
        }

        match &self.deduper {
            Some(deduper) => Ok(deduper.dedupe(merged)),
            None => Ok(merged),
        }
    }

    /// Intent-signal search (topic lists stay well under the size limit)
    pub async fn search_intent(&self, query: &IntentQuery) -> Result<Vec<CompanyRecord>> {
        let transport = Arc::clone(&self.transport);
        let query = query.clone();
        let merged = self
            .paginator
            .collect(move |page| {
                let transport = Arc::clone(&transport);
                let query = query.clone();
                async move {
                    let body = transport.search_intent(&query, page).await?;
                    Ok(normalize::companies_from_search(&body))
                }
            })
            .await?;

        match &self.deduper {
            Some(deduper) => Ok(deduper.dedupe(merged)),
            None => Ok(merged),
        }
    }

    /// Enrichment, chunked to the per-call id cap (not paginated)
    pub async fn enrich(&self, query: &EnrichQuery) -> Result<EnrichOutcome> {
        let mut outcome = EnrichOutcome::default();
        let mut seen: HashSet<String> = HashSet::new();

        for ids in chunked(&query.person_ids, self.caps.enrich_ids) {
            let sub = query.with_person_ids(ids);
            let body = self.transport.enrich_contacts(&sub).await?;
            let page = normalize::enrich_outcome(&body);

            merge_unique(&mut outcome.contacts, &mut seen, page.contacts);
            outcome.no_match.extend(page.no_match);
        }

        Ok(outcome)
    }

    fn split_contact_query(&self, query: &ContactQuery) -> Vec<ContactQuery> {
        if query.company_ids.len() > self.caps.company_ids {
            chunked(&query.company_ids, self.caps.company_ids)
                .into_iter()
                .map(|ids| query.with_company_ids(ids))
                .collect()
        } else if query.zip_codes.len() > self.caps.zip_codes {
            chunked(&query.zip_codes, self.caps.zip_codes)
                .into_iter()
                .map(|zips| query.with_zip_codes(zips))
                .collect()
        } else {
            vec![query.clone()]
        }
    }
}

/// Ordered chunks of at most `cap` items
fn chunked(items: &[String], cap: usize) -> Vec<Vec<String>> {
    items.chunks(cap.max(1)).map(<[String]>::to_vec).collect()
}

/// Append records whose stable id has not been seen yet
fn merge_unique<R: RecordId>(merged: &mut Vec<R>, seen: &mut HashSet<String>, records: Vec<R>) {
    for record in records {
        if seen.insert(record.record_id().to_string()) {
            merged.push(record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunking_preserves_order_and_cap() {
        let items: Vec<String> = (0..120).map(|i| format!("id-{i}")).collect();
        let chunks = chunked(&items, 40);

        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.len() == 40));
        assert_eq!(chunks[0][0], "id-0");
        assert_eq!(chunks[2][39], "id-119");
    }

    #[test]
    fn test_merge_unique_drops_cross_batch_duplicates() {
        use prospectarc_domain::ContactRecord;

        let mut merged = Vec::new();
        let mut seen = HashSet::new();

        let batch = |ids: &[&str]| -> Vec<ContactRecord> {
            ids.iter()
                .map(|id| ContactRecord { person_id: (*id).to_string(), ..Default::default() })
                .collect()
        };

        merge_unique(&mut merged, &mut seen, batch(&["a", "b"]));
        merge_unique(&mut merged, &mut seen, batch(&["b", "c"]));

        let ids: Vec<&str> = merged.iter().map(|r| r.person_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }
}
