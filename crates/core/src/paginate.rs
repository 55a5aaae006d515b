//! Sequential page walking for one batch
//!
//! The provider may silently cap page size below what was requested, so the
//! first non-empty page's *actual* count becomes the expected page size.
//! Walking continues while pages come back full and a safety cap has not
//! been reached. Records repeating an earlier stable id are dropped, not
//! re-counted.

use std::collections::HashSet;
use std::future::Future;

use prospectarc_domain::{RecordId, Result};
use tracing::{debug, warn};

/// Walks sequential result pages of one batch until a stop condition
#[derive(Debug, Clone)]
pub struct Paginator {
    max_pages: u32,
}

impl Paginator {
    #[must_use]
    pub fn new(max_pages: u32) -> Self {
        Self { max_pages: max_pages.max(1) }
    }

    /// Fetch pages starting at 1 and accumulate deduplicated records.
    ///
    /// `fetch_page` performs one provider call and returns that page's
    /// already-normalized records.
    pub async fn collect<R, F, Fut>(&self, mut fetch_page: F) -> Result<Vec<R>>
    where
        R: RecordId,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<Vec<R>>>,
    {
        let mut records: Vec<R> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut detected_page_size: Option<usize> = None;

        let mut page = 1u32;
        loop {
            let batch = fetch_page(page).await?;
            let count = batch.len();
            debug!(page, count, "fetched result page");

            if count == 0 {
                break;
            }
            let expected = *detected_page_size.get_or_insert(count);

            for record in batch {
                if seen.insert(record.record_id().to_string()) {
                    records.push(record);
                }
            }

            // A short page means the provider ran out of results
            if count < expected {
                break;
            }
            if page >= self.max_pages {
                warn!(page, "pagination stopped at safety cap");
                break;
            }
            page += 1;
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use prospectarc_domain::ContactRecord;

    use super::*;

    fn contact(id: &str) -> ContactRecord {
        ContactRecord { person_id: id.to_string(), ..Default::default() }
    }

    fn pages(
        layout: Vec<Vec<&str>>,
    ) -> impl FnMut(u32) -> std::future::Ready<Result<Vec<ContactRecord>>> {
        move |page| {
            let batch = layout
                .get((page - 1) as usize)
                .map(|ids| ids.iter().map(|id| contact(id)).collect())
                .unwrap_or_default();
            std::future::ready(Ok(batch))
        }
    }

    #[tokio::test]
    async fn test_short_page_terminates_pagination() {
        let paginator = Paginator::new(20);
        // Page sizes: 3, 3, 2 -> stops after the short page
        let result = paginator
            .collect(pages(vec![
                vec!["a", "b", "c"],
                vec!["d", "e", "f"],
                vec!["g", "h"],
                vec!["x", "y", "z"],
            ]))
            .await
            .unwrap();

        assert_eq!(result.len(), 8);
        assert!(!result.iter().any(|r| r.person_id == "x"));
    }

    #[tokio::test]
    async fn test_empty_first_page_yields_no_records() {
        let paginator = Paginator::new(20);
        let result = paginator.collect(pages(vec![vec![]])).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_detected_size_comes_from_first_page_not_request() {
        // Requested page size may be 25; the provider caps at 2
        let paginator = Paginator::new(20);
        let result = paginator
            .collect(pages(vec![vec!["a", "b"], vec!["c", "d"], vec!["e"]]))
            .await
            .unwrap();

        assert_eq!(result.len(), 5);
    }

    #[tokio::test]
    async fn test_repeated_ids_across_pages_are_dropped() {
        let paginator = Paginator::new(20);
        let result = paginator
            .collect(pages(vec![vec!["a", "b"], vec!["b", "c"], vec!["d"]]))
            .await
            .unwrap();

        let ids: Vec<&str> = result.iter().map(|r| r.person_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
    }

    #[tokio::test]
    async fn test_safety_cap_stops_runaway_pagination() {
        let paginator = Paginator::new(3);
        // Every page is full; only the cap stops the walk
        let mut counter = 0u32;
        let result = paginator
            .collect(|_page| {
                counter += 1;
                let base = counter * 10;
                std::future::ready(Ok(vec![
                    contact(&format!("p{}", base)),
                    contact(&format!("p{}", base + 1)),
                ]))
            })
            .await
            .unwrap();

        assert_eq!(counter, 3);
        assert_eq!(result.len(), 6);
    }
}
