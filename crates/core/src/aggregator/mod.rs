//! Concurrent multi-provider search.
//!
//! Fans a search request out to every registered provider adapter, waits for
//! all of them to settle, and merges their listings into a single
//! deduplicated result. A slow or failing adapter never suppresses another
//! adapter's records; per the adapter contract a failure is an empty list.

mod dedup;

pub use dedup::dedup_records;

use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use crate::metrics::{SEARCH_DURATION, SEARCH_RESULTS};
use crate::provider::{ProviderRegistry, SearchRequest, SubtitleRecord};

pub struct SubtitleAggregator {
    registry: Arc<ProviderRegistry>,
}

impl SubtitleAggregator {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self { registry }
    }

    /// Search every registered adapter concurrently and merge the results in
    /// registration order, dropping `(provider, external_id)` duplicates.
    pub async fn search_all(&self, request: &SearchRequest) -> Vec<SubtitleRecord> {
        let start = Instant::now();

        debug!(
            title = %request.title,
            year = ?request.year,
            providers = self.registry.len(),
            "Starting aggregated search"
        );

        let search_futures: Vec<_> = self
            .registry
            .iter()
            .map(|provider| {
                let provider = Arc::clone(provider);
                let request = request.clone();
                async move { provider.search(&request).await }
            })
            .collect();

        // join_all keeps input order, which is registration order.
        let settled = futures::future::join_all(search_futures).await;
        let merged: Vec<SubtitleRecord> = settled.into_iter().flatten().collect();
        let records = dedup_records(merged);

        SEARCH_RESULTS
            .with_label_values(&[])
            .observe(records.len() as f64);
        SEARCH_DURATION
            .with_label_values(&[])
            .observe(start.elapsed().as_secs_f64());

        debug!(
            results = records.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Aggregated search complete"
        );

        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MockProvider};

    fn registry_of(providers: Vec<MockProvider>) -> Arc<ProviderRegistry> {
        let mut registry = ProviderRegistry::new();
        for provider in providers {
            registry.register(Arc::new(provider));
        }
        Arc::new(registry)
    }

    fn request(title: &str) -> SearchRequest {
        SearchRequest {
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_merges_in_registration_order() {
        let first = MockProvider::new("first", "First");
        first
            .set_results(vec![fixtures::record("first", "1", "The Matrix")])
            .await;
        let second = MockProvider::new("second", "Second");
        second
            .set_results(vec![fixtures::record("second", "9", "The Matrix")])
            .await;

        let aggregator = SubtitleAggregator::new(registry_of(vec![first, second]));
        let records = aggregator.search_all(&request("The Matrix")).await;

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].provider, "first");
        assert_eq!(records[1].provider, "second");
    }

    #[tokio::test]
    async fn test_empty_provider_does_not_suppress_others() {
        let broken = MockProvider::new("broken", "Broken");
        // No results configured: behaves like an adapter that absorbed a
        // network failure.
        let healthy = MockProvider::new("healthy", "Healthy");
        healthy
            .set_results(vec![fixtures::record("healthy", "5", "The Matrix")])
            .await;

        let aggregator = SubtitleAggregator::new(registry_of(vec![broken, healthy]));
        let records = aggregator.search_all(&request("The Matrix")).await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].provider, "healthy");
    }

    #[tokio::test]
    async fn test_duplicate_pairs_are_dropped() {
        let provider = MockProvider::new("dup", "Dup");
        provider
            .set_results(vec![
                fixtures::record("dup", "1", "keep"),
                fixtures::record("dup", "1", "drop"),
                fixtures::record("dup", "2", "keep too"),
            ])
            .await;

        let aggregator = SubtitleAggregator::new(registry_of(vec![provider]));
        let records = aggregator.search_all(&request("anything")).await;

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "keep");
    }

    #[tokio::test]
    async fn test_every_record_comes_from_a_registered_provider() {
        let alpha = MockProvider::new("alpha", "Alpha");
        alpha
            .set_results(vec![
                fixtures::record("alpha", "1", "The Matrix"),
                fixtures::record("alpha", "2", "The Matrix (workprint)"),
            ])
            .await;
        let beta = MockProvider::new("beta", "Beta");
        beta.set_results(vec![fixtures::record("beta", "1", "The Matrix")])
            .await;

        let aggregator = SubtitleAggregator::new(registry_of(vec![alpha, beta]));
        let records = aggregator.search_all(&request("The Matrix")).await;

        assert!(!records.is_empty());
        for record in &records {
            assert!(record.provider == "alpha" || record.provider == "beta");
        }

        let mut pairs: Vec<(String, String)> = records
            .iter()
            .map(|r| (r.provider.clone(), r.external_id.clone()))
            .collect();
        pairs.sort();
        pairs.dedup();
        assert_eq!(pairs.len(), records.len());
    }

    #[tokio::test]
    async fn test_all_providers_receive_the_request() {
        let alpha = MockProvider::new("alpha", "Alpha");
        let beta = MockProvider::new("beta", "Beta");
        let alpha_requests = alpha.recorded();
        let beta_requests = beta.recorded();

        let aggregator = SubtitleAggregator::new(registry_of(vec![alpha, beta]));
        aggregator.search_all(&request("The Office")).await;

        assert_eq!(alpha_requests.read().await.len(), 1);
        assert_eq!(beta_requests.read().await.len(), 1);
        assert_eq!(alpha_requests.read().await[0].title, "The Office");
    }

    #[tokio::test]
    async fn test_empty_registry_yields_empty_list() {
        let aggregator = SubtitleAggregator::new(Arc::new(ProviderRegistry::new()));
        assert!(aggregator.search_all(&request("anything")).await.is_empty());
    }
}
