//! Mock provider for testing.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::provider::{DownloadLocator, SearchRequest, SubtitleProvider, SubtitleRecord};

/// Mock implementation of the `SubtitleProvider` trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable search results
/// - Track search requests for assertions
/// - Simulate an absorbed failure (empty result) by leaving results unset
pub struct MockProvider {
    id: &'static str,
    label: &'static str,
    download_base: String,
    results: Arc<RwLock<Vec<SubtitleRecord>>>,
    requests: Arc<RwLock<Vec<SearchRequest>>>,
}

impl MockProvider {
    pub fn new(id: &'static str, label: &'static str) -> Self {
        Self {
            id,
            label,
            download_base: "http://mock.invalid/download".to_string(),
            results: Arc::new(RwLock::new(Vec::new())),
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Point download locators at a test origin (e.g. an in-process stub
    /// server) instead of the default unreachable host.
    pub fn with_download_base(mut self, base: impl Into<String>) -> Self {
        self.download_base = base.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the results returned by subsequent searches.
    pub async fn set_results(&self, results: Vec<SubtitleRecord>) {
        *self.results.write().await = results;
    }

    /// Clear configured results; searches behave like an adapter that
    /// absorbed an origin failure.
    pub async fn clear_results(&self) {
        self.results.write().await.clear();
    }

    /// Handle on the recorded requests, usable after the provider has been
    /// moved into a registry.
    pub fn recorded(&self) -> Arc<RwLock<Vec<SearchRequest>>> {
        Arc::clone(&self.requests)
    }

    /// Number of searches performed so far.
    pub async fn search_count(&self) -> usize {
        self.requests.read().await.len()
    }
}

#[async_trait]
impl SubtitleProvider for MockProvider {
    fn id(&self) -> &'static str {
        self.id
    }

    fn label(&self) -> &'static str {
        self.label
    }

    async fn search(&self, request: &SearchRequest) -> Vec<SubtitleRecord> {
        self.requests.write().await.push(request.clone());
        self.results.read().await.clone()
    }

    fn download_locator(&self, external_id: &str) -> DownloadLocator {
        DownloadLocator {
            url: format!("{}/{}/{}", self.download_base, self.id, external_id),
            referer: format!("{}/", self.download_base),
        }
    }
}
