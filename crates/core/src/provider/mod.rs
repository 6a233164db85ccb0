//! Subtitle provider adapters.
//!
//! Each adapter knows how to query one origin site and parse its listing
//! into `SubtitleRecord`s. Adapters are interchangeable implementations of
//! the `SubtitleProvider` contract and are wired into a `ProviderRegistry`;
//! leaving an adapter out of the registry is how it gets disabled.

mod query;
mod sabbz;
mod subsunacs;
mod types;
mod yavka;

pub use query::build_query_variants;
pub use sabbz::SabbzProvider;
pub use subsunacs::SubsunacsProvider;
pub use types::{DownloadLocator, SearchRequest, SubtitleRecord};
pub use yavka::YavkaProvider;

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::TtlCache;
use crate::metrics::PROVIDER_SEARCHES;

/// Hard cap on records returned by a single adapter, to bound aggregation
/// cost.
pub const MAX_RESULTS_PER_PROVIDER: usize = 20;

/// Internal failure of one origin query. Always absorbed into an empty
/// result before it crosses the adapter boundary.
#[derive(Debug, Error)]
pub enum ProviderSearchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to parse listing: {0}")]
    Parse(String),
}

/// Contract implemented once per external subtitle origin.
#[async_trait]
pub trait SubtitleProvider: Send + Sync {
    /// Registry key, e.g. "subsunacs".
    fn id(&self) -> &'static str;

    /// Display name, e.g. "Subsunacs.net".
    fn label(&self) -> &'static str;

    /// Search the origin for subtitle listings.
    ///
    /// Never fails outward: network and parse errors degrade to an empty
    /// list and are logged and counted instead.
    async fn search(&self, request: &SearchRequest) -> Vec<SubtitleRecord>;

    /// The download location for one of this provider's external ids.
    /// Pure; performs no network access.
    fn download_locator(&self, external_id: &str) -> DownloadLocator;
}

/// Ordered, open set of registered adapters. Registration order is the
/// merge order used by the aggregator.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn SubtitleProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an adapter. Later registrations with a duplicate id are kept
    /// but unreachable through `get`; don't do that.
    pub fn register(&mut self, provider: Arc<dyn SubtitleProvider>) {
        self.providers.push(provider);
    }

    /// Look up an adapter by its registry key.
    pub fn get(&self, id: &str) -> Option<&Arc<dyn SubtitleProvider>> {
        self.providers.iter().find(|p| p.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn SubtitleProvider>> {
        self.providers.iter()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

/// Shared variant/year retry loop used by every adapter's `search`.
///
/// Tries each query variant in order, stopping at the first non-empty
/// listing; when a year filter was applied and every variant came back
/// empty, the whole sequence is retried without the year (some origins
/// apply the year strictly). Each `(variant, year)` parse is cached.
pub(crate) async fn run_variant_search<F, Fut>(
    provider: &'static str,
    request: &SearchRequest,
    cache: &TtlCache<String, Vec<SubtitleRecord>>,
    query_origin: F,
) -> Vec<SubtitleRecord>
where
    F: Fn(String, Option<u32>) -> Fut,
    Fut: Future<Output = Result<Vec<SubtitleRecord>, ProviderSearchError>>,
{
    let variants = build_query_variants(&request.title, request.season, request.episode);
    if variants.is_empty() {
        return Vec::new();
    }

    let year_passes: Vec<Option<u32>> = if request.year.is_some() {
        vec![request.year, None]
    } else {
        vec![None]
    };

    for year in year_passes {
        for variant in &variants {
            let key = cache_key(variant, year);
            let records = match cache.get(&key) {
                Some(cached) => {
                    debug!(provider, query = %variant, "Listing cache hit");
                    cached
                }
                None => match query_origin(variant.clone(), year).await {
                    Ok(mut records) => {
                        records.truncate(MAX_RESULTS_PER_PROVIDER);
                        cache.insert(key, records.clone());
                        records
                    }
                    Err(e) => {
                        warn!(provider, query = %variant, error = %e, "Provider search failed");
                        PROVIDER_SEARCHES
                            .with_label_values(&[provider, "failed"])
                            .inc();
                        continue;
                    }
                },
            };

            if !records.is_empty() {
                PROVIDER_SEARCHES.with_label_values(&[provider, "ok"]).inc();
                return records;
            }
        }
    }

    PROVIDER_SEARCHES
        .with_label_values(&[provider, "empty"])
        .inc();
    Vec::new()
}

fn cache_key(variant: &str, year: Option<u32>) -> String {
    match year {
        Some(year) => format!("{}|{}", variant.to_lowercase(), year),
        None => format!("{}|", variant.to_lowercase()),
    }
}
