//! Retrieval proxy.
//!
//! Given a chosen record, fetches the raw artifact from its origin, unwraps
//! the container if there is one, fixes the text encoding, converts legacy
//! frame-indexed captions to SubRip, and returns normalized text. Nothing on
//! this path is cached; the content is cheap to rebuild and not guaranteed
//! stable at the origin.

mod archive;
mod convert;
mod encoding;
mod fetch;

pub use archive::{is_container, select_payload};
pub use convert::convert_legacy_format;
pub use encoding::decode_text;
pub use fetch::{ArtifactFetcher, FetchOutcome};

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::config::RetrievalConfig;
use crate::provider::ProviderRegistry;

/// Content type of normalized output.
pub const SUBRIP_CONTENT_TYPE: &str = "application/x-subrip";

/// Encoding-corrected SubRip text ready to serve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedSubtitle {
    pub text: String,
    pub content_type: &'static str,
}

/// Errors that can occur while retrieving one subtitle.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// The external id is not in the adapter's expected lexical form.
    #[error("Invalid subtitle identifier: {0}")]
    InvalidIdentifier(String),

    /// No adapter with this registry key.
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    /// The origin fetch produced no bytes at all.
    #[error("Upstream fetch failed: {0}")]
    UpstreamUnavailable(String),

    /// A container was fetched but holds no recognized subtitle entry.
    #[error("No subtitle entry found in archive")]
    ArtifactNotFound,
}

/// Fetches and normalizes one chosen subtitle per call. Holds no per-request
/// state; concurrent retrievals share nothing but the HTTP client and the
/// registry.
pub struct RetrievalProxy {
    registry: Arc<ProviderRegistry>,
    fetcher: ArtifactFetcher,
}

impl RetrievalProxy {
    pub fn new(registry: Arc<ProviderRegistry>, config: &RetrievalConfig) -> Self {
        Self {
            registry,
            fetcher: ArtifactFetcher::new(config),
        }
    }

    /// Retrieve and normalize one subtitle.
    pub async fn fetch(
        &self,
        provider_id: &str,
        external_id: &str,
    ) -> Result<NormalizedSubtitle, RetrievalError> {
        if external_id.is_empty() || !external_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(RetrievalError::InvalidIdentifier(external_id.to_string()));
        }

        let provider = self
            .registry
            .get(provider_id)
            .ok_or_else(|| RetrievalError::UnknownProvider(provider_id.to_string()))?;

        let locator = provider.download_locator(external_id);
        let bytes = self
            .fetcher
            .fetch(&locator)
            .await
            .into_bytes()
            .map_err(RetrievalError::UpstreamUnavailable)?;

        debug!(
            provider = provider_id,
            id = external_id,
            bytes = bytes.len(),
            container = is_container(&bytes),
            "Artifact fetched"
        );

        let payload = select_payload(&bytes)?;
        let text = decode_text(&payload);
        let normalized = convert_legacy_format(&text);

        Ok(NormalizedSubtitle {
            text: normalized,
            content_type: SUBRIP_CONTENT_TYPE,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetrievalConfig;
    use crate::testing::MockProvider;

    fn proxy_with_mock() -> RetrievalProxy {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(MockProvider::new("subsunacs", "Subsunacs.net")));
        RetrievalProxy::new(Arc::new(registry), &RetrievalConfig::default())
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_invalid() {
        let proxy = proxy_with_mock();
        let result = proxy.fetch("subsunacs", "abc").await;
        assert!(matches!(
            result,
            Err(RetrievalError::InvalidIdentifier(id)) if id == "abc"
        ));
    }

    #[tokio::test]
    async fn test_empty_id_is_invalid() {
        let proxy = proxy_with_mock();
        assert!(matches!(
            proxy.fetch("subsunacs", "").await,
            Err(RetrievalError::InvalidIdentifier(_))
        ));
    }

    #[tokio::test]
    async fn test_unregistered_provider_is_unknown() {
        let proxy = proxy_with_mock();
        let result = proxy.fetch("unknownprovider", "1").await;
        assert!(matches!(
            result,
            Err(RetrievalError::UnknownProvider(p)) if p == "unknownprovider"
        ));
    }

    #[tokio::test]
    async fn test_unreachable_origin_is_upstream_unavailable() {
        // The mock's locator points at a .invalid host, so the fetch yields
        // no bytes and must surface as UpstreamUnavailable.
        let proxy = proxy_with_mock();
        let result = proxy.fetch("subsunacs", "94087").await;
        assert!(matches!(
            result,
            Err(RetrievalError::UpstreamUnavailable(_))
        ));
    }
}
