//! Artifact download with a tri-state outcome.
//!
//! Some origins close the connection abnormally after the payload has been
//! fully transmitted. Bytes received before such a connection-level error
//! are still a usable artifact, so the fetch result distinguishes a truncated
//! body from a fetch that produced nothing at all.

use std::time::Duration;

use bytes::{Bytes, BytesMut};
use reqwest::{header::REFERER, redirect, Client};
use tracing::{debug, warn};

use crate::config::RetrievalConfig;
use crate::metrics::FETCH_OUTCOMES;
use crate::provider::DownloadLocator;
use crate::USER_AGENT;

/// Terminal states of one artifact download.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Body read to completion.
    Complete(Bytes),
    /// The connection died mid-stream but bytes had already arrived.
    Truncated(Bytes),
    /// No bytes at all: connect error, timeout before data, non-2xx status,
    /// or an empty body.
    Failed(String),
}

impl FetchOutcome {
    /// The received payload, when there is one. A `Truncated` body still
    /// counts as a payload.
    pub fn into_bytes(self) -> Result<Bytes, String> {
        match self {
            FetchOutcome::Complete(bytes) | FetchOutcome::Truncated(bytes) => Ok(bytes),
            FetchOutcome::Failed(reason) => Err(reason),
        }
    }
}

/// Downloads raw artifacts from provider origins.
pub struct ArtifactFetcher {
    client: Client,
}

impl ArtifactFetcher {
    pub fn new(config: &RetrievalConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .redirect(redirect::Policy::limited(config.max_redirects as usize))
            .user_agent(USER_AGENT)
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }

    /// GET the locator's URL with the origin-appropriate referer.
    pub async fn fetch(&self, locator: &DownloadLocator) -> FetchOutcome {
        debug!(url = %locator.url, "Fetching artifact");

        let response = match self
            .client
            .get(&locator.url)
            .header(REFERER, &locator.referer)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                FETCH_OUTCOMES.with_label_values(&["failed"]).inc();
                return FetchOutcome::Failed(e.to_string());
            }
        };

        let status = response.status();
        if !status.is_success() {
            FETCH_OUTCOMES.with_label_values(&["failed"]).inc();
            return FetchOutcome::Failed(format!("HTTP {}", status));
        }

        let mut response = response;
        let mut buf = BytesMut::new();
        loop {
            match response.chunk().await {
                Ok(Some(chunk)) => buf.extend_from_slice(&chunk),
                Ok(None) => break,
                Err(e) => {
                    // Abnormal termination. Use what we got, if anything.
                    if buf.is_empty() {
                        FETCH_OUTCOMES.with_label_values(&["failed"]).inc();
                        return FetchOutcome::Failed(e.to_string());
                    }
                    warn!(url = %locator.url, bytes = buf.len(), error = %e,
                        "Body stream died after payload bytes arrived; keeping them");
                    FETCH_OUTCOMES.with_label_values(&["truncated"]).inc();
                    return FetchOutcome::Truncated(buf.freeze());
                }
            }
        }

        if buf.is_empty() {
            FETCH_OUTCOMES.with_label_values(&["failed"]).inc();
            return FetchOutcome::Failed("empty body".to_string());
        }

        FETCH_OUTCOMES.with_label_values(&["complete"]).inc();
        FetchOutcome::Complete(buf.freeze())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_and_truncated_both_yield_bytes() {
        let complete = FetchOutcome::Complete(Bytes::from_static(b"payload"));
        assert_eq!(complete.into_bytes().unwrap().as_ref(), b"payload");

        let truncated = FetchOutcome::Truncated(Bytes::from_static(b"partial"));
        assert_eq!(truncated.into_bytes().unwrap().as_ref(), b"partial");
    }

    #[test]
    fn test_failed_yields_reason() {
        let failed = FetchOutcome::Failed("connection reset".to_string());
        assert_eq!(failed.into_bytes().unwrap_err(), "connection reset");
    }

    #[tokio::test]
    async fn test_unreachable_origin_is_failed_not_panic() {
        let fetcher = ArtifactFetcher::new(&RetrievalConfig {
            timeout_secs: 1,
            max_redirects: 5,
        });

        let outcome = fetcher
            .fetch(&DownloadLocator {
                // .invalid never resolves.
                url: "http://origin.invalid/get.php?id=1".to_string(),
                referer: "http://origin.invalid/".to_string(),
            })
            .await;

        assert!(matches!(outcome, FetchOutcome::Failed(_)));
    }
}
