//! JSON metadata service client.
//!
//! The service is Cinemeta-shaped: `GET {base}/meta/{kind}/{id}.json` returns
//! `{"meta": {"name": ..., "year": ..., ...}}` or an empty body for unknown
//! ids. No API key, generous rate limits.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::types::{MediaKind, MediaMetadata};
use super::ResolveError;
use crate::config::MetadataConfig;

/// Client for the primary metadata service.
pub struct TitleService {
    client: Client,
    base_url: String,
}

impl TitleService {
    /// Create a new client from the metadata section of the config.
    pub fn new(config: &MetadataConfig) -> Result<Self, ResolveError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        Ok(Self {
            client,
            base_url: config.service_url.trim_end_matches('/').to_string(),
        })
    }

    /// Look up one id under one kind.
    ///
    /// Returns `Ok(None)` when the service has no usable entry (missing meta,
    /// empty name, 404). Transport errors propagate so the caller can decide
    /// whether to keep trying other kinds.
    pub async fn lookup(
        &self,
        kind: MediaKind,
        canonical_id: &str,
    ) -> Result<Option<MediaMetadata>, ResolveError> {
        let url = format!("{}/meta/{}/{}.json", self.base_url, kind.as_str(), canonical_id);

        debug!(kind = kind.as_str(), id = canonical_id, "Metadata service lookup");

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if status == 404 {
            return Ok(None);
        }
        if !status.is_success() {
            return Ok(None);
        }

        let body: MetaResponse = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                debug!(id = canonical_id, error = %e, "Metadata response was not parseable");
                return Ok(None);
            }
        };

        let Some(meta) = body.meta else {
            return Ok(None);
        };
        let name = meta.name.unwrap_or_default();
        if name.trim().is_empty() {
            return Ok(None);
        }

        let year = meta
            .year
            .as_ref()
            .and_then(parse_year_value)
            .or_else(|| meta.release_info.as_deref().and_then(parse_year_str));

        Ok(Some(MediaMetadata {
            title: name,
            year,
            kind,
        }))
    }
}

/// Pull a 4-digit year out of the service's year field, which may be a bare
/// number, a `"1999"` string, or a `"2008-2013"` range.
fn parse_year_value(value: &serde_json::Value) -> Option<u32> {
    match value {
        serde_json::Value::Number(n) => n.as_u64().map(|y| y as u32),
        serde_json::Value::String(s) => parse_year_str(s),
        _ => None,
    }
}

fn parse_year_str(s: &str) -> Option<u32> {
    let digits: String = s.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.len() == 4 {
        digits.parse().ok()
    } else {
        None
    }
}

// Service response types (private)

#[derive(Debug, Deserialize)]
struct MetaResponse {
    meta: Option<MetaPayload>,
}

#[derive(Debug, Deserialize)]
struct MetaPayload {
    name: Option<String>,
    year: Option<serde_json::Value>,
    #[serde(rename = "releaseInfo")]
    release_info: Option<String>,
}
