//! Identifier resolution.
//!
//! Turns an opaque composite identifier (`tt0133093`, `tt0386676:9:24`) into
//! a searchable `{title, year, kind}` tuple. The primary source is a JSON
//! metadata service; when it has nothing usable the canonical title page is
//! scraped as a fallback. Successful resolutions are cached for a day.

mod scrape;
mod title_service;
mod types;

pub use scrape::{extract, ScrapedTitle, TitlePageScraper};
pub use title_service::TitleService;
pub use types::{MediaKind, MediaMetadata, MediaReference};

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::TtlCache;
use crate::config::MetadataConfig;
use crate::metrics::METADATA_RESOLUTIONS;

/// Errors from identifier parsing and resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The composite identifier string has an unusable shape.
    #[error("Malformed media identifier: {0}")]
    MalformedIdentifier(String),

    /// Neither the metadata service nor the page scrape produced a title.
    #[error("No usable metadata for {0}")]
    MetadataUnavailable(String),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Parse a composite identifier into a `MediaReference`.
///
/// One segment is a movie; three or more segments are a series with positive
/// integer season and episode in the second and third slot. Anything else is
/// malformed.
pub fn parse_media_id(raw: &str) -> Result<MediaReference, ResolveError> {
    let malformed = || ResolveError::MalformedIdentifier(raw.to_string());

    let segments: Vec<&str> = raw.split(':').collect();
    let canonical_id = segments[0].trim();
    if canonical_id.is_empty() {
        return Err(malformed());
    }

    match segments.len() {
        1 => Ok(MediaReference {
            canonical_id: canonical_id.to_string(),
            kind: MediaKind::Movie,
            season: None,
            episode: None,
        }),
        n if n >= 3 => {
            let season: u32 = segments[1].parse().map_err(|_| malformed())?;
            let episode: u32 = segments[2].parse().map_err(|_| malformed())?;
            if season == 0 || episode == 0 {
                return Err(malformed());
            }
            Ok(MediaReference {
                canonical_id: canonical_id.to_string(),
                kind: MediaKind::Series,
                season: Some(season),
                episode: Some(episode),
            })
        }
        _ => Err(malformed()),
    }
}

/// Resolves canonical ids to title metadata with a service-then-scrape
/// strategy and a long-lived cache.
pub struct MetadataResolver {
    service: TitleService,
    scraper: TitlePageScraper,
    cache: TtlCache<String, MediaMetadata>,
}

impl MetadataResolver {
    pub fn new(config: &MetadataConfig) -> Result<Self, ResolveError> {
        Ok(Self {
            service: TitleService::new(config)?,
            scraper: TitlePageScraper::new(config)?,
            cache: TtlCache::new(Duration::from_secs(config.cache_ttl_secs)),
        })
    }

    /// Resolve a canonical id to title metadata.
    ///
    /// With a kind hint only that kind is queried against the service;
    /// otherwise `series` is tried before `movie`. The first response with a
    /// non-empty name wins. When the service yields nothing the title page
    /// scrape fills in what it can; only when that also fails does the call
    /// error with `MetadataUnavailable`.
    pub async fn resolve(
        &self,
        canonical_id: &str,
        kind_hint: Option<MediaKind>,
    ) -> Result<MediaMetadata, ResolveError> {
        if let Some(cached) = self.cache.get(&canonical_id.to_string()) {
            debug!(id = canonical_id, "Metadata cache hit");
            METADATA_RESOLUTIONS.with_label_values(&["cache"]).inc();
            return Ok(cached);
        }

        let kinds: &[MediaKind] = match kind_hint {
            Some(MediaKind::Movie) => &[MediaKind::Movie],
            Some(MediaKind::Series) => &[MediaKind::Series],
            None => &[MediaKind::Series, MediaKind::Movie],
        };

        for kind in kinds {
            match self.service.lookup(*kind, canonical_id).await {
                Ok(Some(metadata)) => {
                    METADATA_RESOLUTIONS.with_label_values(&["service"]).inc();
                    self.cache.insert(canonical_id.to_string(), metadata.clone());
                    return Ok(metadata);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(id = canonical_id, kind = kind.as_str(), error = %e, "Metadata service lookup failed");
                }
            }
        }

        match self.scraper.scrape(canonical_id).await {
            Ok(scraped) => {
                if let Some(title) = scraped.title {
                    let metadata = MediaMetadata {
                        title,
                        year: scraped.year,
                        kind: scraped
                            .kind
                            .or(kind_hint)
                            .unwrap_or(MediaKind::Movie),
                    };
                    METADATA_RESOLUTIONS.with_label_values(&["scrape"]).inc();
                    self.cache.insert(canonical_id.to_string(), metadata.clone());
                    return Ok(metadata);
                }
            }
            Err(e) => {
                warn!(id = canonical_id, error = %e, "Title page scrape failed");
            }
        }

        METADATA_RESOLUTIONS.with_label_values(&["failed"]).inc();
        Err(ResolveError::MetadataUnavailable(canonical_id.to_string()))
    }

    /// Resolve a parsed reference, composing `parse_media_id` and `resolve`
    /// for callers that start from the composite string.
    pub async fn resolve_reference(
        &self,
        reference: &MediaReference,
    ) -> Result<MediaMetadata, ResolveError> {
        self.resolve(&reference.canonical_id, Some(reference.kind)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_movie_id() {
        let reference = parse_media_id("tt0133093").unwrap();
        assert_eq!(reference.canonical_id, "tt0133093");
        assert_eq!(reference.kind, MediaKind::Movie);
        assert!(reference.season.is_none());
        assert!(reference.episode.is_none());
    }

    #[test]
    fn test_parse_series_id() {
        let reference = parse_media_id("tt0386676:9:24").unwrap();
        assert_eq!(reference.canonical_id, "tt0386676");
        assert_eq!(reference.kind, MediaKind::Series);
        assert_eq!(reference.season, Some(9));
        assert_eq!(reference.episode, Some(24));
    }

    #[test]
    fn test_parse_extra_segments_are_ignored() {
        let reference = parse_media_id("tt0386676:9:24:director-cut").unwrap();
        assert_eq!(reference.season, Some(9));
        assert_eq!(reference.episode, Some(24));
    }

    #[test]
    fn test_parse_two_segments_is_malformed() {
        assert!(matches!(
            parse_media_id("tt0386676:9"),
            Err(ResolveError::MalformedIdentifier(_))
        ));
    }

    #[test]
    fn test_parse_non_numeric_episode_is_malformed() {
        assert!(matches!(
            parse_media_id("tt0386676:9:finale"),
            Err(ResolveError::MalformedIdentifier(_))
        ));
    }

    #[test]
    fn test_parse_zero_season_is_malformed() {
        assert!(matches!(
            parse_media_id("tt0386676:0:1"),
            Err(ResolveError::MalformedIdentifier(_))
        ));
    }

    #[test]
    fn test_parse_empty_is_malformed() {
        assert!(matches!(
            parse_media_id(""),
            Err(ResolveError::MalformedIdentifier(_))
        ));
        assert!(matches!(
            parse_media_id(":1:2"),
            Err(ResolveError::MalformedIdentifier(_))
        ));
    }

    #[test]
    fn test_parse_negative_numbers_are_malformed() {
        assert!(matches!(
            parse_media_id("tt1:-1:2"),
            Err(ResolveError::MalformedIdentifier(_))
        ));
    }
}
