//! Scraping fallback for identifier resolution.
//!
//! When the metadata service has no usable entry, the canonical title page is
//! fetched and picked apart with a fixed list of extraction heuristics. Each
//! heuristic is a pure function over the parsed document; they are tried in
//! order per field, and title, year, and kind may each be filled by a
//! different heuristic.

use std::time::Duration;

use once_cell::sync::Lazy;
use regex_lite::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::debug;

use super::types::MediaKind;
use super::ResolveError;
use crate::config::MetadataConfig;
use crate::USER_AGENT;

static OG_TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[property="og:title"]"#).expect("static selector"));
static LD_JSON: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).expect("static selector"));
static HEADING: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").expect("static selector"));
static YEAR_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"a[href*="releaseinfo"]"#).expect("static selector"));
static EPISODES_SUBNAV: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"a[href*="episodes"]"#).expect("static selector"));

static PAREN_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\((\d{4})").expect("static regex"));

/// Fields recovered from the title page; any subset may be present.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScrapedTitle {
    pub title: Option<String>,
    pub year: Option<u32>,
    pub kind: Option<MediaKind>,
}

/// Fetches and scrapes the canonical title page for one identifier.
pub struct TitlePageScraper {
    client: Client,
    base_url: String,
}

impl TitlePageScraper {
    pub fn new(config: &MetadataConfig) -> Result<Self, ResolveError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: config.fallback_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn scrape(&self, canonical_id: &str) -> Result<ScrapedTitle, ResolveError> {
        let url = format!("{}/title/{}/", self.base_url, canonical_id);
        debug!(id = canonical_id, "Scraping title page");

        let html = self.client.get(&url).send().await?.text().await?;
        Ok(extract(&Html::parse_document(&html)))
    }
}

/// Apply the heuristic lists to a parsed document.
pub fn extract(doc: &Html) -> ScrapedTitle {
    ScrapedTitle {
        title: title_from_og_meta(doc)
            .or_else(|| title_from_ld_json(doc))
            .or_else(|| title_from_heading(doc)),
        year: year_from_og_meta(doc)
            .or_else(|| year_from_ld_json(doc))
            .or_else(|| year_from_release_link(doc)),
        kind: kind_from_ld_json(doc).or_else(|| kind_from_subnav(doc)),
    }
}

// Heuristic 1: structured meta tag, e.g.
// `<meta property="og:title" content="The Matrix (1999) - IMDb">`.

fn og_title_content(doc: &Html) -> Option<String> {
    doc.select(&OG_TITLE)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn title_from_og_meta(doc: &Html) -> Option<String> {
    let content = og_title_content(doc)?;
    let cut = content
        .find(" (")
        .or_else(|| content.find(" - "))
        .unwrap_or(content.len());
    let title = content[..cut].trim();
    (!title.is_empty()).then(|| title.to_string())
}

fn year_from_og_meta(doc: &Html) -> Option<u32> {
    let content = og_title_content(doc)?;
    PAREN_YEAR
        .captures(&content)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

// Heuristic 2: embedded structured data block.

fn ld_json_value(doc: &Html) -> Option<serde_json::Value> {
    for script in doc.select(&LD_JSON) {
        let raw: String = script.text().collect();
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(&raw) {
            return Some(value);
        }
    }
    None
}

fn title_from_ld_json(doc: &Html) -> Option<String> {
    ld_json_value(doc)?
        .get("name")
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn year_from_ld_json(doc: &Html) -> Option<u32> {
    let value = ld_json_value(doc)?;
    let date = value.get("datePublished").and_then(|v| v.as_str())?;
    let digits: String = date.chars().take_while(|c| c.is_ascii_digit()).collect();
    (digits.len() == 4).then(|| digits.parse().ok()).flatten()
}

fn kind_from_ld_json(doc: &Html) -> Option<MediaKind> {
    let value = ld_json_value(doc)?;
    match value.get("@type").and_then(|v| v.as_str())? {
        "Movie" => Some(MediaKind::Movie),
        "TVSeries" | "TVEpisode" | "TVSeason" => Some(MediaKind::Series),
        _ => None,
    }
}

// Heuristic 3: primary heading element.

fn title_from_heading(doc: &Html) -> Option<String> {
    doc.select(&HEADING)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

// Heuristic 4: release-year link.

fn year_from_release_link(doc: &Html) -> Option<u32> {
    for link in doc.select(&YEAR_LINK) {
        let text: String = link.text().collect::<String>().trim().to_string();
        if text.len() == 4 && text.chars().all(|c| c.is_ascii_digit()) {
            return text.parse().ok();
        }
    }
    None
}

// Heuristic 5: an episodes subnav only exists on series pages.

fn kind_from_subnav(doc: &Html) -> Option<MediaKind> {
    doc.select(&EPISODES_SUBNAV).next().map(|_| MediaKind::Series)
}
