//! subsunacs.net provider adapter.
//!
//! Search is a form POST against `/search.php`; the listing is a table whose
//! rows link to `/subtitles/<slug>-<id>/` pages. Downloads go through
//! `/get.php?id=<id>` and require a site referer.

use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::debug;

use super::{
    run_variant_search, DownloadLocator, ProviderSearchError, SearchRequest, SubtitleProvider,
    SubtitleRecord,
};
use crate::cache::TtlCache;
use crate::config::ProviderConfig;
use crate::retrieval::decode_text;
use crate::USER_AGENT;

const PROVIDER_ID: &str = "subsunacs";
const PROVIDER_LABEL: &str = "Subsunacs.net";

static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").expect("static selector"));
static TITLE_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"a[href*="/subtitles/"]"#).expect("static selector"));
static FPS_CELL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td.tdFps").expect("static selector"));
static DOWNLOADS_CELL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td.tdDown").expect("static selector"));
static UPLOADER_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"a[href*="/members/"]"#).expect("static selector"));

static TITLE_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\((\d{4})\)").expect("static regex"));

pub struct SubsunacsProvider {
    client: Client,
    base_url: String,
    cache: TtlCache<String, Vec<SubtitleRecord>>,
}

impl SubsunacsProvider {
    pub fn new(config: &ProviderConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .user_agent(USER_AGENT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            cache: TtlCache::new(Duration::from_secs(config.cache_ttl_secs)),
        }
    }

    async fn query_origin(
        &self,
        query: String,
        year: Option<u32>,
    ) -> Result<Vec<SubtitleRecord>, ProviderSearchError> {
        let url = format!("{}/search.php", self.base_url);
        let year_field = year.map(|y| y.to_string()).unwrap_or_default();
        let form = [
            ("ss", query.as_str()),
            ("ys", year_field.as_str()),
            ("t", "Subs"),
            ("action", "Search"),
        ];

        debug!(query = %query, year = ?year, "Searching subsunacs");

        let response = self.client.post(&url).form(&form).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderSearchError::Parse(format!("HTTP {}", status)));
        }

        // The listing is windows-1251 more often than not; decode explicitly
        // instead of trusting the content-type header.
        let bytes = response.bytes().await?;
        Ok(parse_listing(&decode_text(&bytes)))
    }
}

/// Parse a search listing page into records. Rows without a recognizable
/// subtitle link or numeric id are skipped.
fn parse_listing(html: &str) -> Vec<SubtitleRecord> {
    let doc = Html::parse_document(html);
    let mut records = Vec::new();

    for row in doc.select(&ROW) {
        let Some(link) = row.select(&TITLE_LINK).next() else {
            continue;
        };
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let Some(external_id) = id_from_href(href) else {
            continue;
        };

        let title = link.text().collect::<String>().trim().to_string();
        if title.is_empty() {
            continue;
        }

        let year = TITLE_YEAR
            .captures(&title)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string());

        let frame_rate = cell_text(&row, &FPS_CELL);
        let download_count = cell_text(&row, &DOWNLOADS_CELL);
        let uploader = row
            .select(&UPLOADER_LINK)
            .next()
            .map(|a| a.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty());

        records.push(SubtitleRecord {
            provider: PROVIDER_ID.to_string(),
            provider_label: PROVIDER_LABEL.to_string(),
            external_id,
            title,
            year,
            frame_rate,
            uploader,
            download_count,
        });
    }

    records
}

fn cell_text(row: &scraper::ElementRef<'_>, selector: &Selector) -> Option<String> {
    row.select(selector)
        .next()
        .map(|td| td.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Subtitle pages look like `/subtitles/the-matrix-94087/`; the id is the
/// trailing digit run of the path.
fn id_from_href(href: &str) -> Option<String> {
    let trimmed = href.trim_end_matches('/');
    let digits: String = trimmed
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    (!digits.is_empty()).then_some(digits)
}

#[async_trait]
impl SubtitleProvider for SubsunacsProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn label(&self) -> &'static str {
        PROVIDER_LABEL
    }

    async fn search(&self, request: &SearchRequest) -> Vec<SubtitleRecord> {
        run_variant_search(PROVIDER_ID, request, &self.cache, |query, year| {
            self.query_origin(query, year)
        })
        .await
    }

    fn download_locator(&self, external_id: &str) -> DownloadLocator {
        DownloadLocator {
            url: format!("{}/get.php?id={}", self.base_url, external_id),
            referer: format!("{}/", self.base_url),
        }
    }
}
