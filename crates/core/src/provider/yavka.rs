//! yavka.net provider adapter.
//!
//! Search is a plain GET against `/subtitles.php`; results come back as
//! card-like blocks rather than table rows. Downloads go through
//! `/download.php?id=<id>`.

use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
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

const PROVIDER_ID: &str = "yavka";
const PROVIDER_LABEL: &str = "Yavka.net";

static ITEM: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.subs-item").expect("static selector"));
static TITLE_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"a[href*="/subtitles/"]"#).expect("static selector"));
static YEAR_SPAN: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.year").expect("static selector"));
static FPS_SPAN: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.fps").expect("static selector"));
static DOWNLOADS_SPAN: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.downloads").expect("static selector"));
static UPLOADER_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"a[href*="/user/"]"#).expect("static selector"));

pub struct YavkaProvider {
    client: Client,
    base_url: String,
    cache: TtlCache<String, Vec<SubtitleRecord>>,
}

impl YavkaProvider {
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
        let mut url = format!(
            "{}/subtitles.php?s={}&l=BG",
            self.base_url,
            urlencoding::encode(&query)
        );
        if let Some(year) = year {
            url.push_str(&format!("&y={}", year));
        }

        debug!(query = %query, year = ?year, "Searching yavka");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderSearchError::Parse(format!("HTTP {}", status)));
        }

        let bytes = response.bytes().await?;
        Ok(parse_listing(&decode_text(&bytes)))
    }
}

/// Parse a search page. Each result block links to `/subtitles/<id>/<slug>`;
/// the id is the leading digit run after the path prefix.
fn parse_listing(html: &str) -> Vec<SubtitleRecord> {
    let doc = Html::parse_document(html);
    let mut records = Vec::new();

    for item in doc.select(&ITEM) {
        let Some(link) = item.select(&TITLE_LINK).next() else {
            continue;
        };
        let Some(external_id) = link.value().attr("href").and_then(id_from_href) else {
            continue;
        };

        let title = link.text().collect::<String>().trim().to_string();
        if title.is_empty() {
            continue;
        }

        let span_text = |selector: &Selector| {
            item.select(selector)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
                .filter(|s| !s.is_empty())
        };

        records.push(SubtitleRecord {
            provider: PROVIDER_ID.to_string(),
            provider_label: PROVIDER_LABEL.to_string(),
            external_id,
            title,
            year: span_text(&YEAR_SPAN),
            frame_rate: span_text(&FPS_SPAN),
            uploader: item
                .select(&UPLOADER_LINK)
                .next()
                .map(|a| a.text().collect::<String>().trim().to_string())
                .filter(|s| !s.is_empty()),
            download_count: span_text(&DOWNLOADS_SPAN),
        });
    }

    records
}

fn id_from_href(href: &str) -> Option<String> {
    let after = href.split("/subtitles/").nth(1)?;
    let digits: String = after.chars().take_while(|c| c.is_ascii_digit()).collect();
    (!digits.is_empty()).then_some(digits)
}

#[async_trait]
impl SubtitleProvider for YavkaProvider {
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
            url: format!("{}/download.php?id={}", self.base_url, external_id),
            referer: format!("{}/subtitles.php", self.base_url),
        }
    }
}
