//! subs.sab.bz provider adapter.
//!
//! Search is a form POST against `/index.php?act=search`; listing rows carry
//! their download link inline as `index.php?act=download&attach_id=<id>`, so
//! the external id is the `attach_id` query parameter.

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

const PROVIDER_ID: &str = "sabbz";
const PROVIDER_LABEL: &str = "Subs.sab.bz";

static DOWNLOAD_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"a[href*="attach_id="]"#).expect("static selector"));
static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").expect("static selector"));
static CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td").expect("static selector"));

pub struct SabbzProvider {
    client: Client,
    base_url: String,
    cache: TtlCache<String, Vec<SubtitleRecord>>,
}

impl SabbzProvider {
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
        let url = format!("{}/index.php?act=search", self.base_url);
        let year_field = year.map(|y| y.to_string()).unwrap_or_default();
        let form = [
            ("movie", query.as_str()),
            ("yr", year_field.as_str()),
            ("select-language", "2"),
        ];

        debug!(query = %query, year = ?year, "Searching sab.bz");

        let response = self.client.post(&url).form(&form).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderSearchError::Parse(format!("HTTP {}", status)));
        }

        let bytes = response.bytes().await?;
        Ok(parse_listing(&decode_text(&bytes)))
    }
}

/// Parse a results page. A row is a record when it contains a download link
/// with a numeric `attach_id`; the surrounding cells hold title, frame rate,
/// download count, and uploader in fixed positions.
fn parse_listing(html: &str) -> Vec<SubtitleRecord> {
    let doc = Html::parse_document(html);
    let mut records = Vec::new();

    for row in doc.select(&ROW) {
        let Some(link) = row.select(&DOWNLOAD_LINK).next() else {
            continue;
        };
        let Some(external_id) = link
            .value()
            .attr("href")
            .and_then(attach_id_from_href)
        else {
            continue;
        };

        let title = link.text().collect::<String>().trim().to_string();
        if title.is_empty() {
            continue;
        }

        // Fixed cell layout: title, year, fps, cds, downloads, uploader.
        let cells: Vec<String> = row
            .select(&CELL)
            .map(|td| td.text().collect::<String>().trim().to_string())
            .collect();

        let year = cells
            .get(1)
            .filter(|s| s.len() == 4 && s.chars().all(|c| c.is_ascii_digit()))
            .cloned();
        let frame_rate = cells.get(2).filter(|s| !s.is_empty()).cloned();
        let download_count = cells.get(4).filter(|s| !s.is_empty()).cloned();
        let uploader = cells.get(5).filter(|s| !s.is_empty()).cloned();

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

fn attach_id_from_href(href: &str) -> Option<String> {
    let after = href.split("attach_id=").nth(1)?;
    let digits: String = after.chars().take_while(|c| c.is_ascii_digit()).collect();
    (!digits.is_empty()).then_some(digits)
}

#[async_trait]
impl SubtitleProvider for SabbzProvider {
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
            url: format!(
                "{}/index.php?act=download&attach_id={}",
                self.base_url, external_id
            ),
            referer: format!("{}/index.php", self.base_url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
<html><body><table>
<tr>
  <td><a href="index.php?act=download&attach_id=120455">The Matrix / Матрицата</a></td>
  <td>1999</td>
  <td>23.976</td>
  <td>1</td>
  <td>3204</td>
  <td>morpheus</td>
</tr>
<tr>
  <td><a href="index.php?act=download&attach_id=98761&s=2">Матрицата: Презареждане</a></td>
  <td></td>
  <td></td>
  <td>2</td>
  <td>211</td>
  <td></td>
</tr>
<tr><td>No download link here</td></tr>
</table></body></html>
"#;

    #[test]
    fn test_parse_listing() {
        let records = parse_listing(LISTING);
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.provider, "sabbz");
        assert_eq!(first.external_id, "120455");
        assert_eq!(first.title, "The Matrix / Матрицата");
        assert_eq!(first.year.as_deref(), Some("1999"));
        assert_eq!(first.frame_rate.as_deref(), Some("23.976"));
        assert_eq!(first.download_count.as_deref(), Some("3204"));
        assert_eq!(first.uploader.as_deref(), Some("morpheus"));

        let second = &records[1];
        assert_eq!(second.external_id, "98761");
        assert!(second.year.is_none());
        assert!(second.frame_rate.is_none());
        assert!(second.uploader.is_none());
    }

    #[test]
    fn test_attach_id_from_href() {
        assert_eq!(
            attach_id_from_href("index.php?act=download&attach_id=120455"),
            Some("120455".to_string())
        );
        assert_eq!(
            attach_id_from_href("index.php?act=download&attach_id=98761&s=2"),
            Some("98761".to_string())
        );
        assert_eq!(attach_id_from_href("index.php?act=download"), None);
    }

    #[test]
    fn test_download_locator_is_pure() {
        let config = ProviderConfig {
            enabled: true,
            base_url: "http://subs.sab.bz".to_string(),
            timeout_secs: 15,
            cache_ttl_secs: 3600,
        };
        let provider = SabbzProvider::new(&config);

        let locator = provider.download_locator("120455");
        assert_eq!(
            locator.url,
            "http://subs.sab.bz/index.php?act=download&attach_id=120455"
        );
        assert_eq!(locator.referer, "http://subs.sab.bz/index.php");
    }
}
