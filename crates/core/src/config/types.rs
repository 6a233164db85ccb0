use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub metadata: MetadataConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    7070
}

/// Identifier resolution configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetadataConfig {
    /// Base URL of the JSON metadata service.
    #[serde(default = "default_service_url")]
    pub service_url: String,
    /// Base URL of the title page used for the scraping fallback.
    #[serde(default = "default_fallback_url")]
    pub fallback_url: String,
    /// Request timeout in seconds (default: 10)
    #[serde(default = "default_metadata_timeout")]
    pub timeout_secs: u32,
    /// How long resolved metadata stays cached (default: 24h)
    #[serde(default = "default_metadata_ttl")]
    pub cache_ttl_secs: u64,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            service_url: default_service_url(),
            fallback_url: default_fallback_url(),
            timeout_secs: default_metadata_timeout(),
            cache_ttl_secs: default_metadata_ttl(),
        }
    }
}

fn default_service_url() -> String {
    "https://v3-cinemeta.strem.io".to_string()
}

fn default_fallback_url() -> String {
    "https://www.imdb.com".to_string()
}

fn default_metadata_timeout() -> u32 {
    10
}

fn default_metadata_ttl() -> u64 {
    24 * 60 * 60
}

/// Provider adapter configuration, one section per origin site.
///
/// An adapter whose section has `enabled = false` is simply never registered
/// with the aggregator.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProvidersConfig {
    #[serde(default = "default_subsunacs")]
    pub subsunacs: ProviderConfig,
    #[serde(default = "default_sabbz")]
    pub sabbz: ProviderConfig,
    #[serde(default = "default_yavka")]
    pub yavka: ProviderConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            subsunacs: default_subsunacs(),
            sabbz: default_sabbz(),
            yavka: default_yavka(),
        }
    }
}

fn default_subsunacs() -> ProviderConfig {
    ProviderConfig::with_base_url("https://subsunacs.net")
}

fn default_sabbz() -> ProviderConfig {
    ProviderConfig::with_base_url("http://subs.sab.bz")
}

fn default_yavka() -> ProviderConfig {
    ProviderConfig::with_base_url("https://yavka.net")
}

/// Configuration for a single provider adapter.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Origin site base URL, without a trailing slash.
    pub base_url: String,
    /// Search request timeout in seconds (default: 15)
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u32,
    /// How long parsed listings stay cached per query (default: 1h)
    #[serde(default = "default_provider_ttl")]
    pub cache_ttl_secs: u64,
}

impl ProviderConfig {
    fn with_base_url(base_url: &str) -> Self {
        Self {
            enabled: default_enabled(),
            base_url: base_url.to_string(),
            timeout_secs: default_provider_timeout(),
            cache_ttl_secs: default_provider_ttl(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_provider_timeout() -> u32 {
    15
}

fn default_provider_ttl() -> u64 {
    60 * 60
}

/// Retrieval proxy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetrievalConfig {
    /// Download timeout in seconds (default: 25)
    #[serde(default = "default_retrieval_timeout")]
    pub timeout_secs: u32,
    /// Maximum redirects to follow on the download path (default: 5)
    #[serde(default = "default_max_redirects")]
    pub max_redirects: u32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_retrieval_timeout(),
            max_redirects: default_max_redirects(),
        }
    }
}

fn default_retrieval_timeout() -> u32 {
    25
}

fn default_max_redirects() -> u32 {
    5
}
