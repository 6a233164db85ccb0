pub mod aggregator;
pub mod cache;
pub mod config;
pub mod metadata;
pub mod metrics;
pub mod provider;
pub mod retrieval;
pub mod testing;

pub use aggregator::{dedup_records, SubtitleAggregator};
pub use cache::TtlCache;
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, MetadataConfig,
    ProviderConfig, ProvidersConfig, RetrievalConfig, ServerConfig,
};
pub use metadata::{
    parse_media_id, MediaKind, MediaMetadata, MediaReference, MetadataResolver, ResolveError,
};
pub use provider::{
    DownloadLocator, ProviderRegistry, SabbzProvider, SearchRequest, SubsunacsProvider,
    SubtitleProvider, SubtitleRecord, YavkaProvider, MAX_RESULTS_PER_PROVIDER,
};
pub use retrieval::{
    convert_legacy_format, decode_text, NormalizedSubtitle, RetrievalError, RetrievalProxy,
    SUBRIP_CONTENT_TYPE,
};

/// Browser user agent sent to origin sites; several refuse scripted clients.
pub(crate) const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

/// Build the provider registry from configuration.
///
/// Adapters are registered in a fixed order (subsunacs, sabbz, yavka), which
/// is also the merge order of aggregated results. A section with
/// `enabled = false` is skipped entirely; there is no disabled state inside
/// the registry.
pub fn build_registry(providers: &ProvidersConfig) -> ProviderRegistry {
    use std::sync::Arc;

    let mut registry = ProviderRegistry::new();
    if providers.subsunacs.enabled {
        registry.register(Arc::new(SubsunacsProvider::new(&providers.subsunacs)));
    }
    if providers.sabbz.enabled {
        registry.register(Arc::new(SabbzProvider::new(&providers.sabbz)));
    }
    if providers.yavka.enabled {
        registry.register(Arc::new(YavkaProvider::new(&providers.yavka)));
    }
    registry
}
