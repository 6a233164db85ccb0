use subtonic_core::{Config, MetadataResolver, RetrievalProxy, SubtitleAggregator};

/// Shared application state
pub struct AppState {
    config: Config,
    resolver: MetadataResolver,
    aggregator: SubtitleAggregator,
    proxy: RetrievalProxy,
}

impl AppState {
    pub fn new(
        config: Config,
        resolver: MetadataResolver,
        aggregator: SubtitleAggregator,
        proxy: RetrievalProxy,
    ) -> Self {
        Self {
            config,
            resolver,
            aggregator,
            proxy,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn resolver(&self) -> &MetadataResolver {
        &self.resolver
    }

    pub fn aggregator(&self) -> &SubtitleAggregator {
        &self.aggregator
    }

    pub fn proxy(&self) -> &RetrievalProxy {
        &self.proxy
    }
}
