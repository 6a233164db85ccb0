use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Metadata service/fallback URLs are present
/// - Enabled providers have a base URL and non-zero timeout
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.metadata.service_url.is_empty() {
        return Err(ConfigError::ValidationError(
            "metadata.service_url cannot be empty".to_string(),
        ));
    }
    if config.metadata.fallback_url.is_empty() {
        return Err(ConfigError::ValidationError(
            "metadata.fallback_url cannot be empty".to_string(),
        ));
    }

    let providers = [
        ("subsunacs", &config.providers.subsunacs),
        ("sabbz", &config.providers.sabbz),
        ("yavka", &config.providers.yavka),
    ];
    for (name, provider) in providers {
        if !provider.enabled {
            continue;
        }
        if provider.base_url.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "providers.{}.base_url cannot be empty",
                name
            )));
        }
        if provider.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(format!(
                "providers.{}.timeout_secs cannot be 0",
                name
            )));
        }
    }

    if config.retrieval.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "retrieval.timeout_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}
