mod loader;
mod types;

pub use loader::{load_config, load_config_from_str};
pub use types::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Validate configuration.
///
/// Currently validates:
/// - at least one forum section is configured
/// - translation provider has credentials when enabled
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.crawler.forums.is_empty() {
        return Err(ConfigError::ValidationError(
            "crawler.forums cannot be empty".to_string(),
        ));
    }

    if config.translate.enabled
        && config.translate.provider == "baidu"
        && (config.translate.baidu_appid.is_empty() || config.translate.baidu_key.is_empty())
    {
        return Err(ConfigError::ValidationError(
            "translate.baidu_appid and translate.baidu_key are required when the baidu provider is enabled".to_string(),
        ));
    }

    Ok(())
}
