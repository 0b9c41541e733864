use crate::config::types::{Config, CrawlerConfig, HttpConfig, MediaConfig, OutputConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_http_config(&config.http)?;
    validate_output_config(&config.output)?;
    validate_media_config(&config.media)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    let root = Url::parse(&config.root_url).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid root-url '{}': {}", config.root_url, e))
    })?;

    if root.scheme() != "http" && root.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "root-url '{}' must use http or https",
            config.root_url
        )));
    }

    if !root.path().ends_with('/') {
        return Err(ConfigError::Validation(format!(
            "root-url '{}' must point at a directory (end with '/')",
            config.root_url
        )));
    }

    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max-attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    if config.checkpoint_interval < 1 {
        return Err(ConfigError::Validation(format!(
            "checkpoint-interval must be >= 1, got {}",
            config.checkpoint_interval
        )));
    }

    Ok(())
}

/// Validates HTTP configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if let Some(referer) = &config.referer {
        Url::parse(referer)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid referer: {}", e)))?;
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.catalog_path.is_empty() {
        return Err(ConfigError::Validation(
            "catalog-path cannot be empty".to_string(),
        ));
    }

    if config.default_genre.is_empty() {
        return Err(ConfigError::Validation(
            "default-genre cannot be empty".to_string(),
        ));
    }

    if config.link_label.is_empty() {
        return Err(ConfigError::Validation(
            "link-label cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the media extension list
fn validate_media_config(config: &MediaConfig) -> Result<(), ConfigError> {
    if config.extensions.is_empty() {
        return Err(ConfigError::Validation(
            "at least one media extension is required".to_string(),
        ));
    }

    for ext in &config.extensions {
        if ext.len() < 2 || !ext.starts_with('.') {
            return Err(ConfigError::Validation(format!(
                "media extension '{}' must start with '.' and be non-empty",
                ext
            )));
        }
    }

    Ok(())
}
