use crate::config::types::{BrowserConfig, Config, OutputConfig, SiteConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_browser_config(&config.browser)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the site configuration
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.home_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid home-url: {}", e)))?;

    if url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "home-url '{}' must use HTTPS scheme",
            config.home_url
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "home-url '{}' has no host",
            config.home_url
        )));
    }

    Ok(())
}

/// Validates the browser automation configuration
fn validate_browser_config(config: &BrowserConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.webdriver_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid webdriver-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "webdriver-url '{}' must use HTTP or HTTPS scheme",
            config.webdriver_url
        )));
    }

    if config.page_settle_ms > 60_000 {
        return Err(ConfigError::Validation(format!(
            "page-settle-ms must be <= 60000ms, got {}ms",
            config.page_settle_ms
        )));
    }

    Ok(())
}

/// Validates the output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    if config.snapshot_path.is_empty() {
        return Err(ConfigError::Validation(
            "snapshot-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
