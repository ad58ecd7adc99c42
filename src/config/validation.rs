use crate::config::types::{
    BrowserConfig, Config, CrawlerConfig, ExtractConfig, LinkConfig, OutputConfig,
};
use crate::ConfigError;
use regex::Regex;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_link_config(&config.links)?;
    validate_extract_config(&config.extract)?;
    validate_browser_config(&config.browser)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates listing traversal configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.listing_url).map_err(|e| {
        ConfigError::InvalidUrl(format!(
            "Invalid listing-url '{}': {}",
            config.listing_url, e
        ))
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "listing-url '{}' must use http or https",
            config.listing_url
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "listing-url '{}' has no host",
            config.listing_url
        )));
    }

    if config.page_count < 1 {
        return Err(ConfigError::Validation(format!(
            "page-count must be >= 1, got {}",
            config.page_count
        )));
    }

    if !config.page_url_template.contains("{page}") {
        return Err(ConfigError::Validation(format!(
            "page-url-template must contain '{{page}}', got '{}'",
            config.page_url_template
        )));
    }

    Ok(())
}

/// Validates link candidacy rules
fn validate_link_config(config: &LinkConfig) -> Result<(), ConfigError> {
    if config.suffix.is_empty() {
        return Err(ConfigError::Validation(
            "links.suffix cannot be empty".to_string(),
        ));
    }

    Regex::new(&config.id_pattern).map_err(|e| {
        ConfigError::InvalidPattern(format!("id-pattern '{}': {}", config.id_pattern, e))
    })?;

    Ok(())
}

/// Validates extraction selectors
fn validate_extract_config(config: &ExtractConfig) -> Result<(), ConfigError> {
    validate_selector("title-selector", &config.title_selector)?;
    validate_selector("content-selector", &config.content_selector)?;
    Ok(())
}

fn validate_selector(name: &str, selector: &str) -> Result<(), ConfigError> {
    if selector.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
    }

    Selector::parse(selector)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidPattern(format!("{} '{}': {:?}", name, selector, e)))
}

/// Validates page fetcher configuration
fn validate_browser_config(config: &BrowserConfig) -> Result<(), ConfigError> {
    if config.navigation_timeout_ms < 1000 {
        return Err(ConfigError::Validation(format!(
            "navigation-timeout-ms must be >= 1000ms, got {}ms",
            config.navigation_timeout_ms
        )));
    }

    if let Some(path) = &config.executable_path {
        if path.is_empty() {
            return Err(ConfigError::Validation(
                "executable-path cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.dataset_path.is_empty() {
        return Err(ConfigError::Validation(
            "dataset-path cannot be empty".to_string(),
        ));
    }

    if config.log_path.is_empty() {
        return Err(ConfigError::Validation(
            "log-path cannot be empty".to_string(),
        ));
    }

    if config.dataset_path == config.log_path {
        return Err(ConfigError::Validation(
            "dataset-path and log-path must differ".to_string(),
        ));
    }

    Ok(())
}
