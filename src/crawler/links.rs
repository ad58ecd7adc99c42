//! Article link extraction from listing pages
//!
//! An anchor is an article link when its `href`:
//! - is root-relative (starts with a single `/`)
//! - ends with the configured suffix (`.chn` on the default portal)
//! - contains a match of the ID pattern (a run of 12+ digits by default)
//!
//! Accepted paths are made absolute by prefixing the listing site's origin.

use crate::config::LinkConfig;
use crate::ConfigError;
use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

/// Compiled link candidacy rules for one site
#[derive(Debug, Clone)]
pub struct LinkPattern {
    origin: String,
    suffix: String,
    id_pattern: Regex,
}

impl LinkPattern {
    /// Builds the pattern for the site hosting `listing_url`
    ///
    /// # Arguments
    ///
    /// * `listing_url` - Any URL on the site; only its origin is kept
    /// * `config` - Suffix and ID pattern
    pub fn new(listing_url: &str, config: &LinkConfig) -> Result<Self, ConfigError> {
        let url = Url::parse(listing_url).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid listing-url '{}': {}", listing_url, e))
        })?;

        let id_pattern = Regex::new(&config.id_pattern).map_err(|e| {
            ConfigError::InvalidPattern(format!("id-pattern '{}': {}", config.id_pattern, e))
        })?;

        Ok(Self {
            origin: url.origin().ascii_serialization(),
            suffix: config.suffix.clone(),
            id_pattern,
        })
    }

    /// Scheme, host and port that relative links are resolved against
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Returns true if `href` points at an article on this site
    pub fn is_candidate(&self, href: &str) -> bool {
        href.starts_with('/')
            && !href.starts_with("//")
            && href.ends_with(&self.suffix)
            && self.id_pattern.is_match(href)
    }

    /// Resolves a candidate path to an absolute URL
    pub fn resolve(&self, href: &str) -> String {
        format!("{}{}", self.origin, href)
    }
}

/// Extracts article links from a listing page, in document order
///
/// The same article may appear more than once on a page (teaser and
/// headline); callers deduplicate.
pub fn extract_article_links(html: &str, pattern: &LinkPattern) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if let Some(href) = element.value().attr("href") {
                if pattern.is_candidate(href) {
                    links.push(pattern.resolve(href));
                }
            }
        }
    }

    links
}
