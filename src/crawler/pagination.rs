//! Listing pagination and link discovery
//!
//! Walks listing pages `1..=page_count` in order, collecting article links
//! into an insertion-ordered set. Any listing page that fails to load
//! aborts discovery.

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::links::{extract_article_links, LinkPattern};
use crate::FetchError;
use std::collections::HashSet;
use std::time::Duration;

/// The bounded sequence of listing page URLs for one run
#[derive(Debug, Clone)]
pub struct ListingPages {
    listing_url: String,
    template: String,
    page_count: u32,
}

impl ListingPages {
    pub fn new(listing_url: &str, template: &str, page_count: u32) -> Self {
        Self {
            listing_url: listing_url.to_string(),
            template: template.to_string(),
            page_count,
        }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(
            &config.listing_url,
            &config.page_url_template,
            config.page_count,
        )
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// URL of listing page `page` (1-based)
    ///
    /// Page 1 is the bare listing URL; later pages expand the template.
    pub fn url_for(&self, page: u32) -> String {
        if page <= 1 {
            return self.listing_url.clone();
        }
        self.template
            .replace("{listing}", self.listing_url.trim_end_matches('/'))
            .replace("{page}", &page.to_string())
    }

    /// All `(page, url)` pairs in visiting order
    pub fn iter(&self) -> impl Iterator<Item = (u32, String)> + '_ {
        (1..=self.page_count).map(move |page| (page, self.url_for(page)))
    }
}

/// Insertion-ordered set of article URLs
#[derive(Debug, Default)]
pub struct LinkSet {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl LinkSet {
    /// Adds `url` unless already present; returns true if it was new
    pub fn insert(&mut self, url: String) -> bool {
        if self.seen.contains(&url) {
            return false;
        }
        self.seen.insert(url.clone());
        self.order.push(url);
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.order
    }
}

/// Visits every listing page and returns the article URLs found, first-seen order
///
/// # Arguments
///
/// * `fetcher` - Loads each listing page
/// * `pages` - Listing pages to visit
/// * `pattern` - Article link candidacy rules
/// * `settle` - Pause after each listing page loads
///
/// # Returns
///
/// * `Ok(Vec<String>)` - Unique article URLs; empty if no page had any
/// * `Err(FetchError)` - A listing page failed to load
pub async fn discover_links(
    fetcher: &mut dyn PageFetcher,
    pages: &ListingPages,
    pattern: &LinkPattern,
    settle: Duration,
) -> Result<Vec<String>, FetchError> {
    let mut links = LinkSet::default();

    for (page, url) in pages.iter() {
        tracing::info!("Opening page: {}", url);

        let html = fetcher.fetch(&url, settle).await?;

        let mut added = 0;
        for link in extract_article_links(&html, pattern) {
            if links.insert(link) {
                added += 1;
            }
        }

        tracing::info!("Page {}: {} new, {} links so far", page, added, links.len());
    }

    tracing::info!("Total: {} posts", links.len());
    Ok(links.into_vec())
}
