//! Crawler module for discovering and extracting articles
//!
//! This module contains the core crawling logic, including:
//! - Page fetching through a headless browser or plain HTTP
//! - Article link extraction from listing pages
//! - Listing pagination and link discovery
//! - Article title and body extraction
//! - Overall crawl coordination

mod article;
mod coordinator;
mod fetcher;
mod links;
mod pagination;

pub use article::{visible_text, ArticleExtractor};
pub use coordinator::{run_crawl, Coordinator, CrawlPlan};
pub use fetcher::{
    build_http_client, launch_fetcher, BrowserFetcher, HttpFetcher, PageFetcher,
};
pub use links::{extract_article_links, LinkPattern};
pub use pagination::{discover_links, LinkSet, ListingPages};

use crate::config::Config;
use crate::output::RunSummary;
use crate::CrawlerError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the listing pages, link rules and extractor from the config
/// 2. Open the dataset and check that it is readable
/// 3. Acquire the page fetcher
/// 4. Discover article links and extract each article
/// 5. Merge the results into the dataset and release the fetcher
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(RunSummary)` - Crawl completed; counts of links, articles and rows
/// * `Err(CrawlerError)` - Crawl failed
pub async fn crawl(config: Config) -> Result<RunSummary, CrawlerError> {
    run_crawl(config).await
}
