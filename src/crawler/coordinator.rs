//! Crawler coordinator - main crawl orchestration logic
//!
//! This module sequences a single crawl run:
//! - Discovering article links across the listing pages
//! - Extracting each article, skipping (and logging) the ones that fail
//! - Merging the extracted records into the persisted dataset
//! - Releasing the page fetcher on every exit path

use crate::config::Config;
use crate::crawler::article::ArticleExtractor;
use crate::crawler::fetcher::{launch_fetcher, PageFetcher};
use crate::crawler::links::LinkPattern;
use crate::crawler::pagination::{discover_links, ListingPages};
use crate::output::{ArticleFailure, RunSummary};
use crate::state::RunPhase;
use crate::storage::{merge_and_persist, open_dataset, ArticleRecord, DatasetStore};
use crate::CrawlerError;
use std::time::Duration;

/// Everything a run needs that can be built without touching the network
#[derive(Debug, Clone)]
pub struct CrawlPlan {
    pub pages: ListingPages,
    pub pattern: LinkPattern,
    pub extractor: ArticleExtractor,
    pub listing_settle: Duration,
}

impl CrawlPlan {
    pub fn from_config(config: &Config) -> Result<Self, CrawlerError> {
        Ok(Self {
            pages: ListingPages::from_config(&config.crawler),
            pattern: LinkPattern::new(&config.crawler.listing_url, &config.links)?,
            extractor: ArticleExtractor::new(
                &config.extract,
                Duration::from_millis(config.crawler.article_settle_ms),
            )?,
            listing_settle: Duration::from_millis(config.crawler.listing_settle_ms),
        })
    }
}

/// Main crawler coordinator structure
///
/// Owns the page fetcher for the whole run. `run` consumes the coordinator
/// and always closes the fetcher before returning.
pub struct Coordinator {
    plan: CrawlPlan,
    fetcher: Box<dyn PageFetcher>,
    store: Box<dyn DatasetStore>,
    phase: RunPhase,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `plan` - Listing pages, link rules and extractor
    /// * `fetcher` - An acquired page fetcher; released by `run`
    /// * `store` - The dataset backend to merge into
    pub fn new(plan: CrawlPlan, fetcher: Box<dyn PageFetcher>, store: Box<dyn DatasetStore>) -> Self {
        Self {
            plan,
            fetcher,
            store,
            phase: RunPhase::Idle,
        }
    }

    /// Runs the crawl and releases the fetcher
    ///
    /// A failure to release the fetcher after a successful run is logged,
    /// not returned: the dataset has already been committed by then.
    pub async fn run(mut self) -> Result<RunSummary, CrawlerError> {
        let outcome = self.execute().await;
        let reached = self.phase;
        let released = self.release().await;

        match (outcome, released) {
            (Ok(summary), Ok(())) => Ok(summary),
            (Ok(summary), Err(e)) => {
                tracing::warn!("Failed to release page fetcher: {}", e);
                Ok(summary)
            }
            (Err(e), released) => {
                if let Err(release_err) = released {
                    tracing::warn!("Failed to release page fetcher: {}", release_err);
                }
                tracing::error!("Crawl aborted while {}: {}", reached, e);
                Err(e)
            }
        }
    }

    fn transition(&mut self, next: RunPhase) -> Result<(), CrawlerError> {
        if !self.phase.can_transition_to(next) {
            return Err(CrawlerError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        tracing::debug!("Run phase {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }

    async fn execute(&mut self) -> Result<RunSummary, CrawlerError> {
        let mut summary = RunSummary::default();

        self.transition(RunPhase::Discovering)?;
        let links = discover_links(
            self.fetcher.as_mut(),
            &self.plan.pages,
            &self.plan.pattern,
            self.plan.listing_settle,
        )
        .await?;
        summary.links_discovered = links.len();

        let records = if links.is_empty() {
            tracing::warn!("No posts found");
            Vec::new()
        } else {
            self.transition(RunPhase::Extracting)?;
            tracing::info!("Start crawling each post");
            self.extract_all(&links, &mut summary).await
        };
        summary.articles_extracted = records.len();

        self.transition(RunPhase::Merging)?;
        summary.records_written = merge_and_persist(self.store.as_mut(), records)?;

        Ok(summary)
    }

    /// Extracts every article, isolating per-article failures
    async fn extract_all(
        &mut self,
        links: &[String],
        summary: &mut RunSummary,
    ) -> Vec<ArticleRecord> {
        let mut records = Vec::with_capacity(links.len());

        for (index, url) in links.iter().enumerate() {
            match self.plan.extractor.extract(self.fetcher.as_mut(), url).await {
                Ok(article) => {
                    tracing::info!(
                        "[{}/{}] The post has been taken: {}",
                        index + 1,
                        links.len(),
                        title_preview(&article.title)
                    );
                    records.push(article);
                }
                Err(e) => {
                    tracing::error!("Post error {}: {}", url, e);
                    summary.failures.push(ArticleFailure {
                        url: url.clone(),
                        cause: e.to_string(),
                    });
                }
            }
        }

        records
    }

    async fn release(&mut self) -> Result<(), CrawlerError> {
        self.transition(RunPhase::Finalizing)?;
        let closed = self.fetcher.close().await;
        self.transition(RunPhase::Done)?;
        closed
    }
}

/// First 50 characters of a title, for log lines
fn title_preview(title: &str) -> String {
    let mut preview: String = title.chars().take(50).collect();
    if title.chars().count() > 50 {
        preview.push_str("...");
    }
    preview
}

/// Runs a complete crawl from configuration
///
/// Everything that can fail without side effects (link rules, selectors,
/// reading the existing dataset) is checked before the fetcher is acquired.
pub async fn run_crawl(config: Config) -> Result<RunSummary, CrawlerError> {
    let plan = CrawlPlan::from_config(&config)?;

    let store = open_dataset(&config.output)?;
    let existing = store.load()?;
    tracing::info!(
        "Existing dataset {}: {} articles",
        store.location().display(),
        existing.len()
    );

    let fetcher = launch_fetcher(&config.browser).await?;

    Coordinator::new(plan, fetcher, store).run().await
}
