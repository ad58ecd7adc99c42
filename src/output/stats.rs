//! Run summaries and dataset statistics
//!
//! This module provides the counts reported at the end of a crawl run and
//! the `--stats` view of a persisted dataset.

use crate::storage::DatasetStore;
use crate::CrawlerError;

/// One article that could not be extracted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleFailure {
    pub url: String,
    pub cause: String,
}

/// Counts reported at the end of a crawl run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Unique article links found across all listing pages
    pub links_discovered: usize,

    /// Articles extracted and handed to the merger
    pub articles_extracted: usize,

    /// Articles skipped because their page failed to load
    pub failures: Vec<ArticleFailure>,

    /// Rows in the dataset after the merge
    pub records_written: usize,
}

impl RunSummary {
    pub fn articles_failed(&self) -> usize {
        self.failures.len()
    }
}

/// Logs the end-of-run summary
pub fn log_run_summary(summary: &RunSummary) {
    tracing::info!(
        "Crawl complete: {} links discovered, {} articles saved, {} failed, {} rows in dataset",
        summary.links_discovered,
        summary.articles_extracted,
        summary.articles_failed(),
        summary.records_written
    );

    for failure in &summary.failures {
        tracing::warn!("Skipped {}: {}", failure.url, failure.cause);
    }
}

/// Statistics of a persisted dataset
#[derive(Debug, Clone)]
pub struct DatasetStatistics {
    pub total_articles: usize,
    pub untitled_articles: usize,
    pub empty_content_articles: usize,
    pub latest_crawled_at: Option<String>,
}

/// Loads statistics from a dataset backend
pub fn load_statistics(store: &dyn DatasetStore) -> Result<DatasetStatistics, CrawlerError> {
    let dataset = store.load()?;

    Ok(DatasetStatistics {
        total_articles: dataset.len(),
        untitled_articles: dataset.iter().filter(|r| r.title.is_empty()).count(),
        empty_content_articles: dataset.iter().filter(|r| r.content.is_empty()).count(),
        latest_crawled_at: dataset.latest_crawled_at().map(str::to_string),
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &DatasetStatistics) {
    println!("=== Dataset Statistics ===\n");
    println!("  Articles: {}", stats.total_articles);
    println!("  Without title: {}", stats.untitled_articles);
    println!("  Without content: {}", stats.empty_content_articles);
    match &stats.latest_crawled_at {
        Some(at) => println!("  Last crawled: {}", at),
        None => println!("  Last crawled: never"),
    }
}
