//! Article page extraction
//!
//! A missing title or body element is not an error: the field is left
//! empty. Only a failed page load fails extraction.

use crate::config::ExtractConfig;
use crate::crawler::fetcher::PageFetcher;
use crate::storage::{ArticleRecord, TIMESTAMP_FORMAT};
use crate::{ConfigError, FetchError};
use chrono::Local;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;

/// Elements whose text is never shown to a reader
const HIDDEN_ELEMENTS: [&str; 3] = ["script", "style", "noscript"];

/// Turns article pages into `ArticleRecord`s
#[derive(Debug, Clone)]
pub struct ArticleExtractor {
    title: Selector,
    content: Selector,
    settle: Duration,
}

impl ArticleExtractor {
    /// # Arguments
    ///
    /// * `config` - Title and content selectors
    /// * `settle` - Pause after each article page loads
    pub fn new(config: &ExtractConfig, settle: Duration) -> Result<Self, ConfigError> {
        Ok(Self {
            title: parse_selector(&config.title_selector)?,
            content: parse_selector(&config.content_selector)?,
            settle,
        })
    }

    /// Fetches `url` and extracts its record, stamped with the current time
    pub async fn extract(
        &self,
        fetcher: &mut dyn PageFetcher,
        url: &str,
    ) -> Result<ArticleRecord, FetchError> {
        let html = fetcher.fetch(url, self.settle).await?;
        let crawled_at = Local::now().format(TIMESTAMP_FORMAT).to_string();
        Ok(self.parse(url, &html, crawled_at))
    }

    /// Extracts a record from already-fetched HTML
    pub fn parse(&self, url: &str, html: &str, crawled_at: String) -> ArticleRecord {
        let document = Html::parse_document(html);

        let title = first_text(&document, &self.title).unwrap_or_else(|| {
            tracing::debug!("No title element on {}", url);
            String::new()
        });
        let content = first_text(&document, &self.content).unwrap_or_else(|| {
            tracing::debug!("No content element on {}", url);
            String::new()
        });

        ArticleRecord {
            crawled_at,
            title,
            url: url.to_string(),
            content,
        }
    }
}

fn parse_selector(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector)
        .map_err(|e| ConfigError::InvalidPattern(format!("selector '{}': {:?}", selector, e)))
}

/// Text of the first element matching `selector`, or None if nothing matches
fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document.select(selector).next().map(visible_text)
}

/// Visible text of an element
///
/// Each text node is trimmed with inner whitespace collapsed to one space,
/// empty nodes are dropped, and the rest are concatenated with no separator.
pub fn visible_text(element: ElementRef<'_>) -> String {
    let mut text = String::new();

    for node in element.descendants() {
        let Some(fragment) = node.value().as_text() else {
            continue;
        };

        let hidden = node
            .parent()
            .and_then(|parent| parent.value().as_element().map(|e| e.name()))
            .map(|name| HIDDEN_ELEMENTS.contains(&name))
            .unwrap_or(false);
        if hidden {
            continue;
        }

        let mut words = fragment.split_whitespace();
        if let Some(first) = words.next() {
            text.push_str(first);
            for word in words {
                text.push(' ');
                text.push_str(word);
            }
        }
    }

    text
}
