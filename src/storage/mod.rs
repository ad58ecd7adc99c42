//! Storage module for persisting crawled articles
//!
//! This module handles everything on the persistence side of a run:
//! - The `ArticleRecord` row type and the in-memory `Dataset` keyed by URL
//! - CSV and SQLite dataset backends
//! - The read-modify-write merge of newly crawled records

mod csv_store;
mod schema;
mod sqlite;
mod traits;

pub use csv_store::CsvDataset;
pub use sqlite::SqliteDataset;
pub use traits::{DatasetError, DatasetResult, DatasetStore};

use crate::config::{OutputConfig, StorageBackend};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Column order of the persisted dataset
pub const COLUMNS: [&str; 4] = ["crawled_at", "title", "url", "content"];

/// Timestamp format used for `crawled_at`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One crawled article
///
/// Field order matches `COLUMNS`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub crawled_at: String,
    pub title: String,
    pub url: String,
    pub content: String,
}

/// Articles keyed by URL, in insertion order
///
/// Replacing an existing URL keeps the row where it was; new URLs are
/// appended. Row order on disk is therefore stable across runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<ArticleRecord>,
    index: HashMap<String, usize>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the record for `record.url`
    ///
    /// Returns the record that was replaced, if any.
    pub fn upsert(&mut self, record: ArticleRecord) -> Option<ArticleRecord> {
        match self.index.get(&record.url) {
            Some(&position) => Some(std::mem::replace(&mut self.records[position], record)),
            None => {
                self.index.insert(record.url.clone(), self.records.len());
                self.records.push(record);
                None
            }
        }
    }

    pub fn get(&self, url: &str) -> Option<&ArticleRecord> {
        self.index.get(url).map(|&position| &self.records[position])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ArticleRecord> {
        self.records.iter()
    }

    /// Most recent `crawled_at` in the dataset
    ///
    /// The timestamp format sorts lexicographically.
    pub fn latest_crawled_at(&self) -> Option<&str> {
        self.records.iter().map(|r| r.crawled_at.as_str()).max()
    }
}

impl FromIterator<ArticleRecord> for Dataset {
    fn from_iter<I: IntoIterator<Item = ArticleRecord>>(iter: I) -> Self {
        let mut dataset = Dataset::new();
        for record in iter {
            dataset.upsert(record);
        }
        dataset
    }
}

/// Opens the dataset backend named in the output configuration
pub fn open_dataset(config: &OutputConfig) -> DatasetResult<Box<dyn DatasetStore>> {
    let path = Path::new(&config.dataset_path);
    Ok(match config.backend {
        StorageBackend::Csv => Box::new(CsvDataset::new(path)),
        StorageBackend::Sqlite => Box::new(SqliteDataset::open(path)?),
    })
}

/// Merges newly crawled records into the persisted dataset
///
/// Loads the stored dataset, replaces or appends each record by URL (last
/// write wins, whole record) and writes everything back. An empty batch
/// over a non-empty dataset leaves the stored data untouched.
///
/// # Returns
///
/// The size of the merged dataset, not the number of new records
pub fn merge_and_persist(
    store: &mut dyn DatasetStore,
    new_records: Vec<ArticleRecord>,
) -> DatasetResult<usize> {
    let mut dataset = store.load()?;
    let existing = dataset.len();

    if new_records.is_empty() && existing > 0 {
        tracing::debug!("Nothing to merge into {}", store.location().display());
        return Ok(existing);
    }

    let mut replaced = 0;
    for record in new_records {
        if dataset.upsert(record).is_some() {
            replaced += 1;
        }
    }

    tracing::debug!(
        "Merging into {}: {} existing, {} replaced, {} added",
        store.location().display(),
        existing,
        replaced,
        dataset.len() - existing
    );

    store.save(&dataset)
}
