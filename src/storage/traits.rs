//! Storage traits and error types
//!
//! This module defines the trait interface for dataset backends and
//! associated error types.

use crate::storage::Dataset;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during dataset operations
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Dataset {path} is corrupt: {message}")]
    Corrupt { path: PathBuf, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DatasetError {
    pub(crate) fn corrupt(path: &Path, message: impl Into<String>) -> Self {
        Self::Corrupt {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}

/// Result type for dataset operations
pub type DatasetResult<T> = Result<T, DatasetError>;

/// Trait for dataset backend implementations
///
/// A backend persists the whole dataset: `load` reads every row into memory
/// and `save` replaces the stored rows with the given dataset.
pub trait DatasetStore {
    /// Reads the persisted dataset
    ///
    /// A missing store is an empty dataset. A store that exists but does not
    /// match the article schema is reported as `DatasetError::Corrupt`.
    fn load(&self) -> DatasetResult<Dataset>;

    /// Replaces the persisted dataset
    ///
    /// # Returns
    ///
    /// The number of rows written
    fn save(&mut self, dataset: &Dataset) -> DatasetResult<usize>;

    /// Where this backend keeps its data
    fn location(&self) -> &Path;
}
