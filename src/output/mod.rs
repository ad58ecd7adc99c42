//! Output module for run reports
//!
//! This module handles:
//! - The end-of-run summary (links, saved articles, failures)
//! - Statistics over a persisted dataset

pub mod stats;

pub use stats::{
    load_statistics, log_run_summary, print_statistics, ArticleFailure, DatasetStatistics,
    RunSummary,
};
