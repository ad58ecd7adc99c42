//! CSV dataset backend
//!
//! The dataset is a UTF-8, comma-delimited file with the header
//! `crawled_at,title,url,content` and one quoted-as-needed row per article.

use crate::storage::traits::{DatasetError, DatasetResult, DatasetStore};
use crate::storage::{ArticleRecord, Dataset, COLUMNS};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// CSV file backend
pub struct CsvDataset {
    path: PathBuf,
}

impl CsvDataset {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Directory the dataset lives in; save stages its temp file here
    fn directory(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    fn corrupt_at(&self, line: Option<u64>, message: impl std::fmt::Display) -> DatasetError {
        match line {
            Some(line) => DatasetError::corrupt(&self.path, format!("line {}: {}", line, message)),
            None => DatasetError::corrupt(&self.path, message.to_string()),
        }
    }

    fn check_headers(&self, headers: &StringRecord) -> DatasetResult<()> {
        let mut found: Vec<&str> = headers.iter().collect();
        found.sort_unstable();
        let mut expected = COLUMNS.to_vec();
        expected.sort_unstable();

        if found != expected {
            return Err(DatasetError::corrupt(
                &self.path,
                format!(
                    "expected header {}, found {}",
                    COLUMNS.join(","),
                    headers.iter().collect::<Vec<_>>().join(",")
                ),
            ));
        }
        Ok(())
    }
}

impl DatasetStore for CsvDataset {
    fn load(&self) -> DatasetResult<Dataset> {
        if !self.path.exists() {
            return Ok(Dataset::new());
        }

        let file = File::open(&self.path)?;
        if file.metadata()?.len() == 0 {
            return Ok(Dataset::new());
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .from_reader(BufReader::new(file));

        let headers = reader
            .headers()
            .map_err(|e| DatasetError::corrupt(&self.path, format!("unreadable header: {}", e)))?
            .clone();
        self.check_headers(&headers)?;

        let mut dataset = Dataset::new();
        let mut row = StringRecord::new();
        loop {
            let more = reader
                .read_record(&mut row)
                .map_err(|e| self.corrupt_at(e.position().map(|p| p.line()), &e))?;
            if !more {
                break;
            }

            // Quoted fields may span lines, so report where the record starts
            let line = row.position().map(|p| p.line());
            let record: ArticleRecord = row
                .deserialize(Some(&headers))
                .map_err(|e| self.corrupt_at(line, e))?;

            if record.url.is_empty() {
                return Err(self.corrupt_at(line, "empty url"));
            }

            dataset.upsert(record);
        }

        Ok(dataset)
    }

    fn save(&mut self, dataset: &Dataset) -> DatasetResult<usize> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // The temp file is deleted on drop unless it is persisted
        let mut staged = NamedTempFile::new_in(self.directory())?;
        {
            let mut writer = WriterBuilder::new()
                .has_headers(false)
                .from_writer(staged.as_file_mut());
            writer.write_record(COLUMNS)?;
            for record in dataset.iter() {
                writer.serialize(record)?;
            }
            writer.flush()?;
        }
        staged.persist(&self.path).map_err(|e| DatasetError::Io(e.error))?;

        Ok(dataset.len())
    }

    fn location(&self) -> &Path {
        &self.path
    }
}
