//! SQLite dataset backend
//!
//! Keeps the same four columns as the CSV file, keyed by URL, with a
//! `position` column preserving dataset order. A save rewrites the table
//! in one transaction, so a failed save leaves the previous rows intact.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{DatasetError, DatasetResult, DatasetStore};
use crate::storage::{ArticleRecord, Dataset};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};

/// SQLite storage backend
pub struct SqliteDataset {
    conn: Connection,
    path: PathBuf,
}

impl SqliteDataset {
    /// Opens or creates the database at `path`
    ///
    /// A file that is not a SQLite database is reported as corrupt.
    pub fn open(path: &Path) -> DatasetResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
        ",
        )
        .and_then(|_| initialize_schema(&conn))
        .map_err(|e| DatasetError::corrupt(path, e.to_string()))?;

        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> DatasetResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn,
            path: PathBuf::from(":memory:"),
        })
    }
}

impl DatasetStore for SqliteDataset {
    fn load(&self) -> DatasetResult<Dataset> {
        let mut stmt = self.conn.prepare(
            "SELECT crawled_at, title, url, content FROM articles ORDER BY position, url",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(ArticleRecord {
                crawled_at: row.get(0)?,
                title: row.get(1)?,
                url: row.get(2)?,
                content: row.get(3)?,
            })
        })?;

        let mut dataset = Dataset::new();
        for row in rows {
            dataset.upsert(row?);
        }
        Ok(dataset)
    }

    fn save(&mut self, dataset: &Dataset) -> DatasetResult<usize> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM articles", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO articles (url, crawled_at, title, content, position)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;

            for (position, record) in dataset.iter().enumerate() {
                stmt.execute(params![
                    record.url,
                    record.crawled_at,
                    record.title,
                    record.content,
                    position as i64
                ])?;
            }
        }
        tx.commit()?;

        Ok(dataset.len())
    }

    fn location(&self) -> &Path {
        &self.path
    }
}
