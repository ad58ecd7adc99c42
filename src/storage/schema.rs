//! Database schema definitions
//!
//! This module contains the SQL schema for the SQLite dataset backend.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per article URL
CREATE TABLE IF NOT EXISTS articles (
    url TEXT PRIMARY KEY,
    crawled_at TEXT NOT NULL,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    position INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_articles_position ON articles(position);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
