//! SQLite table of uploaded documents and their extracted text
//!
//! The table is append-only: rows are inserted on upload and never updated or
//! deleted.

use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::types::DocumentRecord;

/// SQLite-backed document store
#[derive(Clone)]
pub struct DocumentDb {
    conn: Arc<Mutex<Connection>>,
}

impl DocumentDb {
    /// Create or open the database at the given path
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::store(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        let conn = Connection::open(path)
            .map_err(|e| Error::store(format!("Failed to open database: {}", e)))?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.migrate()?;
        tracing::info!("Document store ready at {}", path.display());
        Ok(db)
    }

    /// Create an in-memory database (for testing)
    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::store(format!("Failed to open in-memory database: {}", e)))?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.migrate()?;
        Ok(db)
    }

    /// Run database migrations
    fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;

            CREATE TABLE IF NOT EXISTS user_document (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                filename TEXT NOT NULL,
                content TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL
            );
            "#,
        )
        .map_err(|e| Error::store(format!("Failed to run migrations: {}", e)))?;

        Ok(())
    }

    /// Append a document; the id is assigned by SQLite
    pub fn save(&self, filename: &str, content: &str) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute(
            "INSERT INTO user_document (filename, content, created_at) VALUES (?1, ?2, ?3)",
            params![filename, content, Utc::now()],
        )
        .map_err(|e| Error::store(format!("Failed to save document: {}", e)))?;

        tracing::debug!("Stored '{}' ({} chars)", filename, content.len());
        Ok(())
    }

    /// Content of the most recently stored document
    pub fn fetch_latest(&self) -> Result<Option<String>> {
        let conn = self.conn.lock();

        conn.query_row(
            "SELECT content FROM user_document ORDER BY id DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| Error::store(format!("Failed to fetch latest document: {}", e)))
    }

    /// Most recently stored record, with metadata
    pub fn latest_record(&self) -> Result<Option<DocumentRecord>> {
        let conn = self.conn.lock();

        conn.query_row(
            "SELECT id, filename, content, created_at FROM user_document ORDER BY id DESC LIMIT 1",
            [],
            row_to_record,
        )
        .optional()
        .map_err(|e| Error::store(format!("Failed to fetch latest document: {}", e)))
    }

    /// `(filename, content)` of every document whose content contains `query`.
    ///
    /// Matching is case-sensitive: `instr` compares bytes, unlike SQLite's
    /// `LIKE`, which folds ASCII case. Results come back in insertion order.
    pub fn search(&self, query: &str) -> Result<Vec<(String, String)>> {
        let conn = self.conn.lock();

        let mut stmt = conn
            .prepare(
                "SELECT filename, content FROM user_document \
                 WHERE instr(content, ?1) > 0 ORDER BY id ASC",
            )
            .map_err(|e| Error::store(format!("Failed to prepare search: {}", e)))?;

        let rows = stmt
            .query_map(params![query], |row| Ok((row.get(0)?, row.get(1)?)))
            .map_err(|e| Error::store(format!("Failed to search documents: {}", e)))?;

        let mut results = Vec::new();
        for row in rows {
            match row {
                Ok(r) => results.push(r),
                Err(e) => tracing::warn!("Error reading search result: {}", e),
            }
        }

        Ok(results)
    }

    /// Number of stored documents
    pub fn count(&self) -> Result<usize> {
        let conn = self.conn.lock();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM user_document", [], |row| row.get(0))
            .map_err(|e| Error::store(format!("Failed to count documents: {}", e)))?;

        Ok(count as usize)
    }
}

fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<DocumentRecord> {
    Ok(DocumentRecord {
        id: row.get(0)?,
        filename: row.get(1)?,
        content: row.get(2)?,
        created_at: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::TextExtractor;

    #[test]
    fn test_empty_store() {
        let db = DocumentDb::in_memory().unwrap();
        assert_eq!(db.fetch_latest().unwrap(), None);
        assert!(db.search("anything").unwrap().is_empty());
        assert_eq!(db.count().unwrap(), 0);
    }

    #[test]
    fn test_fetch_latest_returns_highest_id() {
        let db = DocumentDb::in_memory().unwrap();
        db.save("a.txt", "first").unwrap();
        db.save("b.txt", "second").unwrap();
        db.save("a.txt", "third").unwrap();

        assert_eq!(db.fetch_latest().unwrap().as_deref(), Some("third"));
        assert_eq!(db.count().unwrap(), 3);

        let record = db.latest_record().unwrap().unwrap();
        assert_eq!(record.id, 3);
        assert_eq!(record.filename, "a.txt");
    }

    #[test]
    fn test_empty_content_is_kept() {
        let db = DocumentDb::in_memory().unwrap();
        db.save("scan.pdf", "").unwrap();
        assert_eq!(db.fetch_latest().unwrap().as_deref(), Some(""));
    }

    #[test]
    fn test_search_is_case_sensitive() {
        let db = DocumentDb::in_memory().unwrap();
        db.save("hello.txt", "Hello World").unwrap();

        let hits = db.search("World").unwrap();
        assert_eq!(hits, vec![("hello.txt".to_string(), "Hello World".to_string())]);
        assert!(db.search("world").unwrap().is_empty());
    }

    #[test]
    fn test_search_treats_like_wildcards_literally() {
        let db = DocumentDb::in_memory().unwrap();
        db.save("a.txt", "100% sure").unwrap();
        db.save("b.txt", "100 percent").unwrap();

        let hits = db.search("0%").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, "a.txt");
    }

    #[test]
    fn test_search_returns_all_matches_in_insertion_order() {
        let db = DocumentDb::in_memory().unwrap();
        db.save("one.txt", "rust is fast").unwrap();
        db.save("two.txt", "python is slow").unwrap();
        db.save("three.txt", "rust is safe").unwrap();

        let names: Vec<String> = db.search("rust").unwrap().into_iter().map(|(f, _)| f).collect();
        assert_eq!(names, vec!["one.txt", "three.txt"]);
    }

    #[test]
    fn test_extract_store_fetch_round_trip() {
        let db = DocumentDb::in_memory().unwrap();
        let text = TextExtractor::extract("sky.txt", "The sky is blue.\n".as_bytes()).unwrap();
        db.save("sky.txt", &text).unwrap();
        assert_eq!(db.fetch_latest().unwrap(), Some(text));
    }

    #[test]
    fn test_file_database_persists_across_handles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("documents.db");

        {
            let db = DocumentDb::new(&path).unwrap();
            db.save("kept.txt", "still here").unwrap();
        }

        let reopened = DocumentDb::new(&path).unwrap();
        assert_eq!(reopened.fetch_latest().unwrap().as_deref(), Some("still here"));
    }
}
