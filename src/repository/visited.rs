//! Visited URL markers.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use super::Result;

pub(crate) fn init_visited_table(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS visited (
            link TEXT PRIMARY KEY,
            visited_at TEXT NOT NULL
        );
    "#,
    )
}

/// Insert a marker. Returns false if the link was already present.
pub(crate) fn insert_visited(
    conn: &Connection,
    link: &str,
    visited_at: DateTime<Utc>,
) -> rusqlite::Result<bool> {
    let rows = conn.execute(
        "INSERT OR IGNORE INTO visited (link, visited_at) VALUES (?1, ?2)",
        params![link, visited_at.to_rfc3339()],
    )?;
    Ok(rows > 0)
}

/// SQLite-backed visited-URL repository.
#[derive(Debug, Clone)]
pub struct VisitedRepository {
    db_path: PathBuf,
}

impl VisitedRepository {
    /// Create a new visited repository, creating the table if needed.
    pub fn new(db_path: &Path) -> Result<Self> {
        let repo = Self {
            db_path: db_path.to_path_buf(),
        };
        let conn = repo.connect()?;
        init_visited_table(&conn)?;
        Ok(repo)
    }

    fn connect(&self) -> Result<Connection> {
        super::connect(&self.db_path)
    }

    /// Check whether a link has been recorded.
    pub fn contains(&self, link: &str) -> Result<bool> {
        let conn = self.connect()?;
        let found = super::to_option(conn.query_row(
            "SELECT 1 FROM visited WHERE link = ?1",
            params![link],
            |row| row.get::<_, i64>(0),
        ))?;
        Ok(found.is_some())
    }

    /// Number of recorded links.
    pub fn count(&self) -> Result<u64> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM visited", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// All recorded links in insertion order.
    pub fn all(&self) -> Result<Vec<String>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT link FROM visited ORDER BY rowid")?;
        let links = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(links)
    }
}
