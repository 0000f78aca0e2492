//! Listing table.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

use super::{parse_datetime, Result};
use crate::models::Listing;

/// Column order shared by inserts, selects and exports.
pub(crate) const LISTING_COLUMNS: &str = "model_name, model_year, kms_driven, owner, location, \
     mileage, engine, power, wheel_size, price, source, detail_url, scraped_at";

pub(crate) fn init_listings_table(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS listings (
            model_name TEXT NOT NULL,
            model_year VARCHAR(4) NOT NULL,
            kms_driven VARCHAR(20) NOT NULL,
            owner VARCHAR(10) NOT NULL,
            location VARCHAR(60) NOT NULL,
            mileage VARCHAR(20),
            engine VARCHAR(20),
            power VARCHAR(20),
            wheel_size VARCHAR(20),
            price VARCHAR(20) NOT NULL,
            source TEXT NOT NULL,
            detail_url TEXT,
            scraped_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_listings_source ON listings(source);
    "#,
    )
}

pub(crate) fn insert_listing(
    conn: &Connection,
    listing: &Listing,
    scraped_at: DateTime<Utc>,
) -> rusqlite::Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO listings ({LISTING_COLUMNS}) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"
        ),
        params![
            listing.model_name,
            listing.model_year,
            listing.kms_driven,
            listing.owner,
            listing.location,
            listing.mileage,
            listing.engine,
            listing.power,
            listing.wheel_size,
            listing.price,
            listing.source,
            listing.detail_url,
            scraped_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

/// A persisted listing with its insert timestamp.
#[derive(Debug, Clone)]
pub struct StoredListing {
    pub listing: Listing,
    pub scraped_at: DateTime<Utc>,
}

impl StoredListing {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            listing: Listing {
                model_name: row.get("model_name")?,
                model_year: row.get("model_year")?,
                kms_driven: row.get("kms_driven")?,
                owner: row.get("owner")?,
                location: row.get("location")?,
                mileage: row.get("mileage")?,
                engine: row.get("engine")?,
                power: row.get("power")?,
                wheel_size: row.get("wheel_size")?,
                price: row.get("price")?,
                source: row.get("source")?,
                detail_url: row.get("detail_url")?,
            },
            scraped_at: parse_datetime(&row.get::<_, String>("scraped_at")?),
        })
    }
}

/// SQLite-backed listing repository.
#[derive(Debug, Clone)]
pub struct ListingRepository {
    db_path: PathBuf,
}

impl ListingRepository {
    /// Create a new listing repository, creating the table if needed.
    pub fn new(db_path: &Path) -> Result<Self> {
        let repo = Self {
            db_path: db_path.to_path_buf(),
        };
        let conn = repo.connect()?;
        init_listings_table(&conn)?;
        Ok(repo)
    }

    fn connect(&self) -> Result<Connection> {
        super::connect(&self.db_path)
    }

    /// Total number of persisted listings.
    pub fn count(&self) -> Result<u64> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM listings", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Listing counts grouped by source, ordered by source name.
    pub fn count_by_source(&self) -> Result<Vec<(String, u64)>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT source, COUNT(*) FROM listings GROUP BY source ORDER BY source",
        )?;
        let counts = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(counts)
    }

    /// The most recently stored listing.
    pub fn latest(&self) -> Result<Option<StoredListing>> {
        let conn = self.connect()?;
        super::to_option(conn.query_row(
            &format!("SELECT {LISTING_COLUMNS} FROM listings ORDER BY rowid DESC LIMIT 1"),
            [],
            StoredListing::from_row,
        ))
    }

    /// All listings in insertion order.
    pub fn all(&self) -> Result<Vec<StoredListing>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {LISTING_COLUMNS} FROM listings ORDER BY rowid"
        ))?;
        let listings = stmt
            .query_map([], StoredListing::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(listings)
    }
}
