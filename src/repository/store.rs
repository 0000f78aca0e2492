//! Record store combining listings and visited markers.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::debug;

use super::listing::{init_listings_table, insert_listing};
use super::visited::{init_visited_table, insert_visited};
use super::{ListingRepository, Result, VisitedRepository};
use crate::models::Listing;

/// Durable store owning the `listings` and `visited` tables.
#[derive(Debug, Clone)]
pub struct RecordStore {
    db_path: PathBuf,
    listings: ListingRepository,
    visited: VisitedRepository,
}

impl RecordStore {
    /// Open (and create if missing) the store at `db_path`.
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = super::connect(db_path)?;
        init_listings_table(&conn)?;
        init_visited_table(&conn)?;
        drop(conn);

        Ok(Self {
            db_path: db_path.to_path_buf(),
            listings: ListingRepository::new(db_path)?,
            visited: VisitedRepository::new(db_path)?,
        })
    }

    pub fn listings(&self) -> &ListingRepository {
        &self.listings
    }

    pub fn visited(&self) -> &VisitedRepository {
        &self.visited
    }

    /// Persist one unit of work atomically.
    ///
    /// All `listings` are appended and `visited_key` (if any) is recorded in
    /// the same transaction, so a marker never exists without its rows.
    pub fn commit(&self, listings: &[Listing], visited_key: Option<&str>) -> Result<usize> {
        let mut conn = super::connect(&self.db_path)?;
        let tx = conn.transaction()?;
        let now = Utc::now();

        for listing in listings {
            insert_listing(&tx, listing, now)?;
        }
        if let Some(key) = visited_key {
            if !insert_visited(&tx, key, now)? {
                debug!("Visited marker already present: {}", key);
            }
        }

        tx.commit()?;
        Ok(listings.len())
    }
}
