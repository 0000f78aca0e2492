//! Persistent visited-URL checks.

use crate::repository::{Result, VisitedRepository};

/// Decides whether a unit of work already completed in an earlier run.
///
/// Marking happens inside [`crate::repository::RecordStore::commit`] so the
/// marker lands with the unit's listings.
pub struct Deduplicator<'a> {
    visited: &'a VisitedRepository,
}

impl<'a> Deduplicator<'a> {
    pub fn new(visited: &'a VisitedRepository) -> Self {
        Self { visited }
    }

    pub fn is_visited(&self, key: &str) -> Result<bool> {
        self.visited.contains(key)
    }
}
