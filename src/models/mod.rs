//! Data models for bikeacquire.

mod listing;

pub use listing::{FieldError, Listing, ListingDraft};
