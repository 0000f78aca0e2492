//! bikeacquire - used motorcycle listing acquisition.
//!
//! Scrapes used-bike marketplaces into a local SQLite database, one page
//! at a time, resuming where an interrupted run left off.

pub mod cli;
pub mod config;
pub mod export;
pub mod models;
pub mod repository;
pub mod scrapers;
pub mod sources;
pub mod utils;
