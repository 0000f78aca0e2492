//! CSV export of stored listings.

use std::io::Write;
use std::path::Path;

use crate::repository::{RecordStore, Result, StoredListing};

/// Header row, in column order.
pub const CSV_HEADER: [&str; 11] = [
    "model_name",
    "model_year",
    "kms_driven",
    "owner",
    "location",
    "mileage",
    "engine",
    "power",
    "wheel_size",
    "price",
    "source",
];

fn to_csv_record(stored: &StoredListing) -> [&str; 11] {
    let l = &stored.listing;
    [
        l.model_name.as_str(),
        l.model_year.as_str(),
        l.kms_driven.as_str(),
        l.owner.as_str(),
        l.location.as_str(),
        l.mileage.as_deref().unwrap_or(""),
        l.engine.as_deref().unwrap_or(""),
        l.power.as_deref().unwrap_or(""),
        l.wheel_size.as_deref().unwrap_or(""),
        l.price.as_str(),
        l.source.as_str(),
    ]
}

/// Write every listing, optionally filtered by source, to `writer`.
pub fn write_csv<W: Write>(store: &RecordStore, source: Option<&str>, writer: W) -> Result<u64> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CSV_HEADER)?;

    let mut rows = 0;
    for stored in store.listings().all()? {
        if source.is_some_and(|s| s != stored.listing.source) {
            continue;
        }
        wtr.write_record(to_csv_record(&stored))?;
        rows += 1;
    }
    wtr.flush()?;
    Ok(rows)
}

/// Export listings to a CSV file at `path`.
pub fn export_csv(store: &RecordStore, source: Option<&str>, path: &Path) -> Result<u64> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    write_csv(store, source, file)
}
