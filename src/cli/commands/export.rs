//! CSV export command.

use std::path::Path;

use console::style;

use crate::config::Settings;
use crate::export::export_csv;
use crate::repository::RecordStore;

pub async fn cmd_export(settings: &Settings, path: &Path, source: Option<&str>) -> anyhow::Result<()> {
    if !settings.database_exists() {
        anyhow::bail!(
            "no database at {}; run 'bikeacquire scrape' first",
            settings.database_path().display()
        );
    }

    let store = RecordStore::open(&settings.database_path())?;
    let rows = export_csv(&store, source, path)?;

    println!(
        "{} Exported {} listings to {}",
        style("✓").green(),
        rows,
        path.display()
    );
    Ok(())
}
