//! Status command.

use console::style;

use crate::config::Settings;
use crate::repository::RecordStore;

/// Show listing and visited counts.
pub async fn cmd_status(settings: &Settings) -> anyhow::Result<()> {
    if !settings.database_exists() {
        println!(
            "{} No database at {}. Run 'bikeacquire scrape' first.",
            style("!").yellow(),
            settings.database_path().display()
        );
        return Ok(());
    }

    let store = RecordStore::open(&settings.database_path())?;

    println!("\n{}", style("bikeacquire Status").bold());
    println!("{}", "-".repeat(40));
    println!("{:<20} {}", "Data Directory:", settings.data_dir.display());
    println!("{:<20} {}", "Total Listings:", store.listings().count()?);
    for (source, count) in store.listings().count_by_source()? {
        println!("{:<20} {}", format!("  {}:", source), count);
    }
    println!("{:<20} {}", "Visited URLs:", store.visited().count()?);
    if let Some(last) = store.listings().latest()? {
        println!(
            "{:<20} {} ({})",
            "Last Listing:",
            last.scraped_at.format("%Y-%m-%d %H:%M UTC"),
            last.listing.source
        );
    }

    Ok(())
}
