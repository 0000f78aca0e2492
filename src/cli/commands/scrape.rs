//! Scrape command.

use std::time::Duration;

use console::style;

use crate::config::{Config, Settings};
use crate::repository::RecordStore;
use crate::scrapers::{BrowserFetcher, HttpClient, Orchestrator, RunReport, SourceState};

/// Scrape the named sources, or every enabled source when none are named.
///
/// Naming a disabled source runs it anyway.
pub async fn cmd_scrape(settings: &Settings, config: &Config, names: &[String]) -> anyhow::Result<()> {
    let mut sources = config.sources();
    if !names.is_empty() {
        if let Some(unknown) = names.iter().find(|n| !sources.iter().any(|s| &s.name == *n)) {
            anyhow::bail!(
                "unknown source '{}'; see 'bikeacquire source list'",
                unknown
            );
        }
        sources.retain(|s| names.contains(&s.name));
        for source in &mut sources {
            source.enabled = true;
        }
    }

    let store = RecordStore::open(&settings.database_path())?;
    let client = HttpClient::new(
        Duration::from_secs(settings.request_timeout),
        settings.user_agent.as_deref(),
    )?;
    let renderer = BrowserFetcher::new(settings.browser.clone());

    let orchestrator = Orchestrator::new(&client, &store).with_renderer(&renderer);
    let report = orchestrator.run_all(&sources).await;

    print_report(&report);
    Ok(())
}

fn print_report(report: &RunReport) {
    println!("\n{}", style("Scrape Summary").bold());
    println!("{}", "-".repeat(78));
    println!(
        "{:<30} {:<9} {:>6} {:>8} {:>7} {:>7} {:>7}",
        "Source", "State", "Pages", "Stored", "Failed", "Seen", "Dropped"
    );
    println!("{}", "-".repeat(78));

    for run in &report.sources {
        let state = match run.state {
            SourceState::Done if run.pages_failed == 0 => style(run.state.to_string()).green(),
            SourceState::Done => style(run.state.to_string()).yellow(),
            _ => style(run.state.to_string()).red(),
        };
        println!(
            "{:<30} {:<9} {:>6} {:>8} {:>7} {:>7} {:>7}",
            run.label(),
            state,
            run.page_count,
            run.listings_persisted,
            run.pages_failed + run.details_failed,
            run.pages_skipped + run.details_skipped,
            run.records_discarded
        );
    }

    println!("{}", "-".repeat(78));
    println!(
        "{} {} listings stored, {} sources skipped",
        style("✓").green(),
        report.listings_persisted(),
        report.skipped_sources()
    );
}
