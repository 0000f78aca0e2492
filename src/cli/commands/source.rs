//! Source management commands.

use console::style;

use crate::config::Config;
use crate::scrapers::{PaginationStrategy, Transport};

use super::helpers::truncate;

fn describe_pagination(p: &PaginationStrategy) -> String {
    match p {
        PaginationStrategy::Fixed { pages } => format!("{} pages", pages),
        PaginationStrategy::Computed { page_size, .. } => format!("total / {}", page_size),
        PaginationStrategy::SingleVirtualPage => "single".to_string(),
    }
}

/// List configured sources.
pub async fn cmd_source_list(config: &Config) -> anyhow::Result<()> {
    let sources = config.sources();

    println!("\n{}", style("Listing Sources").bold());
    println!("{}", "-".repeat(86));
    println!(
        "{:<16} {:<17} {:<8} {:<12} {:<9} URL",
        "Name", "Extractor", "Via", "Pages", "Contexts"
    );
    println!("{}", "-".repeat(86));

    for source in sources {
        let name = if source.enabled {
            style(source.name.clone())
        } else {
            style(format!("{} (off)", source.name)).dim()
        };
        let via = match source.transport {
            Transport::Http => "http",
            Transport::Browser => "browser",
        };
        let contexts = source
            .context
            .as_ref()
            .map(|c| c.values.len().to_string())
            .unwrap_or_else(|| "-".to_string());

        println!(
            "{:<16} {:<17} {:<8} {:<12} {:<9} {}",
            name,
            source.extractor.kind(),
            via,
            describe_pagination(&source.pagination),
            contexts,
            truncate(&source.base_url, 48)
        );
    }

    Ok(())
}
