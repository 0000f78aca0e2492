//! Page count derivation and page URL construction.

use scraper::Html;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::{PageCountError, ParseError};
use super::http_client::{CookieMap, Fetcher};
use crate::utils::html::{element_text, parse_selector};

/// How many listing pages a source has.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum PaginationStrategy {
    /// A constant number of pages.
    Fixed { pages: u32 },
    /// `floor(advertised total / page_size)`, read from the index page.
    Computed {
        page_size: u32,
        total_selector: String,
    },
    /// One page at `base_url`; used by sources that paginate internally.
    #[default]
    SingleVirtualPage,
}

impl PaginationStrategy {
    /// Resolve the number of pages to iterate.
    ///
    /// Only [`PaginationStrategy::Computed`] performs a fetch.
    pub async fn page_count(
        &self,
        base_url: &str,
        cookies: &CookieMap,
        fetcher: &dyn Fetcher,
    ) -> Result<u32, PageCountError> {
        match self {
            PaginationStrategy::Fixed { pages } => Ok(*pages),
            PaginationStrategy::SingleVirtualPage => Ok(1),
            PaginationStrategy::Computed {
                page_size,
                total_selector,
            } => {
                let body = fetcher.fetch(base_url, cookies).await?;
                let total = parse_advertised_total(&body, total_selector)?;
                debug!("{} advertises {} listings", base_url, total);
                Ok(pages_for_total(total, *page_size))
            }
        }
    }

    /// URL of the zero-based `page_index`.
    pub fn page_url(&self, base_url: &str, template: &str, page_index: u32) -> String {
        match self {
            PaginationStrategy::SingleVirtualPage => base_url.to_string(),
            PaginationStrategy::Fixed { .. } | PaginationStrategy::Computed { .. } => format!(
                "{}{}",
                base_url,
                template.replace("{page}", &(page_index + 1).to_string())
            ),
        }
    }
}

/// Read the listing total advertised in a heading like "1,234 Used Bikes".
pub fn parse_advertised_total(body: &str, selector: &str) -> Result<u64, PageCountError> {
    let sel = parse_selector(selector)?;
    let document = Html::parse_document(body);
    let heading = document
        .select(&sel)
        .next()
        .map(element_text)
        .ok_or_else(|| ParseError::MissingElement {
            selector: selector.to_string(),
        })?;

    let token = heading.split_whitespace().next().unwrap_or_default();
    token
        .replace(',', "")
        .parse::<u64>()
        .map_err(|_| PageCountError::Unparseable { text: heading.clone() })
}

/// Whole pages only; a partial trailing page is not visited.
pub fn pages_for_total(total: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    u32::try_from(total / u64::from(page_size)).unwrap_or(u32::MAX)
}
