//! Per-site record extraction.
//!
//! Each source carries one [`ExtractorConfig`] variant. Extraction turns a
//! fetched body into one result per record container: a record with a
//! missing required field becomes a [`FieldError`] and is dropped by the
//! caller without affecting its siblings. A body missing its structural
//! container is a [`ParseError`] for the whole page.

pub mod api_detail;
pub mod browser_rendered;
pub mod computed_count;
pub mod json;
pub mod static_list;

use serde::{Deserialize, Serialize};

use super::error::{FieldError, ParseError};
use crate::models::Listing;

pub use api_detail::ApiDetailConfig;
pub use browser_rendered::BrowserRenderedSelectors;
pub use computed_count::ComputedCountSelectors;
pub use static_list::StaticListSelectors;

/// Records extracted from one page, in document order.
pub type Extracted = Vec<Result<Listing, FieldError>>;

/// Site-specific extraction rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractorConfig {
    /// Server-rendered list with positional detail labels.
    StaticList(StaticListSelectors),
    /// Server-rendered widgets whose listing count is advertised in a heading.
    ComputedCount(ComputedCountSelectors),
    /// Client-rendered cards captured after scrolling in a browser.
    BrowserRendered(BrowserRenderedSelectors),
    /// JSON search API followed by per-listing detail pages.
    ApiDetail(ApiDetailConfig),
}

impl ExtractorConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractorConfig::StaticList(_) => "static_list",
            ExtractorConfig::ComputedCount(_) => "computed_count",
            ExtractorConfig::BrowserRendered(_) => "browser_rendered",
            ExtractorConfig::ApiDetail(_) => "api_detail",
        }
    }

    /// Extract every record from a listing page body.
    ///
    /// [`ExtractorConfig::ApiDetail`] sources have no listing pages; they
    /// are walked record by record through [`api_detail`].
    pub fn extract(&self, source: &str, body: &str) -> Result<Extracted, ParseError> {
        match self {
            ExtractorConfig::StaticList(s) => static_list::extract(s, source, body),
            ExtractorConfig::ComputedCount(s) => computed_count::extract(s, source, body),
            ExtractorConfig::BrowserRendered(s) => browser_rendered::extract(s, source, body),
            ExtractorConfig::ApiDetail(_) => Err(ParseError::NotAListingPage { kind: self.kind() }),
        }
    }
}

/// Positional label lookup that names the field on failure.
pub(crate) fn label_at(
    labels: &[String],
    index: usize,
    field: &'static str,
) -> Result<String, FieldError> {
    match labels.get(index) {
        Some(text) if !text.is_empty() => Ok(text.clone()),
        Some(_) => Err(FieldError::missing(field)),
        None => Err(FieldError::with_detail(
            field,
            format!("only {} labels present", labels.len()),
        )),
    }
}
