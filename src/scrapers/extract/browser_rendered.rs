//! Cards captured from a browser-rendered, infinitely scrolling listing page.

use scraper::Html;
use serde::{Deserialize, Serialize};

use super::{label_at, Extracted};
use crate::models::{Listing, ListingDraft};
use crate::scrapers::error::{FieldError, ParseError};
use crate::utils::html::{all_texts, first_text, parse_selector};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserRenderedSelectors {
    pub item: String,
    /// "<year> <model name>" heading.
    pub title: String,
    pub price: String,
    pub info: String,
    pub kms_index: usize,
    pub owner_index: usize,
    /// The site lists a single city, so location is not on the card.
    pub location: String,
}

impl Default for BrowserRenderedSelectors {
    fn default() -> Self {
        Self {
            item: "div.col-4".to_string(),
            title: "h5".to_string(),
            price: "h3".to_string(),
            info: "p span".to_string(),
            kms_index: 0,
            owner_index: 1,
            location: "Delhi".to_string(),
        }
    }
}

/// Extract cards from captured markup.
///
/// The capture is usually an inner-HTML fragment rather than a document,
/// so an empty capture yields no records instead of a parse error.
pub fn extract(
    sel: &BrowserRenderedSelectors,
    source: &str,
    body: &str,
) -> Result<Extracted, ParseError> {
    let item = parse_selector(&sel.item)?;
    let title = parse_selector(&sel.title)?;
    let price = parse_selector(&sel.price)?;
    let info = parse_selector(&sel.info)?;

    let fragment = Html::parse_fragment(body);

    Ok(fragment
        .select(&item)
        .map(|card| -> Result<Listing, FieldError> {
            let mut draft = ListingDraft::new(source);
            let heading = first_text(card, &title).ok_or(FieldError::missing("model_name"))?;
            draft.set_year_and_model(&heading);
            draft.price = first_text(card, &price);

            let facts = all_texts(card, &info);
            draft.kms_driven = Some(label_at(&facts, sel.kms_index, "kms_driven")?);
            draft.owner = Some(label_at(&facts, sel.owner_index, "owner")?);
            draft.location = Some(sel.location.clone());

            Listing::try_from(draft)
        })
        .collect())
}
