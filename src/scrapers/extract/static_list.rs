//! Server-rendered list pages with positional detail labels.

use scraper::Html;
use serde::{Deserialize, Serialize};

use super::{label_at, Extracted};
use crate::models::{Listing, ListingDraft};
use crate::scrapers::error::{FieldError, ParseError};
use crate::utils::html::{all_texts, first_text, parse_selector};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticListSelectors {
    /// Record list container; its absence fails the page.
    pub container: String,
    pub item: String,
    /// Title heading holding a separated "maker, model, variant" string.
    pub title: String,
    pub title_separator: String,
    /// Zero-based segment of the title that is the model name.
    pub title_segment: usize,
    /// Detail labels, in order: year, kms, owner, location.
    pub labels: String,
    pub price: String,
}

impl Default for StaticListSelectors {
    fn default() -> Self {
        Self {
            container: "ul#used-bikes-list".to_string(),
            item: "li".to_string(),
            title: "h2".to_string(),
            title_separator: ",".to_string(),
            title_segment: 1,
            labels: "span.model-details-label".to_string(),
            price: "span.font22".to_string(),
        }
    }
}

pub fn extract(
    sel: &StaticListSelectors,
    source: &str,
    body: &str,
) -> Result<Extracted, ParseError> {
    let container = parse_selector(&sel.container)?;
    let item = parse_selector(&sel.item)?;
    let title = parse_selector(&sel.title)?;
    let labels = parse_selector(&sel.labels)?;
    let price = parse_selector(&sel.price)?;

    let document = Html::parse_document(body);
    let list = document
        .select(&container)
        .next()
        .ok_or_else(|| ParseError::MissingElement {
            selector: sel.container.clone(),
        })?;

    Ok(list
        .select(&item)
        .map(|element| -> Result<Listing, FieldError> {
            let mut draft = ListingDraft::new(source);

            let heading = first_text(element, &title).ok_or(FieldError::missing("model_name"))?;
            let model = heading
                .split(sel.title_separator.as_str())
                .nth(sel.title_segment)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| {
                    FieldError::with_detail(
                        "model_name",
                        format!("title `{}` has no segment {}", heading, sel.title_segment),
                    )
                })?;
            draft.model_name = Some(model.to_string());

            let texts = all_texts(element, &labels);
            draft.model_year = Some(label_at(&texts, 0, "model_year")?);
            draft.kms_driven = Some(label_at(&texts, 1, "kms_driven")?);
            draft.owner = Some(label_at(&texts, 2, "owner")?);
            draft.location = Some(label_at(&texts, 3, "location")?);
            draft.price = first_text(element, &price);

            Listing::try_from(draft)
        })
        .collect())
}
