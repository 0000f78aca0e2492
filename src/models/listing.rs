//! Normalized listing records.

use serde::{Deserialize, Serialize};

/// A required listing field was missing or empty when a draft was finalized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("missing required field `{field}`{}", fmt_detail(.detail))]
pub struct FieldError {
    pub field: &'static str,
    pub detail: Option<String>,
}

fn fmt_detail(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|d| format!(" ({d})"))
        .unwrap_or_default()
}

impl FieldError {
    pub fn missing(field: &'static str) -> Self {
        Self {
            field,
            detail: None,
        }
    }

    pub fn with_detail(field: &'static str, detail: impl Into<String>) -> Self {
        Self {
            field,
            detail: Some(detail.into()),
        }
    }
}

/// One used-vehicle listing, ready to persist.
///
/// Every required field is non-empty. Optional fields are only present for
/// sources that expose a detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub model_name: String,
    pub model_year: String,
    pub kms_driven: String,
    pub owner: String,
    pub location: String,
    pub price: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mileage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wheel_size: Option<String>,
    /// Name of the source this listing was scraped from.
    pub source: String,
    /// Detail page the optional fields came from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail_url: Option<String>,
}

/// Partially-filled listing built field by field by an extractor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingDraft {
    pub model_name: Option<String>,
    pub model_year: Option<String>,
    pub kms_driven: Option<String>,
    pub owner: Option<String>,
    pub location: Option<String>,
    pub price: Option<String>,
    pub mileage: Option<String>,
    pub engine: Option<String>,
    pub power: Option<String>,
    pub wheel_size: Option<String>,
    pub source: String,
    pub detail_url: Option<String>,
}

impl ListingDraft {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            ..Default::default()
        }
    }

    /// Split a combined "<year> <model name>" title.
    ///
    /// The first whitespace token is the year, the remainder the model name.
    pub fn set_year_and_model(&mut self, title: &str) {
        let mut tokens = title.split_whitespace();
        if let Some(year) = tokens.next() {
            self.model_year = Some(year.to_string());
        }
        let rest = tokens.collect::<Vec<_>>().join(" ");
        if !rest.is_empty() {
            self.model_name = Some(rest);
        }
    }

    /// Fill fields that are still unset from another draft.
    pub fn fill_from(&mut self, other: ListingDraft) {
        fn fill(slot: &mut Option<String>, value: Option<String>) {
            if slot.is_none() {
                *slot = value;
            }
        }
        fill(&mut self.model_name, other.model_name);
        fill(&mut self.model_year, other.model_year);
        fill(&mut self.kms_driven, other.kms_driven);
        fill(&mut self.owner, other.owner);
        fill(&mut self.location, other.location);
        fill(&mut self.price, other.price);
        fill(&mut self.mileage, other.mileage);
        fill(&mut self.engine, other.engine);
        fill(&mut self.power, other.power);
        fill(&mut self.wheel_size, other.wheel_size);
        fill(&mut self.detail_url, other.detail_url);
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, FieldError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(FieldError::missing(field)),
    }
}

fn optional(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl TryFrom<ListingDraft> for Listing {
    type Error = FieldError;

    fn try_from(draft: ListingDraft) -> Result<Self, Self::Error> {
        Ok(Listing {
            model_name: required(draft.model_name, "model_name")?,
            model_year: required(draft.model_year, "model_year")?,
            kms_driven: required(draft.kms_driven, "kms_driven")?,
            owner: required(draft.owner, "owner")?,
            location: required(draft.location, "location")?,
            price: required(draft.price, "price")?,
            mileage: optional(draft.mileage),
            engine: optional(draft.engine),
            power: optional(draft.power),
            wheel_size: optional(draft.wheel_size),
            source: draft.source,
            detail_url: draft.detail_url,
        })
    }
}
