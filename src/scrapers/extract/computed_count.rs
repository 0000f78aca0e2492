//! Server-rendered listing widgets on sites that advertise a result total.

use scraper::Html;
use serde::{Deserialize, Serialize};

use super::{label_at, Extracted};
use crate::models::{Listing, ListingDraft};
use crate::scrapers::error::{FieldError, ParseError};
use crate::utils::html::{all_texts, first_text, parse_selector};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComputedCountSelectors {
    pub container: String,
    pub item: String,
    /// "<year> <model name>" heading.
    pub title: String,
    pub price: String,
    pub location: String,
    pub info: String,
    pub kms_index: usize,
    pub owner_index: usize,
}

impl Default for ComputedCountSelectors {
    fn default() -> Self {
        Self {
            container: "div.clist__main".to_string(),
            item: "div.usedcar-widget".to_string(),
            title: "h4.usedcar-widget__ttl".to_string(),
            price: "div.usedcar-widget__price".to_string(),
            location: "div.usedcar-widget__loc-txt".to_string(),
            info: "ul.usedcar-widget__infolist li".to_string(),
            kms_index: 0,
            owner_index: 2,
        }
    }
}

pub fn extract(
    sel: &ComputedCountSelectors,
    source: &str,
    body: &str,
) -> Result<Extracted, ParseError> {
    let container = parse_selector(&sel.container)?;
    let item = parse_selector(&sel.item)?;
    let title = parse_selector(&sel.title)?;
    let price = parse_selector(&sel.price)?;
    let location = parse_selector(&sel.location)?;
    let info = parse_selector(&sel.info)?;

    let document = Html::parse_document(body);
    let main = document
        .select(&container)
        .next()
        .ok_or_else(|| ParseError::MissingElement {
            selector: sel.container.clone(),
        })?;

    Ok(main
        .select(&item)
        .map(|widget| -> Result<Listing, FieldError> {
            let mut draft = ListingDraft::new(source);
            let heading = first_text(widget, &title).ok_or(FieldError::missing("model_name"))?;
            draft.set_year_and_model(&heading);
            draft.price = first_text(widget, &price);
            draft.location = first_text(widget, &location);

            let facts = all_texts(widget, &info);
            draft.kms_driven = Some(label_at(&facts, sel.kms_index, "kms_driven")?);
            draft.owner = Some(label_at(&facts, sel.owner_index, "owner")?);

            Listing::try_from(draft)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget(title: &str, facts: &[&str], price: &str, loc: &str) -> String {
        let lis: String = facts.iter().map(|f| format!("<li>{}</li>", f)).collect();
        format!(
            r#"<div class="usedcar-widget">
                 <h4 class="usedcar-widget__ttl">{}</h4>
                 <div class="usedcar-widget__price">{}</div>
                 <ul class="usedcar-widget__infolist">{}</ul>
                 <div class="usedcar-widget__loc-txt">{}</div>
               </div>"#,
            title, price, lis, loc
        )
    }

    fn page(widgets: &[String]) -> String {
        format!(
            r#"<html><body><h1 class="title-page">40 Used Bikes</h1>
               <div class="clist__main">{}</div></body></html>"#,
            widgets.concat()
        )
    }

    #[test]
    fn test_extracts_widget_fields() {
        let body = page(&[widget(
            "2019 KTM Duke 200",
            &["15,000 km", "Petrol", "1st Owner"],
            "₹ 1.2 Lakh",
            "New Delhi",
        )]);
        let records = extract(&ComputedCountSelectors::default(), "carandbike.com", &body).unwrap();
        let listing = records[0].as_ref().unwrap();
        assert_eq!(listing.model_year, "2019");
        assert_eq!(listing.model_name, "KTM Duke 200");
        assert_eq!(listing.kms_driven, "15,000 km");
        assert_eq!(listing.owner, "1st Owner");
        assert_eq!(listing.location, "New Delhi");
        assert_eq!(listing.price, "₹ 1.2 Lakh");
    }

    #[test]
    fn test_short_info_list_is_field_error() {
        let body = page(&[
            widget("2018 Honda Activa", &["9,000 km", "Petrol"], "₹ 45,000", "Mumbai"),
            widget("2021 Bajaj Dominar", &["3,000 km", "Petrol", "1st Owner"], "₹ 1.8 Lakh", "Pune"),
        ]);
        let records = extract(&ComputedCountSelectors::default(), "carandbike.com", &body).unwrap();
        assert_eq!(records[0].as_ref().unwrap_err().field, "owner");
        assert_eq!(records[1].as_ref().unwrap().model_name, "Bajaj Dominar");
    }

    #[test]
    fn test_title_with_only_year_is_missing_model() {
        let body = page(&[widget("2018", &["1 km", "Petrol", "1st Owner"], "₹ 1", "Pune")]);
        let records = extract(&ComputedCountSelectors::default(), "carandbike.com", &body).unwrap();
        assert_eq!(records[0].as_ref().unwrap_err().field, "model_name");
    }
}
