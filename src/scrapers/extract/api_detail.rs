//! Two-phase extraction: a JSON search API, then one detail page per record.

use scraper::Html;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use super::json::{extract_path, render_template, resolve_url, value_text};
use crate::models::ListingDraft;
use crate::scrapers::error::ParseError;
use crate::utils::html::{collapse_whitespace, element_text, parse_selector};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiDetailConfig {
    /// Query parameter carrying the 1-based API page number.
    pub page_param: String,
    /// Upper bound on API pages requested per run.
    pub max_api_pages: u32,
    /// Dot path to the records array.
    pub results_path: String,
    pub id_field: String,
    pub title_field: String,
    pub price_field: String,
    pub year_field: String,
    /// Numeric owner count, rendered as "<n> Owner".
    pub owner_field: String,
    /// A list of locations (first wins) or a plain string.
    pub location_field: String,
    pub kms_field: Option<String>,
    pub detail_url_field: Option<String>,
    /// Used when `detail_url_field` is unset or empty, e.g. "https://host/product/{slug}".
    pub detail_url_template: Option<String>,
    /// Base for relative detail URLs.
    pub detail_base: String,
    pub label_container: String,
    pub label_item: String,
}

impl Default for ApiDetailConfig {
    fn default() -> Self {
        Self {
            page_param: "page".to_string(),
            max_api_pages: 120,
            results_path: "data.records".to_string(),
            id_field: "id".to_string(),
            title_field: "title".to_string(),
            price_field: "price".to_string(),
            year_field: "year".to_string(),
            owner_field: "owner_count".to_string(),
            location_field: "locations".to_string(),
            kms_field: None,
            detail_url_field: Some("product_url".to_string()),
            detail_url_template: Some("https://droom.in/product/{slug}".to_string()),
            detail_base: "https://droom.in".to_string(),
            label_container: "ul.d-display-table.d-width-100".to_string(),
            label_item: "li".to_string(),
        }
    }
}

/// One phase-one record.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRecord {
    pub id: Option<String>,
    pub detail_url: Option<String>,
    pub draft: ListingDraft,
}

/// URL of the 1-based API page `page` under `endpoint`.
pub fn api_page_url(endpoint: &str, page_param: &str, page: u32) -> String {
    match Url::parse(endpoint) {
        Ok(mut url) => {
            url.query_pairs_mut()
                .append_pair(page_param, &page.to_string());
            url.to_string()
        }
        Err(_) => {
            let sep = if endpoint.contains('?') { '&' } else { '?' };
            format!("{}{}{}={}", endpoint, sep, page_param, page)
        }
    }
}

/// Parse one API page into records, in payload order.
pub fn parse_api_page(
    config: &ApiDetailConfig,
    source: &str,
    body: &str,
) -> Result<Vec<ApiRecord>, ParseError> {
    let payload: Value = serde_json::from_str(body)?;
    let records = extract_path(&payload, &config.results_path)
        .as_array()
        .ok_or_else(|| ParseError::MissingRecords {
            path: config.results_path.clone(),
        })?;

    Ok(records
        .iter()
        .map(|item| parse_record(config, source, item))
        .collect())
}

fn field(item: &Value, path: &str) -> Option<String> {
    value_text(extract_path(item, path))
}

fn parse_record(config: &ApiDetailConfig, source: &str, item: &Value) -> ApiRecord {
    let mut draft = ListingDraft::new(source);

    if let Some(title) = field(item, &config.title_field) {
        match field(item, &config.year_field) {
            Some(year) => {
                draft.model_year = Some(year);
                draft.model_name = Some(title);
            }
            None => {
                let (model, year) = split_trailing_year(&title);
                draft.model_name = Some(model);
                draft.model_year = year;
            }
        }
    }

    draft.price = field(item, &config.price_field);
    draft.owner = field(item, &config.owner_field).map(|n| format!("{} Owner", n));
    draft.location = first_location(extract_path(item, &config.location_field));
    draft.kms_driven = config.kms_field.as_deref().and_then(|p| field(item, p));

    let detail_url = config
        .detail_url_field
        .as_deref()
        .and_then(|p| field(item, p))
        .map(|path| resolve_url(&config.detail_base, &path))
        .or_else(|| {
            config
                .detail_url_template
                .as_deref()
                .and_then(|t| render_template(t, item))
        });
    draft.detail_url = detail_url.clone();

    ApiRecord {
        id: field(item, &config.id_field),
        detail_url,
        draft,
    }
}

/// Titles of the form "<model name> <year>".
fn split_trailing_year(title: &str) -> (String, Option<String>) {
    let mut tokens: Vec<&str> = title.split_whitespace().collect();
    let year = tokens
        .last()
        .copied()
        .filter(|t| tokens.len() > 1 && t.len() == 4 && t.chars().all(|c| c.is_ascii_digit()))
        .map(str::to_string);
    if year.is_some() {
        tokens.pop();
    }
    (tokens.join(" "), year)
}

fn first_location(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => items.first().and_then(|first| match first {
            Value::Object(_) => value_text(extract_path(first, "name")),
            other => value_text(other),
        }),
        other => value_text(other),
    }
}

/// Scan a detail page's labelled facts.
///
/// Every label item under every matching container is applied in order,
/// so a later label overrides an earlier one for the same field.
pub fn parse_detail_page(
    config: &ApiDetailConfig,
    source: &str,
    body: &str,
) -> Result<ListingDraft, ParseError> {
    let container = parse_selector(&config.label_container)?;
    let item = parse_selector(&config.label_item)?;

    let document = Html::parse_document(body);
    let mut draft = ListingDraft::new(source);
    let mut found = false;
    for list in document.select(&container) {
        found = true;
        for label in list.select(&item) {
            apply_label(&mut draft, &element_text(label));
        }
    }

    if !found {
        return Err(ParseError::MissingElement {
            selector: config.label_container.clone(),
        });
    }
    Ok(draft)
}

/// Apply one detail label to a draft.
///
/// Markers are case-sensitive and independent: a label containing both
/// "Power" and "Km" sets both fields.
pub fn apply_label(draft: &mut ListingDraft, label: &str) {
    let text = collapse_whitespace(label);
    if text.contains("Owner") {
        set(&mut draft.owner, text.clone());
    }
    if text.contains("Km") {
        set(&mut draft.kms_driven, text.clone());
    }
    if text.contains("Mileage") {
        set(&mut draft.mileage, strip_marker(&text, &["Mileage"]));
    }
    if text.contains("Engine") {
        set(&mut draft.engine, strip_marker(&text, &["Engine"]));
    }
    if text.contains("Power") {
        set(&mut draft.power, strip_marker(&text, &["Max Power", "Power"]));
    }
    if text.contains("Wheel") {
        set(&mut draft.wheel_size, strip_marker(&text, &["Wheel Size", "Wheel"]));
    }
}

fn set(slot: &mut Option<String>, value: String) {
    if !value.is_empty() {
        *slot = Some(value);
    }
}

/// Remove the first marker present, longest first.
fn strip_marker(text: &str, markers: &[&str]) -> String {
    match markers.iter().find(|m| text.contains(*m)) {
        Some(marker) => collapse_whitespace(&text.replace(marker, "")),
        None => text.to_string(),
    }
}

/// Combine both phases. Detail-page values win over the API payload.
pub fn merge(api: ListingDraft, detail: ListingDraft) -> ListingDraft {
    let mut merged = detail;
    merged.fill_from(api);
    merged
}
