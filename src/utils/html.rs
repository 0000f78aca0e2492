//! HTML text helpers shared by the extractors.

use scraper::{ElementRef, Selector};

use crate::scrapers::ParseError;

/// Parse a CSS selector, reporting the offending text on failure.
pub fn parse_selector(selector: &str) -> Result<Selector, ParseError> {
    Selector::parse(selector).map_err(|e| ParseError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Collapse runs of whitespace to single spaces and trim.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whitespace-collapsed text content of an element.
pub fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// Text of the first descendant matching `selector`, if any and non-empty.
pub fn first_text(element: ElementRef<'_>, selector: &Selector) -> Option<String> {
    element
        .select(selector)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty())
}

/// Texts of every descendant matching `selector`, in document order.
pub fn all_texts(element: ElementRef<'_>, selector: &Selector) -> Vec<String> {
    element.select(selector).map(element_text).collect()
}
