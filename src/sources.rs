//! Built-in source catalogue.
//!
//! Every entry can be overridden, or disabled, from the config file's
//! `[sources."<name>"]` tables.

use std::collections::BTreeMap;

use crate::scrapers::config::{ContextConfig, SourceDefinition, Transport};
use crate::scrapers::extract::{
    ApiDetailConfig, BrowserRenderedSelectors, ComputedCountSelectors, ExtractorConfig,
    StaticListSelectors,
};
use crate::scrapers::{PaginationStrategy, RenderOptions};

/// Cities carandbike.com partitions its results by.
pub const CARANDBIKE_CITIES: [&str; 7] = [
    "New Delhi",
    "Mumbai",
    "Bangalore",
    "Chennai",
    "Hyderabad",
    "Ahmedabad",
    "Kolkata",
];

pub fn bikewale() -> SourceDefinition {
    SourceDefinition {
        name: "bikewale.com".to_string(),
        base_url: "https://www.bikewale.com/used/bikes-in-india/".to_string(),
        pagination: PaginationStrategy::Fixed { pages: 67 },
        page_template: "page-{page}/".to_string(),
        cookies: BTreeMap::new(),
        context: None,
        delay_ms: 2000,
        follow_details: false,
        transport: Transport::Http,
        extractor: ExtractorConfig::StaticList(StaticListSelectors::default()),
        render: None,
        enabled: true,
    }
}

pub fn carandbike() -> SourceDefinition {
    SourceDefinition {
        name: "carandbike.com".to_string(),
        base_url: "https://www.carandbike.com/used/bikes-for-sale/".to_string(),
        pagination: PaginationStrategy::Computed {
            page_size: 18,
            total_selector: "h1.title-page".to_string(),
        },
        page_template: "{page}/".to_string(),
        cookies: BTreeMap::new(),
        context: Some(ContextConfig {
            cookie: "userCity".to_string(),
            values: CARANDBIKE_CITIES.iter().map(|c| c.to_string()).collect(),
        }),
        delay_ms: 3000,
        follow_details: false,
        transport: Transport::Http,
        extractor: ExtractorConfig::ComputedCount(ComputedCountSelectors::default()),
        render: None,
        enabled: true,
    }
}

pub fn bikes24() -> SourceDefinition {
    SourceDefinition {
        name: "bikes24.com".to_string(),
        base_url: "https://www.bikes24.com/buy-used-bikes-faridabad/".to_string(),
        pagination: PaginationStrategy::SingleVirtualPage,
        page_template: String::new(),
        cookies: BTreeMap::new(),
        context: None,
        delay_ms: 3000,
        follow_details: false,
        transport: Transport::Browser,
        extractor: ExtractorConfig::BrowserRendered(BrowserRenderedSelectors::default()),
        render: Some(RenderOptions {
            popup_selector: Some(
                "body > div:nth-of-type(1) > div > div:nth-of-type(1) > div:nth-of-type(2) > div > div > h3 > div > img"
                    .to_string(),
            ),
            content_selector: Some(
                "body > div:nth-of-type(1) > div > div:nth-of-type(2) > div > div:nth-of-type(2) > div:nth-of-type(2) > div:nth-of-type(2) > div"
                    .to_string(),
            ),
            ..RenderOptions::default()
        }),
        enabled: true,
    }
}

pub fn droom() -> SourceDefinition {
    SourceDefinition {
        name: "droom.in".to_string(),
        base_url:
            "https://droom.in/bikes/used?tab=grid&display_category=All+Motorcycles&condition=used"
                .to_string(),
        pagination: PaginationStrategy::SingleVirtualPage,
        page_template: String::new(),
        cookies: BTreeMap::new(),
        context: None,
        delay_ms: 3000,
        follow_details: true,
        transport: Transport::Http,
        extractor: ExtractorConfig::ApiDetail(ApiDetailConfig::default()),
        render: None,
        enabled: true,
    }
}

/// All built-in sources, in run order.
pub fn catalogue() -> Vec<SourceDefinition> {
    vec![bikewale(), carandbike(), bikes24(), droom()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::html::parse_selector;

    #[test]
    fn test_catalogue_names_are_unique() {
        let sources = catalogue();
        let mut names: Vec<_> = sources.iter().map(|s| s.name.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), sources.len());
    }

    #[test]
    fn test_carandbike_runs_per_city() {
        let contexts = carandbike().contexts();
        assert_eq!(contexts.len(), 7);
        assert_eq!(contexts[0].as_deref(), Some("New Delhi"));
    }

    #[test]
    fn test_render_selectors_parse() {
        let render = bikes24().render.unwrap();
        parse_selector(&render.popup_selector.unwrap()).unwrap();
        parse_selector(&render.content_selector.unwrap()).unwrap();
    }

    #[test]
    fn test_catalogue_serializes_as_config() {
        for source in catalogue() {
            let text = serde_json::to_string(&source).unwrap();
            let parsed: SourceDefinition = serde_json::from_str(&text).unwrap();
            assert_eq!(parsed, source);
        }
    }
}
