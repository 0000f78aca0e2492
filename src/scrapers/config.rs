//! Source definitions.
//!
//! These structs define the TOML/JSON-configurable behavior of a source:
//! where its pages live, how many there are, which transport fetches them,
//! and which extractor reads them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::browser::RenderOptions;
use super::extract::ExtractorConfig;
use super::pagination::PaginationStrategy;

/// Static configuration of one listing source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDefinition {
    /// Source name stored with every listing (e.g. "bikewale.com").
    pub name: String,
    /// Listing index or API endpoint.
    pub base_url: String,
    #[serde(default)]
    pub pagination: PaginationStrategy,
    /// Appended to `base_url` for each page, with a `{page}` placeholder.
    #[serde(default)]
    pub page_template: String,
    /// Cookies sent with every request to this source.
    #[serde(default)]
    pub cookies: BTreeMap<String, String>,
    /// Run the source once per value of a context cookie.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<ContextConfig>,
    /// Delay between units of work, in milliseconds.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    /// Fetch detail pages for API records.
    #[serde(default = "default_true")]
    pub follow_details: bool,
    #[serde(default)]
    pub transport: Transport,
    pub extractor: ExtractorConfig,
    /// Browser settings for [`Transport::Browser`] sources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render: Option<RenderOptions>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// A cookie whose values partition a source into independent runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextConfig {
    pub cookie: String,
    #[serde(default)]
    pub values: Vec<String>,
}

/// How pages of a source are fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    #[default]
    Http,
    Browser,
}

pub(crate) fn default_delay_ms() -> u64 {
    3000
}

fn default_true() -> bool {
    true
}

impl SourceDefinition {
    /// Context values to run under; `None` is a single uncontextualised run.
    pub fn contexts(&self) -> Vec<Option<String>> {
        match &self.context {
            Some(ctx) if !ctx.values.is_empty() => {
                ctx.values.iter().cloned().map(Some).collect()
            }
            _ => vec![None],
        }
    }

    /// Cookie map for a run, including the context cookie if any.
    pub fn cookies_for(&self, context: Option<&str>) -> BTreeMap<String, String> {
        let mut cookies = self.cookies.clone();
        if let (Some(ctx), Some(value)) = (&self.context, context) {
            cookies.insert(ctx.cookie.clone(), value.to_string());
        }
        cookies
    }

    /// Visited-marker key for a listing page under a context.
    ///
    /// Detail URLs are keyed as-is and never pass through here.
    pub fn page_key(&self, url: &str, context: Option<&str>) -> String {
        match (&self.context, context) {
            (Some(ctx), Some(value)) => format!("{}#{}={}", url, ctx.cookie, value),
            _ => url.to_string(),
        }
    }

    /// Overlay the fields set in a config-file override.
    pub fn apply(&mut self, o: &SourceOverride) {
        if let Some(v) = &o.base_url {
            self.base_url = v.clone();
        }
        if let Some(v) = &o.pagination {
            self.pagination = v.clone();
        }
        if let Some(v) = &o.page_template {
            self.page_template = v.clone();
        }
        if let Some(v) = &o.cookies {
            self.cookies = v.clone();
        }
        if let Some(v) = &o.context {
            self.context = Some(v.clone());
        }
        if let Some(v) = o.delay_ms {
            self.delay_ms = v;
        }
        if let Some(v) = o.follow_details {
            self.follow_details = v;
        }
        if let Some(v) = o.transport {
            self.transport = v;
        }
        if let Some(v) = &o.extractor {
            self.extractor = v.clone();
        }
        if let Some(v) = &o.render {
            self.render = Some(v.clone());
        }
        if let Some(v) = o.enabled {
            self.enabled = v;
        }
    }
}

/// Partial source definition from the config file.
///
/// Keyed by source name; an override for an unknown name is a new source
/// and must then carry `base_url` and `extractor`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceOverride {
    pub base_url: Option<String>,
    pub pagination: Option<PaginationStrategy>,
    pub page_template: Option<String>,
    pub cookies: Option<BTreeMap<String, String>>,
    pub context: Option<ContextConfig>,
    pub delay_ms: Option<u64>,
    pub follow_details: Option<bool>,
    pub transport: Option<Transport>,
    pub extractor: Option<ExtractorConfig>,
    pub render: Option<RenderOptions>,
    pub enabled: Option<bool>,
}

impl SourceOverride {
    /// Build a new source from an override, if it is complete enough.
    pub fn into_definition(self, name: &str) -> Option<SourceDefinition> {
        let mut def = SourceDefinition {
            name: name.to_string(),
            base_url: self.base_url.clone()?,
            pagination: PaginationStrategy::default(),
            page_template: String::new(),
            cookies: BTreeMap::new(),
            context: None,
            delay_ms: default_delay_ms(),
            follow_details: true,
            transport: Transport::default(),
            extractor: self.extractor.clone()?,
            render: None,
            enabled: true,
        };
        def.apply(&self);
        Some(def)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city_source() -> SourceDefinition {
        toml::from_str(
            r#"
            name = "carandbike.com"
            base_url = "https://www.carandbike.com/used-bikes/"
            page_template = "{page}/"
            cookies = { currency = "INR" }
            context = { cookie = "userCity", values = ["Mumbai", "Chennai"] }

            [pagination]
            strategy = "computed"
            page_size = 18
            total_selector = "h1.title-page"

            [extractor]
            kind = "computed_count"
            "#,
        )
        .unwrap()
    }

    #[test]
    fn test_definition_defaults() {
        let def = city_source();
        assert_eq!(def.delay_ms, 3000);
        assert!(def.follow_details);
        assert!(def.enabled);
        assert_eq!(def.transport, Transport::Http);
    }

    #[test]
    fn test_contexts_and_cookies() {
        let def = city_source();
        assert_eq!(
            def.contexts(),
            vec![Some("Mumbai".to_string()), Some("Chennai".to_string())]
        );
        let cookies = def.cookies_for(Some("Mumbai"));
        assert_eq!(cookies.get("userCity").map(String::as_str), Some("Mumbai"));
        assert_eq!(cookies.get("currency").map(String::as_str), Some("INR"));
    }

    #[test]
    fn test_page_key_is_context_qualified() {
        let def = city_source();
        assert_eq!(
            def.page_key("https://x/1/", Some("Mumbai")),
            "https://x/1/#userCity=Mumbai"
        );
        assert_eq!(def.page_key("https://x/1/", None), "https://x/1/");
    }

    #[test]
    fn test_source_without_context_runs_once() {
        let mut def = city_source();
        def.context = None;
        assert_eq!(def.contexts(), vec![None]);
        assert_eq!(def.page_key("https://x/1/", None), "https://x/1/");
    }

    #[test]
    fn test_apply_override() {
        let mut def = city_source();
        let o = SourceOverride {
            delay_ms: Some(500),
            enabled: Some(false),
            ..Default::default()
        };
        def.apply(&o);
        assert_eq!(def.delay_ms, 500);
        assert!(!def.enabled);
        assert_eq!(def.page_template, "{page}/");
    }

    #[test]
    fn test_incomplete_override_is_not_a_source() {
        assert!(SourceOverride::default().into_definition("new").is_none());
    }
}
