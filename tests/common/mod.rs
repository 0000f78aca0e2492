//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use tempfile::TempDir;

use bikeacquire::repository::RecordStore;
use bikeacquire::scrapers::config::{ContextConfig, SourceDefinition, Transport};
use bikeacquire::scrapers::extract::{
    ApiDetailConfig, BrowserRenderedSelectors, ComputedCountSelectors, ExtractorConfig,
    StaticListSelectors,
};
use bikeacquire::scrapers::{
    CookieMap, Fetcher, NetworkError, PaginationStrategy, RenderOptions, Renderer,
};

/// Fetcher serving canned bodies and recording every request.
#[derive(Default)]
pub struct MockFetcher {
    responses: HashMap<String, Result<String, u16>>,
    calls: Mutex<Vec<(String, CookieMap)>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, body: impl Into<String>) -> Self {
        self.responses.insert(url.to_string(), Ok(body.into()));
        self
    }

    pub fn status(mut self, url: &str, status: u16) -> Self {
        self.responses.insert(url.to_string(), Err(status));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.calls().iter().filter(|u| u.as_str() == url).count()
    }

    pub fn cookies_sent(&self) -> Vec<CookieMap> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, cookies)| cookies.clone())
            .collect()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str, cookies: &CookieMap) -> Result<String, NetworkError> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), cookies.clone()));
        match self.responses.get(url) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(status)) => Err(NetworkError::Status {
                url: url.to_string(),
                status: *status,
            }),
            None => Err(NetworkError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

/// Renderer returning one fixed capture.
pub struct MockRenderer {
    pub body: String,
    pub calls: Mutex<Vec<String>>,
}

impl MockRenderer {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Renderer for MockRenderer {
    async fn render(&self, url: &str, _options: &RenderOptions) -> Result<String, NetworkError> {
        self.calls.lock().unwrap().push(url.to_string());
        Ok(self.body.clone())
    }
}

pub fn temp_store() -> (TempDir, RecordStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = RecordStore::open(&dir.path().join("local.db")).unwrap();
    (dir, store)
}

fn source(name: &str, base_url: &str, extractor: ExtractorConfig) -> SourceDefinition {
    SourceDefinition {
        name: name.to_string(),
        base_url: base_url.to_string(),
        pagination: PaginationStrategy::SingleVirtualPage,
        page_template: String::new(),
        cookies: BTreeMap::new(),
        context: None,
        delay_ms: 0,
        follow_details: true,
        transport: Transport::Http,
        extractor,
        render: None,
        enabled: true,
    }
}

pub const LIST_BASE: &str = "https://bikes.test/used/";

pub fn fixed_source(pages: u32) -> SourceDefinition {
    let mut def = source(
        "bikewale.test",
        LIST_BASE,
        ExtractorConfig::StaticList(StaticListSelectors::default()),
    );
    def.pagination = PaginationStrategy::Fixed { pages };
    def.page_template = "page-{page}/".to_string();
    def
}

pub fn computed_source(cities: &[&str]) -> SourceDefinition {
    let mut def = source(
        "carandbike.test",
        LIST_BASE,
        ExtractorConfig::ComputedCount(ComputedCountSelectors::default()),
    );
    def.pagination = PaginationStrategy::Computed {
        page_size: 2,
        total_selector: "h1.title-page".to_string(),
    };
    def.page_template = "{page}/".to_string();
    if !cities.is_empty() {
        def.context = Some(ContextConfig {
            cookie: "userCity".to_string(),
            values: cities.iter().map(|c| c.to_string()).collect(),
        });
    }
    def
}

pub fn browser_source() -> SourceDefinition {
    let mut def = source(
        "bikes24.test",
        "https://bikes24.test/buy-used-bikes/",
        ExtractorConfig::BrowserRendered(BrowserRenderedSelectors::default()),
    );
    def.transport = Transport::Browser;
    def
}

pub const API_BASE: &str = "https://droom.test/api/search";

pub fn api_url(page: u32) -> String {
    format!("{}?page={}", API_BASE, page)
}

pub fn detail_url(slug: &str) -> String {
    format!("https://droom.test/product/{}", slug)
}

pub fn api_source() -> SourceDefinition {
    source(
        "droom.test",
        API_BASE,
        ExtractorConfig::ApiDetail(ApiDetailConfig {
            detail_url_field: None,
            detail_url_template: Some("https://droom.test/product/{slug}".to_string()),
            detail_base: "https://droom.test".to_string(),
            max_api_pages: 10,
            ..Default::default()
        }),
    )
}

/// A bikewale-style list page with `count` complete items.
pub fn static_list_page(page: u32, count: usize) -> String {
    let items: String = (0..count)
        .map(|i| {
            format!(
                r#"<li><h2>Bajaj, Pulsar {page}{i}, Std</h2>
                   <span class="model-details-label">2018</span>
                   <span class="model-details-label">12,000 km</span>
                   <span class="model-details-label">1st Owner</span>
                   <span class="model-details-label">Pune</span>
                   <span class="font22">₹ 55,000</span></li>"#
            )
        })
        .collect();
    format!(r#"<html><body><ul id="used-bikes-list">{items}</ul></body></html>"#)
}

/// A carandbike-style page advertising `total` listings with `count` widgets.
pub fn computed_page(total: u64, count: usize) -> String {
    let widgets: String = (0..count)
        .map(|i| {
            format!(
                r#"<div class="usedcar-widget">
                     <h4 class="usedcar-widget__ttl">2019 Honda Shine {i}</h4>
                     <div class="usedcar-widget__price">₹ 60,000</div>
                     <ul class="usedcar-widget__infolist"><li>9,000 km</li><li>Petrol</li><li>1st Owner</li></ul>
                     <div class="usedcar-widget__loc-txt">Mumbai</div>
                   </div>"#
            )
        })
        .collect();
    format!(
        r#"<html><body><h1 class="title-page">{total} Used Bikes</h1>
           <div class="clist__main">{widgets}</div></body></html>"#
    )
}

/// One API record as JSON.
pub fn api_record(slug: &str, price: Option<&str>) -> serde_json::Value {
    let mut record = serde_json::json!({
        "id": slug,
        "title": "Bajaj Avenger Street 220",
        "year": 2017,
        "owner_count": 1,
        "locations": ["Gurgaon"],
        "slug": slug
    });
    if let Some(price) = price {
        record["price"] = serde_json::json!(price);
    }
    record
}

pub fn api_page(records: Vec<serde_json::Value>) -> String {
    serde_json::json!({"data": {"records": records}}).to_string()
}

pub fn detail_page(owner: &str, kms: &str) -> String {
    format!(
        r#"<html><body><ul class="d-display-table d-width-100">
             <li>{owner}</li><li>{kms}</li><li>45 kmpl Mileage</li><li>220 cc Engine</li>
           </ul></body></html>"#
    )
}
