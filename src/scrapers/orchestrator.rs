//! Sequential scrape driver.
//!
//! One source run walks `Idle → ComputingPageCount → Iterating → Done`,
//! or stops at `Skipped` when no pages can be derived. Each iteration is a
//! unit of work whose listings and visited marker commit together; a failed
//! unit commits nothing and the run moves on to the next page.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, trace, warn};

use super::browser::Renderer;
use super::config::{SourceDefinition, Transport};
use super::dedup::Deduplicator;
use super::error::{FieldError, NetworkError, UnitError};
use super::extract::api_detail::{self, ApiDetailConfig, ApiRecord};
use super::extract::ExtractorConfig;
use super::http_client::{CookieMap, Fetcher};
use super::pacer::Pacer;
use crate::models::{Listing, ListingDraft};
use crate::repository::RecordStore;

/// Lifecycle of one source run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceState {
    #[default]
    Idle,
    ComputingPageCount,
    Iterating,
    Fetching,
    Extracting,
    Persisting,
    /// The last iteration failed; the run continues with the next one.
    Failed,
    Skipped,
    Done,
}

impl fmt::Display for SourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SourceState::Idle => "idle",
            SourceState::ComputingPageCount => "computing page count",
            SourceState::Iterating => "iterating",
            SourceState::Fetching => "fetching",
            SourceState::Extracting => "extracting",
            SourceState::Persisting => "persisting",
            SourceState::Failed => "failed",
            SourceState::Skipped => "skipped",
            SourceState::Done => "done",
        };
        f.write_str(s)
    }
}

/// Outcome of one source run under one context.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SourceReport {
    pub source: String,
    pub context: Option<String>,
    pub state: SourceState,
    pub page_count: u32,
    /// Listing or API pages fetched and processed.
    pub pages_scraped: u64,
    pub pages_failed: u64,
    /// Pages not fetched because they were already visited.
    pub pages_skipped: u64,
    pub listings_persisted: u64,
    /// Records dropped for a missing required field.
    pub records_discarded: u64,
    pub details_skipped: u64,
    pub details_failed: u64,
}

impl SourceReport {
    fn new(source: &str, context: Option<&str>) -> Self {
        Self {
            source: source.to_string(),
            context: context.map(str::to_string),
            ..Default::default()
        }
    }

    /// "name" or "name[context]", for log lines.
    pub fn label(&self) -> String {
        match &self.context {
            Some(ctx) => format!("{}[{}]", self.source, ctx),
            None => self.source.clone(),
        }
    }

    fn transition(&mut self, state: SourceState) {
        trace!("{}: {} -> {}", self.label(), self.state, state);
        self.state = state;
    }
}

/// Accumulated outcome of a multi-source run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub sources: Vec<SourceReport>,
}

impl RunReport {
    pub fn listings_persisted(&self) -> u64 {
        self.sources.iter().map(|s| s.listings_persisted).sum()
    }

    pub fn pages_failed(&self) -> u64 {
        self.sources.iter().map(|s| s.pages_failed).sum()
    }

    pub fn skipped_sources(&self) -> usize {
        self.sources
            .iter()
            .filter(|s| s.state == SourceState::Skipped)
            .count()
    }
}

/// Drives sources one after another against a shared store.
pub struct Orchestrator<'a> {
    fetcher: &'a dyn Fetcher,
    renderer: Option<&'a dyn Renderer>,
    store: &'a RecordStore,
}

impl<'a> Orchestrator<'a> {
    pub fn new(fetcher: &'a dyn Fetcher, store: &'a RecordStore) -> Self {
        Self {
            fetcher,
            renderer: None,
            store,
        }
    }

    /// Renderer for [`Transport::Browser`] sources.
    pub fn with_renderer(mut self, renderer: &'a dyn Renderer) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Run every enabled source, once per context value.
    pub async fn run_all(&self, sources: &[SourceDefinition]) -> RunReport {
        let mut report = RunReport::default();
        for source in sources.iter().filter(|s| s.enabled) {
            for context in source.contexts() {
                let run = self.run_source(source, context.as_deref()).await;
                info!(
                    "{}: {} ({} pages, {} listings, {} failed, {} already visited)",
                    run.label(),
                    run.state,
                    run.page_count,
                    run.listings_persisted,
                    run.pages_failed,
                    run.pages_skipped
                );
                report.sources.push(run);
            }
        }
        report
    }

    /// Run one source under an optional context value.
    pub async fn run_source(&self, source: &SourceDefinition, context: Option<&str>) -> SourceReport {
        let mut report = SourceReport::new(&source.name, context);
        let cookies = source.cookies_for(context);
        let mut pacer = Pacer::new(Duration::from_millis(source.delay_ms));

        report.transition(SourceState::ComputingPageCount);
        let pages = match source
            .pagination
            .page_count(&source.base_url, &cookies, self.fetcher)
            .await
        {
            Ok(pages) => pages,
            Err(e) => {
                warn!("{}: could not resolve page count: {}", report.label(), e);
                report.transition(SourceState::Skipped);
                return report;
            }
        };
        report.page_count = pages;

        if pages == 0 {
            info!("{}: no pages to scrape", report.label());
            report.transition(SourceState::Skipped);
            return report;
        }

        report.transition(SourceState::Iterating);
        match &source.extractor {
            ExtractorConfig::ApiDetail(api) => {
                self.run_api(source, api, &cookies, &mut pacer, &mut report)
                    .await
            }
            _ => {
                self.run_pages(source, context, pages, &cookies, &mut pacer, &mut report)
                    .await
            }
        }

        report.transition(SourceState::Done);
        report
    }

    async fn run_pages(
        &self,
        source: &SourceDefinition,
        context: Option<&str>,
        pages: u32,
        cookies: &CookieMap,
        pacer: &mut Pacer,
        report: &mut SourceReport,
    ) {
        let dedup = Deduplicator::new(self.store.visited());

        for index in 0..pages {
            let url = source
                .pagination
                .page_url(&source.base_url, &source.page_template, index);
            let key = source.page_key(&url, context);

            match dedup.is_visited(&key) {
                Ok(true) => {
                    debug!("{}: page {} already visited", report.label(), index + 1);
                    report.pages_skipped += 1;
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    warn!("{}: visited lookup for {} failed: {}", report.label(), url, e);
                    report.pages_failed += 1;
                    pacer.pause().await;
                    continue;
                }
            }

            info!("{}: page {}/{}", report.label(), index + 1, pages);
            match self.scrape_page(source, &url, &key, cookies, report).await {
                Ok(persisted) => {
                    debug!("{}: page {} stored {} listings", report.label(), index + 1, persisted);
                    report.pages_scraped += 1;
                    report.listings_persisted += persisted as u64;
                    pacer.report_success();
                    report.transition(SourceState::Iterating);
                }
                Err(e) => {
                    warn!("{}: page {} ({}) failed: {}", report.label(), index + 1, url, e);
                    report.pages_failed += 1;
                    note_failure(pacer, &e);
                    report.transition(SourceState::Failed);
                    report.transition(SourceState::Iterating);
                }
            }

            pacer.pause().await;
        }
    }

    async fn scrape_page(
        &self,
        source: &SourceDefinition,
        url: &str,
        key: &str,
        cookies: &CookieMap,
        report: &mut SourceReport,
    ) -> Result<usize, UnitError> {
        report.transition(SourceState::Fetching);
        let body = self.fetch_body(source, url, cookies).await?;

        report.transition(SourceState::Extracting);
        let listings = keep_complete(source.extractor.extract(&source.name, &body)?, report);

        report.transition(SourceState::Persisting);
        Ok(self.store.commit(&listings, Some(key))?)
    }

    async fn fetch_body(
        &self,
        source: &SourceDefinition,
        url: &str,
        cookies: &CookieMap,
    ) -> Result<String, NetworkError> {
        match source.transport {
            Transport::Http => self.fetcher.fetch(url, cookies).await,
            Transport::Browser => {
                let renderer = self.renderer.ok_or_else(|| NetworkError::Browser {
                    url: url.to_string(),
                    reason: "no browser renderer available".to_string(),
                })?;
                let options = source.render.clone().unwrap_or_default();
                renderer.render(url, &options).await
            }
        }
    }

    /// Page through the search API until it runs dry or `max_api_pages`.
    ///
    /// A failed API page is skipped and the walk moves on to the next one.
    /// API pages are never marked visited so new records surface on every
    /// run; only detail URLs are.
    async fn run_api(
        &self,
        source: &SourceDefinition,
        api: &ApiDetailConfig,
        cookies: &CookieMap,
        pacer: &mut Pacer,
        report: &mut SourceReport,
    ) {
        for page in 1..=api.max_api_pages {
            let url = api_detail::api_page_url(&source.base_url, &api.page_param, page);
            info!("{}: API page {}", report.label(), page);

            report.transition(SourceState::Fetching);
            let records = match self.fetch_api_page(source, api, &url, cookies).await {
                Ok(records) => records,
                Err(e) => {
                    warn!("{}: API page {} ({}) failed: {}", report.label(), page, url, e);
                    report.pages_failed += 1;
                    note_failure(pacer, &e);
                    report.transition(SourceState::Failed);
                    report.transition(SourceState::Iterating);
                    pacer.pause().await;
                    continue;
                }
            };
            report.pages_scraped += 1;
            pacer.report_success();
            pacer.pause().await;

            if records.is_empty() {
                debug!("{}: API page {} is empty", report.label(), page);
                break;
            }

            for record in records {
                self.process_record(source, api, record, cookies, pacer, report)
                    .await;
            }
            report.transition(SourceState::Iterating);
        }
    }

    async fn fetch_api_page(
        &self,
        source: &SourceDefinition,
        api: &ApiDetailConfig,
        url: &str,
        cookies: &CookieMap,
    ) -> Result<Vec<ApiRecord>, UnitError> {
        let body = self.fetcher.fetch(url, cookies).await?;
        Ok(api_detail::parse_api_page(api, &source.name, &body)?)
    }

    async fn process_record(
        &self,
        source: &SourceDefinition,
        api: &ApiDetailConfig,
        record: ApiRecord,
        cookies: &CookieMap,
        pacer: &mut Pacer,
        report: &mut SourceReport,
    ) {
        let Some(detail_url) = record.detail_url.clone() else {
            debug!(
                "{}: record {:?} has no detail URL, discarded",
                report.label(),
                record.id
            );
            report.records_discarded += 1;
            return;
        };

        let dedup = Deduplicator::new(self.store.visited());
        match dedup.is_visited(&detail_url) {
            Ok(true) => {
                debug!("{}: {} already visited", report.label(), detail_url);
                report.details_skipped += 1;
                return;
            }
            Ok(false) => {}
            Err(e) => {
                warn!("{}: visited lookup for {} failed: {}", report.label(), detail_url, e);
                report.details_failed += 1;
                return;
            }
        }

        let draft = if source.follow_details {
            report.transition(SourceState::Fetching);
            let detail = self.fetch_detail(source, api, &detail_url, cookies).await;
            let detail = match detail {
                Ok(detail) => {
                    pacer.report_success();
                    pacer.pause().await;
                    detail
                }
                Err(e) => {
                    warn!("{}: detail {} failed: {}", report.label(), detail_url, e);
                    report.details_failed += 1;
                    note_failure(pacer, &e);
                    pacer.pause().await;
                    return;
                }
            };
            api_detail::merge(record.draft, detail)
        } else {
            record.draft
        };

        let listings = match Listing::try_from(draft) {
            Ok(listing) => vec![listing],
            Err(e) => {
                debug!("{}: {} discarded: {}", report.label(), detail_url, e);
                report.records_discarded += 1;
                Vec::new()
            }
        };

        report.transition(SourceState::Persisting);
        match self.store.commit(&listings, Some(&detail_url)) {
            Ok(persisted) => report.listings_persisted += persisted as u64,
            Err(e) => {
                warn!("{}: storing {} failed: {}", report.label(), detail_url, e);
                report.details_failed += 1;
            }
        }
    }

    async fn fetch_detail(
        &self,
        source: &SourceDefinition,
        api: &ApiDetailConfig,
        url: &str,
        cookies: &CookieMap,
    ) -> Result<ListingDraft, UnitError> {
        let body = self.fetcher.fetch(url, cookies).await?;
        Ok(api_detail::parse_detail_page(api, &source.name, &body)?)
    }
}

/// Split extraction results, logging and counting discarded records.
fn keep_complete(
    records: Vec<Result<Listing, FieldError>>,
    report: &mut SourceReport,
) -> Vec<Listing> {
    let mut listings = Vec::with_capacity(records.len());
    for record in records {
        match record {
            Ok(listing) => listings.push(listing),
            Err(e) => {
                debug!("{}: record discarded: {}", report.label(), e);
                report.records_discarded += 1;
            }
        }
    }
    listings
}

fn note_failure(pacer: &mut Pacer, error: &UnitError) {
    match error {
        UnitError::Network(e) if e.is_rate_limit() => {
            pacer.report_rate_limit(e.status().unwrap_or(429))
        }
        _ => pacer.report_failure(),
    }
}
