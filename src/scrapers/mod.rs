//! Listing scrapers for used-bike marketplaces.

pub mod browser;
pub mod config;
pub mod dedup;
pub mod error;
pub mod extract;
mod http_client;
pub mod orchestrator;
pub mod pacer;
pub mod pagination;

pub use browser::{BrowserEngineConfig, BrowserFetcher, RenderOptions, Renderer};
pub use config::{ContextConfig, SourceDefinition, SourceOverride, Transport};
pub use dedup::Deduplicator;
pub use error::{FieldError, NetworkError, PageCountError, ParseError, UnitError};
pub use extract::ExtractorConfig;
pub use http_client::{cookie_header, resolve_user_agent, CookieMap, Fetcher, HttpClient, USER_AGENT};
pub use orchestrator::{Orchestrator, RunReport, SourceReport, SourceState};
pub use pacer::{Pacer, PacerConfig};
pub use pagination::PaginationStrategy;
