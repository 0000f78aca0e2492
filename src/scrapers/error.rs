//! Error taxonomy for scraping.
//!
//! None of these abort a multi-source run: a [`NetworkError`] or
//! [`ParseError`] skips one page, a [`FieldError`] one record, and a
//! [`PageCountError`] one source.

pub use crate::models::FieldError;
use crate::repository::StoreError;

/// Transport failure, timeout, non-2xx status or browser failure.
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("browser rendering of {url} failed: {reason}")]
    Browser { url: String, reason: String },
}

impl NetworkError {
    /// HTTP status code, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            NetworkError::Status { status, .. } => Some(*status),
            NetworkError::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            NetworkError::Browser { .. } => None,
        }
    }

    /// Whether the upstream signalled rate limiting.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self.status(), Some(429 | 503))
    }
}

/// A page lacked an expected structural element or could not be decoded.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("missing element `{selector}`")]
    MissingElement { selector: String },
    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no records array at `{path}`")]
    MissingRecords { path: String },
    #[error("`{kind}` sources have no listing pages")]
    NotAListingPage { kind: &'static str },
}

/// The page count of a source could not be derived.
#[derive(Debug, thiserror::Error)]
pub enum PageCountError {
    #[error("index page fetch failed: {0}")]
    Fetch(#[from] NetworkError),
    #[error("index page layout: {0}")]
    Parse(#[from] ParseError),
    #[error("advertised total `{text}` is not a number")]
    Unparseable { text: String },
}

/// Failure of one unit of work (page or detail page).
#[derive(Debug, thiserror::Error)]
pub enum UnitError {
    #[error(transparent)]
    Network(#[from] NetworkError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("store: {0}")]
    Store(#[from] StoreError),
}
