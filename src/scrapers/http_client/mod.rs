//! HTTP fetcher with per-source cookies.

mod user_agent;

pub use user_agent::{resolve_user_agent, USER_AGENT};

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::COOKIE;
use reqwest::Client;
use tracing::debug;

use super::error::NetworkError;

/// Cookie name to value, sent as one `Cookie` header.
pub type CookieMap = BTreeMap<String, String>;

/// Anything that can turn a URL into a response body.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET `url` with `cookies`, returning the body of a 2xx response.
    async fn fetch(&self, url: &str, cookies: &CookieMap) -> Result<String, NetworkError>;
}

/// Render a cookie map as a `Cookie` header value.
pub fn cookie_header(cookies: &CookieMap) -> Option<String> {
    if cookies.is_empty() {
        return None;
    }
    Some(
        cookies
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; "),
    )
}

/// reqwest-backed fetcher.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client.
    /// - `user_agent_config` None: default bikeacquire user agent
    /// - Some("impersonate"): random real browser user agent
    /// - Some(custom): custom user agent string
    pub fn new(timeout: Duration, user_agent_config: Option<&str>) -> Result<Self, reqwest::Error> {
        let user_agent = resolve_user_agent(user_agent_config);
        let client = Client::builder()
            .user_agent(&user_agent)
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpClient {
    async fn fetch(&self, url: &str, cookies: &CookieMap) -> Result<String, NetworkError> {
        let mut request = self.client.get(url);
        if let Some(header) = cookie_header(cookies) {
            request = request.header(COOKIE, header);
        }

        let transport = |source: reqwest::Error| NetworkError::Transport {
            url: url.to_string(),
            source,
        };

        let start = Instant::now();
        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        debug!(
            "GET {} -> {} in {}ms",
            url,
            status.as_u16(),
            start.elapsed().as_millis()
        );

        if !status.is_success() {
            return Err(NetworkError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_header_empty() {
        assert_eq!(cookie_header(&CookieMap::new()), None);
    }

    #[test]
    fn test_cookie_header_joins_pairs() {
        let mut cookies = CookieMap::new();
        cookies.insert("userCity".to_string(), "Mumbai".to_string());
        cookies.insert("lang".to_string(), "en".to_string());
        assert_eq!(
            cookie_header(&cookies).as_deref(),
            Some("lang=en; userCity=Mumbai")
        );
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let client = HttpClient::new(Duration::from_secs(2), None).unwrap();
        let err = client
            .fetch("http://127.0.0.1:9/", &CookieMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, NetworkError::Transport { .. }));
        assert!(!err.is_rate_limit());
    }
}
