//! Browser engine and render configuration types.

use serde::{Deserialize, Serialize};

/// How the browser process is obtained.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BrowserEngineConfig {
    /// Run in headless mode (default: true).
    /// Set to false for debugging or if headless detection is an issue.
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Proxy server URL (e.g., "socks5://127.0.0.1:1080").
    #[serde(default)]
    pub proxy: Option<String>,

    /// Navigation and CDP request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Additional Chrome arguments.
    #[serde(default)]
    pub chrome_args: Vec<String>,

    /// Remote Chrome DevTools URL (e.g., "ws://localhost:9222").
    /// If set, connects to existing browser instead of launching one.
    #[serde(default)]
    pub remote_url: Option<String>,
}

pub fn default_headless() -> bool {
    true
}

pub fn default_timeout() -> u64 {
    30
}

impl Default for BrowserEngineConfig {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            proxy: None,
            timeout: default_timeout(),
            chrome_args: Vec::new(),
            remote_url: None,
        }
    }
}

impl BrowserEngineConfig {
    /// Apply `BROWSER_URL` and `SOCKS_PROXY` from the environment.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("BROWSER_URL") {
            if !url.trim().is_empty() {
                self.remote_url = Some(url.trim().to_string());
            }
        }
        if let Ok(proxy) = std::env::var("SOCKS_PROXY") {
            if !proxy.trim().is_empty() {
                self.proxy = Some(proxy.trim().to_string());
            }
        }
        self
    }
}

/// Per-source rendering steps for infinite-scroll pages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RenderOptions {
    /// Element to click once after load to dismiss an initial modal.
    #[serde(default)]
    pub popup_selector: Option<String>,

    /// Number of scroll-to-bottom signals to dispatch.
    #[serde(default = "default_scroll_count")]
    pub scroll_count: u32,

    /// Pause after each scroll, in milliseconds.
    #[serde(default = "default_scroll_delay_ms")]
    pub scroll_delay_ms: u64,

    /// Pause after load and after dismissing the popup, in milliseconds.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Element whose inner HTML is returned; the whole document if unset or absent.
    #[serde(default)]
    pub content_selector: Option<String>,
}

fn default_scroll_count() -> u32 {
    10
}

fn default_scroll_delay_ms() -> u64 {
    5000
}

fn default_settle_delay_ms() -> u64 {
    2000
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            popup_selector: None,
            scroll_count: default_scroll_count(),
            scroll_delay_ms: default_scroll_delay_ms(),
            settle_delay_ms: default_settle_delay_ms(),
            content_selector: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_options_defaults_from_empty_toml() {
        let options: RenderOptions = toml::from_str("").unwrap();
        assert_eq!(options.scroll_count, 10);
        assert_eq!(options.scroll_delay_ms, 5000);
        assert!(options.popup_selector.is_none());
    }

    #[test]
    fn test_engine_config_partial_toml() {
        let config: BrowserEngineConfig = toml::from_str("headless = false").unwrap();
        assert!(!config.headless);
        assert_eq!(config.timeout, 30);
    }
}
