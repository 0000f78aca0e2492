//! Browser-driven rendering for infinite-scroll sources.
//!
//! Uses chromiumoxide (CDP). One browser session is owned by a single
//! [`Renderer::render`] call and is shut down on every exit path.

mod config;

pub use config::{BrowserEngineConfig, RenderOptions};

use async_trait::async_trait;

use super::error::NetworkError;

#[cfg(feature = "browser")]
use std::time::Duration;

#[cfg(feature = "browser")]
use anyhow::{Context, Result};
#[cfg(feature = "browser")]
use chromiumoxide::{Browser, BrowserConfig, Page};
#[cfg(feature = "browser")]
use futures::StreamExt;
#[cfg(feature = "browser")]
use tokio::task::JoinHandle;
#[cfg(feature = "browser")]
use tracing::{debug, info, warn};

/// Produces a fully rendered document fragment for a URL.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, url: &str, options: &RenderOptions) -> Result<String, NetworkError>;
}

#[cfg(feature = "browser")]
const SCROLL_TO_BOTTOM: &str = "window.scrollTo(0, document.body.scrollHeight); true";

/// Browser-based renderer.
pub struct BrowserFetcher {
    config: BrowserEngineConfig,
}

impl BrowserFetcher {
    /// Create a new browser fetcher.
    pub fn new(config: BrowserEngineConfig) -> Self {
        Self { config }
    }
}

/// A launched or connected browser plus its CDP handler task.
#[cfg(feature = "browser")]
struct Session {
    browser: Browser,
    handler: JoinHandle<()>,
    remote: bool,
}

#[cfg(feature = "browser")]
impl Session {
    /// Close the browser (local launches only) and stop the handler task.
    async fn shutdown(mut self) {
        if !self.remote {
            if let Err(e) = self.browser.close().await {
                warn!("Failed to close browser cleanly: {}", e);
            }
            if let Err(e) = self.browser.wait().await {
                debug!("Browser process wait failed: {}", e);
            }
        }
        self.handler.abort();
    }
}

#[cfg(feature = "browser")]
impl BrowserFetcher {
    /// Common Chrome executable paths to check.
    const CHROME_PATHS: &'static [&'static str] = &[
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/snap/bin/chromium",
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
    ];

    /// Find a Chrome executable on disk or in PATH.
    fn find_chrome() -> Result<std::path::PathBuf> {
        for path in Self::CHROME_PATHS {
            let p = std::path::Path::new(path);
            if p.exists() {
                info!("Found Chrome at: {}", path);
                return Ok(p.to_path_buf());
            }
        }

        for cmd in [
            "google-chrome",
            "google-chrome-stable",
            "chromium",
            "chromium-browser",
        ] {
            if let Ok(path) = which::which(cmd) {
                info!("Found Chrome in PATH: {}", path.display());
                return Ok(path);
            }
        }

        Err(anyhow::anyhow!(
            "Chrome/Chromium not found. Install chromium or set BROWSER_URL to a remote DevTools endpoint"
        ))
    }

    fn spawn_handler(mut handler: chromiumoxide::Handler) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        })
    }

    async fn launch(&self) -> Result<Session> {
        if let Some(ref remote_url) = self.config.remote_url {
            return self.connect_remote(remote_url).await;
        }

        info!("Launching browser (headless={})", self.config.headless);
        let chrome_path = Self::find_chrome()?;

        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .request_timeout(Duration::from_secs(self.config.timeout));

        // with_head means NOT headless
        if !self.config.headless {
            builder = builder.with_head();
        }
        if let Some(ref proxy) = self.config.proxy {
            builder = builder.arg(format!("--proxy-server={}", proxy));
        }

        builder = builder
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-infobars")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--start-maximized")
            .arg("--no-sandbox")
            .arg("--disable-gpu");

        for arg in &self.config.chrome_args {
            builder = builder.arg(arg);
        }

        let config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build browser config: {}", e))?;

        let (browser, handler) = Browser::launch(config)
            .await
            .context("Failed to launch browser")?;

        Ok(Session {
            browser,
            handler: Self::spawn_handler(handler),
            remote: false,
        })
    }

    /// Connect to a remote Chrome instance.
    async fn connect_remote(&self, url: &str) -> Result<Session> {
        info!("Connecting to remote browser at {}", url);

        // Get WebSocket URL from the /json/version endpoint
        let http_url = url
            .replace("ws://", "http://")
            .replace("wss://", "https://");
        let version_url = format!("{}/json/version", http_url.trim_end_matches('/'));

        let resp: serde_json::Value = reqwest::Client::new()
            .get(&version_url)
            .timeout(Duration::from_secs(self.config.timeout))
            .send()
            .await
            .context("Failed to connect to remote browser")?
            .json()
            .await
            .context("Failed to parse browser version info")?;

        let ws_url = resp
            .get("webSocketDebuggerUrl")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow::anyhow!("No webSocketDebuggerUrl in response"))?;

        let (browser, handler) = Browser::connect(ws_url)
            .await
            .context("Failed to connect to remote browser")?;

        Ok(Session {
            browser,
            handler: Self::spawn_handler(handler),
            remote: true,
        })
    }

    async fn render_page(
        &self,
        browser: &Browser,
        url: &str,
        options: &RenderOptions,
    ) -> Result<String> {
        info!("Navigating to {}", url);
        let page = browser
            .new_page(url)
            .await
            .with_context(|| format!("Failed to open {}", url))?;

        let result = Self::scroll_and_capture(&page, options).await;

        // Close the tab even when capture failed
        if let Err(e) = page.close().await {
            debug!("Failed to close page: {}", e);
        }
        result
    }

    async fn scroll_and_capture(page: &Page, options: &RenderOptions) -> Result<String> {
        let settle = Duration::from_millis(options.settle_delay_ms);
        tokio::time::sleep(settle).await;

        if let Some(ref selector) = options.popup_selector {
            match page.find_element(selector.as_str()).await {
                Ok(element) => {
                    if let Err(e) = element.click().await {
                        warn!("Failed to dismiss popup `{}`: {}", selector, e);
                    } else {
                        debug!("Dismissed popup `{}`", selector);
                    }
                    tokio::time::sleep(settle).await;
                }
                Err(_) => debug!("No popup `{}` present", selector),
            }
        }

        let scroll_delay = Duration::from_millis(options.scroll_delay_ms);
        for i in 0..options.scroll_count {
            if let Err(e) = page.evaluate(SCROLL_TO_BOTTOM.to_string()).await {
                warn!("Scroll {} failed: {}", i + 1, e);
            }
            tokio::time::sleep(scroll_delay).await;
        }

        if let Some(ref selector) = options.content_selector {
            match page.find_element(selector.as_str()).await {
                Ok(element) => {
                    if let Some(html) = element.inner_html().await? {
                        return Ok(html);
                    }
                }
                Err(_) => warn!(
                    "Content element `{}` not found, using full document",
                    selector
                ),
            }
        }

        Ok(page.content().await?)
    }
}

#[cfg(feature = "browser")]
#[async_trait]
impl Renderer for BrowserFetcher {
    async fn render(&self, url: &str, options: &RenderOptions) -> Result<String, NetworkError> {
        let to_network = |e: anyhow::Error| NetworkError::Browser {
            url: url.to_string(),
            reason: format!("{:#}", e),
        };

        let session = self.launch().await.map_err(to_network)?;
        let result = self.render_page(&session.browser, url, options).await;
        session.shutdown().await;
        result.map_err(to_network)
    }
}

// Stub for when browser feature is disabled
#[cfg(not(feature = "browser"))]
#[async_trait]
impl Renderer for BrowserFetcher {
    async fn render(&self, url: &str, _options: &RenderOptions) -> Result<String, NetworkError> {
        Err(NetworkError::Browser {
            url: url.to_string(),
            reason: "Browser support not compiled. Rebuild with: cargo build --features browser"
                .to_string(),
        })
    }
}
