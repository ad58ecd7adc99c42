//! Page fetchers
//!
//! This module turns a URL into page HTML. Two backends share the
//! `PageFetcher` trait:
//! - `BrowserFetcher`: one headless Chromium tab, re-navigated per call,
//!   so client-side scripts run before the HTML is read
//! - `HttpFetcher`: a plain GET for server-rendered pages
//!
//! A fetcher is acquired once per run and must be released with `close`.

use crate::config::{BrowserConfig, FetcherMode};
use crate::{CrawlerError, FetchError};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromiumConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use reqwest::Client;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Something that can load a page and hand back its HTML
#[async_trait]
pub trait PageFetcher: Send {
    /// Loads `url`, waits `settle` for rendering to finish, returns the HTML
    async fn fetch(&mut self, url: &str, settle: Duration) -> Result<String, FetchError>;

    /// Releases the underlying session
    ///
    /// Calling `close` more than once is a no-op.
    async fn close(&mut self) -> Result<(), CrawlerError>;
}

/// Acquires the fetcher selected by the configuration
///
/// # Returns
///
/// * `Ok(Box<dyn PageFetcher>)` - Ready to fetch
/// * `Err(CrawlerError)` - The browser or HTTP client could not be started
pub async fn launch_fetcher(config: &BrowserConfig) -> Result<Box<dyn PageFetcher>, CrawlerError> {
    match config.mode {
        FetcherMode::Chromium => Ok(Box::new(BrowserFetcher::launch(config).await?)),
        FetcherMode::Http => Ok(Box::new(HttpFetcher::new(config)?)),
    }
}

/// Headless Chromium session with a single reusable tab
pub struct BrowserFetcher {
    browser: Option<Browser>,
    page: Option<Page>,
    handler: Option<JoinHandle<()>>,
    navigation_timeout: Duration,
}

impl BrowserFetcher {
    /// Launches Chromium and opens the tab every fetch will reuse
    pub async fn launch(config: &BrowserConfig) -> Result<Self, CrawlerError> {
        let navigation_timeout = Duration::from_millis(config.navigation_timeout_ms);

        let mut builder = ChromiumConfig::builder()
            .no_sandbox()
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .request_timeout(navigation_timeout);

        if let Some(path) = &config.executable_path {
            builder = builder.chrome_executable(path);
        }
        if let Some(user_agent) = &config.user_agent {
            builder = builder.arg(format!("--user-agent={}", user_agent));
        }

        let browser_config = builder.build().map_err(CrawlerError::Browser)?;

        let (mut browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| CrawlerError::Browser(format!("failed to launch Chromium: {}", e)))?;

        // The CDP connection only makes progress while its handler is polled
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!("Browser handler event error: {}", e);
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let _ = browser.close().await;
                let _ = browser.wait().await;
                handler.abort();
                return Err(CrawlerError::Browser(format!(
                    "failed to open browser tab: {}",
                    e
                )));
            }
        };

        tracing::info!("Browser session started");

        Ok(Self {
            browser: Some(browser),
            page: Some(page),
            handler: Some(handler),
            navigation_timeout,
        })
    }
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    async fn fetch(&mut self, url: &str, settle: Duration) -> Result<String, FetchError> {
        let page = self.page.as_ref().ok_or_else(|| FetchError::Navigation {
            url: url.to_string(),
            message: "browser session already closed".to_string(),
        })?;

        match tokio::time::timeout(self.navigation_timeout, page.goto(url)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                return Err(FetchError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                })
            }
            Err(_) => {
                return Err(FetchError::Timeout {
                    url: url.to_string(),
                })
            }
        }

        tokio::time::sleep(settle).await;

        page.content().await.map_err(|e| FetchError::Navigation {
            url: url.to_string(),
            message: format!("failed to read page content: {}", e),
        })
    }

    async fn close(&mut self) -> Result<(), CrawlerError> {
        if let Some(page) = self.page.take() {
            if let Err(e) = page.close().await {
                tracing::debug!("Failed to close browser tab: {}", e);
            }
        }

        let result = match self.browser.take() {
            Some(mut browser) => {
                let closed = browser
                    .close()
                    .await
                    .map(|_| ())
                    .map_err(|e| CrawlerError::Browser(format!("failed to close Chromium: {}", e)));
                let _ = browser.wait().await;
                tracing::info!("Browser session closed");
                closed
            }
            None => Ok(()),
        };

        if let Some(handler) = self.handler.take() {
            handler.abort();
        }

        result
    }
}

/// Builds the HTTP client used by `HttpFetcher`
///
/// # Arguments
///
/// * `config` - The fetcher configuration (timeout and user agent)
pub fn build_http_client(config: &BrowserConfig) -> Result<Client, reqwest::Error> {
    let user_agent = config.user_agent.clone().unwrap_or_else(|| {
        format!(
            "{}/{}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        )
    });

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_millis(config.navigation_timeout_ms))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Plain HTTP fetcher
///
/// Nothing is rendered, so the settle delay is skipped. Any non-2xx
/// response is a fetch failure.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &BrowserConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }
}

fn classify_reqwest_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&mut self, url: &str, _settle: Duration) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| classify_reqwest_error(url, e))?;

        response
            .text()
            .await
            .map_err(|e| classify_reqwest_error(url, e))
    }

    async fn close(&mut self) -> Result<(), CrawlerError> {
        Ok(())
    }
}

/// In-memory fetcher for unit tests
#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Serves canned HTML; URLs in `failing` (or unknown URLs) fail to load
    #[derive(Default)]
    pub struct StaticFetcher {
        pages: HashMap<String, String>,
        failing: HashSet<String>,
        pub visits: Arc<Mutex<Vec<(String, Duration)>>>,
        pub closes: Arc<AtomicUsize>,
    }

    impl StaticFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn page(mut self, url: &str, html: &str) -> Self {
            self.pages.insert(url.to_string(), html.to_string());
            self
        }

        pub fn failing(mut self, url: &str) -> Self {
            self.failing.insert(url.to_string());
            self
        }

        pub fn close_count(&self) -> Arc<AtomicUsize> {
            Arc::clone(&self.closes)
        }

        pub fn visit_log(&self) -> Arc<Mutex<Vec<(String, Duration)>>> {
            Arc::clone(&self.visits)
        }
    }

    #[async_trait]
    impl PageFetcher for StaticFetcher {
        async fn fetch(&mut self, url: &str, settle: Duration) -> Result<String, FetchError> {
            self.visits.lock().unwrap().push((url.to_string(), settle));

            if self.failing.contains(url) {
                return Err(FetchError::Navigation {
                    url: url.to_string(),
                    message: "net::ERR_CONNECTION_RESET".to_string(),
                });
            }

            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| FetchError::Navigation {
                    url: url.to_string(),
                    message: "net::ERR_NAME_NOT_RESOLVED".to_string(),
                })
        }

        async fn close(&mut self) -> Result<(), CrawlerError> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }
}
