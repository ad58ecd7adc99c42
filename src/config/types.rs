use serde::Deserialize;

/// Main configuration structure for the crawler
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub links: LinkConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    pub output: OutputConfig,
}

/// Listing traversal configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// First listing page; later pages are derived from it
    #[serde(rename = "listing-url")]
    pub listing_url: String,

    /// Number of listing pages to visit
    #[serde(rename = "page-count", default = "default_page_count")]
    pub page_count: u32,

    /// Template for listing pages after the first.
    /// `{listing}` expands to the listing URL and `{page}` to the page number.
    #[serde(rename = "page-url-template", default = "default_page_url_template")]
    pub page_url_template: String,

    /// Pause after loading a listing page (milliseconds)
    #[serde(rename = "listing-settle-ms", default = "default_listing_settle_ms")]
    pub listing_settle_ms: u64,

    /// Pause after loading an article page (milliseconds)
    #[serde(rename = "article-settle-ms", default = "default_article_settle_ms")]
    pub article_settle_ms: u64,
}

/// Article link candidacy rules
#[derive(Debug, Clone, Deserialize)]
pub struct LinkConfig {
    /// Required trailing token of an article path
    #[serde(default = "default_link_suffix")]
    pub suffix: String,

    /// Regex that must match somewhere in the article path (the numeric ID)
    #[serde(rename = "id-pattern", default = "default_id_pattern")]
    pub id_pattern: String,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            suffix: default_link_suffix(),
            id_pattern: default_id_pattern(),
        }
    }
}

/// Article page extraction selectors
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractConfig {
    #[serde(rename = "title-selector", default = "default_title_selector")]
    pub title_selector: String,

    #[serde(rename = "content-selector", default = "default_content_selector")]
    pub content_selector: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            title_selector: default_title_selector(),
            content_selector: default_content_selector(),
        }
    }
}

/// Which page fetcher backs the crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FetcherMode {
    /// Headless Chromium, pages rendered with client-side scripts
    #[default]
    Chromium,
    /// Plain HTTP GET, for server-rendered pages
    Http,
}

/// Page fetcher configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    #[serde(default)]
    pub mode: FetcherMode,

    /// Chromium binary; auto-detected when absent
    #[serde(rename = "executable-path", default)]
    pub executable_path: Option<String>,

    /// Upper bound on a single navigation (milliseconds)
    #[serde(rename = "navigation-timeout-ms", default = "default_navigation_timeout_ms")]
    pub navigation_timeout_ms: u64,

    #[serde(rename = "user-agent", default)]
    pub user_agent: Option<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            mode: FetcherMode::default(),
            executable_path: None,
            navigation_timeout_ms: default_navigation_timeout_ms(),
            user_agent: None,
        }
    }
}

/// Dataset storage backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Csv,
    Sqlite,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Path to the persisted dataset
    #[serde(rename = "dataset-path")]
    pub dataset_path: String,

    /// Path to the run log
    #[serde(rename = "log-path")]
    pub log_path: String,
}

fn default_page_count() -> u32 {
    5
}

fn default_page_url_template() -> String {
    "{listing}/trang-{page}.chn".to_string()
}

fn default_listing_settle_ms() -> u64 {
    5000
}

fn default_article_settle_ms() -> u64 {
    2000
}

fn default_link_suffix() -> String {
    ".chn".to_string()
}

fn default_id_pattern() -> String {
    r"\d{12,}".to_string()
}

fn default_title_selector() -> String {
    "h1".to_string()
}

fn default_content_selector() -> String {
    "div.contentdetail".to_string()
}

fn default_navigation_timeout_ms() -> u64 {
    30_000
}
