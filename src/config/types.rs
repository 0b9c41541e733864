use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Dirlist-Catalog
///
/// Every table and key is optional; anything left out keeps its built-in
/// default, so `Config::default()` is the configuration used when no file is
/// given on the command line.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub http: HttpConfig,
    pub output: OutputConfig,
    pub media: MediaConfig,
}

/// Traversal and retry behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Directory listing the traversal starts from (must end with `/`)
    #[serde(rename = "root-url")]
    pub root_url: String,

    /// Minimum time between two consecutive requests (milliseconds)
    #[serde(rename = "request-delay")]
    pub request_delay: u64,

    /// Attempts per page, shared by transient failures and rate limiting
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Pause after a rate-limit response (milliseconds)
    #[serde(rename = "rate-limit-cooldown")]
    pub rate_limit_cooldown: u64,

    /// Pause after a transient network failure (milliseconds)
    #[serde(rename = "transient-retry-delay")]
    pub transient_retry_delay: u64,

    /// Number of new entries between two periodic checkpoints
    #[serde(rename = "checkpoint-interval")]
    pub checkpoint_interval: usize,
}

impl CrawlerConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay)
    }

    pub fn rate_limit_cooldown(&self) -> Duration {
        Duration::from_millis(self.rate_limit_cooldown)
    }

    pub fn transient_retry_delay(&self) -> Duration {
        Duration::from_millis(self.transient_retry_delay)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            root_url: "https://a.111477.xyz/movies/".to_string(),
            request_delay: 3_000,
            max_attempts: 3,
            rate_limit_cooldown: 60_000,
            transient_retry_delay: 5_000,
            checkpoint_interval: 20,
        }
    }
}

/// Request identification and timeouts
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Accept header sent with every request
    pub accept: String,

    /// Optional Referer header
    pub referer: Option<String>,

    /// Whole-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"
                .to_string(),
            referer: Some("https://a.111477.xyz/".to_string()),
            timeout_secs: 15,
        }
    }
}

/// Catalog file configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path of the JSON catalog, overwritten by every checkpoint
    #[serde(rename = "catalog-path")]
    pub catalog_path: String,

    /// Genre tag given to every entry
    #[serde(rename = "default-genre")]
    pub default_genre: String,

    /// Label given to every download link
    #[serde(rename = "link-label")]
    pub link_label: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            catalog_path: "directory_import.json".to_string(),
            default_genre: "Uncategorized".to_string(),
            link_label: "Download".to_string(),
        }
    }
}

/// Which links count as leaf media files
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Lowercase extensions including the leading dot
    pub extensions: Vec<String>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            extensions: [".mp4", ".mkv", ".avi", ".mov", ".wmv", ".m4v"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}
