use serde::Deserialize;
use std::time::Duration;

/// Upper bound for every time window in the configuration (ten years)
pub const MAX_WINDOW_HOURS: i64 = 10 * 365 * 24;

/// Main configuration structure for the crawler
///
/// Every section and key is optional; omitted values fall back to the
/// defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub fetch: FetchConfig,
    pub extract: ExtractConfig,
    pub storage: StorageConfig,
    pub seeds: SeedsConfig,
}

/// Crawl loop behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum depth to crawl from seed URLs
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Minimum time between requests to the same hostname (seconds)
    #[serde(rename = "host-cooldown-secs")]
    pub host_cooldown_secs: u64,

    /// Fixed pause after each completed item (milliseconds)
    #[serde(rename = "item-delay-ms")]
    pub item_delay_ms: u64,

    /// Pause when no work is available (seconds)
    #[serde(rename = "idle-poll-secs")]
    pub idle_poll_secs: u64,

    /// How long a failed item waits before it may be reset to pending (minutes)
    #[serde(rename = "retry-backoff-mins")]
    pub retry_backoff_mins: i64,

    /// A URL scraped within this window is not enqueued again (hours)
    #[serde(rename = "recrawl-window-hours")]
    pub recrawl_window_hours: i64,
}

impl CrawlerConfig {
    pub fn host_cooldown(&self) -> Duration {
        Duration::from_secs(self.host_cooldown_secs)
    }

    pub fn item_delay(&self) -> Duration {
        Duration::from_millis(self.item_delay_ms)
    }

    pub fn idle_poll(&self) -> Duration {
        Duration::from_secs(self.idle_poll_secs)
    }

    pub fn retry_backoff(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.retry_backoff_mins.clamp(0, MAX_WINDOW_HOURS * 60))
    }

    pub fn recrawl_window(&self) -> chrono::Duration {
        chrono::Duration::hours(self.recrawl_window_hours.clamp(0, MAX_WINDOW_HOURS))
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            host_cooldown_secs: 30,
            item_delay_ms: 1000,
            idle_poll_secs: 10,
            retry_backoff_mins: 30,
            recrawl_window_hours: 24,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler, also used as the robots.txt product token
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// Optional URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: Option<String>,
}

impl UserAgentConfig {
    /// Full identity sent in the User-Agent header
    ///
    /// ```
    /// use navigate_crawler::config::UserAgentConfig;
    ///
    /// assert_eq!(UserAgentConfig::default().user_agent_string(), "NavigateBot/1.0");
    /// ```
    pub fn user_agent_string(&self) -> String {
        match &self.contact_url {
            Some(url) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, url
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }

    /// Token matched against `User-agent:` lines in robots.txt
    pub fn product_token(&self) -> &str {
        &self.crawler_name
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "NavigateBot".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: None,
        }
    }
}

/// HTTP fetch configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Page request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// robots.txt request timeout (seconds)
    #[serde(rename = "robots-timeout-secs")]
    pub robots_timeout_secs: u64,

    /// Response bodies are truncated to this many bytes
    #[serde(rename = "max-body-bytes")]
    pub max_body_bytes: usize,

    /// How long a fetched robots.txt is reused (hours)
    #[serde(rename = "robots-cache-hours")]
    pub robots_cache_hours: i64,
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn robots_timeout(&self) -> Duration {
        Duration::from_secs(self.robots_timeout_secs)
    }

    pub fn robots_cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.robots_cache_hours.clamp(0, MAX_WINDOW_HOURS))
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            robots_timeout_secs: 10,
            max_body_bytes: 5 * 1024 * 1024,
            robots_cache_hours: 24,
        }
    }
}

/// Content extraction limits
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Outbound links kept per page after filtering
    #[serde(rename = "max-links")]
    pub max_links: usize,

    /// Body text cap (characters)
    #[serde(rename = "max-text-chars")]
    pub max_text_chars: usize,

    /// Meta description cap (characters)
    #[serde(rename = "max-description-chars")]
    pub max_description_chars: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            max_links: 500,
            max_text_chars: 50_000,
            max_description_chars: 500,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Outbound links persisted on a document
    #[serde(rename = "max-stored-links")]
    pub max_stored_links: usize,

    /// Keywords persisted on a document
    #[serde(rename = "max-keywords")]
    pub max_keywords: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: "navigate.db".to_string(),
            max_stored_links: 50,
            max_keywords: 50,
        }
    }
}

/// Seed list configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SeedsConfig {
    /// Newline-delimited seed URL file
    pub path: String,
}

impl Default for SeedsConfig {
    fn default() -> Self {
        Self {
            path: "seeds.txt".to_string(),
        }
    }
}
