//! # Scraper Configuration Module
//!
//! Configuration for the company website scraper: cache lifetime and capacity,
//! the global throttle between outbound requests, HTTP client options and the
//! location of the on-disk response cache. It uses the same builder pattern as
//! the rest of the crate.

use std::path::PathBuf;
use std::time::Duration;

/// Browser-like user agent sent with every fetch
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; CompanyAnalyzer/1.0; +http://example.com)";

/// Configuration for the scraper
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// How long an extracted record stays valid in memory
    pub cache_ttl: Duration,

    /// Maximum number of records kept in memory
    pub cache_capacity: usize,

    /// Minimum interval between successive outbound fetches (0 disables it)
    pub min_request_interval: Duration,

    /// Timeout for a single fetch
    pub request_timeout: Duration,

    /// User agent to use for requests
    pub user_agent: String,

    /// Directory for the on-disk response cache; `None` disables it
    pub http_cache_dir: Option<PathBuf>,

    /// Freshness window of on-disk responses
    pub http_cache_ttl: Duration,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(3600),
            cache_capacity: 100,
            min_request_interval: Duration::from_secs(1),
            request_timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            http_cache_dir: Some(PathBuf::from(".sales-assistant/http-cache")),
            http_cache_ttl: Duration::from_secs(3600),
        }
    }
}

/// Builder for ScraperConfig
#[derive(Debug, Default)]
pub struct ScraperConfigBuilder {
    config: ScraperConfig,
}

impl ScraperConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: ScraperConfig::default(),
        }
    }

    /// Set the in-memory cache lifetime
    pub fn cache_ttl(mut self, cache_ttl: Duration) -> Self {
        self.config.cache_ttl = cache_ttl;
        self
    }

    /// Set the in-memory cache capacity
    pub fn cache_capacity(mut self, cache_capacity: usize) -> Self {
        self.config.cache_capacity = cache_capacity;
        self
    }

    /// Set the minimum interval between outbound fetches
    pub fn min_request_interval(mut self, interval: Duration) -> Self {
        self.config.min_request_interval = interval;
        self
    }

    /// Set the minimum interval between outbound fetches in milliseconds
    pub fn rate_limit_ms(self, rate_limit_ms: u64) -> Self {
        self.min_request_interval(Duration::from_millis(rate_limit_ms))
    }

    /// Set the fetch timeout
    pub fn request_timeout(mut self, request_timeout: Duration) -> Self {
        self.config.request_timeout = request_timeout;
        self
    }

    /// Set the user agent to use for requests
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set (or clear) the on-disk response cache directory
    pub fn http_cache_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.config.http_cache_dir = dir;
        self
    }

    /// Set the on-disk response freshness window
    pub fn http_cache_ttl(mut self, ttl: Duration) -> Self {
        self.config.http_cache_ttl = ttl;
        self
    }

    /// Build the configuration
    pub fn build(self) -> ScraperConfig {
        self.config
    }
}

impl ScraperConfig {
    /// Create a new builder
    pub fn builder() -> ScraperConfigBuilder {
        ScraperConfigBuilder::new()
    }
}
