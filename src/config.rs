// src/config.rs
// =============================================================================
// Crawl settings shared by the fetcher, the traversal loop and the dispatcher.
//
// Built once at startup (from CLI flags / environment in main.rs) and passed
// down by reference. There is no global configuration.
// =============================================================================

use std::time::Duration;

/// Pages whose cleaned body is shorter than this are extracted but not stored.
pub const DEFAULT_MIN_CONTENT_CHARS: usize = 500;

/// How many seeds may be crawled at the same time.
pub const DEFAULT_CONCURRENCY: usize = 1000;

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Ceiling on simultaneously running site traversals (at least 1)
    pub concurrency: usize,
    pub min_content_chars: usize,
    /// Per-request timeout enforced by the HTTP client
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        CrawlConfig {
            concurrency: DEFAULT_CONCURRENCY,
            min_content_chars: DEFAULT_MIN_CONTENT_CHARS,
            request_timeout: Duration::from_secs(10),
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        }
    }
}
