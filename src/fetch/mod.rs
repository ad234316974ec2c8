// src/fetch/mod.rs
// =============================================================================
// The crawler's view of the network.
//
// The traversal loop only talks to the Fetcher trait, so tests can swap the
// real HTTP client for an in-memory site.
//
// Contract:
// - fetch_page: fails on 4xx or if the content type isn't text/html,
//   otherwise returns the raw body bytes
// - fetch_robots: 404 means "no robots.txt" (empty body), 403 is an error,
//   otherwise the content type must be text/plain
// =============================================================================

mod http;

pub use http::HttpFetcher;

use async_trait::async_trait;

use crate::error::FetchError;

#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch_page(&self, url: &str) -> Result<Vec<u8>, FetchError>;

    async fn fetch_robots(&self, url: &str) -> Result<String, FetchError>;
}
