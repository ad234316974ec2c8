// src/crawl/fixtures.rs
// =============================================================================
// Test-only in-memory website that stands in for the network.
//
// - pages and robots.txt bodies are registered by exact URL
// - unknown pages answer like a 404, unknown robots.txt like a missing one
// - every page fetch is recorded, and the number of fetches running at the
//   same moment is tracked so tests can check the concurrency ceiling
// =============================================================================

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::fetch::Fetcher;

#[derive(Default)]
pub struct SiteFixture {
    pages: HashMap<String, Vec<u8>>,
    robots: HashMap<String, Result<String, u16>>,
    latency: Duration,
    fetched: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl SiteFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, url: &str, html: impl Into<String>) -> Self {
        self.raw_page(url, html.into().into_bytes())
    }

    pub fn raw_page(mut self, url: &str, body: Vec<u8>) -> Self {
        self.pages.insert(url.to_string(), body);
        self
    }

    pub fn robots(mut self, url: &str, body: &str) -> Self {
        self.robots.insert(url.to_string(), Ok(body.to_string()));
        self
    }

    pub fn robots_status(mut self, url: &str, status: u16) -> Self {
        self.robots.insert(url.to_string(), Err(status));
        self
    }

    // Every fetch (page or robots.txt) takes this long
    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    async fn in_flight<T>(&self, work: impl FnOnce() -> T) -> T {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let result = work();
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

#[async_trait]
impl Fetcher for SiteFixture {
    async fn fetch_page(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.fetched.lock().unwrap().push(url.to_string());
        self.in_flight(|| {
            self.pages.get(url).cloned().ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
        })
        .await
    }

    async fn fetch_robots(&self, url: &str) -> Result<String, FetchError> {
        self.in_flight(|| match self.robots.get(url) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(status)) => Err(FetchError::Status {
                url: url.to_string(),
                status: *status,
            }),
            None => Ok(String::new()),
        })
        .await
    }
}

// Builds a page with a title, one paragraph of exactly `body_chars` letters
// and one anchor per link
pub fn html_page(title: &str, body_chars: usize, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|link| format!(r#"<a href="{link}">link</a>"#))
        .collect();
    let paragraph = if body_chars == 0 {
        String::new()
    } else {
        format!("<p>{}</p>", "a".repeat(body_chars))
    };
    format!(
        "<!DOCTYPE html><html><head><title>{title}</title></head>\
         <body><nav>{anchors}</nav>{paragraph}</body></html>"
    )
}
