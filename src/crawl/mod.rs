// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling.
//
// Features:
// - Breadth-first crawling of one site per seed URL
// - Same-host restriction (never wanders onto other sites)
// - robots.txt allow/disallow rules and crawl delay
// - Many seeds in parallel under a fixed concurrency ceiling
//
// Submodules:
// - urls: normalization and same-domain checks
// - traversal: the per-seed crawl loop
// - dispatcher: runs all seeds and persists the results
// =============================================================================

mod dispatcher;
mod traversal;
pub mod urls;

#[cfg(test)]
mod fixtures;

pub use dispatcher::{CrawlSummary, Dispatcher};
pub use traversal::crawl_site;
