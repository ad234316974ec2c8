// src/lib.rs
// =============================================================================
// site-harvester: a host-scoped, robots.txt-aware crawler.
//
// Give it seed URLs; for each one it crawls the seed's own host breadth-first,
// pulls title / paragraph text / links out of every page, and finally stores
// every page with enough text in one batch.
//
// Layout:
// - crawl: URL helpers, the per-seed traversal loop and the dispatcher
// - robots: robots.txt parsing and the allow/disallow decision
// - extract: HTML tokenizing and content extraction
// - fetch: the network boundary (trait + reqwest implementation)
// - store: where pages end up (trait + JSON Lines / in-memory)
// - progress: optional per-page events for front-ends
// =============================================================================

pub mod config;
pub mod crawl;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod progress;
pub mod robots;
pub mod store;

pub use config::CrawlConfig;
pub use crawl::{CrawlSummary, Dispatcher};
pub use error::{CrawlError, FetchError, PersistenceError, SeedError, TokenizeError, UrlError};
pub use progress::{CrawlEvent, Progress};
pub use store::{PageRecord, PageStore};
