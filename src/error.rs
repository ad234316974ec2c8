// src/error.rs
// =============================================================================
// Typed errors for the crawl engine.
//
// Every error knows which URL, seed or file it is about, so log lines can
// carry those as structured fields instead of pre-formatted strings.
//
// Propagation rules:
// - UrlError, FetchError, TokenizeError: local to one page, logged and skipped
// - SeedError: aborts one seed's traversal, never its siblings
// - PersistenceError: the only thing that can fail a whole crawl
// =============================================================================

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// A string that could not be parsed as a URL.
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("can't parse URL '{url}': {source}")]
    Malformed {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

impl UrlError {
    pub fn malformed(url: &str, source: url::ParseError) -> Self {
        UrlError::Malformed {
            url: url.to_string(),
            source,
        }
    }
}

/// Failures from the fetch collaborator.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP client itself could not be built
    #[error("couldn't build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Network failure, timeout, DNS...
    #[error("couldn't make GET request to {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Disallowed status code
    #[error("{status} status code returned from {url}")]
    Status { url: String, status: u16 },

    /// Wrong media type
    #[error("content type of {url} is '{found}', expected {expected}")]
    ContentType {
        url: String,
        expected: &'static str,
        found: String,
    },

    #[error("couldn't read response from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// The token stream broke before a clean end-of-stream.
#[derive(Debug, Error)]
pub enum TokenizeError {
    /// html5ever handed control back mid-page
    #[error("couldn't tokenise page: tokenizer suspended at byte {offset}")]
    Suspended { offset: usize },
}

/// Where in the per-page pipeline something went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Scope,
    Fetch,
    Extract,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Scope => "scope",
            Stage::Fetch => "fetch",
            Stage::Extract => "extract",
        };
        f.write_str(name)
    }
}

/// One page's failure inside a traversal. Never escapes the traversal loop.
#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    Url(#[from] UrlError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Tokenize(#[from] TokenizeError),
}

/// Errors that abort a single seed's traversal.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("didn't crawl {seed}: {source}")]
    MalformedSeed {
        seed: String,
        #[source]
        source: UrlError,
    },

    #[error("didn't crawl {seed}: robots.txt unavailable: {source}")]
    Robots {
        seed: String,
        #[source]
        source: FetchError,
    },
}

/// Failures from the persistence collaborator.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("couldn't access page store {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A record could not be encoded; nothing was written
    #[error("couldn't encode page {url}: {source}")]
    Encode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// A write failed part way through. Written records stay written.
    #[error("couldn't insert some content into {}: {inserted} of {attempted} records stored: {source}", path.display())]
    Partial {
        path: PathBuf,
        inserted: usize,
        attempted: usize,
        #[source]
        source: std::io::Error,
    },
}

/// The only errors that fail a whole crawl.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("couldn't persist crawled pages: {0}")]
    Persistence(#[from] PersistenceError),
}
