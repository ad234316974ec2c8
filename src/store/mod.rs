// src/store/mod.rs
// =============================================================================
// Where crawled pages end up.
//
// The dispatcher hands every stored page to a PageStore in ONE call after all
// seeds have finished. Stores are insert-or-ignore keyed by url: seeing the
// same url twice (in one batch or across runs) is not an error.
//
// Implementations:
// - JsonlStore: one JSON object per line in a file
// - MemoryStore: a Vec behind a lock, for tests and embedding
// =============================================================================

mod jsonl;
mod memory;

pub use jsonl::JsonlStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;

/// One page worth indexing. `url` is the raw URL it was fetched from and
/// the record's primary key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    pub url: String,
    pub title: String,
    pub body: String,
}

/// What a persist call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PersistReport {
    pub inserted: usize,
    /// Records whose url was already stored
    pub skipped: usize,
}

#[async_trait]
pub trait PageStore: Send + Sync {
    async fn persist(&self, records: Vec<PageRecord>) -> Result<PersistReport, PersistenceError>;
}
