// src/store/memory.rs
// In-memory PageStore with the same insert-or-ignore semantics as JsonlStore.

use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{PageRecord, PageStore, PersistReport};
use crate::error::PersistenceError;

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    records: Vec<PageRecord>,
    urls: HashSet<String>,
    calls: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn records(&self) -> Vec<PageRecord> {
        self.inner.lock().await.records.clone()
    }

    /// Number of persist calls received so far
    pub async fn calls(&self) -> usize {
        self.inner.lock().await.calls
    }
}

#[async_trait]
impl PageStore for MemoryStore {
    async fn persist(&self, records: Vec<PageRecord>) -> Result<PersistReport, PersistenceError> {
        let mut inner = self.inner.lock().await;
        inner.calls += 1;

        let mut report = PersistReport::default();
        for record in records {
            if inner.urls.insert(record.url.clone()) {
                inner.records.push(record);
                report.inserted += 1;
            } else {
                report.skipped += 1;
            }
        }
        Ok(report)
    }
}
