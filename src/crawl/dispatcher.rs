// src/crawl/dispatcher.rs
// =============================================================================
// Runs one site traversal per seed, at most `concurrency` at a time, then
// stores everything they collected in a single batch.
//
// Concurrency model:
// - a Semaphore with `concurrency` permits is the admission gate
// - the launching loop waits for a permit BEFORE spawning each seed's task,
//   so at most `concurrency` traversals exist at once
// - each task owns its permit and gives it back when it ends, however it ends
// - a JoinSet holds every task handle; nothing outlives run()
//
// Failure isolation: a seed that fails (bad URL, no robots.txt, even a panic)
// is logged and counted; its siblings carry on.
// =============================================================================

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info};

use super::traversal::crawl_site;
use crate::config::CrawlConfig;
use crate::error::{CrawlError, SeedError};
use crate::fetch::Fetcher;
use crate::progress::Progress;
use crate::store::{PageRecord, PageStore, PersistReport};

/// Outcome of a whole crawl.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CrawlSummary {
    /// Seeds we were asked to crawl
    pub seeds: usize,
    pub failed_seeds: Vec<String>,
    /// Pages handed to the store
    pub pages: usize,
    /// None when there was nothing to store
    pub report: Option<PersistReport>,
}

impl CrawlSummary {
    pub fn is_empty(&self) -> bool {
        self.pages == 0
    }
}

pub struct Dispatcher {
    fetcher: Arc<dyn Fetcher>,
    store: Arc<dyn PageStore>,
    config: Arc<CrawlConfig>,
    progress: Progress,
}

impl Dispatcher {
    pub fn new(fetcher: Arc<dyn Fetcher>, store: Arc<dyn PageStore>, config: CrawlConfig) -> Self {
        Dispatcher {
            fetcher,
            store,
            config: Arc::new(config),
            progress: Progress::disabled(),
        }
    }

    // Attaches a progress notifier; without one, events are dropped
    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = progress;
        self
    }

    // Crawls every seed, then persists all collected pages in one call
    //
    // Returns Err only if the final persist fails. An empty result is NOT an
    // error here; callers decide what "nothing crawled" means for them.
    pub async fn run(&self, seeds: Vec<String>) -> Result<CrawlSummary, CrawlError> {
        let mut summary = CrawlSummary {
            seeds: seeds.len(),
            ..CrawlSummary::default()
        };

        let batch = self.crawl_all(seeds, &mut summary.failed_seeds).await;
        summary.pages = batch.len();

        if batch.is_empty() {
            info!(seeds = summary.seeds, "nothing to persist");
            return Ok(summary);
        }

        summary.report = Some(self.store.persist(batch).await?);
        Ok(summary)
    }

    async fn crawl_all(&self, seeds: Vec<String>, failed: &mut Vec<String>) -> Vec<PageRecord> {
        let gate = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let mut tasks = JoinSet::new();

        info!(
            seeds = seeds.len(),
            concurrency = self.config.concurrency,
            "starting crawl"
        );

        for seed in seeds {
            // blocks here while every slot is taken
            let permit = match Arc::clone(&gate).acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    error!(%seed, error = %e, "admission gate closed, not launching seed");
                    failed.push(seed);
                    continue;
                }
            };

            let fetcher = Arc::clone(&self.fetcher);
            let config = Arc::clone(&self.config);
            let progress = self.progress.clone();
            tasks.spawn(async move {
                let _permit = permit;
                let result = crawl_site(&seed, fetcher.as_ref(), &config, &progress).await;
                (seed, result)
            });
        }

        let mut batch = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(records))) => batch.extend(records),
                Ok((seed, Err(e))) => {
                    log_seed_failure(&e);
                    failed.push(seed);
                }
                Err(e) => {
                    // the seed's name died with the task
                    error!(error = %e, "seed task panicked or was cancelled");
                    failed.push(String::from("<unknown seed>"));
                }
            }
        }

        info!(
            pages = batch.len(),
            failed_seeds = failed.len(),
            "all seeds finished"
        );
        batch
    }
}

fn log_seed_failure(e: &SeedError) {
    match e {
        SeedError::MalformedSeed { seed, .. } | SeedError::Robots { seed, .. } => {
            error!(%seed, error = %e, "seed failed")
        }
    }
}
