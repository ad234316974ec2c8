// src/crawl/traversal.rs
// =============================================================================
// Crawls ONE site breadth-first, starting from a seed URL.
//
// How it works:
// 1. Fetch and parse the seed's robots.txt (failure here aborts the seed)
// 2. Put the seed in a FIFO queue (the frontier)
// 3. Pop a URL; drop it if it's off-domain, malformed, already visited or
//    disallowed by robots.txt
// 4. Wait out the crawl delay while fetching the page
// 5. Extract title, paragraph text and links; queue every link
// 6. Keep the page if its cleaned text is long enough
// 7. Repeat until the frontier is empty
//
// Filtering happens when a URL is popped, not when it is queued, so the
// frontier may hold duplicates and foreign links for a while.
//
// Everything here belongs to one seed: the frontier, the visited set and the
// collected pages are never shared with other seeds.
// =============================================================================

use std::collections::VecDeque;

use tracing::{debug, info, instrument, warn};
use url::Url;

use super::urls;
use crate::config::CrawlConfig;
use crate::error::{PageError, SeedError, Stage, UrlError};
use crate::extract::extract_html;
use crate::fetch::Fetcher;
use crate::progress::{CrawlEvent, Progress};
use crate::robots::{is_fetchable, Rules, VisitedSet};
use crate::store::PageRecord;

// What happened to one popped URL
enum Visit {
    // off-domain, already visited or disallowed; never fetched
    Skipped,
    Crawled { stored: bool },
}

struct PageFailure {
    stage: Stage,
    error: PageError,
}

impl PageFailure {
    fn at(stage: Stage) -> impl FnOnce(PageError) -> PageFailure {
        move |error| PageFailure { stage, error }
    }
}

struct SiteTraversal<'a> {
    seed: &'a str,
    domain: Url,
    rules: Rules,
    visited: VisitedSet,
    frontier: VecDeque<String>,
    records: Vec<PageRecord>,
    fetcher: &'a dyn Fetcher,
    progress: &'a Progress,
    min_content_chars: usize,
}

// Crawls every reachable same-host page of one seed
//
// Parameters:
//   seed: the starting URL
//   fetcher: network access (real HTTP or a test double)
//   config: content threshold and friends
//   progress: where per-page events go
//
// Returns: the pages that had enough text to keep, in crawl order
//
// Only a malformed seed or an unavailable robots.txt is an error; every
// per-page problem is logged and skipped.
#[instrument(skip_all, fields(seed = %seed))]
pub async fn crawl_site(
    seed: &str,
    fetcher: &dyn Fetcher,
    config: &CrawlConfig,
    progress: &Progress,
) -> Result<Vec<PageRecord>, SeedError> {
    let malformed = |e| SeedError::MalformedSeed {
        seed: seed.to_string(),
        source: e,
    };

    let domain = urls::parse(seed).map_err(malformed)?;
    let robots_url = domain
        .join("/robots.txt")
        .map_err(|e| malformed(UrlError::malformed(seed, e)))?;

    let robots = fetcher
        .fetch_robots(robots_url.as_str())
        .await
        .map_err(|source| SeedError::Robots {
            seed: seed.to_string(),
            source,
        })?;
    let rules = Rules::parse(&urls::normalize_url(&domain), &robots);
    info!(
        disallowed = rules.disallowed.len(),
        allowed = rules.allowed.len(),
        crawl_delay_secs = rules.crawl_delay_secs,
        "robots.txt parsed"
    );

    let traversal = SiteTraversal {
        seed,
        domain,
        rules,
        visited: VisitedSet::new(),
        frontier: VecDeque::from([seed.to_string()]),
        records: Vec::new(),
        fetcher,
        progress,
        min_content_chars: config.min_content_chars,
    };
    Ok(traversal.run().await)
}

impl SiteTraversal<'_> {
    async fn run(mut self) -> Vec<PageRecord> {
        while let Some(raw) = self.frontier.pop_front() {
            match self.visit(&raw).await {
                Ok(Visit::Skipped) => {}
                Ok(Visit::Crawled { stored }) => {
                    debug!(url = %raw, stored, "crawled");
                    self.progress.notify(CrawlEvent::PageCrawled {
                        seed: self.seed.to_string(),
                        url: raw,
                        stored,
                    });
                }
                Err(PageFailure { stage, error }) => {
                    warn!(url = %raw, %stage, error = %error, "didn't crawl page");
                    // scope drops happen before any fetch attempt
                    if matches!(stage, Stage::Fetch | Stage::Extract) {
                        self.progress.notify(CrawlEvent::PageFailed {
                            seed: self.seed.to_string(),
                            url: raw,
                            stage,
                            reason: error.to_string(),
                        });
                    }
                }
            }
        }

        info!(
            pages = self.records.len(),
            visited = self.visited.len(),
            "site crawl finished"
        );
        self.records
    }

    async fn visit(&mut self, raw: &str) -> Result<Visit, PageFailure> {
        let page_url = urls::parse(raw)
            .map_err(PageError::from)
            .map_err(PageFailure::at(Stage::Scope))?;
        if !urls::same_host(&self.domain, &page_url) {
            debug!(url = raw, "off-domain, dropping");
            return Ok(Visit::Skipped);
        }

        let key = urls::normalize_url(&page_url);
        if !is_fetchable(&mut self.visited, &self.rules, &key) {
            return Ok(Visit::Skipped);
        }

        // the delay and the fetch run together; we move on only once both are done
        let (_, fetched) = tokio::join!(
            tokio::time::sleep(self.rules.crawl_delay()),
            self.fetcher.fetch_page(raw)
        );
        let page = fetched
            .map_err(PageError::from)
            .map_err(PageFailure::at(Stage::Fetch))?;

        let extracted = extract_html(&page_url, &page)
            .map_err(PageError::from)
            .map_err(PageFailure::at(Stage::Extract))?;

        let body = extracted.cleaned_body();
        self.frontier.extend(extracted.links);

        let stored = body.len() >= self.min_content_chars;
        if stored {
            self.records.push(PageRecord {
                url: raw.to_string(),
                title: extracted.title,
                body,
            });
        } else {
            debug!(url = raw, chars = body.len(), "not enough content, discarding");
        }
        Ok(Visit::Crawled { stored })
    }
}
