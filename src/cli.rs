// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two ways to give seeds:
// - crawl <LINKS_FILE>: one URL per line (any whitespace works)
// - site <URL>...: URLs straight on the command line
//
// Every tuning flag can also come from a SITE_HARVESTER_* environment
// variable, which is handy in containers and CI.
// =============================================================================

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use site_harvester::config::{CrawlConfig, DEFAULT_CONCURRENCY, DEFAULT_MIN_CONTENT_CHARS};

#[derive(Parser, Debug)]
#[command(
    name = "site-harvester",
    version,
    about = "Crawl websites politely and collect their text for search indexing",
    long_about = "site-harvester crawls each seed URL's own host breadth-first, honours robots.txt \
                  allow/disallow rules and crawl delays, and stores the title, paragraph text and \
                  URL of every page with enough content."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl every seed URL listed in a file
    ///
    /// Example: site-harvester crawl links.txt --output pages.jsonl
    Crawl {
        /// File with seed URLs, separated by whitespace or newlines
        links_file: PathBuf,

        #[command(flatten)]
        args: CrawlArgs,
    },

    /// Crawl the seed URLs given on the command line
    ///
    /// Example: site-harvester site https://example.com/ https://example.org/
    Site {
        /// One or more seed URLs
        #[arg(required = true)]
        urls: Vec<String>,

        #[command(flatten)]
        args: CrawlArgs,
    },
}

#[derive(Args, Debug)]
pub struct CrawlArgs {
    /// JSON Lines file the crawled pages are appended to
    #[arg(long, env = "SITE_HARVESTER_OUTPUT", default_value = "pages.jsonl")]
    pub output: PathBuf,

    /// Maximum number of sites crawled at the same time
    #[arg(long, env = "SITE_HARVESTER_CONCURRENCY", default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Pages with less cleaned text than this are not stored
    #[arg(long, env = "SITE_HARVESTER_MIN_CONTENT", default_value_t = DEFAULT_MIN_CONTENT_CHARS)]
    pub min_content: usize,

    /// Per-request timeout in seconds
    #[arg(long, env = "SITE_HARVESTER_TIMEOUT", default_value_t = 10)]
    pub timeout: u64,

    /// Print the summary as JSON instead of a human-readable report
    #[arg(long)]
    pub json: bool,
}

impl CrawlArgs {
    pub fn to_config(&self) -> CrawlConfig {
        CrawlConfig {
            concurrency: self.concurrency.max(1),
            min_content_chars: self.min_content,
            request_timeout: Duration::from_secs(self.timeout),
            ..CrawlConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_defaults() {
        let cli = Cli::try_parse_from(["site-harvester", "site", "https://example.com/"]).unwrap();
        let Commands::Site { urls, args } = cli.command else {
            panic!("expected site command");
        };
        assert_eq!(urls, vec!["https://example.com/"]);
        let config = args.to_config();
        assert_eq!(config.min_content_chars, 500);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert!(!args.json);
    }

    #[test]
    fn test_site_requires_a_url() {
        assert!(Cli::try_parse_from(["site-harvester", "site"]).is_err());
    }

    #[test]
    fn test_crawl_flags() {
        let cli = Cli::try_parse_from([
            "site-harvester",
            "crawl",
            "links.txt",
            "--concurrency",
            "0",
            "--output",
            "out/pages.jsonl",
            "--json",
        ])
        .unwrap();
        let Commands::Crawl { links_file, args } = cli.command else {
            panic!("expected crawl command");
        };
        assert_eq!(links_file, PathBuf::from("links.txt"));
        assert_eq!(args.output, PathBuf::from("out/pages.jsonl"));
        assert!(args.json);
        // zero would deadlock the admission gate
        assert_eq!(args.to_config().concurrency, 1);
    }
}
