// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Set up logging (tracing, filtered by RUST_LOG)
// 2. Parse command-line arguments using clap
// 3. Build the shared HTTP fetcher and page store once
// 4. Run the dispatcher over every seed, printing progress as pages finish
// 5. Exit with proper code (0 = pages stored, 1 = nothing crawled, 2 = error)
// =============================================================================

mod cli;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use site_harvester::fetch::HttpFetcher;
use site_harvester::store::JsonlStore;
use site_harvester::{CrawlEvent, CrawlSummary, Dispatcher, Progress};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing_subscriber::EnvFilter;

use cli::{Cli, CrawlArgs, Commands};

#[tokio::main]
async fn main() {
    init_logging();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Logs go to stderr so --json output on stdout stays machine-readable
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("site_harvester=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Crawl { links_file, args } => {
            let seeds = read_seeds(&links_file).await?;
            handle_crawl(seeds, &args).await
        }
        Commands::Site { urls, args } => handle_crawl(urls, &args).await,
    }
}

async fn read_seeds(path: &Path) -> Result<Vec<String>> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("couldn't read {}", path.display()))?;
    Ok(contents.split_whitespace().map(String::from).collect())
}

async fn handle_crawl(seeds: Vec<String>, args: &CrawlArgs) -> Result<i32> {
    if seeds.is_empty() {
        eprintln!("⚠️  No seed URLs to crawl");
        return Ok(1);
    }

    let config = args.to_config();
    if !args.json {
        println!("🔍 Crawling {} site(s)", seeds.len());
        println!("📊 Concurrency: {}", config.concurrency);
    }

    let fetcher = Arc::new(HttpFetcher::new(&config)?);
    let store = Arc::new(JsonlStore::new(&args.output));

    let (progress, events) = Progress::channel();
    let printer = tokio::spawn(print_progress(events, args.json));

    // the dispatcher (and with it every progress sender) is dropped after
    // this statement, which lets the printer finish
    let summary = Dispatcher::new(fetcher, store, config)
        .with_progress(progress)
        .run(seeds)
        .await;
    let attempted = printer.await.context("progress printer stopped unexpectedly")?;
    let summary = summary?;

    print_summary(&summary, attempted, &args.output, args.json)?;

    if summary.is_empty() {
        eprintln!("⚠️  No sites were crawled");
        Ok(1)
    } else {
        Ok(0)
    }
}

// Prints one line per finished page and returns how many there were
async fn print_progress(mut events: UnboundedReceiver<CrawlEvent>, quiet: bool) -> usize {
    let mut attempted = 0;
    while let Some(event) = events.recv().await {
        attempted += 1;
        if quiet {
            continue;
        }
        match event {
            CrawlEvent::PageCrawled { url, stored: true, .. } => println!("  Crawled: {}", url),
            CrawlEvent::PageCrawled { url, stored: false, .. } => {
                println!("  Crawled (too short, not kept): {}", url)
            }
            CrawlEvent::PageFailed { url, stage, reason, .. } => {
                println!("  Failed [{}]: {} ({})", stage, url, reason)
            }
        }
    }
    attempted
}

fn print_summary(summary: &CrawlSummary, attempted: usize, output: &Path, json: bool) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(summary)?;
        println!("{}", json_output);
        return Ok(());
    }

    println!();
    println!("📊 Summary:");
    println!("   🌱 Sites: {}", summary.seeds);
    println!("   📄 Pages attempted: {}", attempted);
    println!("   ✅ Pages kept: {}", summary.pages);
    if let Some(report) = &summary.report {
        println!("   💾 Newly stored: {} (already stored: {})", report.inserted, report.skipped);
        println!("   📁 Output: {}", output.display());
    }
    if !summary.failed_seeds.is_empty() {
        println!("   ❌ Failed sites: {}", summary.failed_seeds.len());
        for seed in &summary.failed_seeds {
            println!("      {}", seed);
        }
    }
    Ok(())
}
