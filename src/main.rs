//! Market News Crawler main entry point
//!
//! This is the command-line interface for the market news crawler.

use anyhow::Context;
use clap::Parser;
use market_news_crawler::config::{load_config_with_hash, Config};
use market_news_crawler::crawler::{crawl, ListingPages};
use market_news_crawler::output::{load_statistics, log_run_summary, print_statistics};
use market_news_crawler::storage::open_dataset;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::Subscriber;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Market News Crawler: incremental stock-market news crawler
///
/// Walks the paginated listing of a news portal, extracts every linked
/// article and merges the results into a dataset keyed by article URL.
/// Only one run per dataset path may execute at a time.
#[derive(Parser, Debug)]
#[command(name = "market-news-crawler")]
#[command(version)]
#[command(about = "Incremental stock-market news crawler")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Override the number of listing pages to visit
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pages: Option<u32>,

    /// Validate config and show which listing pages would be visited
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics of the persisted dataset and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;

    if let Some(pages) = cli.pages {
        config.crawler.page_count = pages;
    }

    setup_logging(Path::new(&config.output.log_path), cli.verbose, cli.quiet)?;
    tracing::info!(
        "Configuration {} loaded (hash: {})",
        cli.config.display(),
        config_hash
    );

    if cli.dry_run {
        handle_dry_run(&config, &config_hash);
        Ok(())
    } else if cli.stats {
        handle_stats(&config, &config_hash)
    } else {
        handle_crawl(config).await
    }
}

/// Sets up console and run-log output based on verbosity level
///
/// Every line carries a local `YYYY-MM-DD HH:MM:SS` timestamp and a level.
/// The run log is appended to, never truncated.
fn setup_logging(log_path: &Path, verbose: u8, quiet: bool) -> anyhow::Result<()> {
    let log_file = open_run_log(log_path)?;
    run_subscriber(log_file, verbose, quiet).init();
    Ok(())
}

fn open_run_log(log_path: &Path) -> anyhow::Result<File> {
    if let Some(parent) = log_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create log directory {}", parent.display())
            })?;
        }
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("Failed to open run log {}", log_path.display()))
}

/// Console filter; `-q` and `-v` only apply here
fn console_filter(verbose: u8, quiet: bool) -> EnvFilter {
    if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        run_log_filter(verbose)
    }
}

/// Run-log filter; never coarser than info so progress and summaries are kept
fn run_log_filter(verbose: u8) -> EnvFilter {
    match verbose {
        0 => EnvFilter::new("market_news_crawler=info,warn"),
        1 => EnvFilter::new("market_news_crawler=debug,info"),
        2 => EnvFilter::new("market_news_crawler=trace,debug"),
        _ => EnvFilter::new("trace"),
    }
}

fn run_subscriber(log_file: File, verbose: u8, quiet: bool) -> impl Subscriber + Send + Sync {
    let timestamp = || ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string());

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_timer(timestamp())
                .with_filter(console_filter(verbose, quiet)),
        )
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_timer(timestamp())
                .with_writer(Mutex::new(log_file))
                .with_filter(run_log_filter(verbose)),
        )
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config, config_hash: &str) {
    println!("=== Market News Crawler Dry Run ===\n");
    println!("Config hash: {}\n", config_hash);

    println!("Crawler Configuration:");
    println!("  Listing URL: {}", config.crawler.listing_url);
    println!("  Listing pages: {}", config.crawler.page_count);
    println!("  Listing settle delay: {}ms", config.crawler.listing_settle_ms);
    println!("  Article settle delay: {}ms", config.crawler.article_settle_ms);

    println!("\nArticle Links:");
    println!("  Suffix: {}", config.links.suffix);
    println!("  ID pattern: {}", config.links.id_pattern);

    println!("\nExtraction:");
    println!("  Title selector: {}", config.extract.title_selector);
    println!("  Content selector: {}", config.extract.content_selector);

    println!("\nFetcher: {:?}", config.browser.mode);

    println!("\nOutput:");
    println!("  Dataset ({:?}): {}", config.output.backend, config.output.dataset_path);
    println!("  Run log: {}", config.output.log_path);

    println!("\nListing pages to visit:");
    for (page, url) in ListingPages::from_config(&config.crawler).iter() {
        println!("  {:>3}. {}", page, url);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows statistics of the persisted dataset
fn handle_stats(config: &Config, config_hash: &str) -> anyhow::Result<()> {
    println!("Dataset: {}", config.output.dataset_path);
    println!("Config hash: {}\n", config_hash);

    let store = open_dataset(&config.output)?;
    let stats = load_statistics(store.as_ref())?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        "Starting crawl of {} ({} listing pages)",
        config.crawler.listing_url,
        config.crawler.page_count
    );

    match crawl(config).await {
        Ok(summary) => {
            log_run_summary(&summary);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
