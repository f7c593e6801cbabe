//! Catalog-Crawler main entry point
//!
//! This is the command-line interface for the category tree crawler.

use anyhow::Context;
use catalog_crawler::config::{load_config_with_hash, Config};
use catalog_crawler::crawler::{crawl, CrawlReport};
use catalog_crawler::output::{generate_markdown_summary, print_statistics};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Catalog-Crawler: an authenticated category tree crawler
///
/// Walks a retailer's catalogue from the home page through every category
/// and sub-category, and writes one CSV row per sub-category with the
/// product links it lists.
#[derive(Parser, Debug)]
#[command(name = "catalog-crawler")]
#[command(version)]
#[command(about = "An authenticated category tree crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file; defaults apply when omitted
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Home page of the site to crawl
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// CSV file to write
    #[arg(short, long, value_name = "PATH")]
    output: Option<String>,

    /// Saved session state file
    #[arg(long, value_name = "PATH")]
    auth: Option<String>,

    /// Per-navigation timeout in milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Number of category branches walked at once
    #[arg(long, value_name = "N")]
    concurrency: Option<u32>,

    /// List categories and sub-categories without fetching product pages
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Applies command-line overrides on top of the loaded configuration
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(base_url) = &self.base_url {
            config.site.base_url = base_url.clone();
        }
        if let Some(output) = &self.output {
            config.output.csv_path = output.clone();
        }
        if let Some(auth) = &self.auth {
            config.session.auth_path = auth.clone();
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.timing.navigation_timeout_ms = timeout_ms;
        }
        if let Some(concurrency) = self.concurrency {
            config.crawler.max_branch_concurrency = concurrency;
        }
        if self.dry_run {
            config.crawler.dry_run = true;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    match &cli.config {
        Some(path) => tracing::info!("Loading configuration from: {}", path.display()),
        None => tracing::info!("No configuration file given, using defaults"),
    }
    let (mut config, config_hash) =
        load_config_with_hash(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    cli.apply_overrides(&mut config);
    config.validate().context("invalid configuration")?;

    tracing::info!(
        "Crawling {} (concurrency: {}, navigation timeout: {}ms)",
        config.site.base_url,
        config.crawler.max_branch_concurrency,
        config.timing.navigation_timeout_ms
    );

    let report = crawl(&config).await.context("crawl failed")?;

    if let Some(summary_path) = &config.output.summary_path {
        generate_markdown_summary(&report, &config_hash, Path::new(summary_path))
            .with_context(|| format!("failed to write summary to {}", summary_path))?;
        tracing::info!("Summary written to {}", summary_path);
    }

    if !cli.quiet {
        if config.crawler.dry_run {
            print_tree(&report);
        }
        print_statistics(&report.statistics);
        if report.statistics.records > 0 {
            println!("\n✓ Records written to: {}", config.output.csv_path);
        }
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("catalog_crawler=info,warn"),
            1 => EnvFilter::new("catalog_crawler=debug,info"),
            2 => EnvFilter::new("catalog_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Prints the category tree seen during a dry run
fn print_tree(report: &CrawlReport) {
    println!("=== Catalog-Crawler Dry Run ===\n");
    println!("Site: {}\n", report.base_url);

    for (i, branch) in report.branches.iter().enumerate() {
        let status = if branch.fetched { "" } else { " (failed)" };
        println!("{}. {}{}", i + 1, branch.category.name, status);
        for sub in &branch.subcategories {
            println!("   - {} -> {}", sub.name, sub.url);
        }
    }
    println!();
}
