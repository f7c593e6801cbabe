//! Crawler module for walking the category tree
//!
//! This module contains the core crawling logic, including:
//! - Browsing contexts carrying the session state
//! - Page fetching with timeouts, pacing and readiness polling
//! - Selector-based extraction of links
//! - The depth-first tree walk

mod context;
mod fetcher;
mod parser;
mod scheduler;
mod walker;

pub use context::{build_http_client, BrowsingContext, ContextFactory, HttpContext, HttpContextFactory};
pub use fetcher::{FetchSettings, PageFetcher};
pub use parser::{extract, has_match, resolve_link, Document, Extracted, LevelSelectors};
pub use scheduler::Pacer;
pub use walker::{BranchReport, CrawlReport, NodeFailure, TreeWalker, WalkOptions};

use crate::config::Config;
use crate::output::CsvSink;
use crate::{session, ConfigError, CrawlError};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Load the session state, if any
/// 2. Build the context factory and tree walker
/// 3. Walk the tree, writing records to the CSV file after each category
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed; failed branches are listed in the report
/// * `Err(CrawlError)` - Crawl could not start, or output could not be written
///
/// # Example
///
/// ```no_run
/// use catalog_crawler::config::load_config;
/// use catalog_crawler::crawler::crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("crawler.toml"))?;
/// let report = crawl(&config).await?;
/// println!("{} records", report.statistics.records);
/// # Ok(())
/// # }
/// ```
pub async fn crawl(config: &Config) -> Result<CrawlReport, CrawlError> {
    let base_url = Url::parse(&config.site.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", config.site.base_url, e)))?;

    let auth = session::load(Path::new(&config.session.auth_path), &base_url);

    let factory = HttpContextFactory::new(
        config.user_agent.clone(),
        Duration::from_millis(config.timing.navigation_timeout_ms),
        auth,
    );

    if !factory.is_authenticated() {
        tracing::warn!("No session state for {}, pages may differ from a logged-in view", base_url);
    }

    let walker = build_walker(config, factory)?;
    let mut sink = CsvSink::new(&config.output.csv_path);
    let report = walker.run(base_url.as_str(), &mut sink).await?;

    if sink.rows_written() == 0 && !config.crawler.dry_run {
        tracing::warn!("No records collected, {} not written", sink.path().display());
    }

    Ok(report)
}

/// Assembles a tree walker from configuration and a context factory
pub fn build_walker<F: ContextFactory>(
    config: &Config,
    factory: F,
) -> Result<TreeWalker<F>, ConfigError> {
    let selectors = LevelSelectors::compile(&config.selectors)?;
    let pacer = Pacer::new(Duration::from_millis(config.timing.min_request_interval_ms));
    let options = WalkOptions {
        empty_label: config.crawler.empty_products_label.clone(),
        dry_run: config.crawler.dry_run,
        concurrency: config.crawler.max_branch_concurrency as usize,
    };

    Ok(TreeWalker::new(
        factory,
        selectors,
        FetchSettings::from(&config.timing),
        pacer,
        options,
    ))
}
