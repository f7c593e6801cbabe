//! Run statistics
//!
//! Counters collected while walking the tree, and their console rendering.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Crawl statistics summary
#[derive(Debug, Clone, Serialize)]
pub struct CrawlStatistics {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    /// Categories listed on the home page
    pub categories_found: u64,

    /// Categories whose page could not be fetched
    pub categories_failed: u64,

    /// Sub-categories listed on successfully fetched category pages
    pub subcategories_found: u64,

    /// Sub-categories whose page could not be fetched
    pub subcategories_failed: u64,

    /// Sub-categories listed but deliberately not fetched (dry run)
    pub subcategories_skipped: u64,

    /// Records handed to the sink
    pub records: u64,

    /// Records whose products are the empty label
    pub empty_subcategories: u64,

    /// Product names across all records
    pub products: u64,

    /// Page loads issued, readiness reloads included
    pub navigations: u64,
}

impl CrawlStatistics {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            finished_at: None,
            categories_found: 0,
            categories_failed: 0,
            subcategories_found: 0,
            subcategories_failed: 0,
            subcategories_skipped: 0,
            records: 0,
            empty_subcategories: 0,
            products: 0,
            navigations: 0,
        }
    }

    pub fn finish(&mut self, finished_at: DateTime<Utc>) {
        self.finished_at = Some(finished_at);
    }

    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }

    /// Share of attempted sub-category pages that were fetched, in percent
    pub fn success_rate(&self) -> f64 {
        let attempted = self.records + self.subcategories_failed;
        if attempted == 0 {
            return 0.0;
        }
        (self.records as f64 / attempted as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Tree:");
    println!(
        "  Categories: {} found, {} failed",
        stats.categories_found, stats.categories_failed
    );
    println!(
        "  Sub-categories: {} found, {} failed, {} skipped",
        stats.subcategories_found, stats.subcategories_failed, stats.subcategories_skipped
    );
    println!(
        "  Records: {} ({} without products)",
        stats.records, stats.empty_subcategories
    );
    println!("  Products: {}", stats.products);
    println!();

    println!("Navigations: {}", stats.navigations);
    if let Some(duration) = stats.duration_seconds() {
        println!("Duration: {}s", duration);
    }

    println!(
        "Success Rate: {:.1}% ({} / {} sub-category pages fetched)",
        stats.success_rate(),
        stats.records,
        stats.records + stats.subcategories_failed
    );
}
