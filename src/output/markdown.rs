//! Markdown summary generation
//!
//! This module generates a human-readable markdown summary of a crawl run:
//! statistics, the category tree that was seen, and the nodes that failed.

use crate::crawler::CrawlReport;
use crate::output::traits::SinkResult;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the markdown summary of `report` to `output_path`
///
/// # Arguments
///
/// * `report` - The finished crawl
/// * `config_hash` - Hash of the configuration the crawl ran with
/// * `output_path` - Path where the markdown file should be written
pub fn generate_markdown_summary(
    report: &CrawlReport,
    config_hash: &str,
    output_path: &Path,
) -> SinkResult<()> {
    let markdown = format_markdown_summary(report, config_hash);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl report as markdown
pub fn format_markdown_summary(report: &CrawlReport, config_hash: &str) -> String {
    let stats = &report.statistics;
    let mut md = String::new();

    md.push_str("# Catalog Crawl Summary\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Site**: {}\n", report.base_url));
    md.push_str(&format!("- **Started**: {}\n", stats.started_at.to_rfc3339()));
    if let Some(finished) = &stats.finished_at {
        md.push_str(&format!("- **Finished**: {}\n", finished.to_rfc3339()));
    }
    if let Some(duration) = stats.duration_seconds() {
        md.push_str(&format!(
            "- **Duration**: {} seconds ({:.2} minutes)\n",
            duration,
            duration as f64 / 60.0
        ));
    }
    md.push_str(&format!("- **Config Hash**: {}\n\n", config_hash));

    md.push_str("## Statistics\n\n");
    md.push_str("| Metric | Count |\n");
    md.push_str("|--------|-------|\n");
    md.push_str(&format!("| Categories found | {} |\n", stats.categories_found));
    md.push_str(&format!("| Categories failed | {} |\n", stats.categories_failed));
    md.push_str(&format!(
        "| Sub-categories found | {} |\n",
        stats.subcategories_found
    ));
    md.push_str(&format!(
        "| Sub-categories failed | {} |\n",
        stats.subcategories_failed
    ));
    if stats.subcategories_skipped > 0 {
        md.push_str(&format!(
            "| Sub-categories not fetched (dry run) | {} |\n",
            stats.subcategories_skipped
        ));
    }
    md.push_str(&format!("| Records | {} |\n", stats.records));
    md.push_str(&format!(
        "| Records without products | {} |\n",
        stats.empty_subcategories
    ));
    md.push_str(&format!("| Products | {} |\n", stats.products));
    md.push_str(&format!("| Navigations | {} |\n\n", stats.navigations));

    if !report.branches.is_empty() {
        md.push_str("## Categories\n\n");
        for branch in &report.branches {
            let status = if branch.fetched { "" } else { " (failed)" };
            md.push_str(&format!(
                "- [{}]({}){}: {} sub-categories, {} records\n",
                branch.category.name,
                branch.category.url,
                status,
                branch.subcategories.len(),
                branch.records
            ));
            for sub in &branch.subcategories {
                md.push_str(&format!("  - [{}]({})\n", sub.name, sub.url));
            }
        }
        md.push('\n');
    }

    if !report.failures.is_empty() {
        md.push_str("## Failures\n\n");
        md.push_str("| Level | Name | URL | Error |\n");
        md.push_str("|-------|------|-----|-------|\n");
        for failure in &report.failures {
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                failure.level,
                escape_cell(&failure.name),
                failure.url,
                escape_cell(&failure.error)
            ));
        }
        md.push('\n');
    }

    md
}

fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|")
}
