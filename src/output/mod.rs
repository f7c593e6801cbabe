//! Output module for crawl records and run summaries
//!
//! This module handles:
//! - Streaming crawl records to a CSV file, one branch at a time
//! - Recording crawl statistics
//! - Generating a markdown summary of a run

mod csv_sink;
mod markdown;
pub mod stats;
mod traits;

pub use csv_sink::{write_records, CsvSink, UTF8_BOM};
pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use stats::{print_statistics, CrawlStatistics};
pub use traits::{RecordSink, SinkError, SinkResult};
