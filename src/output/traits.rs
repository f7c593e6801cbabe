//! Output sink trait and errors
//!
//! A sink receives crawl records in traversal order, one completed category
//! branch at a time.

use crate::tree::CrawlRecord;
use thiserror::Error;

/// Errors that can occur while writing output
///
/// A failed write ends the crawl: records already handed to a sink cannot be
/// recovered without a rerun.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for output operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Destination for crawl records
pub trait RecordSink {
    /// Appends records, in order, after the ones already written
    ///
    /// Implementations should make the records durable before returning, so
    /// that a crash loses at most the branch in progress.
    fn append(&mut self, records: &[CrawlRecord]) -> SinkResult<()>;
}

/// In-memory sink
impl RecordSink for Vec<CrawlRecord> {
    fn append(&mut self, records: &[CrawlRecord]) -> SinkResult<()> {
        self.extend_from_slice(records);
        Ok(())
    }
}
