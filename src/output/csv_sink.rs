//! CSV output of crawl records
//!
//! Format: UTF-8 with a byte-order mark (so spreadsheet tools keep accented
//! characters), header `Category,Sub-category,Link,Products`, one row per
//! record, products joined by `", "`.

use crate::output::traits::{RecordSink, SinkResult};
use crate::tree::{CrawlRecord, CSV_HEADERS};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// UTF-8 byte-order mark
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Incremental CSV sink
///
/// The file is created (truncating any previous one) on the first non-empty
/// append, so a run that collects nothing leaves no file behind. Every append
/// is flushed before returning.
pub struct CsvSink {
    path: PathBuf,
    writer: Option<csv::Writer<File>>,
    rows: usize,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: None,
            rows: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of data rows written so far
    pub fn rows_written(&self) -> usize {
        self.rows
    }
}

impl RecordSink for CsvSink {
    fn append(&mut self, records: &[CrawlRecord]) -> SinkResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        if self.writer.is_none() {
            self.writer = Some(create_writer(&self.path)?);
            tracing::info!("Writing records to {}", self.path.display());
        }
        let Some(writer) = self.writer.as_mut() else {
            return Ok(());
        };

        for record in records {
            writer.write_record(record.to_csv_record())?;
        }
        writer.flush()?;

        self.rows += records.len();
        tracing::debug!("Flushed {} rows ({} total)", records.len(), self.rows);
        Ok(())
    }
}

fn create_writer(path: &Path) -> SinkResult<csv::Writer<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut file = File::create(path)?;
    file.write_all(UTF8_BOM)?;

    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(CSV_HEADERS)?;
    Ok(writer)
}

/// Writes all records to `path` in one go
///
/// Identical records produce byte-identical files. Returns the number of
/// rows written; with no records, no file is created.
pub fn write_records(records: &[CrawlRecord], path: &Path) -> SinkResult<usize> {
    let mut sink = CsvSink::new(path);
    sink.append(records)?;
    Ok(sink.rows_written())
}
