//! Configuration for batch runs and the CSV codec.

use std::time::Duration;

/// Default page size for table views.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Configuration for a batch-extraction run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Items processed concurrently. 1 is the sequential baseline and the
    /// default: the extraction service is metered, and a single in-flight
    /// call acts as backpressure.
    pub concurrency: usize,

    /// Deadline for a single extraction call. A timeout fails the item and
    /// the batch continues.
    pub call_timeout: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: 1,
            call_timeout: Duration::from_secs(60),
        }
    }
}

impl BatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the concurrency limit (floored at 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Set the per-call deadline.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }
}

/// Which cell of an imported CSV line carries the URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlColumn {
    /// A fixed zero-based column index.
    Index(usize),
    /// The first non-empty cell on the line.
    FirstNonEmpty,
}

/// Options for the CSV codec.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    pub url_column: UrlColumn,

    /// Rows rendered per write batch on export; bounds transient memory.
    pub export_batch_rows: usize,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            // Column 1: the upstream spreadsheets put a label in column 0.
            url_column: UrlColumn::Index(1),
            export_batch_rows: 128,
        }
    }
}

impl CsvOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_url_column(mut self, column: UrlColumn) -> Self {
        self.url_column = column;
        self
    }

    /// Set the export batch size (floored at 1).
    pub fn with_export_batch_rows(mut self, rows: usize) -> Self {
        self.export_batch_rows = rows.max(1);
        self
    }
}
