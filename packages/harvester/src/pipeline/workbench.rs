//! Host-facing facade over the tables, processor, and gateway.

use std::io;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::csv;
use crate::error::Result;
use crate::pipeline::batch::{self, BatchRun};
use crate::pipeline::derive::{self, DeriveReport};
use crate::pipeline::persist;
use crate::table::{pager, UrlTable, WorkTable};
use crate::traits::extractor::Extractor;
use crate::traits::fetcher::PageFetcher;
use crate::traits::store::RecordStore;
use crate::types::config::{BatchConfig, CsvOptions, DEFAULT_PAGE_SIZE};
use crate::types::item::WorkItem;

/// The batch-extraction workbench: owns the work table and drives imports,
/// runs, saves, and exports against the configured services.
///
/// The host invokes it with direct calls; there is no ambient state and no
/// CLI surface.
///
/// # Example
///
/// ```rust,ignore
/// use harvester::{MemoryStore, Workbench};
/// use harvester::testing::MockExtractor;
///
/// let mut bench = Workbench::new(MockExtractor::new(), MemoryStore::new());
/// bench.import_csv("event,https://example.com/conf\n");
/// bench.toggle_all();
/// let run = bench.run().await?;
/// let saved = bench.save().await?;
/// ```
pub struct Workbench<X: Extractor, S: RecordStore> {
    table: WorkTable,
    seeds: UrlTable,
    extractor: X,
    store: S,
    batch: BatchConfig,
    csv: CsvOptions,
    page_size: usize,
}

impl<X: Extractor, S: RecordStore> Workbench<X, S> {
    pub fn new(extractor: X, store: S) -> Self {
        Self {
            table: WorkTable::new(),
            seeds: UrlTable::new(),
            extractor,
            store,
            batch: BatchConfig::default(),
            csv: CsvOptions::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_batch_config(mut self, config: BatchConfig) -> Self {
        self.batch = config;
        self
    }

    pub fn with_csv_options(mut self, options: CsvOptions) -> Self {
        self.csv = options;
        self
    }

    /// Set the display page size (floored at 1).
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn table(&self) -> &WorkTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut WorkTable {
        &mut self.table
    }

    pub fn seeds(&self) -> &UrlTable {
        &self.seeds
    }

    // Imports ----------------------------------------------------------

    /// Load work items from CSV content. Returns how many rows landed.
    pub fn import_csv(&mut self, content: &str) -> usize {
        let items = csv::import_items(content, &self.csv);
        self.table.append(items)
    }

    /// Load listing URLs for the derivation sub-workflow.
    pub fn import_seed_csv(&mut self, content: &str) -> usize {
        let urls = csv::import_urls(content, &self.csv);
        self.seeds.append(urls)
    }

    /// Resolve uploaded listing URLs into event site URLs.
    pub async fn resolve_seeds<F: PageFetcher>(&mut self, fetcher: &F) -> DeriveReport {
        derive::resolve_seeds(&mut self.seeds, fetcher).await
    }

    /// Copy extracted seeds into the work table as fresh items.
    pub fn forward_seeds(&mut self) -> usize {
        self.seeds.forward_into(&mut self.table)
    }

    // Selection --------------------------------------------------------

    pub fn toggle(&mut self, index: usize) -> Result<()> {
        self.table.toggle(index)
    }

    /// Toggle a row by its position on a page view.
    pub fn toggle_visible(&mut self, page_number: usize, visible_index: usize) -> Result<()> {
        let index = pager::absolute_index(self.page_size, page_number, visible_index);
        self.table.toggle(index)
    }

    pub fn toggle_all(&mut self) {
        self.table.toggle_all();
    }

    pub fn extractable_count(&self) -> usize {
        self.table.extractable_count()
    }

    // Processing -------------------------------------------------------

    /// Run the batch processor over the current selection.
    pub async fn run(&mut self) -> Result<BatchRun> {
        let cancel = CancellationToken::new();
        self.run_with_cancel(&cancel).await
    }

    /// Run with a caller-held cancellation token. Cancelling stops the run
    /// between items; completed items keep their results and items not yet
    /// started remain `NotStarted`.
    pub async fn run_with_cancel(&mut self, cancel: &CancellationToken) -> Result<BatchRun> {
        batch::run_batch(&mut self.table, &self.extractor, &self.batch, cancel).await
    }

    /// Persist the checked, completed selection. Returns the saved count.
    pub async fn save(&mut self) -> Result<usize> {
        persist::save_checked(&mut self.table, &self.store).await
    }

    // Views and export -------------------------------------------------

    /// Items on a 1-based page, clamped into range.
    pub fn page(&self, page_number: usize) -> &[WorkItem] {
        let page = pager::clamp_page(page_number, self.page_count());
        pager::page_slice(self.table.items(), self.page_size, page)
    }

    pub fn page_count(&self) -> usize {
        pager::page_count(self.table.len(), self.page_size)
    }

    /// Export completed rows as CSV. Returns the number of data rows.
    pub fn export_csv<W: io::Write>(&self, writer: &mut W) -> io::Result<usize> {
        csv::export(&self.table, &self.csv, writer)
    }

    /// Export to an in-memory string (small tables, tests).
    pub fn export_csv_string(&self) -> String {
        csv::export_to_string(&self.table, &self.csv)
    }

    /// Subscribe to live table snapshots.
    pub fn watch(&mut self) -> watch::Receiver<Vec<WorkItem>> {
        self.table.watch()
    }

    /// Drop every row and seed.
    pub fn clear(&mut self) {
        self.table.clear();
        self.seeds.clear();
    }
}
