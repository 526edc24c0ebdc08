//! Batch Event-Extraction Orchestration Library
//!
//! Owns the per-item state machine for a table of source URLs, drives a
//! rate-limited batch of a user-selected subset through an external
//! extraction service, reconciles the service's loosely-shaped results
//! into normalized event records, and persists a de-duplicated selection
//! to an upsert-capable record store. CSV import/export at both ends.
//!
//! # Design Philosophy
//!
//! - An explicit table value owned by the orchestrator, no ambient state
//! - One coercion boundary between service shapes and records
//! - Sequential by default: deliberate backpressure against metered services
//! - Every failure is recoverable by operator retry
//!
//! # Usage
//!
//! ```rust,ignore
//! use harvester::{MemoryStore, Workbench};
//! use harvester::testing::MockExtractor;
//!
//! let mut bench = Workbench::new(MockExtractor::new(), MemoryStore::new());
//! bench.import_csv("spring gala,https://example.com/gala\n");
//! bench.toggle_all();
//!
//! let run = bench.run().await?;
//! let saved = bench.save().await?;
//! let csv = bench.export_csv_string();
//! ```
//!
//! # Modules
//!
//! - [`traits`] - External seams (Extractor, RecordStore, PageFetcher)
//! - [`types`] - Work items, records, configuration
//! - [`table`] - The work table, selection, and pager
//! - [`pipeline`] - Batch processor, normalization, persistence, workbench
//! - [`csv`] - Flat-file import/export
//! - [`extractors`] - Extractor implementations and the rate-limit wrapper
//! - [`stores`] - Record-store implementations
//! - [`testing`] - Scripted mocks

pub mod csv;
pub mod error;
pub mod extractors;
pub mod pipeline;
pub mod stores;
pub mod table;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{ExtractError, OrchestratorError, StoreError};
pub use traits::{
    extractor::{ExtractedDocument, Extractor},
    fetcher::{HttpFetcher, PageFetcher},
    store::RecordStore,
};
pub use types::{
    config::{BatchConfig, CsvOptions, UrlColumn, DEFAULT_PAGE_SIZE},
    item::{ItemOutcome, ItemStatus, SeedStatus, UrlSeed, WorkItem},
    record::{EventRecord, EventRow, FieldValue, RawExtraction},
};

// Re-export the table and pager
pub use table::{pager, UrlTable, WorkTable};

// Re-export pipeline components
pub use pipeline::{
    batch::{run_batch, BatchReport, BatchRun},
    derive::{derive_site_url, resolve_seeds, DeriveReport},
    normalize::normalize,
    persist::save_checked,
    workbench::Workbench,
};

// Re-export extractor wrappers
pub use extractors::{ExtractorExt, RateLimitedExtractor};

#[cfg(feature = "firecrawl")]
pub use extractors::FirecrawlExtractor;

// Re-export stores
pub use stores::MemoryStore;

#[cfg(feature = "supabase")]
pub use stores::SupabaseStore;
