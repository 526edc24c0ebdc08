//! Scripted mock implementations for tests and development.
//!
//! These are useful for testing hosts of the orchestrator without making
//! real extraction or store calls.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::{ExtractError, ExtractResult, StoreError, StoreResult};
use crate::traits::extractor::{ExtractedDocument, Extractor};
use crate::traits::fetcher::PageFetcher;
use crate::traits::store::RecordStore;
use crate::types::record::{EventRow, FieldValue, RawExtraction};

/// A scripted extraction service.
///
/// Returns configured documents or failures per URL; unknown URLs get a
/// minimal record named after the URL. Records every call for assertions.
#[derive(Default)]
pub struct MockExtractor {
    documents: Arc<RwLock<HashMap<String, ExtractedDocument>>>,
    failures: Arc<RwLock<HashMap<String, String>>>,
    delays: Arc<RwLock<HashMap<String, Duration>>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockExtractor {
    /// Create a new mock with default behavior.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a successful extraction for a URL.
    pub fn with_document(
        self,
        url: impl Into<String>,
        fields: RawExtraction,
        markdown: impl Into<String>,
    ) -> Self {
        self.documents
            .write()
            .unwrap()
            .insert(url.into(), ExtractedDocument::new(fields, markdown));
        self
    }

    /// Script a failure for a URL.
    pub fn with_failure(self, url: impl Into<String>, message: impl Into<String>) -> Self {
        self.failures
            .write()
            .unwrap()
            .insert(url.into(), message.into());
        self
    }

    /// Delay calls for a URL (for timeout tests).
    pub fn with_delay_for(self, url: impl Into<String>, delay: Duration) -> Self {
        self.delays.write().unwrap().insert(url.into(), delay);
        self
    }

    /// URLs this mock has been asked to extract, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    /// Clear call history.
    pub fn clear_calls(&self) {
        self.calls.write().unwrap().clear();
    }
}

#[async_trait]
impl Extractor for MockExtractor {
    async fn extract(&self, url: &str) -> ExtractResult<ExtractedDocument> {
        self.calls.write().unwrap().push(url.to_string());

        let delay = self.delays.read().unwrap().get(url).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = self.failures.read().unwrap().get(url) {
            return Err(ExtractError::Api {
                status: 500,
                message: message.clone(),
            });
        }

        if let Some(document) = self.documents.read().unwrap().get(url) {
            return Ok(document.clone());
        }

        // Default: a minimal record named after the URL
        let fields = RawExtraction {
            name: Some(FieldValue::text(format!("Event at {url}"))),
            ..Default::default()
        };
        Ok(ExtractedDocument::new(fields, format!("# Event at {url}")))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// A scripted record store that captures upserted rows.
#[derive(Default)]
pub struct MockStore {
    rows: Arc<RwLock<Vec<EventRow>>>,
    error: Arc<RwLock<Option<(u16, String)>>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every upsert fail with the given store payload.
    pub fn with_error(self, status: u16, message: impl Into<String>) -> Self {
        *self.error.write().unwrap() = Some((status, message.into()));
        self
    }

    /// Rows captured across all successful upserts, in submission order.
    pub fn rows(&self) -> Vec<EventRow> {
        self.rows.read().unwrap().clone()
    }
}

#[async_trait]
impl RecordStore for MockStore {
    async fn upsert(&self, rows: &[EventRow]) -> StoreResult<usize> {
        if let Some((status, message)) = self.error.read().unwrap().clone() {
            return Err(StoreError::Api { status, message });
        }
        self.rows.write().unwrap().extend_from_slice(rows);
        Ok(rows.len())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// A scripted page fetcher for the URL-derivation workflow.
#[derive(Default)]
pub struct MockFetcher {
    pages: Arc<RwLock<HashMap<String, String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the HTML served for a URL.
    pub fn with_page(self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.write().unwrap().insert(url.into(), html.into());
        self
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch_html(&self, url: &str) -> ExtractResult<String> {
        self.pages
            .read()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| ExtractError::Api {
                status: 404,
                message: format!("no scripted page for {url}"),
            })
    }
}
