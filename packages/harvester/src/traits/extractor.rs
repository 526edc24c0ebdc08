//! Extraction service seam.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::ExtractResult;
use crate::types::record::RawExtraction;

/// A document returned by the extraction service for one URL.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    /// Structured fields, shapes not yet normalized.
    pub fields: RawExtraction,

    /// Raw page markdown.
    pub markdown: String,

    /// When the extraction ran.
    pub fetched_at: DateTime<Utc>,
}

impl ExtractedDocument {
    pub fn new(fields: RawExtraction, markdown: impl Into<String>) -> Self {
        Self {
            fields,
            markdown: markdown.into(),
            fetched_at: Utc::now(),
        }
    }
}

/// Remote capability mapping a URL to structured event data plus the raw
/// document text.
///
/// Implementations wrap specific providers (Firecrawl, scripted mocks).
/// The processor treats them as stateless calls with no session affinity;
/// wrap with [`crate::extractors::RateLimitedExtractor`] to throttle.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Extract structured data from a single URL.
    async fn extract(&self, url: &str) -> ExtractResult<ExtractedDocument>;

    /// Provider name, for logging.
    fn name(&self) -> &str {
        "unknown"
    }
}
