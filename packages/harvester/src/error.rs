//! Typed errors for the orchestration library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use thiserror::Error;

use crate::types::item::ItemStatus;

/// Errors that can occur during orchestration operations.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Extraction call failed
    #[error("extraction failed: {0}")]
    Extract(#[from] ExtractError),

    /// Persistence store failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A state-machine transition that would move backwards or skip a state
    #[error("invalid transition for {url}: {from:?} -> {to:?}")]
    InvalidTransition {
        url: String,
        from: ItemStatus,
        to: ItemStatus,
    },

    /// Row index outside the table
    #[error("row {index} out of bounds (table has {len} rows)")]
    IndexOutOfBounds { index: usize, len: usize },
}

/// Errors that can occur while calling the extraction service.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Service responded with an error status
    #[error("extraction service error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Call exceeded its deadline
    #[error("timeout extracting: {url}")]
    Timeout { url: String },

    /// Service omitted a field the record cannot exist without
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    /// Payload could not be decoded
    #[error("malformed payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Errors surfaced by the record store.
///
/// The store's own error payload is carried unmodified so the operator
/// sees exactly what the backend reported.
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Store rejected the write
    #[error("store error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Row could not be serialized for the wire
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type alias for orchestration operations.
pub type Result<T> = std::result::Result<T, OrchestratorError>;

/// Result type alias for extraction calls.
pub type ExtractResult<T> = std::result::Result<T, ExtractError>;

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
