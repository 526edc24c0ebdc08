//! Record store seam.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::types::record::EventRow;

/// Remote upsert-capable tabular store keyed by `url`.
///
/// Semantics are overwrite-on-conflict: re-submitting a URL refreshes the
/// stored row rather than silently skipping it. The gateway does not
/// retry; store errors surface to the caller with their payload intact.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert-or-overwrite rows, returning how many the store accepted.
    async fn upsert(&self, rows: &[EventRow]) -> StoreResult<usize>;

    /// Backend name, for logging.
    fn name(&self) -> &str {
        "unknown"
    }
}
