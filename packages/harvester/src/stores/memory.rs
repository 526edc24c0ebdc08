//! In-memory record store for testing and development.

use async_trait::async_trait;
use indexmap::IndexMap;
use std::sync::RwLock;

use crate::error::StoreResult;
use crate::traits::store::RecordStore;
use crate::types::record::EventRow;

/// In-memory upsert-by-URL store.
///
/// Useful for testing and development. Not suitable for production as
/// data is lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    rows: RwLock<IndexMap<String, EventRow>>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct URLs stored.
    pub fn row_count(&self) -> usize {
        self.rows.read().unwrap().len()
    }

    /// Fetch a stored row by URL.
    pub fn get(&self, url: &str) -> Option<EventRow> {
        self.rows.read().unwrap().get(url).cloned()
    }

    /// Clear all stored rows.
    pub fn clear(&self) {
        self.rows.write().unwrap().clear();
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn upsert(&self, rows: &[EventRow]) -> StoreResult<usize> {
        let mut stored = self.rows.write().unwrap();
        for row in rows {
            stored.insert(row.url.clone(), row.clone());
        }
        Ok(rows.len())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
