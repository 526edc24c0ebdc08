//! Supabase-backed record store.
//!
//! Requires the `supabase` feature to be enabled.

use async_trait::async_trait;
use supabase_client::{SupabaseClient, SupabaseError};

use crate::error::{StoreError, StoreResult};
use crate::traits::store::RecordStore;
use crate::types::record::EventRow;

const EVENTS_TABLE: &str = "scraped_events";

/// Record store backed by a Supabase (PostgREST) table.
///
/// Upserts are keyed on `url` with overwrite-on-conflict semantics:
/// re-submitting a URL refreshes the stored row instead of skipping it.
pub struct SupabaseStore {
    client: SupabaseClient,
    table: String,
}

impl SupabaseStore {
    pub fn new(client: SupabaseClient) -> Self {
        Self {
            client,
            table: EVENTS_TABLE.to_string(),
        }
    }

    /// Use a different table name.
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Create from the `SUPABASE_URL` and `SUPABASE_ANON_KEY` environment
    /// variables.
    pub fn from_env() -> StoreResult<Self> {
        let url = env_var("SUPABASE_URL")?;
        let api_key = env_var("SUPABASE_ANON_KEY")?;
        Ok(Self::new(SupabaseClient::new(url, api_key)))
    }
}

fn env_var(name: &'static str) -> StoreResult<String> {
    std::env::var(name).map_err(|_| {
        StoreError::Http(Box::new(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{name} environment variable not set"),
        )))
    })
}

#[async_trait]
impl RecordStore for SupabaseStore {
    async fn upsert(&self, rows: &[EventRow]) -> StoreResult<usize> {
        let saved = self
            .client
            .upsert(&self.table, rows, "url")
            .await
            .map_err(|e| match e {
                SupabaseError::Api { status, message } => StoreError::Api { status, message },
                other => StoreError::Http(Box::new(other)),
            })?;
        Ok(saved)
    }

    fn name(&self) -> &str {
        "supabase"
    }
}
