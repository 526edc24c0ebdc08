//! Pure Supabase PostgREST API client.
//!
//! A minimal client for the Supabase REST interface. Supports keyed
//! upserts with overwrite-on-conflict semantics and basic row fetches.
//!
//! # Example
//!
//! ```rust,ignore
//! use supabase_client::SupabaseClient;
//!
//! let client = SupabaseClient::new(
//!     "https://project.supabase.co".into(),
//!     "anon-key".into(),
//! );
//!
//! let saved = client.upsert("scraped_events", &rows, "url").await?;
//! println!("saved {saved} rows");
//! ```

pub mod error;

pub use error::{Result, SupabaseError};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct SupabaseClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl SupabaseClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Use a different per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Insert-or-overwrite rows keyed on `on_conflict`. Returns the number
    /// of rows the store reports back.
    ///
    /// Sends `Prefer: resolution=merge-duplicates` so a conflicting key
    /// refreshes the stored row instead of being skipped.
    pub async fn upsert<T: Serialize>(
        &self,
        table: &str,
        rows: &[T],
        on_conflict: &str,
    ) -> Result<usize> {
        let url = format!("{}?on_conflict={}", self.rest_url(table), on_conflict);
        let resp = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&rows)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SupabaseError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let returned: Vec<serde_json::Value> = resp.json().await?;
        tracing::debug!(table, rows = returned.len(), "upsert accepted");
        Ok(returned.len())
    }

    /// Fetch rows with a raw PostgREST query string
    /// (e.g. `url=eq.https%3A%2F%2Fexample.com&select=*`).
    pub async fn select<T: DeserializeOwned>(&self, table: &str, query: &str) -> Result<Vec<T>> {
        let url = format!("{}?{}", self.rest_url(table), query);
        let resp = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SupabaseError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(resp.json().await?)
    }
}
