//! Plain-page fetching seam for the URL-derivation workflow.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::{ExtractError, ExtractResult};

/// Fetches the raw HTML of a listing page.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_html(&self, url: &str) -> ExtractResult<String>;
}

/// reqwest-backed fetcher with a bounded timeout.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> ExtractResult<Self> {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> ExtractResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ExtractError::Http(Box::new(e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_html(&self, url: &str) -> ExtractResult<String> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                ExtractError::Timeout {
                    url: url.to_string(),
                }
            } else {
                ExtractError::Http(Box::new(e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ExtractError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .text()
            .await
            .map_err(|e| ExtractError::Http(Box::new(e)))
    }
}
