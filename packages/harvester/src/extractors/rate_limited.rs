//! Rate-limited extractor wrapper.
//!
//! Wraps any Extractor implementation with rate limiting using the
//! governor crate.

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

use crate::error::ExtractResult;
use crate::traits::extractor::{ExtractedDocument, Extractor};

type DefaultRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// An extractor wrapper that enforces rate limits.
///
/// Uses the governor crate for precise rate limiting with burst support.
pub struct RateLimitedExtractor<X: Extractor> {
    inner: X,
    limiter: Arc<DefaultRateLimiter>,
}

impl<X: Extractor> RateLimitedExtractor<X> {
    /// Create a new rate-limited extractor.
    ///
    /// # Arguments
    /// * `extractor` - The underlying extractor to wrap
    /// * `requests_per_second` - Maximum requests per second
    pub fn new(extractor: X, requests_per_second: u32) -> Self {
        let quota = Quota::per_second(
            NonZeroU32::new(requests_per_second).expect("requests_per_second must be > 0"),
        );
        Self {
            inner: extractor,
            limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    /// Create with burst support.
    pub fn with_burst(extractor: X, requests_per_second: u32, burst: u32) -> Self {
        let quota = Quota::per_second(
            NonZeroU32::new(requests_per_second).expect("requests_per_second must be > 0"),
        )
        .allow_burst(NonZeroU32::new(burst).expect("burst must be > 0"));

        Self {
            inner: extractor,
            limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    async fn wait_for_permit(&self) {
        self.limiter.until_ready().await;
    }
}

#[async_trait]
impl<X: Extractor> Extractor for RateLimitedExtractor<X> {
    async fn extract(&self, url: &str) -> ExtractResult<ExtractedDocument> {
        // Wait for rate limit before each call
        self.wait_for_permit().await;
        self.inner.extract(url).await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

/// Extension trait for easy rate limiting.
pub trait ExtractorExt: Extractor + Sized {
    /// Wrap this extractor with rate limiting.
    fn rate_limited(self, requests_per_second: u32) -> RateLimitedExtractor<Self> {
        RateLimitedExtractor::new(self, requests_per_second)
    }

    /// Wrap with rate limiting and burst support.
    fn rate_limited_with_burst(
        self,
        requests_per_second: u32,
        burst: u32,
    ) -> RateLimitedExtractor<Self> {
        RateLimitedExtractor::with_burst(self, requests_per_second, burst)
    }
}

impl<X: Extractor + Sized> ExtractorExt for X {}
