//! Extractor implementations and wrappers.

pub mod rate_limited;

#[cfg(feature = "firecrawl")]
pub mod firecrawl;

pub use rate_limited::{ExtractorExt, RateLimitedExtractor};

#[cfg(feature = "firecrawl")]
pub use firecrawl::FirecrawlExtractor;
