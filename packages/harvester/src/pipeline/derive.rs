//! URL-derivation sub-workflow: listing page to actual event site.
//!
//! Event aggregators wrap the real event website in an embed or a "Visit"
//! link; this pass pulls the underlying site URL out of the listing HTML so
//! the extraction table works against the event's own pages.

use regex::Regex;
use tracing::{info, warn};

use crate::table::UrlTable;
use crate::traits::fetcher::PageFetcher;

/// Summary of a derivation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeriveReport {
    pub attempted: usize,
    pub extracted: usize,
    pub failed: usize,
}

/// Derive the event site URL from a listing page's HTML.
///
/// Tries, in order: the embedded event iframe, the "Visit" link, and a
/// slug fallback built from the listing URL's last path segment with its
/// trailing id stripped.
pub fn derive_site_url(html: &str, listing_url: &str) -> Option<String> {
    let iframe =
        Regex::new(r#"(?i)<iframe[^>]*title="embedded event's website"[^>]*src="([^"]*)""#)
            .unwrap();
    if let Some(found) = iframe
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|url| !url.is_empty())
    {
        return Some(found);
    }

    let visit = Regex::new(r#"(?i)<a[^>]*href="([^"]*)"[^>]*>\s*Visit\s*</a>"#).unwrap();
    if let Some(found) = visit
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|url| !url.is_empty())
    {
        return Some(found);
    }

    slug_fallback(listing_url)
}

/// Build `https://{slug}.com` from the listing URL's last path segment,
/// dropping the trailing id component.
fn slug_fallback(listing_url: &str) -> Option<String> {
    let last_segment = listing_url
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())?;

    let mut parts: Vec<&str> = last_segment.split('-').collect();
    if parts.len() < 2 {
        return None;
    }
    parts.pop();
    let slug = parts.join("-");
    if slug.is_empty() {
        None
    } else {
        Some(format!("https://{slug}.com"))
    }
}

/// Drive every `Uploaded` seed through the fetcher and derivation.
///
/// A single seed's failure never aborts the pass; failed seeds carry the
/// failure message and stay out of the forwardable set.
pub async fn resolve_seeds<F: PageFetcher>(seeds: &mut UrlTable, fetcher: &F) -> DeriveReport {
    let pending = seeds.uploaded_indices();
    let mut report = DeriveReport::default();

    for index in pending {
        let Some(seed) = seeds.get(index) else { continue };
        let original = seed.original_url.clone();
        report.attempted += 1;

        match fetcher.fetch_html(&original).await {
            Ok(html) => match derive_site_url(&html, &original) {
                Some(url) => {
                    seeds.mark_extracted(index, url);
                    report.extracted += 1;
                }
                None => {
                    seeds.mark_failed(index, "unable to derive event site url");
                    report.failed += 1;
                }
            },
            Err(err) => {
                warn!(url = %original, error = %err, "listing fetch failed");
                seeds.mark_failed(index, err.to_string());
                report.failed += 1;
            }
        }
    }

    info!(
        attempted = report.attempted,
        extracted = report.extracted,
        failed = report.failed,
        "derivation pass finished"
    );

    report
}
