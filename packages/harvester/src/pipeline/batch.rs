//! The batch processor: drains eligible items through the extractor.

use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::{ExtractError, ExtractResult, Result};
use crate::pipeline::normalize;
use crate::table::WorkTable;
use crate::traits::extractor::Extractor;
use crate::types::config::BatchConfig;
use crate::types::record::EventRecord;

/// Summary of a completed batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Items the run attempted (entered `InProgress`).
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// True when the run stopped early on a cancellation request.
    /// Items not yet started keep their `NotStarted` status.
    pub cancelled: bool,
}

/// Outcome of [`run_batch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchRun {
    /// At least one eligible item existed and the run proceeded.
    Ran(BatchReport),
    /// No item was both `checked` and `NotStarted`: no calls were made and
    /// the table is unchanged. Not an error.
    NothingToDo,
}

/// Drive every eligible item (`checked` and `NotStarted`) through the
/// extraction service, in table order.
///
/// Items are processed in waves of `config.concurrency`; the default of 1
/// is the sequential baseline, a deliberate backpressure choice against a
/// metered service. Each item enters `InProgress` before its call is
/// issued, and transitions land one completed item at a time as results
/// arrive. A single item's failure (including a timeout) never aborts the
/// batch. Cancellation is honored between waves: completed items keep
/// their results, items not yet started remain `NotStarted`.
pub async fn run_batch<X: Extractor>(
    table: &mut WorkTable,
    extractor: &X,
    config: &BatchConfig,
    cancel: &CancellationToken,
) -> Result<BatchRun> {
    let eligible = table.extractable_indices();
    if eligible.is_empty() {
        info!("batch run requested with no eligible items");
        return Ok(BatchRun::NothingToDo);
    }

    info!(
        eligible = eligible.len(),
        concurrency = config.concurrency,
        extractor = extractor.name(),
        "starting batch run"
    );

    let mut report = BatchReport::default();
    let width = config.concurrency.max(1);

    for wave in eligible.chunks(width) {
        if cancel.is_cancelled() {
            report.cancelled = true;
            break;
        }

        // InProgress is set before any call in the wave is issued
        let mut calls = Vec::with_capacity(wave.len());
        for &index in wave {
            table.begin(index)?;
            report.attempted += 1;
            if let Some(item) = table.get(index) {
                calls.push((index, item.url.clone()));
            }
        }

        let mut in_flight = stream::iter(calls)
            .map(|(index, url)| async move {
                let outcome = extract_one(extractor, &url, config).await;
                (index, url, outcome)
            })
            .buffer_unordered(width);

        while let Some((index, url, outcome)) = in_flight.next().await {
            match outcome {
                Ok((record, raw_text)) => {
                    table.complete(index, record, raw_text)?;
                    report.succeeded += 1;
                }
                Err(err) => {
                    warn!(url = %url, error = %err, "extraction failed");
                    table.fail(index, err.to_string())?;
                    report.failed += 1;
                }
            }
        }
    }

    info!(
        attempted = report.attempted,
        succeeded = report.succeeded,
        failed = report.failed,
        cancelled = report.cancelled,
        "batch run finished"
    );

    Ok(BatchRun::Ran(report))
}

/// One bounded extraction call plus normalization.
async fn extract_one<X: Extractor>(
    extractor: &X,
    url: &str,
    config: &BatchConfig,
) -> ExtractResult<(EventRecord, String)> {
    let document = match tokio::time::timeout(config.call_timeout, extractor.extract(url)).await {
        Ok(result) => result?,
        Err(_) => {
            return Err(ExtractError::Timeout {
                url: url.to_string(),
            })
        }
    };
    let record = normalize::normalize(document.fields)?;
    Ok((record, document.markdown))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::table::WorkTable;
    use crate::testing::MockExtractor;
    use crate::types::item::{ItemStatus, WorkItem};
    use crate::types::record::{FieldValue, RawExtraction};

    fn checked_table(urls: &[&str]) -> WorkTable {
        let mut table = WorkTable::new();
        table.append(urls.iter().map(|url| {
            let mut item = WorkItem::new(*url);
            item.checked = true;
            item
        }));
        table
    }

    fn fields(name: &str) -> RawExtraction {
        RawExtraction {
            name: Some(FieldValue::text(name)),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_no_eligible_items_is_a_noop() {
        let mut table = WorkTable::new();
        table.append([WorkItem::new("https://a.com")]); // unchecked

        let extractor = MockExtractor::new();
        let run = run_batch(
            &mut table,
            &extractor,
            &BatchConfig::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(run, BatchRun::NothingToDo);
        assert!(extractor.calls().is_empty());
        assert_eq!(table.get(0).unwrap().status, ItemStatus::NotStarted);
    }

    #[tokio::test]
    async fn test_failure_never_aborts_the_batch() {
        let mut table = checked_table(&["https://a.com", "https://b.com", "https://c.com"]);
        let extractor = MockExtractor::new()
            .with_document("https://a.com", fields("A"), "# a")
            .with_failure("https://b.com", "service exploded")
            .with_document("https://c.com", fields("C"), "# c");

        let run = run_batch(
            &mut table,
            &extractor,
            &BatchConfig::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        let BatchRun::Ran(report) = run else {
            panic!("expected a run")
        };
        assert_eq!(report.attempted, 3);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, 1);
        assert!(!report.cancelled);

        assert_eq!(table.get(0).unwrap().status, ItemStatus::Done);
        assert_eq!(table.get(1).unwrap().status, ItemStatus::Failed);
        assert!(table
            .get(1)
            .unwrap()
            .error()
            .unwrap()
            .contains("service exploded"));
        assert_eq!(table.get(2).unwrap().status, ItemStatus::Done);
        assert_eq!(table.get(2).unwrap().raw_text, "# c");
    }

    #[tokio::test]
    async fn test_items_are_processed_in_table_order() {
        let mut table = checked_table(&["https://a.com", "https://b.com"]);
        let extractor = MockExtractor::new();

        run_batch(
            &mut table,
            &extractor,
            &BatchConfig::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(
            extractor.calls(),
            vec!["https://a.com".to_string(), "https://b.com".to_string()]
        );
    }

    #[tokio::test]
    async fn test_unchecked_and_finished_items_are_skipped() {
        let mut table = checked_table(&["https://a.com", "https://b.com"]);
        table.toggle(1).unwrap(); // uncheck b

        run_batch(
            &mut table,
            &MockExtractor::new(),
            &BatchConfig::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(table.get(0).unwrap().status, ItemStatus::Done);
        assert_eq!(table.get(1).unwrap().status, ItemStatus::NotStarted);

        // A second run has nothing left to do: Done is not re-entered
        let run = run_batch(
            &mut table,
            &MockExtractor::new(),
            &BatchConfig::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
        assert_eq!(run, BatchRun::NothingToDo);
    }

    #[tokio::test]
    async fn test_timeout_fails_the_item_and_continues() {
        let mut table = checked_table(&["https://slow.com", "https://fast.com"]);
        let extractor = MockExtractor::new()
            .with_delay_for("https://slow.com", Duration::from_millis(200))
            .with_document("https://fast.com", fields("Fast"), "");

        let config = BatchConfig::default().with_call_timeout(Duration::from_millis(50));
        let run = run_batch(&mut table, &extractor, &config, &CancellationToken::new())
            .await
            .unwrap();

        let BatchRun::Ran(report) = run else {
            panic!("expected a run")
        };
        assert_eq!(report.failed, 1);
        assert_eq!(report.succeeded, 1);

        assert_eq!(table.get(0).unwrap().status, ItemStatus::Failed);
        assert!(table.get(0).unwrap().error().unwrap().contains("timeout"));
        assert_eq!(table.get(1).unwrap().status, ItemStatus::Done);
    }

    #[tokio::test]
    async fn test_missing_name_fails_the_item() {
        let mut table = checked_table(&["https://nameless.com"]);
        let extractor =
            MockExtractor::new().with_document("https://nameless.com", RawExtraction::default(), "");

        run_batch(
            &mut table,
            &extractor,
            &BatchConfig::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(table.get(0).unwrap().status, ItemStatus::Failed);
        assert!(table
            .get(0)
            .unwrap()
            .error()
            .unwrap()
            .contains("missing required field"));
    }

    #[tokio::test]
    async fn test_cancellation_leaves_unstarted_items_alone() {
        let mut table = checked_table(&["https://a.com", "https://b.com"]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let run = run_batch(
            &mut table,
            &MockExtractor::new(),
            &BatchConfig::default(),
            &cancel,
        )
        .await
        .unwrap();

        let BatchRun::Ran(report) = run else {
            panic!("expected a run")
        };
        assert!(report.cancelled);
        assert_eq!(report.attempted, 0);
        assert_eq!(table.get(0).unwrap().status, ItemStatus::NotStarted);
        assert_eq!(table.get(1).unwrap().status, ItemStatus::NotStarted);
    }

    #[tokio::test]
    async fn test_bounded_parallel_wave_isolates_failures() {
        let mut table = checked_table(&["https://a.com", "https://b.com", "https://c.com"]);
        let extractor = MockExtractor::new()
            .with_failure("https://b.com", "boom")
            .with_document("https://a.com", fields("A"), "")
            .with_document("https://c.com", fields("C"), "");

        let config = BatchConfig::default().with_concurrency(3);
        let run = run_batch(&mut table, &extractor, &config, &CancellationToken::new())
            .await
            .unwrap();

        let BatchRun::Ran(report) = run else {
            panic!("expected a run")
        };
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(table.get(0).unwrap().status, ItemStatus::Done);
        assert_eq!(table.get(1).unwrap().status, ItemStatus::Failed);
        assert_eq!(table.get(2).unwrap().status, ItemStatus::Done);
    }
}
