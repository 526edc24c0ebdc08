//! The work-item table: ordered rows, selection, guarded transitions.

pub mod pager;

use tokio::sync::watch;

use crate::error::{OrchestratorError, Result};
use crate::types::item::{ItemOutcome, ItemStatus, SeedStatus, UrlSeed, WorkItem};
use crate::types::record::EventRecord;

/// Ordered collection of work items with per-item state.
///
/// The table is an explicit value owned by the orchestrator; components
/// receive it by reference. Mutation is item-granular copy-on-write: a
/// transition builds the replacement item and swaps it in whole, then
/// publishes a full snapshot to any watcher, so a live view never observes
/// a partially written row.
#[derive(Default)]
pub struct WorkTable {
    items: Vec<WorkItem>,
    watch_tx: Option<watch::Sender<Vec<WorkItem>>>,
}

impl WorkTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[WorkItem] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&WorkItem> {
        self.items.get(index)
    }

    /// Subscribe to table snapshots. Every mutation publishes the full
    /// table state.
    pub fn watch(&mut self) -> watch::Receiver<Vec<WorkItem>> {
        match &self.watch_tx {
            Some(tx) => tx.subscribe(),
            None => {
                let (tx, rx) = watch::channel(self.items.clone());
                self.watch_tx = Some(tx);
                rx
            }
        }
    }

    fn publish(&self) {
        if let Some(tx) = &self.watch_tx {
            // All receivers may be gone; that only means nobody is looking.
            let _ = tx.send(self.items.clone());
        }
    }

    /// Bulk-append items. URLs are unique within a table: re-adding an
    /// existing URL replaces that row in place (last write wins).
    ///
    /// Returns the number of items taken in.
    pub fn append(&mut self, seeds: impl IntoIterator<Item = WorkItem>) -> usize {
        let mut taken = 0;
        for seed in seeds {
            match self.items.iter().position(|item| item.url == seed.url) {
                Some(existing) => self.items[existing] = seed,
                None => self.items.push(seed),
            }
            taken += 1;
        }
        self.publish();
        taken
    }

    /// Drop every row. The only way out of a terminal status.
    pub fn clear(&mut self) {
        self.items.clear();
        self.publish();
    }

    /// Flip one item's selection flag.
    pub fn toggle(&mut self, index: usize) -> Result<()> {
        let len = self.items.len();
        let item = self
            .items
            .get_mut(index)
            .ok_or(OrchestratorError::IndexOutOfBounds { index, len })?;
        item.checked = !item.checked;
        self.publish();
        Ok(())
    }

    /// Set every selection flag to the negation of "all currently checked".
    ///
    /// Recomputed from the table rather than tracked separately, so the
    /// operation stays correct after rows are appended or replaced.
    pub fn toggle_all(&mut self) {
        let all_checked = !self.items.is_empty() && self.items.iter().all(|item| item.checked);
        for item in &mut self.items {
            item.checked = !all_checked;
        }
        self.publish();
    }

    /// Items eligible for an extraction run (`checked` and `NotStarted`).
    pub fn extractable_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_extractable()).count()
    }

    /// Indices eligible for an extraction run, in table order.
    pub fn extractable_indices(&self) -> Vec<usize> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.is_extractable())
            .map(|(index, _)| index)
            .collect()
    }

    /// Indices eligible for persistence (`checked` and `Done`), in table
    /// order.
    pub fn savable_indices(&self) -> Vec<usize> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.is_savable())
            .map(|(index, _)| index)
            .collect()
    }

    /// Clone the current table state.
    pub fn snapshot(&self) -> Vec<WorkItem> {
        self.items.clone()
    }

    fn transition(
        &mut self,
        index: usize,
        to: ItemStatus,
        apply: impl FnOnce(&mut WorkItem),
    ) -> Result<()> {
        let len = self.items.len();
        let current = self
            .items
            .get(index)
            .ok_or(OrchestratorError::IndexOutOfBounds { index, len })?;
        if !current.status.can_advance_to(to) {
            return Err(OrchestratorError::InvalidTransition {
                url: current.url.clone(),
                from: current.status,
                to,
            });
        }
        let mut next = current.clone();
        next.status = to;
        apply(&mut next);
        self.items[index] = next;
        self.publish();
        Ok(())
    }

    /// Mark an item in progress. Called immediately before the extraction
    /// call is issued, so a crash mid-flight shows up as a stuck
    /// `InProgress` row instead of silently reverting to `NotStarted`.
    pub fn begin(&mut self, index: usize) -> Result<()> {
        self.transition(index, ItemStatus::InProgress, |_| {})
    }

    /// Store a normalized record and the raw document text.
    pub fn complete(&mut self, index: usize, record: EventRecord, raw_text: String) -> Result<()> {
        self.transition(index, ItemStatus::Done, |item| {
            item.outcome = Some(ItemOutcome::Record(record));
            item.raw_text = raw_text;
        })
    }

    /// Record a failure descriptor. Failed items are never auto-retried.
    pub fn fail(&mut self, index: usize, message: impl Into<String>) -> Result<()> {
        self.transition(index, ItemStatus::Failed, |item| {
            item.outcome = Some(ItemOutcome::Error(message.into()));
        })
    }

    /// Mark a saved item as sent to the store.
    pub fn mark_sent(&mut self, index: usize) -> Result<()> {
        self.transition(index, ItemStatus::SentToDb, |_| {})
    }

    /// Push a row without the uniqueness guard, so gateway tests can stage
    /// the duplicate-URL selections it must defend against.
    #[cfg(test)]
    pub(crate) fn push_for_test(&mut self, item: WorkItem) {
        self.items.push(item);
    }
}

/// Table of uploaded listing URLs for the derivation sub-workflow.
#[derive(Debug, Default)]
pub struct UrlTable {
    seeds: Vec<UrlSeed>,
}

impl UrlTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.seeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seeds.is_empty()
    }

    pub fn seeds(&self) -> &[UrlSeed] {
        &self.seeds
    }

    pub fn get(&self, index: usize) -> Option<&UrlSeed> {
        self.seeds.get(index)
    }

    /// Bulk-append listing URLs, last write wins by original URL.
    pub fn append(&mut self, urls: impl IntoIterator<Item = String>) -> usize {
        let mut taken = 0;
        for url in urls {
            let seed = UrlSeed::new(url);
            match self
                .seeds
                .iter()
                .position(|existing| existing.original_url == seed.original_url)
            {
                Some(existing) => self.seeds[existing] = seed,
                None => self.seeds.push(seed),
            }
            taken += 1;
        }
        taken
    }

    pub fn clear(&mut self) {
        self.seeds.clear();
    }

    /// Indices still waiting for derivation, in table order.
    pub fn uploaded_indices(&self) -> Vec<usize> {
        self.seeds
            .iter()
            .enumerate()
            .filter(|(_, seed)| seed.status == SeedStatus::Uploaded)
            .map(|(index, _)| index)
            .collect()
    }

    pub(crate) fn mark_extracted(&mut self, index: usize, derived_url: String) {
        if let Some(seed) = self.seeds.get_mut(index) {
            seed.derived_url = Some(derived_url);
            seed.status = SeedStatus::Extracted;
            seed.error = None;
        }
    }

    pub(crate) fn mark_failed(&mut self, index: usize, message: impl Into<String>) {
        if let Some(seed) = self.seeds.get_mut(index) {
            seed.status = SeedStatus::Failed;
            seed.error = Some(message.into());
        }
    }

    /// Copy every `Extracted` seed into the work table as a fresh item and
    /// mark it `Forwarded`. Returns how many were forwarded.
    pub fn forward_into(&mut self, table: &mut WorkTable) -> usize {
        let ready: Vec<(usize, String)> = self
            .seeds
            .iter()
            .enumerate()
            .filter(|(_, seed)| seed.status == SeedStatus::Extracted)
            .filter_map(|(index, seed)| {
                seed.derived_url.clone().map(|url| (index, url))
            })
            .collect();

        table.append(ready.iter().map(|(_, url)| WorkItem::new(url.clone())));
        for (index, _) in &ready {
            self.seeds[*index].status = SeedStatus::Forwarded;
        }
        ready.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::record::EventRecord;

    fn record(name: &str) -> EventRecord {
        EventRecord {
            name: name.into(),
            description: None,
            start_date: None,
            end_date: None,
            city: None,
            state: None,
            country: None,
            attendee_count: None,
            event_type: None,
            logo_url: None,
            ticket_cost: None,
            contact_email: None,
            topics: None,
            attendee_titles: None,
            sponsors: None,
            sponsorship_options: None,
            agenda: None,
            audience_insights: None,
            hosting_company: None,
        }
    }

    fn table_with(urls: &[&str]) -> WorkTable {
        let mut table = WorkTable::new();
        table.append(urls.iter().map(|url| WorkItem::new(*url)));
        table
    }

    #[test]
    fn test_append_replaces_duplicate_url_in_place() {
        let mut table = table_with(&["https://a.com", "https://b.com"]);
        table.toggle(0).unwrap();

        // Re-importing an existing URL resets that row, keeping position
        table.append([WorkItem::new("https://a.com")]);

        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0).unwrap().url, "https://a.com");
        assert!(!table.get(0).unwrap().checked);
    }

    #[test]
    fn test_toggle_all_recomputes_from_table() {
        let mut table = table_with(&["https://a.com", "https://b.com"]);

        table.toggle_all();
        assert!(table.items().iter().all(|item| item.checked));

        // A new row arrives unchecked; "all checked" is no longer true, so
        // the next toggle_all checks everything instead of flipping a flag
        table.append([WorkItem::new("https://c.com")]);
        table.toggle_all();
        assert!(table.items().iter().all(|item| item.checked));

        table.toggle_all();
        assert!(table.items().iter().all(|item| !item.checked));
    }

    #[test]
    fn test_toggle_out_of_bounds() {
        let mut table = table_with(&["https://a.com"]);
        let err = table.toggle(5).unwrap_err();
        assert!(matches!(
            err,
            OrchestratorError::IndexOutOfBounds { index: 5, len: 1 }
        ));
    }

    #[test]
    fn test_transitions_follow_the_state_machine() {
        let mut table = table_with(&["https://a.com"]);

        table.begin(0).unwrap();
        assert_eq!(table.get(0).unwrap().status, ItemStatus::InProgress);

        table.complete(0, record("Event"), "# md".into()).unwrap();
        assert_eq!(table.get(0).unwrap().status, ItemStatus::Done);
        assert_eq!(table.get(0).unwrap().raw_text, "# md");

        table.mark_sent(0).unwrap();
        assert_eq!(table.get(0).unwrap().status, ItemStatus::SentToDb);
    }

    #[test]
    fn test_skipping_a_state_is_rejected() {
        let mut table = table_with(&["https://a.com"]);
        let err = table.complete(0, record("Event"), String::new()).unwrap_err();
        assert!(matches!(err, OrchestratorError::InvalidTransition { .. }));

        let err = table.mark_sent(0).unwrap_err();
        assert!(matches!(err, OrchestratorError::InvalidTransition { .. }));
    }

    #[test]
    fn test_failed_is_terminal() {
        let mut table = table_with(&["https://a.com"]);
        table.begin(0).unwrap();
        table.fail(0, "boom").unwrap();

        assert_eq!(table.get(0).unwrap().status, ItemStatus::Failed);
        assert_eq!(table.get(0).unwrap().error(), Some("boom"));
        assert!(table.begin(0).is_err());
    }

    #[test]
    fn test_watch_sees_every_mutation() {
        let mut table = table_with(&["https://a.com"]);
        let rx = table.watch();

        table.begin(0).unwrap();
        assert_eq!(rx.borrow()[0].status, ItemStatus::InProgress);

        table.fail(0, "boom").unwrap();
        assert_eq!(rx.borrow()[0].status, ItemStatus::Failed);
    }

    #[test]
    fn test_eligibility_filters() {
        let mut table = table_with(&["https://a.com", "https://b.com", "https://c.com"]);
        table.toggle(0).unwrap();
        table.toggle(2).unwrap();
        assert_eq!(table.extractable_count(), 2);
        assert_eq!(table.extractable_indices(), vec![0, 2]);

        table.begin(0).unwrap();
        table.complete(0, record("Event"), String::new()).unwrap();
        assert_eq!(table.extractable_indices(), vec![2]);
        assert_eq!(table.savable_indices(), vec![0]);
    }

    #[test]
    fn test_url_table_forwards_only_extracted() {
        let mut seeds = UrlTable::new();
        seeds.append([
            "https://listing.dev/events/one-123".to_string(),
            "https://listing.dev/events/two-456".to_string(),
            "https://listing.dev/events/three-789".to_string(),
        ]);
        seeds.mark_extracted(0, "https://one.com".into());
        seeds.mark_failed(1, "fetch failed");

        let mut table = WorkTable::new();
        let forwarded = seeds.forward_into(&mut table);

        assert_eq!(forwarded, 1);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(0).unwrap().url, "https://one.com");
        assert_eq!(seeds.get(0).unwrap().status, SeedStatus::Forwarded);
        assert_eq!(seeds.get(1).unwrap().status, SeedStatus::Failed);
        assert_eq!(seeds.get(2).unwrap().status, SeedStatus::Uploaded);
    }
}
