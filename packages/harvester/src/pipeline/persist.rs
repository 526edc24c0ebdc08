//! The persistence gateway: de-duplicate, serialize, upsert, advance.

use indexmap::IndexMap;
use tracing::{info, warn};

use crate::error::Result;
use crate::table::WorkTable;
use crate::traits::store::RecordStore;
use crate::types::record::EventRow;

/// Persist every `checked` and `Done` item to the record store.
///
/// Rows are de-duplicated by URL before the upsert: when the selection
/// contains the same URL twice, the later item in table order determines
/// the stored value (last write wins) while the earlier occurrence keeps
/// its position in the submitted batch. This guards against accidental
/// double-selection and is a deliberate, tested contract.
///
/// The operation is all-or-nothing from the state machine's perspective:
/// on a store failure no item changes status, even though the underlying
/// store may not be transactional across rows. On success every
/// contributing item moves `Done -> SentToDb`.
///
/// An empty selection returns `Ok(0)` without touching the store.
pub async fn save_checked<S: RecordStore>(table: &mut WorkTable, store: &S) -> Result<usize> {
    let savable = table.savable_indices();
    if savable.is_empty() {
        info!("save requested with no checked, completed items");
        return Ok(0);
    }

    let mut rows: IndexMap<String, EventRow> = IndexMap::with_capacity(savable.len());
    for &index in &savable {
        let Some(item) = table.get(index) else { continue };
        let Some(record) = item.record() else {
            // savable_indices only yields Done items, which carry a record
            warn!(url = %item.url, "skipping completed item without a record");
            continue;
        };
        let row = EventRow::from_record(&item.url, record, &item.raw_text);
        // insert keeps the first occurrence's position, overwrites the value
        rows.insert(item.url.clone(), row);
    }

    let batch: Vec<EventRow> = rows.into_values().collect();
    let saved = store.upsert(&batch).await?;

    for &index in &savable {
        table.mark_sent(index)?;
    }

    info!(
        rows = batch.len(),
        saved,
        store = store.name(),
        "saved checked items"
    );

    Ok(saved)
}
