//! Work items and their state machines.

use serde::{Deserialize, Serialize};

use crate::types::record::EventRecord;

/// Processing state of a work item.
///
/// Transitions are one-directional:
/// `NotStarted -> InProgress -> {Done, Failed}` and `Done -> SentToDb`.
/// `Failed` and `SentToDb` are terminal within a table generation; the only
/// way back is a bulk clear and re-import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    NotStarted,
    InProgress,
    Done,
    SentToDb,
    Failed,
}

impl ItemStatus {
    /// Whether `next` is a legal single-step advance from this state.
    pub fn can_advance_to(self, next: ItemStatus) -> bool {
        use ItemStatus::*;
        matches!(
            (self, next),
            (NotStarted, InProgress) | (InProgress, Done) | (InProgress, Failed) | (Done, SentToDb)
        )
    }

    /// Terminal states are never left automatically.
    pub fn is_terminal(self) -> bool {
        matches!(self, ItemStatus::SentToDb | ItemStatus::Failed)
    }
}

/// What an item ended up with: a normalized record, or an error descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemOutcome {
    Record(EventRecord),
    Error(String),
}

impl ItemOutcome {
    pub fn record(&self) -> Option<&EventRecord> {
        match self {
            ItemOutcome::Record(record) => Some(record),
            ItemOutcome::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ItemOutcome::Record(_) => None,
            ItemOutcome::Error(message) => Some(message),
        }
    }
}

/// One row of the extraction table, keyed by source URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Natural key; unique within a table.
    pub url: String,
    pub status: ItemStatus,
    /// Present iff status is `Done`/`SentToDb` (a record) or `Failed` (an
    /// error descriptor).
    pub outcome: Option<ItemOutcome>,
    /// Raw document markdown from the extraction call; empty until `Done`.
    pub raw_text: String,
    /// Selection flag, independent of status.
    pub checked: bool,
}

impl WorkItem {
    /// Create a fresh, unchecked item.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: ItemStatus::NotStarted,
            outcome: None,
            raw_text: String::new(),
            checked: false,
        }
    }

    /// Eligible for a batch-extraction run.
    pub fn is_extractable(&self) -> bool {
        self.checked && self.status == ItemStatus::NotStarted
    }

    /// Eligible for persistence.
    pub fn is_savable(&self) -> bool {
        self.checked && self.status == ItemStatus::Done
    }

    /// The normalized record, if extraction completed.
    pub fn record(&self) -> Option<&EventRecord> {
        self.outcome.as_ref().and_then(ItemOutcome::record)
    }

    /// The failure descriptor, if extraction failed.
    pub fn error(&self) -> Option<&str> {
        self.outcome.as_ref().and_then(ItemOutcome::error)
    }
}

/// State of an uploaded listing URL in the derivation sub-workflow.
///
/// Same shape of machine as [`ItemStatus`], one step shorter:
/// `Uploaded -> {Extracted, Failed}` and `Extracted -> Forwarded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedStatus {
    Uploaded,
    Extracted,
    Forwarded,
    Failed,
}

/// A listing-page URL waiting to have its event site derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlSeed {
    pub original_url: String,
    pub derived_url: Option<String>,
    pub status: SeedStatus,
    pub error: Option<String>,
}

impl UrlSeed {
    pub fn new(original_url: impl Into<String>) -> Self {
        Self {
            original_url: original_url.into(),
            derived_url: None,
            status: SeedStatus::Uploaded,
            error: None,
        }
    }
}
