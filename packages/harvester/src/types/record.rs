//! Event records and the shapes the extraction service returns.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A field as the extraction service may return it.
///
/// The service's output shape is not contractually fixed: a field declared
/// list-like can arrive as a bare string, an object-like field as a scalar,
/// and so on. Modeling the possibilities as a tagged union keeps the
/// coercion rules in one place ([`crate::pipeline::normalize`]) instead of
/// spread across untyped `Value` plumbing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(serde_json::Number),
    Items(Vec<String>),
    Structured(serde_json::Map<String, Value>),
    /// Anything else the service invents (arrays of objects, booleans).
    Other(Value),
}

impl FieldValue {
    /// Render as scalar text: strings pass through, numbers print, any
    /// structured shape falls back to its canonical JSON encoding.
    pub fn into_text(self) -> String {
        match self {
            FieldValue::Text(text) => text,
            FieldValue::Number(number) => number.to_string(),
            other => other.into_json_string(),
        }
    }

    /// Canonical string encoding: bare text stays bare, everything else is
    /// compact JSON with sorted object keys.
    pub fn into_json_string(self) -> String {
        match self {
            FieldValue::Text(text) => text,
            FieldValue::Number(number) => number.to_string(),
            FieldValue::Items(items) => Value::from(items).to_string(),
            FieldValue::Structured(map) => Value::Object(map).to_string(),
            FieldValue::Other(value) => value.to_string(),
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn items<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        FieldValue::Items(values.into_iter().map(Into::into).collect())
    }
}

/// The field set returned by the extraction service for one URL, prior to
/// normalization. Unknown keys are ignored; every known key tolerates any
/// shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawExtraction {
    pub name: Option<FieldValue>,
    pub description: Option<FieldValue>,
    pub start_date: Option<FieldValue>,
    pub end_date: Option<FieldValue>,
    pub city: Option<FieldValue>,
    pub state: Option<FieldValue>,
    pub country: Option<FieldValue>,
    pub attendee_count: Option<FieldValue>,
    pub topics: Option<FieldValue>,
    pub event_type: Option<FieldValue>,
    pub attendee_title: Option<FieldValue>,
    pub logo_url: Option<FieldValue>,
    pub sponsorship_options: Option<FieldValue>,
    pub agenda: Option<FieldValue>,
    pub audience_insights: Option<FieldValue>,
    pub sponsors: Option<FieldValue>,
    pub hosting_company: Option<FieldValue>,
    pub ticket_cost: Option<FieldValue>,
    pub contact_email: Option<FieldValue>,
}

/// A normalized extraction result, ready for display or persistence.
///
/// List-like fields distinguish "the service did not report this" (`None`)
/// from "the service reported zero items" (`Some(vec![])`). Object-like
/// fields stay structural until the persistence gateway serializes them
/// for the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub attendee_count: Option<String>,
    pub event_type: Option<String>,
    pub logo_url: Option<String>,
    pub ticket_cost: Option<String>,
    pub contact_email: Option<String>,
    pub topics: Option<Vec<String>>,
    pub attendee_titles: Option<Vec<String>>,
    pub sponsors: Option<Vec<String>>,
    pub sponsorship_options: Option<FieldValue>,
    pub agenda: Option<FieldValue>,
    pub audience_insights: Option<FieldValue>,
    pub hosting_company: Option<FieldValue>,
}

/// The flat row shape written to the record store and to CSV export.
///
/// Object-like fields are canonically JSON-encoded; list-like fields are
/// either null or an array of strings by the time a row exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRow {
    pub url: String,
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub attendee_count: Option<String>,
    pub event_type: Option<String>,
    pub logo_url: Option<String>,
    pub topics: Option<Vec<String>>,
    pub attendee_title: Option<Vec<String>>,
    pub sponsors: Option<Vec<String>>,
    pub sponsorship_options: Option<String>,
    pub agenda: Option<String>,
    pub audience_insights: Option<String>,
    pub hosting_company: Option<String>,
    pub ticket_cost: Option<String>,
    pub contact_email: Option<String>,
    pub event_markdown: Option<String>,
}

impl EventRow {
    /// Build the wire row for a completed item.
    pub fn from_record(url: &str, record: &EventRecord, raw_text: &str) -> Self {
        fn serialized(field: &Option<FieldValue>) -> Option<String> {
            field.clone().map(FieldValue::into_json_string)
        }

        Self {
            url: url.to_string(),
            name: record.name.clone(),
            description: record.description.clone(),
            start_date: record.start_date.clone(),
            end_date: record.end_date.clone(),
            city: record.city.clone(),
            state: record.state.clone(),
            country: record.country.clone(),
            attendee_count: record.attendee_count.clone(),
            event_type: record.event_type.clone(),
            logo_url: record.logo_url.clone(),
            topics: record.topics.clone(),
            attendee_title: record.attendee_titles.clone(),
            sponsors: record.sponsors.clone(),
            sponsorship_options: serialized(&record.sponsorship_options),
            agenda: serialized(&record.agenda),
            audience_insights: serialized(&record.audience_insights),
            hosting_company: serialized(&record.hosting_company),
            ticket_cost: record.ticket_cost.clone(),
            contact_email: record.contact_email.clone(),
            event_markdown: if raw_text.is_empty() {
                None
            } else {
                Some(raw_text.to_string())
            },
        }
    }
}
