//! The single coercion boundary between service output shapes and records.

use serde_json::Value;

use crate::error::{ExtractError, ExtractResult};
use crate::types::record::{EventRecord, FieldValue, RawExtraction};

/// Normalize a raw extraction into an [`EventRecord`].
///
/// Coercion is type-based, never content-based: a scalar landing in a
/// list-like field becomes a one-element list, and a comma-separated
/// string is NOT split. Absent list-like fields stay `None` — distinct
/// from an empty list, which means the service reported zero items.
/// Object-like fields keep their structure; the persistence gateway
/// serializes them for the wire.
pub fn normalize(raw: RawExtraction) -> ExtractResult<EventRecord> {
    let name = raw
        .name
        .map(FieldValue::into_text)
        .filter(|name| !name.trim().is_empty())
        .ok_or(ExtractError::MissingField { field: "name" })?;

    let start_date = raw.start_date.map(FieldValue::into_text);
    // Single-day events are common; downstream consumers require a
    // non-null end date.
    let end_date = raw
        .end_date
        .map(FieldValue::into_text)
        .or_else(|| start_date.clone());

    Ok(EventRecord {
        name,
        description: raw.description.map(FieldValue::into_text),
        start_date,
        end_date,
        city: raw.city.map(FieldValue::into_text),
        state: raw.state.map(FieldValue::into_text),
        country: raw.country.map(FieldValue::into_text),
        attendee_count: raw.attendee_count.map(FieldValue::into_text),
        event_type: raw.event_type.map(FieldValue::into_text),
        logo_url: raw.logo_url.map(FieldValue::into_text),
        ticket_cost: raw.ticket_cost.map(FieldValue::into_text),
        contact_email: raw.contact_email.map(FieldValue::into_text),
        topics: raw.topics.map(into_string_list),
        attendee_titles: raw.attendee_title.map(into_string_list),
        sponsors: raw.sponsors.map(into_string_list),
        sponsorship_options: raw.sponsorship_options,
        agenda: raw.agenda,
        audience_insights: raw.audience_insights,
        hosting_company: raw.hosting_company,
    })
}

/// Coerce any shape into a list of strings.
fn into_string_list(value: FieldValue) -> Vec<String> {
    match value {
        FieldValue::Text(text) => vec![text],
        FieldValue::Number(number) => vec![number.to_string()],
        FieldValue::Items(items) => items,
        FieldValue::Structured(map) => vec![Value::Object(map).to_string()],
        FieldValue::Other(Value::Array(values)) => values
            .into_iter()
            .map(|value| match value {
                Value::String(text) => text,
                other => other.to_string(),
            })
            .collect(),
        FieldValue::Other(other) => vec![other.to_string()],
    }
}
