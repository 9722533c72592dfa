//! Envelope validation and traversal
//!
//! A delivery looks like:
//!
//! ```json
//! {
//!   "object": "page",
//!   "entry": [
//!     { "id": "PAGE_ID", "time": 1458692752478, "messaging": [ { ... }, { ... } ] }
//!   ]
//! }
//! ```
//!
//! The envelope shape is checked in full before the first event is
//! classified. Events are then classified one at a time and handed to the
//! handler in document order; nothing is collected.

use crate::{
    classifier::classify,
    events::Event,
    json::{self, Object},
    HandlerError, ReceiveError, Result,
};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

/// The only `object` value accepted, compared case-insensitively
pub const OBJECT_TYPE_PAGE: &str = "page";

/// One page-scoped batch of messaging events
#[derive(Debug, Clone)]
pub struct Entry<'a> {
    pub page_id: Option<String>,
    pub time: Option<DateTime<Utc>>,
    pub messaging: &'a [Value],
}

/// Parses a raw body into a JSON object.
pub fn parse_envelope(body: &[u8]) -> Result<Value> {
    let document: Value = serde_json::from_slice(body)
        .map_err(|e| ReceiveError::InvalidPayload(format!("body is not valid JSON: {}", e)))?;

    if !document.is_object() {
        return Err(ReceiveError::InvalidPayload(
            "body must be a JSON object".to_string(),
        ));
    }

    Ok(document)
}

/// Checks the envelope shape and returns its entries in document order.
///
/// Fails with [`ReceiveError::SchemaViolation`] when `object` is not "page",
/// when `entry` is not an array, or when any entry lacks a `messaging` array
/// of objects.
pub fn validate_envelope(document: &Value) -> Result<Vec<Entry<'_>>> {
    let envelope = document
        .as_object()
        .ok_or_else(|| ReceiveError::InvalidPayload("body must be a JSON object".to_string()))?;

    match json::string(envelope, "object") {
        Some(object) if object.eq_ignore_ascii_case(OBJECT_TYPE_PAGE) => {}
        Some(object) => {
            return Err(ReceiveError::SchemaViolation(format!(
                "'object' property must be 'page', got '{}'. Make sure this is a page subscription",
                object
            )))
        }
        None => {
            return Err(ReceiveError::SchemaViolation(
                "'object' property is missing. Make sure this is a page subscription".to_string(),
            ))
        }
    }

    let entries = json::array(envelope, "entry")
        .ok_or_else(|| ReceiveError::SchemaViolation("'entry' must be an array".to_string()))?;

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| parse_entry(index, entry))
        .collect()
}

fn parse_entry(index: usize, entry: &Value) -> Result<Entry<'_>> {
    let obj: &Object = entry.as_object().ok_or_else(|| {
        ReceiveError::SchemaViolation(format!("entry[{}] must be an object", index))
    })?;

    let messaging = json::array(obj, "messaging").ok_or_else(|| {
        ReceiveError::SchemaViolation(format!("entry[{}].messaging must be an array", index))
    })?;

    if let Some(position) = messaging.iter().position(|event| !event.is_object()) {
        return Err(ReceiveError::SchemaViolation(format!(
            "entry[{}].messaging[{}] must be an object",
            index, position
        )));
    }

    Ok(Entry {
        page_id: json::id_string(obj, "id"),
        time: json::instant(obj, "time"),
        messaging,
    })
}

/// Walks a parsed envelope, calling `handler` once per messaging event.
///
/// The handler runs synchronously and in document order. The first handler
/// error stops the walk; events after it are not classified.
pub fn walk_envelope<F, E>(document: &Value, mut handler: F) -> Result<()>
where
    F: FnMut(Event) -> std::result::Result<(), E>,
    E: Into<HandlerError>,
{
    let entries = validate_envelope(document)?;

    for entry in entries {
        let page_id = entry.page_id.as_deref().unwrap_or_default();

        for raw in entry.messaging {
            let event = classify(raw);
            debug!(page_id = %page_id, kind = %event.kind(), "Dispatching messaging event");

            handler(event).map_err(|e| ReceiveError::Handler(e.into()))?;
        }
    }

    Ok(())
}
