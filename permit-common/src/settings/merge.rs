//! Settings merge engine.
//!
//! Install and uninstall share one strip step: every installer-owned entry
//! under a known event is removed. Install then appends the canonical entry,
//! so upgrades (new matcher, timeout, command path) always converge to the
//! current canonical value instead of accumulating duplicates. Keys and
//! entries the installer does not own are carried over unchanged.

use super::canonical::CanonicalEntrySet;
use super::ownership::strip_any;
use serde_json::{Map, Value};
use thiserror::Error;

/// Document shapes the engine refuses to rewrite.
///
/// `null` is read as absent; any other wrong type is an error so user data
/// is never replaced by a guess.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("top-level value is not a JSON object")]
    NotAnObject,
    #[error("\"hooks\" is not a JSON object")]
    HooksNotAnObject,
    #[error("\"hooks.{0}\" is not a JSON array")]
    EventNotAnArray(String),
}

/// Replace the installer's entries in `document` with the canonical set.
///
/// For each managed event: strip every owned entry (current and retired
/// markers), then append the canonical entries for that event.
pub fn merge(document: &Value, set: &CanonicalEntrySet) -> Result<Value, ShapeError> {
    let mut doc = document.clone();
    let events = set.managed_events();
    if events.is_empty() {
        return Ok(doc);
    }

    let hooks = hooks_object_mut(&mut doc)?;
    for event in events {
        let markers = set.markers_for(event);
        let mut entries = strip_any(&event_entries(hooks, event)?, &markers);
        entries.extend(set.entries_for(event).map(|c| c.entry.to_value()));
        hooks.insert(event.to_string(), Value::Array(entries));
    }

    Ok(doc)
}

/// Remove every installer-owned entry under every known event.
///
/// Covers retired events and markers too, so entries written by older
/// installer versions are cleaned up. Known event arrays stay present
/// (possibly empty).
pub fn strip_all(document: &Value, set: &CanonicalEntrySet) -> Result<Value, ShapeError> {
    let mut doc = document.clone();
    let events = set.known_events();
    if events.is_empty() {
        return Ok(doc);
    }

    let hooks = hooks_object_mut(&mut doc)?;
    for event in events {
        let markers = set.markers_for(event);
        let entries = strip_any(&event_entries(hooks, event)?, &markers);
        hooks.insert(event.to_string(), Value::Array(entries));
    }

    Ok(doc)
}

/// Entries under `hooks.<event>`, or empty when absent.
pub fn entries_under<'a>(document: &'a Value, event: &str) -> Result<&'a [Value], ShapeError> {
    let hooks = match document {
        Value::Object(obj) => match obj.get("hooks") {
            None | Some(Value::Null) => return Ok(&[][..]),
            Some(Value::Object(hooks)) => hooks,
            Some(_) => return Err(ShapeError::HooksNotAnObject),
        },
        _ => return Err(ShapeError::NotAnObject),
    };

    match hooks.get(event) {
        None | Some(Value::Null) => Ok(&[][..]),
        Some(Value::Array(entries)) => Ok(entries),
        Some(_) => Err(ShapeError::EventNotAnArray(event.to_string())),
    }
}

fn hooks_object_mut(doc: &mut Value) -> Result<&mut Map<String, Value>, ShapeError> {
    let root = doc.as_object_mut().ok_or(ShapeError::NotAnObject)?;
    let hooks = root
        .entry("hooks")
        .or_insert_with(|| Value::Object(Map::new()));
    if hooks.is_null() {
        *hooks = Value::Object(Map::new());
    }
    hooks.as_object_mut().ok_or(ShapeError::HooksNotAnObject)
}

fn event_entries(hooks: &Map<String, Value>, event: &str) -> Result<Vec<Value>, ShapeError> {
    match hooks.get(event) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(entries)) => Ok(entries.clone()),
        Some(_) => Err(ShapeError::EventNotAnArray(event.to_string())),
    }
}
