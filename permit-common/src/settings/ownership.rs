//! Structural ownership of settings entries.
//!
//! Entries carry no installer ID. An entry belongs to the installer iff one
//! of its command descriptors mentions a marker (the hook's file name).
//! Anything that does not have the expected shape is foreign and is passed
//! through untouched.

use serde_json::Value;

/// True iff any `hooks[].command` string inside `entry` contains `marker`.
///
/// An empty marker owns nothing.
pub fn is_owned(entry: &Value, marker: &str) -> bool {
    if marker.is_empty() {
        return false;
    }

    entry
        .get("hooks")
        .and_then(Value::as_array)
        .is_some_and(|commands| {
            commands.iter().any(|cmd| {
                cmd.get("command")
                    .and_then(Value::as_str)
                    .is_some_and(|c| c.contains(marker))
            })
        })
}

/// True iff `entry` is owned under any of `markers`.
pub fn is_owned_by_any(entry: &Value, markers: &[&str]) -> bool {
    markers.iter().any(|m| is_owned(entry, m))
}

/// Returns `entries` without the ones owned under `marker`, order preserved.
pub fn strip(entries: &[Value], marker: &str) -> Vec<Value> {
    strip_any(entries, &[marker])
}

/// Returns `entries` without the ones owned under any of `markers`.
pub fn strip_any(entries: &[Value], markers: &[&str]) -> Vec<Value> {
    entries
        .iter()
        .filter(|entry| !is_owned_by_any(entry, markers))
        .cloned()
        .collect()
}

/// Number of entries owned under any of `markers`.
pub fn count_owned(entries: &[Value], markers: &[&str]) -> usize {
    entries
        .iter()
        .filter(|entry| is_owned_by_any(entry, markers))
        .count()
}
