//! Canonical hook entries: what this installer version wants in settings.json.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One command descriptor inside a settings entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookCommand {
    pub command: String,
    pub timeout: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
    #[serde(rename = "type", default = "default_command_type")]
    pub kind: String,
}

fn default_command_type() -> String {
    "command".to_string()
}

impl HookCommand {
    /// A `type: command` descriptor.
    pub fn command(command: impl Into<String>, timeout: u64) -> Self {
        Self {
            command: command.into(),
            timeout,
            status_message: None,
            kind: default_command_type(),
        }
    }

    pub fn with_status_message(mut self, message: impl Into<String>) -> Self {
        self.status_message = Some(message.into());
        self
    }
}

/// One element of a `hooks.<event>` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookEntry {
    pub hooks: Vec<HookCommand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matcher: Option<String>,
}

impl HookEntry {
    pub fn new(hooks: Vec<HookCommand>) -> Self {
        Self {
            hooks,
            matcher: None,
        }
    }

    pub fn with_matcher(mut self, matcher: impl Into<String>) -> Self {
        self.matcher = Some(matcher.into());
        self
    }

    /// JSON form as written into settings.json.
    pub fn to_value(&self) -> Value {
        // Plain structs of strings and integers always serialize.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// The entry this installer wants under one lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalEntry {
    /// Lifecycle event name (key under `hooks`).
    pub event: String,
    /// Substring identifying entries owned by this installer.
    pub marker: String,
    pub entry: HookEntry,
}

/// An `(event, marker)` pair that identifies installer-owned entries the
/// current version no longer writes (renamed markers, retired events).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipRule {
    pub event: String,
    pub marker: String,
}

/// The fixed set of entries one installer version manages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalEntrySet {
    #[serde(default)]
    pub events: Vec<CanonicalEntry>,
    #[serde(default)]
    pub retired: Vec<OwnershipRule>,
}

impl CanonicalEntrySet {
    pub fn new(events: Vec<CanonicalEntry>) -> Self {
        Self {
            events,
            retired: Vec::new(),
        }
    }

    /// Events that receive a canonical entry on install, in first-seen order.
    pub fn managed_events(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for canonical in &self.events {
            if !out.contains(&canonical.event.as_str()) {
                out.push(&canonical.event);
            }
        }
        out
    }

    /// Every event that may hold an owned entry: managed events, then
    /// events only named by retired rules.
    pub fn known_events(&self) -> Vec<&str> {
        let mut out = self.managed_events();
        for rule in &self.retired {
            if !out.contains(&rule.event.as_str()) {
                out.push(&rule.event);
            }
        }
        out
    }

    /// All markers that identify owned entries under `event`.
    pub fn markers_for(&self, event: &str) -> Vec<&str> {
        let current = self
            .events
            .iter()
            .filter(|c| c.event == event)
            .map(|c| c.marker.as_str());
        let retired = self
            .retired
            .iter()
            .filter(|r| r.event == event)
            .map(|r| r.marker.as_str());

        let mut out: Vec<&str> = Vec::new();
        for marker in current.chain(retired) {
            if !out.contains(&marker) {
                out.push(marker);
            }
        }
        out
    }

    /// Canonical entries for `event`, in declaration order.
    pub fn entries_for<'a>(&'a self, event: &'a str) -> impl Iterator<Item = &'a CanonicalEntry> {
        self.events.iter().filter(move |c| c.event == event)
    }
}
