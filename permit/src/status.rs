//! Read-only inspection of what is currently installed.

use permit_common::settings::merge::entries_under;
use permit_common::settings::ownership::{count_owned, is_owned_by_any};
use permit_common::{InstallerProfile, Layout, Manifest, SettingsFile};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;

/// Installation status of one managed settings event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HookStatus {
    /// Exactly the canonical entries are present.
    Installed,
    /// Owned entries exist but are stale, duplicated or unreadable.
    NeedsUpdate,
    NotInstalled,
}

impl std::fmt::Display for HookStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HookStatus::Installed => write!(f, "Installed"),
            HookStatus::NeedsUpdate => write!(f, "Needs update"),
            HookStatus::NotInstalled => write!(f, "Not installed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventStatus {
    pub event: String,
    pub status: HookStatus,
    pub owned_entries: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileStatus {
    pub path: String,
    pub present: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub settings_path: PathBuf,
    pub settings_exists: bool,
    /// Why the settings document could not be inspected, if it could not.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings_error: Option<String>,
    pub events: Vec<EventStatus>,
    pub manifest_recorded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest_error: Option<String>,
    pub files: Vec<FileStatus>,
}

impl StatusReport {
    pub fn is_installed(&self) -> bool {
        self.events.iter().all(|e| e.status == HookStatus::Installed)
            && self.files.iter().all(|f| f.present)
    }
}

/// Inspect settings entries and installed files. Never writes.
pub fn status(profile: &InstallerProfile, layout: &Layout) -> StatusReport {
    let layout = layout.clone().with_manifest_name(profile.manifest_name.clone());
    let settings = SettingsFile::new(layout.settings_path());

    let (document, settings_error) = match settings.load() {
        Ok(doc) => (doc, None),
        Err(e) => (None, Some(e.to_string())),
    };

    let events = profile
        .canonical
        .managed_events()
        .into_iter()
        .map(|event| {
            let (status, owned_entries) = match (&document, &settings_error) {
                (_, Some(_)) => (HookStatus::NeedsUpdate, 0),
                (None, None) => (HookStatus::NotInstalled, 0),
                (Some(doc), None) => event_status(doc, profile, event),
            };
            EventStatus {
                event: event.to_string(),
                status,
                owned_entries,
            }
        })
        .collect();

    let manifest = Manifest::new(layout.manifest_path());
    let (recorded, manifest_error) = match manifest.read_recorded() {
        Ok(recorded) => (recorded, None),
        Err(e) => (None, Some(e.to_string())),
    };
    let manifest_recorded = recorded.is_some();
    let files = recorded
        .unwrap_or_else(|| profile.default_file_list())
        .into_iter()
        .map(|path| FileStatus {
            present: layout.resolve(&path).exists(),
            path,
        })
        .collect();

    StatusReport {
        settings_path: layout.settings_path(),
        settings_exists: settings.exists(),
        settings_error,
        events,
        manifest_recorded,
        manifest_error,
        files,
    }
}

fn event_status(doc: &Value, profile: &InstallerProfile, event: &str) -> (HookStatus, usize) {
    let entries = match entries_under(doc, event) {
        Ok(entries) => entries,
        Err(_) => return (HookStatus::NeedsUpdate, 0),
    };

    let markers = profile.canonical.markers_for(event);
    let owned = count_owned(entries, &markers);
    let canonical: Vec<Value> = profile
        .canonical
        .entries_for(event)
        .map(|c| c.entry.to_value())
        .collect();

    let status = if owned == 0 {
        HookStatus::NotInstalled
    } else if owned == canonical.len()
        && entries
            .iter()
            .filter(|e| is_owned_by_any(e, &markers))
            .eq(canonical.iter())
    {
        HookStatus::Installed
    } else {
        HookStatus::NeedsUpdate
    };
    (status, owned)
}
