//! Installer profiles.
//!
//! A profile is the immutable description of one installer version: which
//! files it ships, which of them are compiled on the target machine, and
//! which settings entries it owns. [`InstallerProfile::builtin`] is the
//! shipped profile; alternate profiles load from TOML.

use crate::config::layout::{DEFAULT_MANIFEST_NAME, HOOKS_DIR};
use crate::errors::{PermitError, Result};
use crate::settings::canonical::{CanonicalEntry, CanonicalEntrySet, HookCommand, HookEntry};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Component, Path};

pub const DEFAULT_REMOTE_BASE: &str =
    "https://raw.githubusercontent.com/rajulbabel/homebrew-claude/main";

const APPROVE_MATCHER: &str =
    "Bash|Edit|Write|Read|NotebookEdit|Task|WebFetch|WebSearch|Glob|Grep|AskUserQuestion";

/// A file the installer places under the install root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookFile {
    /// Root-relative path, e.g. `hooks/claude-approve`.
    pub path: String,
    #[serde(default)]
    pub executable: bool,
}

impl HookFile {
    pub fn new(path: impl Into<String>, executable: bool) -> Self {
        Self {
            path: path.into(),
            executable,
        }
    }
}

/// A binary compiled from a source file inside the hooks directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeArtifact {
    pub source: String,
    pub output: String,
}

impl NativeArtifact {
    pub fn new(source: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            output: output.into(),
        }
    }
}

/// Everything one installer version needs to know about itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallerProfile {
    pub files: Vec<HookFile>,
    #[serde(default)]
    pub artifacts: Vec<NativeArtifact>,
    /// `std::env::consts::ARCH` value the shipped artifacts were built for.
    #[serde(default = "default_artifact_arch")]
    pub artifact_arch: String,
    #[serde(default = "default_remote_base")]
    pub remote_base: String,
    #[serde(default = "default_manifest_name")]
    pub manifest_name: String,
    pub canonical: CanonicalEntrySet,
}

fn default_artifact_arch() -> String {
    "aarch64".to_string()
}

fn default_remote_base() -> String {
    DEFAULT_REMOTE_BASE.to_string()
}

fn default_manifest_name() -> String {
    DEFAULT_MANIFEST_NAME.to_string()
}

impl InstallerProfile {
    /// The shipped claude-approve / claude-stop profile.
    pub fn builtin() -> Self {
        Self {
            files: vec![
                HookFile::new("hooks/claude-approve", true),
                HookFile::new("hooks/claude-approve.swift", false),
                HookFile::new("hooks/claude-stop", true),
                HookFile::new("hooks/claude-stop.swift", false),
                HookFile::new("hooks/auto-approve.json", false),
            ],
            artifacts: vec![
                NativeArtifact::new("claude-approve.swift", "claude-approve"),
                NativeArtifact::new("claude-stop.swift", "claude-stop"),
            ],
            artifact_arch: default_artifact_arch(),
            remote_base: default_remote_base(),
            manifest_name: default_manifest_name(),
            canonical: CanonicalEntrySet::new(vec![
                CanonicalEntry {
                    event: "PreToolUse".to_string(),
                    marker: "claude-approve".to_string(),
                    entry: HookEntry::new(vec![
                        HookCommand::command("~/.claude/hooks/claude-approve", 600)
                            .with_status_message("Waiting for approval in dialog..."),
                    ])
                    .with_matcher(APPROVE_MATCHER),
                },
                CanonicalEntry {
                    event: "Stop".to_string(),
                    marker: "claude-stop".to_string(),
                    entry: HookEntry::new(vec![HookCommand::command(
                        "~/.claude/hooks/claude-stop",
                        15,
                    )]),
                },
            ]),
        }
    }

    /// Load and validate a TOML profile.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PermitError::io(format!("Failed to read profile {}", path.display()), e))?;
        let profile: Self = toml::from_str(&content).map_err(|e| PermitError::Profile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        profile.validate().map_err(|reason| PermitError::Profile {
            path: path.to_path_buf(),
            reason,
        })?;
        Ok(profile)
    }

    /// Root-relative paths of every shipped file, in declaration order.
    pub fn default_file_list(&self) -> Vec<String> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }

    pub fn is_executable(&self, rel: &str) -> bool {
        self.files.iter().any(|f| f.path == rel && f.executable)
    }

    pub fn with_remote_base(mut self, base: impl Into<String>) -> Self {
        self.remote_base = base.into();
        self
    }

    /// Check the invariants the installer relies on.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.files.is_empty() {
            return Err("profile lists no files".to_string());
        }

        let mut seen = HashSet::new();
        for file in &self.files {
            if !is_contained_relative(&file.path) {
                return Err(format!(
                    "file path '{}' must be relative and stay inside the install root",
                    file.path
                ));
            }
            if !seen.insert(file.path.as_str()) {
                return Err(format!("file '{}' listed twice", file.path));
            }
        }

        for artifact in &self.artifacts {
            for name in [&artifact.source, &artifact.output] {
                if !is_plain_file_name(name) {
                    return Err(format!("artifact name '{}' must be a plain file name", name));
                }
            }
            let source = format!("{}/{}", HOOKS_DIR, artifact.source);
            if !seen.contains(source.as_str()) {
                return Err(format!("artifact source '{}' is not a listed file", source));
            }
        }

        if self.canonical.events.is_empty() {
            return Err("profile declares no canonical settings entries".to_string());
        }
        let markers = self
            .canonical
            .events
            .iter()
            .map(|c| (&c.event, &c.marker))
            .chain(self.canonical.retired.iter().map(|r| (&r.event, &r.marker)));
        for (event, marker) in markers {
            if event.is_empty() {
                return Err("settings event name is empty".to_string());
            }
            if marker.is_empty() {
                return Err(format!("marker for event '{}' is empty", event));
            }
        }

        if !is_plain_file_name(&self.manifest_name) {
            return Err(format!(
                "manifest name '{}' must be a plain file name",
                self.manifest_name
            ));
        }

        Ok(())
    }
}

impl Default for InstallerProfile {
    fn default() -> Self {
        Self::builtin()
    }
}

fn is_contained_relative(rel: &str) -> bool {
    let path = Path::new(rel);
    !rel.is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}

fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(components.next(), Some(Component::Normal(_))) && components.next().is_none()
}
