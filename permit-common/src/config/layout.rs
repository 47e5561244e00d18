//! Filesystem layout of an install root.

use crate::errors::{PermitError, Result};
use std::path::{Path, PathBuf};

/// Default install root relative to the home directory.
pub const DEFAULT_ROOT_DIR: &str = ".claude";
pub const SETTINGS_FILE: &str = "settings.json";
pub const HOOKS_DIR: &str = "hooks";
pub const DEFAULT_MANIFEST_NAME: &str = ".permit-manifest";

/// Paths derived from the install root (`~/.claude` by default).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    root: PathBuf,
    manifest_name: String,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            manifest_name: DEFAULT_MANIFEST_NAME.to_string(),
        }
    }

    /// `~/.claude`.
    pub fn default_root() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|home| home.join(DEFAULT_ROOT_DIR))
            .ok_or(PermitError::HomeDirUnavailable)
    }

    pub fn with_manifest_name(mut self, name: impl Into<String>) -> Self {
        self.manifest_name = name.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn hooks_dir(&self) -> PathBuf {
        self.root.join(HOOKS_DIR)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.root.join(SETTINGS_FILE)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.hooks_dir().join(&self.manifest_name)
    }

    /// Absolute path for a root-relative file such as `hooks/claude-stop`.
    pub fn resolve(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }
}
