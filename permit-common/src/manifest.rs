//! Installed-file manifest.
//!
//! A JSON array of root-relative paths written after every successful file
//! placement. Uninstall removes exactly what it lists; installs that predate
//! the manifest fall back to the profile's default file list.

use crate::errors::{PermitError, Result};
use crate::state::atomic_write;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
}

impl Manifest {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Atomically persist `paths` in order.
    pub fn write(&self, paths: &[String]) -> Result<()> {
        let mut content =
            serde_json::to_string_pretty(paths).map_err(|source| PermitError::Serialize {
                what: "manifest",
                source,
            })?;
        content.push('\n');

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                PermitError::io(format!("Failed to create {}", parent.display()), e)
            })?;
        }
        atomic_write(&self.path, content.as_bytes())?;
        debug!(path = %self.path.display(), count = paths.len(), "wrote manifest");
        Ok(())
    }

    /// The recorded list, or `None` when no manifest exists.
    pub fn read_recorded(&self) -> Result<Option<Vec<String>>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(PermitError::io(
                    format!("Failed to read {}", self.path.display()),
                    e,
                ));
            }
        };

        let paths: Vec<String> =
            serde_json::from_str(&content).map_err(|e| self.corrupt(e.to_string()))?;

        if let Some(bad) = paths.iter().find(|p| !is_safe_relative(p)) {
            return Err(self.corrupt(format!("entry '{}' escapes the install root", bad)));
        }

        Ok(Some(paths))
    }

    /// The recorded list, or `defaults` when no manifest exists.
    pub fn read(&self, defaults: &[String]) -> Result<Vec<String>> {
        Ok(self
            .read_recorded()?
            .unwrap_or_else(|| defaults.to_vec()))
    }

    /// Delete the manifest. Returns whether a file was removed.
    pub fn clear(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(PermitError::io(
                format!("Failed to remove {}", self.path.display()),
                e,
            )),
        }
    }

    fn corrupt(&self, reason: String) -> PermitError {
        PermitError::ManifestCorrupt {
            path: self.path.clone(),
            reason,
        }
    }
}

fn is_safe_relative(rel: &str) -> bool {
    !rel.is_empty()
        && Path::new(rel)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}
