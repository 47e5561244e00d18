//! Reading and atomically rewriting settings.json.

use super::merge::ShapeError;
use crate::errors::{PermitError, Result};
use crate::state::{IdempotentResult, atomic_write, create_backup};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// How a settings update is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Compute the result but write nothing.
    pub dry_run: bool,
    /// Copy the current file to `settings.json.bak.<timestamp>` first.
    pub backup: bool,
}

/// The host application's settings document on disk.
#[derive(Debug, Clone)]
pub struct SettingsFile {
    path: PathBuf,
}

impl SettingsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Parse the document. `Ok(None)` when the file does not exist.
    pub fn load(&self) -> Result<Option<Value>> {
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

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| PermitError::InvalidConfigDocument {
                path: self.path.clone(),
                reason: format!("invalid JSON: {}", e),
                shape: false,
            })
    }

    /// Serialize as 2-space indented JSON with a trailing newline and
    /// atomically replace the file.
    pub fn save(&self, document: &Value) -> Result<()> {
        let content = render(document)?;
        atomic_write(&self.path, content.as_bytes())
    }

    /// Read, transform, and write back if the result differs.
    ///
    /// A missing file is treated as `{}`. A file that fails to parse, or a
    /// transform that rejects the document's shape, aborts without writing.
    pub fn update<F>(&self, options: WriteOptions, transform: F) -> Result<IdempotentResult>
    where
        F: FnOnce(&Value) -> std::result::Result<Value, ShapeError>,
    {
        let existing = self.load()?;
        let created = existing.is_none();
        let current = existing.unwrap_or_else(|| Value::Object(serde_json::Map::new()));

        let updated = transform(&current).map_err(|e| self.shape_error(e))?;

        if !created && updated == current {
            debug!(path = %self.path.display(), "settings already up to date");
            return Ok(IdempotentResult::Unchanged);
        }

        if options.dry_run {
            let verb = if created { "create" } else { "update" };
            return Ok(IdempotentResult::WouldChange(format!(
                "would {} {}",
                verb,
                self.path.display()
            )));
        }

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| {
                PermitError::io(format!("Failed to create {}", parent.display()), e)
            })?;
        }

        if options.backup && !created {
            let backup = create_backup(&self.path)?;
            info!(backup = %backup.display(), "backed up settings");
        }

        self.save(&updated)?;
        info!(path = %self.path.display(), created, "wrote settings");
        Ok(IdempotentResult::Changed)
    }

    fn shape_error(&self, e: ShapeError) -> PermitError {
        PermitError::InvalidConfigDocument {
            path: self.path.clone(),
            reason: e.to_string(),
            shape: true,
        }
    }
}

/// Canonical on-disk text of a settings document.
pub fn render(document: &Value) -> Result<String> {
    let mut content =
        serde_json::to_string_pretty(document).map_err(|source| PermitError::Serialize {
            what: "settings document",
            source,
        })?;
    content.push('\n');
    Ok(content)
}
