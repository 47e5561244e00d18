//! Filesystem primitives shared by the settings writer and the manifest.

use crate::errors::{PermitError, Result};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

/// Outcome of an idempotent operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "result", content = "detail")]
pub enum IdempotentResult {
    /// The target was modified.
    Changed,
    /// The target already matched the desired state.
    Unchanged,
    /// Dry run: the target would be modified.
    WouldChange(String),
    /// Nothing to act on (with reason).
    NotApplicable(String),
}

impl std::fmt::Display for IdempotentResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Changed => write!(f, "changed"),
            Self::Unchanged => write!(f, "unchanged"),
            Self::WouldChange(what) => write!(f, "would change: {}", what),
            Self::NotApplicable(reason) => write!(f, "not applicable: {}", reason),
        }
    }
}

/// Writes content to a file atomically using a temporary file.
///
/// When `path` is a symlink the write goes to the file it points at and the
/// link stays in place. An existing target keeps its permissions. The
/// temporary file lives next to the real target, so the final rename never
/// crosses a filesystem boundary. Readers observe either the old or the new
/// content, never a mix.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    atomic_write_with(path, content, |_| Ok(()))
}

/// [`atomic_write`] with a hook that runs after the temp file is synced and
/// before it is renamed into place. An error from the hook aborts the write.
pub fn atomic_write_with<F>(path: &Path, content: &[u8], before_rename: F) -> Result<()>
where
    F: FnOnce(&Path) -> std::io::Result<()>,
{
    let target = resolve_target(path)
        .map_err(|e| PermitError::io(format!("Failed to resolve {}", path.display()), e))?;
    let parent = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let file_name = target
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("file");
    let temp_path = parent.join(format!(".{}.{}.tmp", file_name, Uuid::new_v4()));
    let permissions = fs::metadata(&target).ok().map(|m| m.permissions());

    let result = write_synced(&temp_path, content, permissions)
        .and_then(|()| before_rename(&temp_path))
        .and_then(|()| fs::rename(&temp_path, &target));

    if let Err(e) = result {
        let _ = fs::remove_file(&temp_path);
        return Err(PermitError::io(
            format!("Failed to write {}", path.display()),
            e,
        ));
    }

    debug!(path = %target.display(), bytes = content.len(), "atomic write complete");
    Ok(())
}

/// The file a write to `path` should replace: the link target when `path`
/// is a symlink, otherwise `path` itself.
fn resolve_target(path: &Path) -> std::io::Result<PathBuf> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => match fs::canonicalize(path) {
            Ok(real) => Ok(real),
            // Dangling link: create the file it names.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let link = fs::read_link(path)?;
                Ok(match path.parent() {
                    Some(parent) => parent.join(link),
                    None => link,
                })
            }
            Err(e) => Err(e),
        },
        _ => Ok(path.to_path_buf()),
    }
}

fn write_synced(
    path: &Path,
    content: &[u8],
    permissions: Option<fs::Permissions>,
) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    if let Some(permissions) = permissions {
        file.set_permissions(permissions)?;
    }
    file.write_all(content)?;
    file.sync_all()
}

/// Creates a timestamped backup copy next to `path`.
pub fn create_backup(path: &Path) -> Result<PathBuf> {
    let backup_name = format!(
        "{}.bak.{}",
        path.file_name().and_then(|n| n.to_str()).unwrap_or("file"),
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );
    let backup_path = path
        .parent()
        .map(|p| p.join(&backup_name))
        .unwrap_or_else(|| PathBuf::from(&backup_name));

    fs::copy(path, &backup_path).map_err(|e| {
        PermitError::io(
            format!("Failed to create backup at {}", backup_path.display()),
            e,
        )
    })?;

    debug!("Created backup: {:?}", backup_path);
    Ok(backup_path)
}
