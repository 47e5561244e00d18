use super::{FileSource, SourceKind};
use permit_common::config::layout::HOOKS_DIR;
use permit_common::{PermitError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Copies hook files from a `hooks/` directory on disk.
#[derive(Debug, Clone)]
pub struct LocalSource {
    root: PathBuf,
}

impl LocalSource {
    /// `root` is the directory that contains `hooks/`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn hooks_dir(&self) -> PathBuf {
        self.root.join(HOOKS_DIR)
    }
}

impl FileSource for LocalSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Local
    }

    fn location(&self) -> String {
        self.hooks_dir().display().to_string()
    }

    /// Top-level regular files only, sorted by name.
    fn list_files(&self) -> Result<Vec<String>> {
        let dir = self.hooks_dir();
        let entries = fs::read_dir(&dir)
            .map_err(|e| PermitError::io(format!("Failed to list {}", dir.display()), e))?;

        let mut files = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|e| PermitError::io(format!("Failed to list {}", dir.display()), e))?;
            let path = entry.path();
            if !path.is_file() {
                debug!(path = %path.display(), "skipping non-file entry");
                continue;
            }
            match entry.file_name().to_str() {
                Some(name) => files.push(format!("{}/{}", HOOKS_DIR, name)),
                None => debug!(path = %path.display(), "skipping non-UTF-8 file name"),
            }
        }
        files.sort();
        Ok(files)
    }

    fn fetch(&self, rel: &str) -> Result<Vec<u8>> {
        let path = self.root.join(rel);
        fs::read(&path).map_err(|e| PermitError::SourceUnavailable {
            path: path.display().to_string(),
            reason: e.to_string(),
            remote: false,
        })
    }

    #[cfg(unix)]
    fn is_executable(&self, rel: &str) -> bool {
        use std::os::unix::fs::PermissionsExt;

        fs::metadata(self.root.join(rel))
            .map(|meta| meta.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }

    fn is_install_target(&self, hooks_dir: &Path) -> bool {
        match (fs::canonicalize(self.hooks_dir()), fs::canonicalize(hooks_dir)) {
            (Ok(ours), Ok(target)) => ours == target,
            _ => false,
        }
    }
}
