//! Where hook files come from.
//!
//! A `hooks/` directory next to the installer means a local checkout; its
//! absence means files are downloaded from the profile's remote base. The
//! choice is a plain existence test with no network fallback.

mod local;
mod remote;

pub use local::LocalSource;
pub use remote::RemoteSource;

use permit_common::config::layout::HOOKS_DIR;
use permit_common::{InstallerProfile, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Local,
    Remote,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Local => write!(f, "local"),
            SourceKind::Remote => write!(f, "remote"),
        }
    }
}

/// A provider of hook file contents.
pub trait FileSource {
    fn kind(&self) -> SourceKind;

    /// Human-readable origin (directory or base URL).
    fn location(&self) -> String;

    /// Root-relative paths this source provides, e.g. `hooks/claude-stop`.
    fn list_files(&self) -> Result<Vec<String>>;

    /// Contents of one listed file.
    fn fetch(&self, rel: &str) -> Result<Vec<u8>>;

    /// Whether the source itself marks `rel` executable. Sources without
    /// file modes report false.
    fn is_executable(&self, _rel: &str) -> bool {
        false
    }

    /// True when the source directory is the install target itself, so
    /// there is nothing to copy.
    fn is_install_target(&self, _hooks_dir: &Path) -> bool {
        false
    }
}

/// Pick a local source if `<source_root>/hooks` is a directory, else remote.
pub fn resolve(source_root: &Path, profile: &InstallerProfile) -> Box<dyn FileSource> {
    if source_root.join(HOOKS_DIR).is_dir() {
        Box::new(LocalSource::new(source_root))
    } else {
        Box::new(RemoteSource::new(
            &profile.remote_base,
            profile.default_file_list(),
        ))
    }
}

/// Directory containing the running executable.
pub fn default_source_root() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
}

/// Whether shipped native artifacts must be recompiled on this machine.
///
/// `force` (`--build` / `--no-build`) wins over the architecture check.
pub fn needs_rebuild(profile: &InstallerProfile, force: Option<bool>) -> bool {
    needs_rebuild_for(std::env::consts::ARCH, profile, force)
}

pub fn needs_rebuild_for(arch: &str, profile: &InstallerProfile, force: Option<bool>) -> bool {
    if profile.artifacts.is_empty() {
        return false;
    }
    force.unwrap_or(arch != profile.artifact_arch)
}
