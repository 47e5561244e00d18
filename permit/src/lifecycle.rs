//! Install and uninstall orchestration.
//!
//! Both flows are strictly sequential and never retry; re-running is the
//! recovery path. Install fetches every file into memory before the first
//! write so an unreachable source leaves the machine untouched.

use crate::build::{BuildReport, NativeBuilder, SwiftcBuilder, build_artifacts};
use crate::source::{FileSource, SourceKind};
use permit_common::settings::{merge, strip_all};
use permit_common::state::atomic_write;
use permit_common::{
    IdempotentResult, InstallerProfile, Layout, Manifest, PermitError, Result, SettingsFile,
    WriteOptions,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Lifecycle stages, logged as the `stage` field on transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    SourceResolved,
    FilesPlaced,
    Built,
    ConfigMerged,
    ManifestLoaded,
    FilesRemoved,
    ConfigStripped,
    Done,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::SourceResolved => "source_resolved",
            Stage::FilesPlaced => "files_placed",
            Stage::Built => "built",
            Stage::ConfigMerged => "config_merged",
            Stage::ManifestLoaded => "manifest_loaded",
            Stage::FilesRemoved => "files_removed",
            Stage::ConfigStripped => "config_stripped",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// User-visible progress emitted while a flow runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    Source { kind: SourceKind, location: String },
    AlreadyInPlace(PathBuf),
    Placed(String),
    Compiling(String),
    Removed(String),
    AlreadyAbsent(String),
}

#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    /// Recompile native artifacts after placing files.
    pub rebuild: bool,
    pub write: WriteOptions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub source_kind: SourceKind,
    /// Root-relative paths written (or that would be written in a dry run).
    pub placed: Vec<String>,
    /// Files the previous install recorded that this version no longer
    /// ships, removed from disk (or that would be removed in a dry run).
    pub retired: Vec<String>,
    pub already_in_place: bool,
    pub build: Option<BuildReport>,
    pub settings: IdempotentResult,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UninstallReport {
    /// Whether the file list came from a manifest rather than the defaults.
    pub manifest_recorded: bool,
    pub removed: Vec<String>,
    pub absent: Vec<String>,
    pub settings: IdempotentResult,
}

type ProgressSink = Box<dyn Fn(&Progress)>;

/// One file read from a source, held in memory until every fetch succeeds.
struct FetchedFile {
    rel: String,
    content: Vec<u8>,
    executable: bool,
}

/// Runs install and uninstall for one profile against one install root.
pub struct Installer {
    profile: InstallerProfile,
    layout: Layout,
    builder: Box<dyn NativeBuilder>,
    progress: ProgressSink,
}

impl Installer {
    pub fn new(profile: InstallerProfile, layout: Layout) -> Self {
        let layout = layout.with_manifest_name(profile.manifest_name.clone());
        Self {
            profile,
            layout,
            builder: Box::new(SwiftcBuilder),
            progress: Box::new(|_| {}),
        }
    }

    pub fn with_builder(mut self, builder: Box<dyn NativeBuilder>) -> Self {
        self.builder = builder;
        self
    }

    pub fn with_progress<F>(mut self, sink: F) -> Self
    where
        F: Fn(&Progress) + 'static,
    {
        self.progress = Box::new(sink);
        self
    }

    fn manifest(&self) -> Manifest {
        Manifest::new(self.layout.manifest_path())
    }

    fn settings(&self) -> SettingsFile {
        SettingsFile::new(self.layout.settings_path())
    }

    fn emit(&self, progress: Progress) {
        (self.progress)(&progress);
    }

    /// Place files from `source`, optionally rebuild, then merge settings.
    ///
    /// On a build failure the placed files and manifest stay and settings
    /// are left untouched.
    pub fn install(&self, source: &dyn FileSource, options: &InstallOptions) -> Result<InstallReport> {
        let dry_run = options.write.dry_run;
        debug!(stage = %Stage::Idle, dry_run, "install starting");

        let hooks_dir = self.layout.hooks_dir();
        info!(stage = %Stage::SourceResolved, kind = %source.kind(), location = %source.location());
        self.emit(Progress::Source {
            kind: source.kind(),
            location: source.location(),
        });

        let already_in_place = source.is_install_target(&hooks_dir);
        let placed: Vec<String> = if already_in_place {
            self.emit(Progress::AlreadyInPlace(hooks_dir.clone()));
            self.profile.default_file_list()
        } else {
            let fetched = self.fetch_all(source)?;
            if !dry_run {
                self.place(&fetched)?;
            }
            fetched.into_iter().map(|file| file.rel).collect()
        };

        let stale = self.previously_recorded_except(&placed);
        let mut recorded = placed.clone();
        let retired = if already_in_place {
            // The source is the install directory; keep tracking old files
            // so uninstall still finds them.
            recorded.extend(stale);
            Vec::new()
        } else {
            self.retire(stale, dry_run)?
        };

        if !dry_run {
            self.manifest().write(&recorded)?;
        }
        info!(stage = %Stage::FilesPlaced, count = placed.len(), retired = retired.len());

        let build = if options.rebuild && !self.profile.artifacts.is_empty() {
            if dry_run {
                None
            } else {
                for artifact in &self.profile.artifacts {
                    self.emit(Progress::Compiling(artifact.source.clone()));
                }
                let report =
                    build_artifacts(self.builder.as_ref(), &hooks_dir, &self.profile.artifacts)?;
                info!(stage = %Stage::Built, built = report.built.len());
                Some(report)
            }
        } else {
            None
        };

        let settings = self
            .settings()
            .update(options.write, |doc| merge(doc, &self.profile.canonical))?;
        info!(stage = %Stage::ConfigMerged, result = %settings);

        info!(stage = %Stage::Done, "install complete");
        Ok(InstallReport {
            source_kind: source.kind(),
            placed,
            retired,
            already_in_place,
            build,
            settings,
        })
    }

    fn fetch_all(&self, source: &dyn FileSource) -> Result<Vec<FetchedFile>> {
        source
            .list_files()?
            .into_iter()
            .map(|rel| {
                let content = source.fetch(&rel)?;
                let executable = self.profile.is_executable(&rel) || source.is_executable(&rel);
                Ok(FetchedFile {
                    rel,
                    content,
                    executable,
                })
            })
            .collect()
    }

    fn place(&self, fetched: &[FetchedFile]) -> Result<()> {
        for file in fetched {
            let dest = self.layout.resolve(&file.rel);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent).map_err(|e| {
                    PermitError::io(format!("Failed to create {}", parent.display()), e)
                })?;
            }
            atomic_write(&dest, &file.content)?;
            if file.executable {
                make_executable(&dest)?;
            }
            debug!(path = %dest.display(), bytes = file.content.len(), "placed");
            self.emit(Progress::Placed(file.rel.clone()));
        }
        Ok(())
    }

    /// Paths the existing manifest records that are not in `current`.
    ///
    /// An unreadable manifest is about to be replaced, so it contributes
    /// nothing.
    fn previously_recorded_except(&self, current: &[String]) -> Vec<String> {
        match self.manifest().read_recorded() {
            Ok(Some(previous)) => previous
                .into_iter()
                .filter(|rel| !current.contains(rel))
                .collect(),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "ignoring unreadable manifest from the previous install");
                Vec::new()
            }
        }
    }

    /// Remove files a previous version placed that this one no longer ships.
    fn retire(&self, stale: Vec<String>, dry_run: bool) -> Result<Vec<String>> {
        let mut retired = Vec::new();
        for rel in stale {
            let path = self.layout.resolve(&rel);
            if fs::symlink_metadata(&path).is_err() {
                debug!(path = %path.display(), "retired file already gone");
                continue;
            }
            if !dry_run {
                fs::remove_file(&path).map_err(|e| {
                    PermitError::io(format!("Failed to remove {}", path.display()), e)
                })?;
                self.emit(Progress::Removed(rel.clone()));
            }
            retired.push(rel);
        }
        Ok(retired)
    }

    /// Remove recorded files, drop the manifest, strip owned settings entries.
    pub fn uninstall(&self, write: WriteOptions) -> Result<UninstallReport> {
        debug!(stage = %Stage::Idle, dry_run = write.dry_run, "uninstall starting");

        let manifest = self.manifest();
        let recorded = manifest.read_recorded()?;
        let manifest_recorded = recorded.is_some();
        let files = recorded.unwrap_or_else(|| self.profile.default_file_list());
        info!(stage = %Stage::ManifestLoaded, recorded = manifest_recorded, count = files.len());

        let mut removed = Vec::new();
        let mut absent = Vec::new();
        for rel in files {
            let path = self.layout.resolve(&rel);
            if fs::symlink_metadata(&path).is_err() {
                self.emit(Progress::AlreadyAbsent(rel.clone()));
                absent.push(rel);
                continue;
            }
            if !write.dry_run {
                fs::remove_file(&path).map_err(|e| {
                    PermitError::io(format!("Failed to remove {}", path.display()), e)
                })?;
            }
            self.emit(Progress::Removed(rel.clone()));
            removed.push(rel);
        }

        if !write.dry_run {
            manifest.clear()?;
        }
        info!(stage = %Stage::FilesRemoved, removed = removed.len(), absent = absent.len());

        let settings_file = self.settings();
        let settings = if settings_file.exists() {
            settings_file.update(write, |doc| strip_all(doc, &self.profile.canonical))?
        } else {
            IdempotentResult::NotApplicable(format!(
                "{} not found",
                settings_file.path().display()
            ))
        };
        info!(stage = %Stage::ConfigStripped, result = %settings);

        info!(stage = %Stage::Done, "uninstall complete");
        Ok(UninstallReport {
            manifest_recorded,
            removed,
            absent,
            settings,
        })
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path)
        .map_err(|e| PermitError::io(format!("Failed to stat {}", path.display()), e))?
        .permissions();
    perms.set_mode(perms.mode() | 0o111);
    fs::set_permissions(path, perms)
        .map_err(|e| PermitError::io(format!("Failed to chmod {}", path.display()), e))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}
