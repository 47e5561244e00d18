//! CLI command implementations.
//!
//! Progress goes to stdout; errors are returned to `main`, which renders
//! them on stderr.

pub mod helpers;

use crate::lifecycle::{InstallOptions, Installer, Progress};
use crate::source::{self, needs_rebuild};
use crate::status::{HookStatus, status};
use helpers::describe_settings;
use permit_common::{EnvConfig, InstallerProfile, Layout, PermitError, Result, WriteOptions};
use std::path::PathBuf;
use tracing::debug;

/// Resolved configuration shared by every command.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub profile: InstallerProfile,
    pub layout: Layout,
    pub env: EnvConfig,
}

impl CommandContext {
    /// Layer CLI flags over `PERMIT_*` variables over built-in defaults.
    pub fn resolve(
        claude_dir: Option<PathBuf>,
        profile_path: Option<PathBuf>,
        env: EnvConfig,
    ) -> Result<Self> {
        let profile = match profile_path.or_else(|| env.profile.clone()) {
            Some(path) => {
                debug!(path = %path.display(), "loading installer profile");
                InstallerProfile::from_toml_file(&path)?
            }
            None => InstallerProfile::builtin(),
        };
        let profile = match &env.base_url {
            Some(base) => profile.with_remote_base(base.clone()),
            None => profile,
        };

        let root = match claude_dir.or_else(|| env.claude_dir.clone()) {
            Some(root) => root,
            None => Layout::default_root()?,
        };

        Ok(Self {
            profile,
            layout: Layout::new(root),
            env,
        })
    }

    fn installer(&self) -> Installer {
        Installer::new(self.profile.clone(), self.layout.clone()).with_progress(print_progress)
    }
}

#[derive(Debug, Clone, Default)]
pub struct InstallCommand {
    pub source_dir: Option<PathBuf>,
    /// `Some(true)` for `--build`, `Some(false)` for `--no-build`.
    pub force_build: Option<bool>,
    pub write: WriteOptions,
}

#[derive(Debug, Clone, Default)]
pub struct UninstallCommand {
    pub write: WriteOptions,
}

fn print_progress(progress: &Progress) {
    match progress {
        Progress::Source { kind, location } => println!("Installing from {kind} source: {location}"),
        Progress::AlreadyInPlace(dir) => {
            println!("  Hooks already in place ({})", dir.display())
        }
        Progress::Placed(rel) => println!("  Placed {rel}"),
        Progress::Compiling(artifact) => println!("  Compiling {artifact}..."),
        Progress::Removed(rel) => println!("  Removed {rel}"),
        Progress::AlreadyAbsent(rel) => println!("  Already absent: {rel}"),
    }
}

pub fn install(ctx: &CommandContext, cmd: &InstallCommand) -> Result<()> {
    let source_root = cmd
        .source_dir
        .clone()
        .or_else(|| ctx.env.source_dir.clone())
        .or_else(source::default_source_root)
        .ok_or_else(|| {
            PermitError::io(
                "Failed to locate the installer directory",
                std::io::Error::from(std::io::ErrorKind::NotFound),
            )
        })?;
    let source = source::resolve(&source_root, &ctx.profile);

    let options = InstallOptions {
        rebuild: needs_rebuild(&ctx.profile, cmd.force_build),
        write: cmd.write,
    };
    let report = ctx.installer().install(source.as_ref(), &options)?;

    if cmd.write.dry_run {
        for rel in &report.placed {
            println!("  Would place {rel}");
        }
        for rel in &report.retired {
            println!("  Would remove {rel}");
        }
    }
    if let Some(build) = &report.build {
        for output in &build.built {
            println!("  Compiled {output}");
        }
    }
    println!(
        "Settings {}: {}",
        ctx.layout.settings_path().display(),
        describe_settings(&report.settings)
    );
    if cmd.write.dry_run {
        println!("Dry run: nothing was written.");
    } else {
        println!("Done. Restart Claude Code to activate the hooks.");
    }
    Ok(())
}

pub fn uninstall(ctx: &CommandContext, cmd: &UninstallCommand) -> Result<()> {
    println!("Uninstalling hooks from {}", ctx.layout.hooks_dir().display());
    let report = ctx.installer().uninstall(cmd.write)?;

    if !report.manifest_recorded {
        println!("  No install manifest found; used the default file list");
    }
    println!(
        "Settings {}: {}",
        ctx.layout.settings_path().display(),
        describe_settings(&report.settings)
    );
    if cmd.write.dry_run {
        println!("Dry run: nothing was removed.");
    } else {
        println!("Done. Restart Claude Code to apply.");
    }
    Ok(())
}

pub fn show_status(ctx: &CommandContext, json: bool) -> Result<()> {
    let report = status(&ctx.profile, &ctx.layout);

    if json {
        let text = serde_json::to_string_pretty(&report).map_err(|source| {
            PermitError::Serialize {
                what: "status report",
                source,
            }
        })?;
        println!("{text}");
        return Ok(());
    }

    println!("Settings: {}", report.settings_path.display());
    if let Some(error) = &report.settings_error {
        println!("  {error}");
    }
    for event in &report.events {
        let marker = match event.status {
            HookStatus::Installed => "ok",
            HookStatus::NeedsUpdate => "!!",
            HookStatus::NotInstalled => "--",
        };
        println!("  [{marker}] {}: {}", event.event, event.status);
    }

    let source = if report.manifest_recorded {
        "manifest"
    } else {
        "defaults"
    };
    println!("Files ({source}):");
    if let Some(error) = &report.manifest_error {
        println!("  {error}");
    }
    for file in &report.files {
        let mark = if file.present { "ok" } else { "--" };
        println!("  [{mark}] {}", file.path);
    }

    if report.is_installed() {
        println!("All hooks installed.");
    } else {
        println!("Run `permit install` to install or update the hooks.");
    }
    Ok(())
}
