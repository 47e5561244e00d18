//! Compiling native hook binaries on the target machine.
//!
//! Shipped binaries are built for one architecture. Elsewhere the Swift
//! sources placed alongside them are recompiled in place.

use permit_common::errors::BuildFailure;
use permit_common::{NativeArtifact, PermitError, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

/// Result of one compiler invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutput {
    pub success: bool,
    pub diagnostics: String,
}

/// A native compiler the installer can drive.
pub trait NativeBuilder {
    fn tool_name(&self) -> &str;

    /// Path of the compiler, or `None` when it is not installed.
    fn locate(&self) -> Option<PathBuf>;

    /// Compile `source` into `output`. Runs to completion.
    fn build(&self, tool: &Path, source: &Path, output: &Path) -> BuildOutput;

    /// Command a user can run to build `artifact` by hand.
    fn manual_command(&self, hooks_dir: &Path, artifact: &NativeArtifact) -> String;

    /// How to install the compiler.
    fn install_hint(&self) -> String;
}

/// `swiftc` with AppKit, as used for the dialog hooks.
#[derive(Debug, Clone, Default)]
pub struct SwiftcBuilder;

impl NativeBuilder for SwiftcBuilder {
    fn tool_name(&self) -> &str {
        "swiftc"
    }

    fn locate(&self) -> Option<PathBuf> {
        which::which("swiftc").ok()
    }

    fn build(&self, tool: &Path, source: &Path, output: &Path) -> BuildOutput {
        let result = Command::new(tool)
            .args(["-O", "-framework", "AppKit", "-o"])
            .arg(output)
            .arg(source)
            .output();

        match result {
            Ok(out) => {
                let mut diagnostics = String::from_utf8_lossy(&out.stderr).into_owned();
                diagnostics.push_str(&String::from_utf8_lossy(&out.stdout));
                BuildOutput {
                    success: out.status.success(),
                    diagnostics: diagnostics.trim().to_string(),
                }
            }
            Err(e) => BuildOutput {
                success: false,
                diagnostics: format!("failed to run {}: {}", tool.display(), e),
            },
        }
    }

    fn manual_command(&self, hooks_dir: &Path, artifact: &NativeArtifact) -> String {
        format!(
            "cd {} && swiftc -framework AppKit -o {} {}",
            hooks_dir.display(),
            artifact.output,
            artifact.source
        )
    }

    fn install_hint(&self) -> String {
        "Install the Xcode Command Line Tools: xcode-select --install".to_string()
    }
}

/// Artifacts compiled by [`build_artifacts`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub built: Vec<String>,
}

/// Compile every artifact once, collecting failures.
///
/// A missing compiler fails before anything runs. Otherwise every artifact
/// is attempted and all failures are reported together.
pub fn build_artifacts(
    builder: &dyn NativeBuilder,
    hooks_dir: &Path,
    artifacts: &[NativeArtifact],
) -> Result<BuildReport> {
    if artifacts.is_empty() {
        return Ok(BuildReport::default());
    }

    let manual: Vec<String> = artifacts
        .iter()
        .map(|a| builder.manual_command(hooks_dir, a))
        .collect();

    let Some(tool) = builder.locate() else {
        warn!(tool = builder.tool_name(), "native compiler not found");
        let mut remediation = vec![builder.install_hint(), "Then run:".to_string()];
        remediation.extend(manual);
        return Err(PermitError::BuildToolMissing {
            tool: builder.tool_name().to_string(),
            remediation,
        });
    };
    debug!(tool = %tool.display(), "using native compiler");

    let mut report = BuildReport::default();
    let mut failures = Vec::new();
    for artifact in artifacts {
        info!(artifact = %artifact.source, "compiling");
        let source = hooks_dir.join(&artifact.source);
        let output = hooks_dir.join(&artifact.output);
        let result = builder.build(&tool, &source, &output);
        if result.success {
            report.built.push(artifact.output.clone());
        } else {
            warn!(artifact = %artifact.source, "compilation failed");
            failures.push(BuildFailure {
                artifact: artifact.source.clone(),
                diagnostics: result.diagnostics,
            });
        }
    }

    if failures.is_empty() {
        Ok(report)
    } else {
        let remediation = artifacts
            .iter()
            .zip(manual)
            .filter(|(a, _)| failures.iter().any(|f| f.artifact == a.source))
            .map(|(_, cmd)| cmd)
            .collect();
        Err(PermitError::BuildFailed {
            failures,
            remediation,
        })
    }
}
