//! Error types for permit.
//!
//! [`PermitError`] is the single error type returned by the library layers.
//! Each variant maps to a catalog [`ErrorCode`] for consistent CLI output.

pub mod catalog;

pub use catalog::{ErrorCategory, ErrorCode, ErrorEntry};

use std::path::PathBuf;
use thiserror::Error;

/// One native artifact that failed to compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildFailure {
    /// Source file name, relative to the hooks directory.
    pub artifact: String,
    /// Captured compiler output.
    pub diagnostics: String,
}

/// Errors raised by the installer.
#[derive(Debug, Error)]
pub enum PermitError {
    /// A hook file could not be obtained (missing locally or download failed).
    #[error("could not obtain {path}: {reason}")]
    SourceUnavailable {
        path: String,
        reason: String,
        remote: bool,
    },

    /// The existing settings document cannot be merged safely.
    #[error("{} is not a valid settings document: {reason}", .path.display())]
    InvalidConfigDocument {
        path: PathBuf,
        reason: String,
        /// True when the document parsed but has the wrong shape.
        shape: bool,
    },

    /// The native compiler is not installed.
    #[error("{tool} not found")]
    BuildToolMissing {
        tool: String,
        remediation: Vec<String>,
    },

    /// One or more native artifacts failed to compile.
    #[error("failed to compile {}", artifact_list(.failures))]
    BuildFailed {
        failures: Vec<BuildFailure>,
        remediation: Vec<String>,
    },

    /// The install manifest exists but could not be parsed.
    #[error("manifest {} is unreadable: {reason}", .path.display())]
    ManifestCorrupt { path: PathBuf, reason: String },

    #[error("could not determine home directory")]
    HomeDirUnavailable,

    /// An installer profile failed to load.
    #[error("invalid installer profile {}: {reason}", .path.display())]
    Profile { path: PathBuf, reason: String },

    /// Environment configuration is invalid.
    #[error("invalid environment configuration: {0}")]
    Env(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize {what}: {source}")]
    Serialize {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

fn artifact_list(failures: &[BuildFailure]) -> String {
    failures
        .iter()
        .map(|f| f.artifact.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for permit operations.
pub type Result<T> = std::result::Result<T, PermitError>;

impl PermitError {
    /// Wrap an I/O error with a human-readable context line.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Catalog code for this error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::SourceUnavailable { remote: true, .. } => ErrorCode::SourceDownloadFailed,
            Self::SourceUnavailable { remote: false, .. } => ErrorCode::SourceFileMissing,
            Self::InvalidConfigDocument { shape: false, .. } => ErrorCode::SettingsInvalidJson,
            Self::InvalidConfigDocument { shape: true, .. } => ErrorCode::SettingsInvalidShape,
            Self::BuildToolMissing { .. } => ErrorCode::BuildToolMissing,
            Self::BuildFailed { .. } => ErrorCode::BuildCompilationFailed,
            Self::ManifestCorrupt { .. } => ErrorCode::ManifestCorrupt,
            Self::HomeDirUnavailable => ErrorCode::HomeDirUnavailable,
            Self::Profile { .. } => ErrorCode::ProfileInvalid,
            Self::Env(_) => ErrorCode::ConfigEnvError,
            Self::Io { .. } => ErrorCode::InternalIoError,
            Self::Serialize { .. } => ErrorCode::InternalSerdeError,
        }
    }

    /// Remediation lines: variant-specific commands first, then catalog steps.
    #[must_use]
    pub fn remediation(&self) -> Vec<String> {
        let mut steps = match self {
            Self::BuildToolMissing { remediation, .. } | Self::BuildFailed { remediation, .. } => {
                remediation.clone()
            }
            _ => Vec::new(),
        };
        steps.extend(self.code().remediation().iter().map(|s| (*s).to_string()));
        steps
    }

    /// Catalog entry for this error, with [`Self::remediation`] in place of
    /// the generic catalog steps.
    #[must_use]
    pub fn entry(&self) -> ErrorEntry {
        let mut entry = self.code().entry();
        entry.remediation = self.remediation();
        entry
    }

    /// Whether files placed before this error are intentionally kept.
    #[must_use]
    pub fn keeps_placed_files(&self) -> bool {
        matches!(
            self,
            Self::BuildToolMissing { .. } | Self::BuildFailed { .. }
        )
    }
}
