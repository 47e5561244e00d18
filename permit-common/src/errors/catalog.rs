//! Error Catalog for permit
//!
//! Every failure the installer can report maps to a unique code with a
//! message template and remediation steps, so the CLI prints the same
//! guidance regardless of which layer raised the error.
//!
//! # Error Code Ranges
//!
//! | Range      | Category    | Description                          |
//! |------------|-------------|--------------------------------------|
//! | E001-E099  | Config      | settings.json, manifest and profiles |
//! | E100-E199  | Source      | Obtaining hook files                 |
//! | E300-E399  | Build       | Native recompilation                 |
//! | E500-E599  | Internal    | Internal/unexpected errors           |
//!
//! # Example
//!
//! ```rust
//! use permit_common::errors::catalog::ErrorCode;
//!
//! let entry = ErrorCode::SettingsInvalidJson.entry();
//! println!("Error {}: {}", entry.code, entry.message);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error code enumeration covering all permit error scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorCode {
    // =========================================================================
    // Config Errors (E001-E099)
    // =========================================================================
    /// settings.json is not parseable JSON
    SettingsInvalidJson,
    /// settings.json parses but has a shape the merge engine refuses to touch
    SettingsInvalidShape,
    /// Install manifest exists but is unreadable
    ManifestCorrupt,
    /// Installer profile could not be loaded
    ProfileInvalid,
    /// Environment variable has invalid value
    ConfigEnvError,
    /// Home directory could not be determined
    HomeDirUnavailable,

    // =========================================================================
    // Source Errors (E100-E199)
    // =========================================================================
    /// A hook file is missing from the local source directory
    SourceFileMissing,
    /// A hook file could not be downloaded
    SourceDownloadFailed,

    // =========================================================================
    // Build Errors (E300-E399)
    // =========================================================================
    /// Native compiler is not installed
    BuildToolMissing,
    /// Native compilation failed
    BuildCompilationFailed,

    // =========================================================================
    // Internal Errors (E500-E599)
    // =========================================================================
    /// Filesystem operation failed
    InternalIoError,
    /// Serialization failed
    InternalSerdeError,
}

impl ErrorCode {
    /// Returns the numeric error code (without prefix).
    #[must_use]
    pub const fn code_number(&self) -> u16 {
        match self {
            Self::SettingsInvalidJson => 1,
            Self::SettingsInvalidShape => 2,
            Self::ManifestCorrupt => 3,
            Self::ProfileInvalid => 4,
            Self::ConfigEnvError => 5,
            Self::HomeDirUnavailable => 6,

            Self::SourceFileMissing => 100,
            Self::SourceDownloadFailed => 101,

            Self::BuildToolMissing => 300,
            Self::BuildCompilationFailed => 301,

            Self::InternalIoError => 500,
            Self::InternalSerdeError => 501,
        }
    }

    /// Returns the formatted error code string (e.g., "PERMIT-E001").
    #[must_use]
    pub fn code_string(&self) -> String {
        format!("PERMIT-E{:03}", self.code_number())
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self.code_number() {
            1..=99 => ErrorCategory::Config,
            100..=199 => ErrorCategory::Source,
            300..=399 => ErrorCategory::Build,
            _ => ErrorCategory::Internal,
        }
    }

    /// Returns the full error entry with all metadata.
    #[must_use]
    pub fn entry(&self) -> ErrorEntry {
        ErrorEntry {
            code: self.code_string(),
            category: self.category(),
            message: self.message().to_string(),
            remediation: self
                .remediation()
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }

    /// Returns the error message template.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::SettingsInvalidJson => "settings.json contains invalid JSON",
            Self::SettingsInvalidShape => "settings.json has an unexpected structure",
            Self::ManifestCorrupt => "Install manifest is unreadable",
            Self::ProfileInvalid => "Installer profile is invalid",
            Self::ConfigEnvError => "Environment variable has invalid value",
            Self::HomeDirUnavailable => "Could not determine home directory",

            Self::SourceFileMissing => "Hook file missing from local source",
            Self::SourceDownloadFailed => "Failed to download hook file",

            Self::BuildToolMissing => "Native compiler not found",
            Self::BuildCompilationFailed => "Failed to compile hook binaries",

            Self::InternalIoError => "Filesystem operation failed",
            Self::InternalSerdeError => "Failed to serialize installer state",
        }
    }

    /// Returns remediation steps for this error.
    #[must_use]
    pub const fn remediation(&self) -> &'static [&'static str] {
        match self {
            Self::SettingsInvalidJson => &[
                "Fix the JSON syntax in settings.json (the file was left untouched)",
                "Validate with: python3 -m json.tool ~/.claude/settings.json",
            ],
            Self::SettingsInvalidShape => &[
                "The top level and \"hooks\" must be JSON objects; event entries must be arrays",
                "Fix the structure by hand and re-run the installer",
            ],
            Self::ManifestCorrupt => &[
                "Delete ~/.claude/hooks/.permit-manifest to fall back to the default file list",
            ],
            Self::ProfileInvalid => &["Check the profile TOML against the builtin profile"],
            Self::ConfigEnvError => &["Unset or correct the PERMIT_* environment variable"],
            Self::HomeDirUnavailable => &["Set HOME or pass --claude-dir explicitly"],

            Self::SourceFileMissing => &[
                "Make sure the hooks/ directory next to the installer is complete",
                "Or remove it to install from the remote source",
            ],
            Self::SourceDownloadFailed => &[
                "Check your internet connection and try again",
                "Nothing was written; re-running the installer is safe",
            ],

            Self::BuildToolMissing => &[
                "Install the Xcode Command Line Tools, then recompile manually",
            ],
            Self::BuildCompilationFailed => &[
                "Re-run install once the hooks compile so settings.json gets merged",
            ],

            Self::InternalIoError => &["Check disk space and permissions, then re-run"],
            Self::InternalSerdeError => &["This is likely a bug; please report it"],
        }
    }

}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code_string(), self.message())
    }
}

/// Error category for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    /// settings.json, manifest and profile errors (E001-E099)
    Config,
    /// Hook file sourcing errors (E100-E199)
    Source,
    /// Native compilation errors (E300-E399)
    Build,
    /// Internal/unexpected errors (E500-E599)
    Internal,
}

impl ErrorCategory {
    /// Returns a human-readable name for the category.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Config => "Configuration",
            Self::Source => "Source",
            Self::Build => "Build",
            Self::Internal => "Internal",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Complete error entry with all metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    /// Error code string (e.g., "PERMIT-E001")
    pub code: String,
    /// Error category
    pub category: ErrorCategory,
    /// Human-readable error message
    pub message: String,
    /// Steps to remediate the error
    pub remediation: Vec<String>,
}

impl ErrorEntry {
    /// Numbered remediation steps under a heading, or an empty string when
    /// there are none.
    #[must_use]
    pub fn format_remediation(&self) -> String {
        if self.remediation.is_empty() {
            return String::new();
        }
        let mut output = String::from("Remediation steps:\n");
        for (i, step) in self.remediation.iter().enumerate() {
            output.push_str(&format!("  {}. {}\n", i + 1, step));
        }
        output
    }
}
