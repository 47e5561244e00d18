//! Shared types for the permit hook installer.
//!
//! Owns everything that touches the host settings document (ownership,
//! merge, atomic persistence) plus the manifest, installer profile,
//! environment configuration, error catalog and logging setup.

pub mod config;
pub mod errors;
pub mod logging;
pub mod manifest;
pub mod settings;
pub mod state;

pub use config::{EnvConfig, HookFile, InstallerProfile, Layout, NativeArtifact};
pub use errors::{BuildFailure, ErrorCode, PermitError, Result};
pub use logging::{LogConfig, LogFormat, init_logging};
pub use manifest::Manifest;
pub use settings::{CanonicalEntrySet, SettingsFile, WriteOptions};
pub use state::IdempotentResult;
