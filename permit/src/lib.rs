//! permit: installs and removes Claude Code hook files and their
//! settings.json entries without disturbing anything else in the file.

pub mod build;
pub mod commands;
pub mod lifecycle;
pub mod source;
pub mod status;

pub use build::{BuildOutput, BuildReport, NativeBuilder, SwiftcBuilder};
pub use lifecycle::{InstallOptions, InstallReport, Installer, Progress, Stage, UninstallReport};
pub use source::{FileSource, LocalSource, RemoteSource, SourceKind};
pub use status::{HookStatus, StatusReport};
