//! Configuration: environment overrides, install layout and profiles.

pub mod env;
pub mod layout;
pub mod profile;

pub use env::{ConfigSource, EnvConfig, EnvError, EnvParser, Sourced, expand_tilde};
pub use layout::Layout;
pub use profile::{HookFile, InstallerProfile, NativeArtifact};
