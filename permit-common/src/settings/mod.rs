//! The host settings document: ownership, merge and persistence.

pub mod canonical;
pub mod file;
pub mod merge;
pub mod ownership;

pub use canonical::{CanonicalEntry, CanonicalEntrySet, HookCommand, HookEntry, OwnershipRule};
pub use file::{SettingsFile, WriteOptions};
pub use merge::{ShapeError, merge, strip_all};
pub use ownership::{count_owned, is_owned, strip, strip_any};
