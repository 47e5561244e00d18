//! On-disk state handling.

pub mod primitives;

pub use primitives::{IdempotentResult, atomic_write, atomic_write_with, create_backup};
