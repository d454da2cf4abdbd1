//! Core abstractions shared across the import engine.

pub mod naming;
pub mod traits;
pub mod value;

pub use traits::{BackupSource, TargetWriter, WILDCARD};
pub use value::{Record, Value};
