//! # backup-importer
//!
//! Imports records from a read-only legacy backup database into the active
//! application database, one entity type at a time.
//!
//! Each entity type gets an importer: a type implementing the [`Importer`]
//! trait over an [`ImporterContext`]. Importers are registered in an
//! [`ImporterRegistry`] at startup and run strictly in order by the
//! [`Orchestrator`], each through an `init -> import -> cleanup` lifecycle.
//! Any failure aborts the run immediately; writes completed by earlier
//! importers stay committed.
//!
//! ## Example
//!
//! ```rust,no_run
//! use backup_importer::{Config, ImporterRegistry, Orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), backup_importer::ImportError> {
//!     let config = Config::load("backup-importer.yaml")?;
//!     let registry = ImporterRegistry::new();
//!     let orchestrator = Orchestrator::new(config, registry).await?;
//!     let report = orchestrator.run().await?;
//!     println!("Imported {} records", report.records_imported);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod connection;
pub mod core;
pub mod drivers;
pub mod error;
pub mod importer;
pub mod model;
pub mod orchestrator;
pub mod registry;

// Re-exports for convenient access
pub use crate::config::{Config, ConnectionOverride, ConnectionProfile, ImportConfig};
pub use crate::connection::HealthReport;
pub use crate::core::naming;
pub use crate::core::traits::{BackupSource, TargetWriter};
pub use crate::core::value::{Record, Value};
pub use crate::error::{ImportError, Result};
pub use crate::importer::{Importer, ImporterContext};
pub use crate::model::{GuardMode, ModelBinding};
pub use crate::orchestrator::{
    ImportReport, ImporterOutcome, NullSink, Orchestrator, ProgressSink, SessionState, StdoutSink,
};
pub use crate::registry::{ImporterRegistry, ImporterSpec};
