//! Database driver implementations.
//!
//! Each driver implements [`BackupSource`] for reading from the backup
//! database and [`TargetWriter`] for inserting into the active database.
//! The `memory` driver backs tests and dry runs without a server.

mod memory;
mod mysql;
mod postgres;

pub use memory::MemoryDatabase;
pub use mysql::MySqlDatabase;
pub use postgres::PostgresDatabase;

use std::sync::Arc;

use crate::config::ConnectionProfile;
use crate::core::traits::{BackupSource, TargetWriter};
use crate::error::{ImportError, Result};

/// Open a read-side connection for the given profile.
pub async fn open_source(profile: &ConnectionProfile) -> Result<Arc<dyn BackupSource>> {
    match profile.driver.as_str() {
        "postgres" => Ok(Arc::new(PostgresDatabase::connect(profile).await?)),
        "mysql" => Ok(Arc::new(MySqlDatabase::connect(profile).await?)),
        "memory" => Ok(Arc::new(MemoryDatabase::new())),
        other => Err(ImportError::Config(format!(
            "Unknown source driver: '{}'. Supported drivers: postgres, mysql, memory",
            other
        ))),
    }
}

/// Open a write-side connection for the given profile.
pub async fn open_target(profile: &ConnectionProfile) -> Result<Arc<dyn TargetWriter>> {
    match profile.driver.as_str() {
        "postgres" => Ok(Arc::new(PostgresDatabase::connect(profile).await?)),
        "mysql" => Ok(Arc::new(MySqlDatabase::connect(profile).await?)),
        "memory" => Ok(Arc::new(MemoryDatabase::new())),
        other => Err(ImportError::Config(format!(
            "Unknown target driver: '{}'. Supported drivers: postgres, mysql, memory",
            other
        ))),
    }
}
