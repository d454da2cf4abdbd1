//! Database access traits for the two ends of an import run.

use async_trait::async_trait;

use crate::core::value::Record;
use crate::error::Result;

/// Column list sentinel selecting every column of the source table.
pub const WILDCARD: &str = "*";

/// Check whether a column list is the wildcard (`["*"]`) selection.
pub fn is_wildcard(columns: &[String]) -> bool {
    columns.len() == 1 && columns[0] == WILDCARD
}

/// Read side: the backup database importers copy from.
///
/// Implementations apply the column projection server-side, before any row
/// is fetched; `["*"]` selects all columns.
#[async_trait]
pub trait BackupSource: Send + Sync {
    /// Fetch every row of `table`, projected to `columns`.
    async fn fetch_rows(&self, table: &str, columns: &[String]) -> Result<Vec<Record>>;

    /// Liveness probe.
    async fn ping(&self) -> Result<()>;

    /// Release the underlying connections.
    async fn close(&self) -> Result<()>;

    /// Driver name for diagnostics.
    fn driver(&self) -> &str;
}

/// Write side: the active application database importers copy into.
#[async_trait]
pub trait TargetWriter: Send + Sync {
    /// Persist exactly one record into `table`.
    ///
    /// A record with no columns still inserts one row (all defaults).
    async fn insert(&self, table: &str, record: &Record) -> Result<()>;

    /// Liveness probe.
    async fn ping(&self) -> Result<()>;

    /// Release the underlying connections.
    async fn close(&self) -> Result<()>;

    /// Driver name for diagnostics.
    fn driver(&self) -> &str;
}
