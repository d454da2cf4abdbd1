//! In-process database backed by a table map.
//!
//! Implements both ends of an import run. Used by tests and selectable in
//! config (driver `memory`) for dry runs; unknown tables read as empty.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::core::traits::{is_wildcard, BackupSource, TargetWriter};
use crate::core::value::Record;
use crate::error::{ImportError, Result};

#[derive(Default)]
struct MemoryStore {
    tables: BTreeMap<String, Vec<Record>>,
    // Column lists requested from fetch_rows, oldest first.
    projections: Vec<(String, Vec<String>)>,
    fail_insert_on: Option<String>,
}

/// Shared in-memory database. Clones share the same store.
#[derive(Clone, Default)]
pub struct MemoryDatabase {
    inner: Arc<Mutex<MemoryStore>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn store(&self) -> MutexGuard<'_, MemoryStore> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Replace the contents of `table`.
    pub fn seed(&self, table: &str, rows: Vec<Record>) {
        self.store().tables.insert(table.to_string(), rows);
    }

    /// Current contents of `table` (empty if unknown).
    pub fn rows(&self, table: &str) -> Vec<Record> {
        self.store().tables.get(table).cloned().unwrap_or_default()
    }

    /// Number of rows currently in `table`.
    pub fn row_count(&self, table: &str) -> usize {
        self.store().tables.get(table).map(Vec::len).unwrap_or(0)
    }

    /// Column lists requested from [`fetch_rows`](BackupSource::fetch_rows),
    /// oldest first. Lets tests assert the projection reached the source.
    pub fn projection_log(&self) -> Vec<(String, Vec<String>)> {
        self.store().projections.clone()
    }

    /// Make inserts into `table` fail. Test hook.
    pub fn fail_inserts_into(&self, table: &str) {
        self.store().fail_insert_on = Some(table.to_string());
    }
}

#[async_trait]
impl BackupSource for MemoryDatabase {
    async fn fetch_rows(&self, table: &str, columns: &[String]) -> Result<Vec<Record>> {
        let mut store = self.store();
        store
            .projections
            .push((table.to_string(), columns.to_vec()));

        let rows = store.tables.get(table).cloned().unwrap_or_default();
        if is_wildcard(columns) {
            return Ok(rows);
        }
        Ok(rows.iter().map(|r| r.project(columns)).collect())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }

    fn driver(&self) -> &str {
        "memory"
    }
}

#[async_trait]
impl TargetWriter for MemoryDatabase {
    async fn insert(&self, table: &str, record: &Record) -> Result<()> {
        let mut store = self.store();
        if store.fail_insert_on.as_deref() == Some(table) {
            return Err(ImportError::Database(format!(
                "simulated insert failure for table '{}'",
                table
            )));
        }
        store
            .tables
            .entry(table.to_string())
            .or_default()
            .push(record.clone());
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }

    fn driver(&self) -> &str {
        "memory"
    }
}
