//! The importer contract: one importer moves one entity type.
//!
//! An importer is a type implementing [`Importer`] over an
//! [`ImporterContext`], which carries the open connections, the resolved
//! model binding and source table, the guard mode, and the imported
//! counter. The trait supplies the default lifecycle: `init` relaxes the
//! mass-assignment guard, `cleanup` restores it, and `simple_import` bulk
//! copies the source table row by row.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::core::traits::{BackupSource, TargetWriter};
use crate::core::value::Record;
use crate::error::Result;
use crate::model::{GuardMode, ModelBinding};

/// Per-importer state handed to the factory at instantiation.
pub struct ImporterContext {
    name: String,
    source: Arc<dyn BackupSource>,
    target: Arc<dyn TargetWriter>,
    binding: Option<ModelBinding>,
    table: String,
    ignore_model: bool,
    guard: GuardMode,
    imported: u64,
}

impl ImporterContext {
    /// Create a context over open connections.
    ///
    /// The orchestrator builds one per importer run; tests and embedders
    /// can construct their own.
    pub fn new(
        name: impl Into<String>,
        source: Arc<dyn BackupSource>,
        target: Arc<dyn TargetWriter>,
        binding: Option<ModelBinding>,
        source_table: impl Into<String>,
        ignore_model: bool,
    ) -> Self {
        Self {
            name: name.into(),
            source,
            target,
            binding,
            table: source_table.into(),
            ignore_model,
            guard: GuardMode::Enforce,
            imported: 0,
        }
    }

    /// Registered identifier, e.g. `CustomerImporter`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolved model binding, if any.
    pub fn model(&self) -> Option<&ModelBinding> {
        self.binding.as_ref()
    }

    /// Source table this importer reads from.
    pub fn source_table(&self) -> &str {
        &self.table
    }

    /// Whether the importer opted out of guard toggling.
    pub fn ignore_model(&self) -> bool {
        self.ignore_model
    }

    /// Guard mode applied by [`persist`](Self::persist).
    pub fn guard(&self) -> GuardMode {
        self.guard
    }

    /// Set the guard mode for subsequent persists.
    pub fn set_guard(&mut self, guard: GuardMode) {
        debug!("{}: guard set to {:?}", self.name, guard);
        self.guard = guard;
    }

    /// Records persisted so far.
    pub fn imported(&self) -> u64 {
        self.imported
    }

    /// Read handle to the backup database.
    pub fn source(&self) -> &Arc<dyn BackupSource> {
        &self.source
    }

    /// Write handle to the active database.
    pub fn target(&self) -> &Arc<dyn TargetWriter> {
        &self.target
    }

    /// Fetch this importer's source table, projected to `columns`.
    pub async fn fetch(&self, columns: &[String]) -> Result<Vec<Record>> {
        self.source.fetch_rows(&self.table, columns).await
    }

    /// Persist one record under the context's current guard mode and count
    /// it. Fails loudly: a write error propagates without touching the
    /// counter.
    pub async fn persist(&mut self, record: Record) -> Result<()> {
        self.persist_guarded(record, self.guard).await
    }

    /// Persist one record under an explicit guard mode.
    pub async fn persist_guarded(&mut self, record: Record, guard: GuardMode) -> Result<()> {
        let record = match &self.binding {
            Some(binding) => binding.fill(record, guard),
            None => record,
        };
        self.target.insert(&self.table, &record).await?;
        self.imported += 1;
        Ok(())
    }

    /// Generic accessor over the context's notable fields, for diagnostics
    /// and progress messages. Unknown names return `None`.
    pub fn attribute(&self, name: &str) -> Option<String> {
        match name {
            "name" => Some(self.name.clone()),
            "model" => self.binding.as_ref().map(|b| b.entity.clone()),
            "source_table" | "table" => Some(self.table.clone()),
            "imported" => Some(self.imported.to_string()),
            "driver" => Some(self.source.driver().to_string()),
            _ => None,
        }
    }
}

/// One importer: moves records for one entity type.
///
/// Implementors embed an [`ImporterContext`] and expose it through the two
/// accessors; everything else has a default. A typical importer is just:
///
/// ```rust,ignore
/// #[async_trait]
/// impl Importer for UserImporter {
///     fn context(&self) -> &ImporterContext { &self.ctx }
///     fn context_mut(&mut self) -> &mut ImporterContext { &mut self.ctx }
///
///     async fn import(&mut self) -> Result<u64> {
///         self.simple_import().await
///     }
/// }
/// ```
#[async_trait]
pub trait Importer: Send {
    /// The embedded context.
    fn context(&self) -> &ImporterContext;

    /// The embedded context, mutably.
    fn context_mut(&mut self) -> &mut ImporterContext;

    /// Columns to select from the source table, applied server-side before
    /// rows are fetched. Defaults to every column.
    fn column_map(&self) -> Vec<String> {
        vec!["*".to_string()]
    }

    /// Runs before `import`. By default relaxes the mass-assignment guard
    /// for model-bound importers, unless the importer opted out.
    async fn init(&mut self) -> Result<()> {
        let ctx = self.context_mut();
        if ctx.model().is_some() && !ctx.ignore_model() {
            ctx.set_guard(GuardMode::Bypass);
        }
        Ok(())
    }

    /// Runs after `import`. Restores the guard relaxed by `init`.
    async fn cleanup(&mut self) -> Result<()> {
        let ctx = self.context_mut();
        if ctx.model().is_some() && !ctx.ignore_model() {
            ctx.set_guard(GuardMode::Enforce);
        }
        Ok(())
    }

    /// Move the records. Returns the number imported.
    async fn import(&mut self) -> Result<u64>;

    /// Default bulk copy: fetch the source table through the column map,
    /// persist each fetched record exactly once, return the count. Any
    /// persistence failure propagates immediately.
    async fn simple_import(&mut self) -> Result<u64> {
        let columns = self.column_map();
        let ctx = self.context_mut();
        let rows = ctx.fetch(&columns).await?;
        for row in rows {
            ctx.persist(row).await?;
        }
        Ok(ctx.imported())
    }

    /// Diagnostics accessor, delegating to the context.
    fn attribute(&self, name: &str) -> Option<String> {
        self.context().attribute(name)
    }
}

// ============================================================================
// Tests
// ============================================================================
