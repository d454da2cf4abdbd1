//! Import orchestrator - runs registered importers in order.
//!
//! A run is strictly sequential: each selected importer goes through
//! `init -> import -> cleanup` before the next one starts. The first
//! failure aborts the run; records persisted by earlier importers stay
//! in the target database.

pub mod progress;

pub use progress::{NullSink, ProgressSink, StdoutSink};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::connection::{self, ImportConnections};
use crate::core::traits::{BackupSource, TargetWriter};
use crate::error::{ImportError, Result};
use crate::importer::ImporterContext;
use crate::registry::{ImporterRegistry, ImporterSpec};

/// Lifecycle of an import session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Idle,
    Running,
    Completed,
    Failed,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Running => "running",
            SessionState::Completed => "completed",
            SessionState::Failed => "failed",
        }
    }
}

/// Import orchestrator.
pub struct Orchestrator {
    config: Config,
    registry: ImporterRegistry,
    source: Arc<dyn BackupSource>,
    target: Arc<dyn TargetWriter>,
    sink: Box<dyn ProgressSink>,
    state: SessionState,
}

/// Result of an import run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    /// Unique run identifier.
    pub run_id: String,

    /// Final session state.
    pub status: SessionState,

    /// Total duration in seconds.
    pub duration_seconds: f64,

    /// When the run started.
    pub started_at: DateTime<Utc>,

    /// When the run completed.
    pub completed_at: DateTime<Utc>,

    /// Importers selected for the run.
    pub importers_total: usize,

    /// Records imported across all importers that completed.
    pub records_imported: u64,

    /// Per-importer results, in run order.
    pub outcomes: Vec<ImporterOutcome>,
}

impl ImportReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// One importer's completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImporterOutcome {
    /// Registered importer identifier.
    pub importer: String,

    /// Resolved model path, absent for importers that ignore the model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Backup table the records came from.
    pub source_table: String,

    /// Records imported.
    pub imported: u64,
}

impl Orchestrator {
    /// Create a new orchestrator, opening both connections from config.
    pub async fn new(config: Config, registry: ImporterRegistry) -> Result<Self> {
        let ImportConnections { source, target } = connection::establish(&config).await?;
        Ok(Self::with_connections(config, registry, source, target))
    }

    /// Create an orchestrator over connections opened elsewhere.
    pub fn with_connections(
        config: Config,
        registry: ImporterRegistry,
        source: Arc<dyn BackupSource>,
        target: Arc<dyn TargetWriter>,
    ) -> Self {
        Self {
            config,
            registry,
            source,
            target,
            sink: Box::new(StdoutSink),
            state: SessionState::Idle,
        }
    }

    /// Replace the progress sink.
    pub fn with_sink(mut self, sink: Box<dyn ProgressSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    fn emit(&self, text: &str) {
        if self.config.import.messages {
            self.sink.message(text);
        }
    }

    /// Run every selected importer, in registration order for the `*`
    /// selection or in the listed order otherwise.
    pub async fn run(mut self) -> Result<ImportReport> {
        let started_at = Utc::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        self.state = SessionState::Running;

        // Resolve the selection up front so an unknown name fails the run
        // before any importer touches the target.
        let specs = self.registry.discover(&self.config.import.importers)?;
        let importers_total = specs.len();

        info!("Starting import run: {}", run_id);
        self.emit(&format!("starting import run ({} importers)", importers_total));

        let mut outcomes: Vec<ImporterOutcome> = Vec::new();
        let mut failure: Option<ImportError> = None;

        for spec in specs {
            match self.run_importer(spec).await {
                Ok(outcome) => {
                    outcomes.push(outcome);
                }
                Err(e) => {
                    error!("Importer '{}' failed: {}", spec.name(), e);
                    failure = Some(e);
                    break;
                }
            }
        }

        let completed_at = Utc::now();
        let duration = (completed_at - started_at).num_milliseconds() as f64 / 1000.0;

        self.state = if failure.is_some() {
            SessionState::Failed
        } else {
            SessionState::Completed
        };

        let records_imported: u64 = outcomes.iter().map(|o| o.imported).sum();
        let report = ImportReport {
            run_id,
            status: self.state,
            duration_seconds: duration,
            started_at,
            completed_at,
            importers_total,
            records_imported,
            outcomes,
        };

        info!(
            "Import {}: {} importers, {} records in {:.1}s",
            report.status.as_str(),
            report.importers_total,
            report.records_imported,
            report.duration_seconds
        );

        if let Some(e) = failure {
            return Err(e);
        }

        self.emit(&format!(
            "import run complete ({} records)",
            report.records_imported
        ));
        Ok(report)
    }

    /// Run one importer through init -> import -> cleanup.
    async fn run_importer(&self, spec: &ImporterSpec) -> Result<ImporterOutcome> {
        let name = spec.name().to_string();
        info!("Running importer: {}", name);
        self.emit(&format!("{}: importing", name));

        // Importers that ignore the model skip resolution entirely.
        let binding = if spec.ignores_model() {
            None
        } else {
            Some(self.registry.resolve_binding(
                spec,
                self.config.import.model_namespace.as_deref(),
            )?)
        };
        let model = binding.as_ref().map(|b| b.entity.clone());
        let table = self.registry.resolve_source_table(spec);

        match &model {
            Some(model) => {
                debug!("{}: model {}, source table {}", name, model, table);
                self.emit(&format!("{}: model {}, source table {}", name, model, table));
            }
            None => {
                debug!("{}: source table {}", name, table);
                self.emit(&format!("{}: source table {}", name, table));
            }
        }

        let context = ImporterContext::new(
            name.clone(),
            Arc::clone(&self.source),
            Arc::clone(&self.target),
            binding,
            table.clone(),
            spec.ignores_model(),
        );
        let mut importer = spec.instantiate(context);

        importer
            .init()
            .await
            .map_err(|e| ImportError::in_importer(e, &name))?;
        debug!("{}: initialized", name);
        self.emit(&format!("{}: initialized", name));

        let imported = importer
            .import()
            .await
            .map_err(|e| ImportError::in_importer(e, &name))?;
        info!("{}: imported {} records", name, imported);
        self.emit(&format!("{}: imported {} records", name, imported));

        importer
            .cleanup()
            .await
            .map_err(|e| ImportError::in_importer(e, &name))?;
        debug!("{}: cleaned up", name);
        self.emit(&format!("{}: cleaned up", name));
        self.emit(&format!("{}: done", name));

        Ok(ImporterOutcome {
            importer: name,
            model,
            source_table: table,
            imported,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
