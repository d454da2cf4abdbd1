//! Error types for the import library.

use thiserror::Error;

/// Main error type for import operations.
#[derive(Error, Debug)]
pub enum ImportError {
    /// Configuration error (invalid YAML, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection error with context about where it occurred
    #[error("Connection error: {message}\n  Context: {context}")]
    Connection { message: String, context: String },

    /// Model resolution failed for an importer
    #[error("Model resolution failed: {0}")]
    Resolution(String),

    /// A configured importer could not be found
    #[error("Importer discovery failed: {0}")]
    Discovery(String),

    /// An importer failed mid-run
    #[error("Import failed in {importer}: {message}")]
    Import { importer: String, message: String },

    /// Database error outside a specific driver (memory backend, etc.)
    #[error("Database error: {0}")]
    Database(String),

    /// PostgreSQL driver error
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    /// MySQL driver error
    #[error("MySQL error: {0}")]
    MySql(#[from] sqlx::Error),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ImportError {
    /// Create a Connection error with context about where it occurred
    pub fn connection(message: impl Into<String>, context: impl Into<String>) -> Self {
        ImportError::Connection {
            message: message.into(),
            context: context.into(),
        }
    }

    /// Create an Import error naming the importer that failed
    pub fn import(importer: impl Into<String>, message: impl Into<String>) -> Self {
        ImportError::Import {
            importer: importer.into(),
            message: message.into(),
        }
    }

    /// Attach an importer identifier to an error that does not carry one yet.
    /// Errors already attributed to an importer pass through unchanged.
    pub fn in_importer(err: ImportError, importer: &str) -> ImportError {
        match err {
            e @ ImportError::Import { .. } => e,
            e => ImportError::Import {
                importer: importer.to_string(),
                message: e.to_string(),
            },
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        // Add error chain for wrapped errors
        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }

    /// Process exit code for the CLI, grouped by error category.
    pub fn exit_code(&self) -> u8 {
        match self {
            ImportError::Config(_) | ImportError::Yaml(_) => 1,
            ImportError::Connection { .. } => 2,
            ImportError::Resolution(_) => 3,
            ImportError::Discovery(_) => 4,
            ImportError::Import { .. } => 5,
            ImportError::Database(_) | ImportError::Postgres(_) | ImportError::MySql(_) => 6,
            ImportError::Io(_) | ImportError::Json(_) => 7,
        }
    }
}

/// Result type alias for import operations.
pub type Result<T> = std::result::Result<T, ImportError>;
