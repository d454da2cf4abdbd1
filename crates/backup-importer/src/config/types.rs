//! Configuration type definitions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Default model namespace when neither the registry hook nor
/// `import.model_namespace` resolves an importer's model.
pub const DEFAULT_MODEL_NAMESPACE: &str = "app::models";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Profile key of the active application database (the write side).
    #[serde(default = "default_connection")]
    pub default_connection: String,

    /// Connection profiles, keyed by driver name.
    #[serde(default)]
    pub connections: HashMap<String, ConnectionProfile>,

    /// Import behavior configuration.
    #[serde(default)]
    pub import: ImportConfig,
}

/// A database connection profile.
#[derive(Clone, Serialize, Deserialize)]
pub struct ConnectionProfile {
    /// Driver name: postgres, mysql, or memory.
    #[serde(default)]
    pub driver: String,

    /// Database host.
    #[serde(default = "default_host")]
    pub host: String,

    /// Database port. Defaults per driver (5432 postgres, 3306 mysql).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Database name.
    #[serde(default)]
    pub database: String,

    /// Username.
    #[serde(default)]
    pub username: String,

    /// Password.
    #[serde(default)]
    pub password: String,
}

impl ConnectionProfile {
    /// Port with the driver default applied.
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or(match self.driver.as_str() {
            "mysql" => 3306,
            _ => 5432,
        })
    }
}

impl Default for ConnectionProfile {
    fn default() -> Self {
        Self {
            driver: String::new(),
            host: default_host(),
            port: None,
            database: String::new(),
            username: String::new(),
            password: String::new(),
        }
    }
}

impl fmt::Debug for ConnectionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionProfile")
            .field("driver", &self.driver)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Import behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Namespace the application's importers live under. Used by the
    /// scaffolder to place generated files.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Model path prefix for resolution, e.g. `app::models` turns
    /// `CustomerImporter` into `app::models::Customer`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_namespace: Option<String>,

    /// Importers to run: explicit identifiers, or `["*"]` for every
    /// registered importer. An explicitly empty list runs nothing.
    #[serde(default = "default_importers")]
    pub importers: Vec<String>,

    /// Print progress messages while running (default: true).
    #[serde(default = "default_true")]
    pub messages: bool,

    /// Backup database override, merged over the matching driver profile
    /// in `connections`. Required for any import run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<ConnectionOverride>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            model_namespace: None,
            importers: default_importers(),
            messages: true,
            connection: None,
        }
    }
}

/// Backup connection override block.
///
/// `driver` and `database` select and rename the base profile; any other
/// field present here wins over the profile's value.
#[derive(Clone, Serialize, Deserialize)]
pub struct ConnectionOverride {
    /// Driver name, also the key of the base profile in `connections`.
    #[serde(default)]
    pub driver: String,

    /// Backup database name.
    #[serde(default)]
    pub database: String,

    /// Host override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// Port override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Username override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Password override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl fmt::Debug for ConnectionOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionOverride")
            .field("driver", &self.driver)
            .field("database", &self.database)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

// Default value functions for serde
fn default_connection() -> String {
    "postgres".to_string()
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_namespace() -> String {
    "app::backup::importers".to_string()
}

fn default_importers() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_true() -> bool {
    true
}
