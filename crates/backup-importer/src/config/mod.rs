//! Configuration loading and validation.

mod types;
mod validation;

pub use types::*;

use crate::error::{ImportError, Result};
use std::path::Path;

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }

    /// Effective backup (read side) profile.
    ///
    /// The `import.connection` override is merged over the profile in
    /// `connections` whose key matches the override's driver: fields set in
    /// the override always win, the base profile fills the gaps. A driver
    /// with no base profile leaves the override standing alone.
    pub fn backup_profile(&self) -> Result<ConnectionProfile> {
        let over = self.import.connection.as_ref().ok_or_else(|| {
            ImportError::Config("import.connection is required".into())
        })?;

        let base = self
            .connections
            .get(&over.driver)
            .cloned()
            .unwrap_or_default();

        let mut profile = ConnectionProfile {
            driver: over.driver.clone(),
            database: over.database.clone(),
            ..base
        };
        if let Some(host) = &over.host {
            profile.host = host.clone();
        }
        if let Some(port) = over.port {
            profile.port = Some(port);
        }
        if let Some(username) = &over.username {
            profile.username = username.clone();
        }
        if let Some(password) = &over.password {
            profile.password = password.clone();
        }

        Ok(profile)
    }

    /// Profile of the active application database (the write side).
    pub fn target_profile(&self) -> Result<&ConnectionProfile> {
        self.connections
            .get(&self.default_connection)
            .ok_or_else(|| {
                ImportError::Config(format!(
                    "default_connection '{}' has no profile under connections",
                    self.default_connection
                ))
            })
    }
}
