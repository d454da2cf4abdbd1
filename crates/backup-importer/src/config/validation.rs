//! Configuration validation.

use super::{Config, ConnectionProfile};
use crate::error::{ImportError, Result};

/// Validate the configuration.
///
/// Fails fast, before any connection is attempted.
pub fn validate(config: &Config) -> Result<()> {
    if config.default_connection.is_empty() {
        return Err(ImportError::Config("default_connection is required".into()));
    }

    let target = match config.connections.get(&config.default_connection) {
        Some(profile) => profile,
        None => {
            return Err(ImportError::Config(format!(
                "default_connection '{}' has no profile under connections",
                config.default_connection
            )))
        }
    };
    validate_profile(
        &format!("connections.{}", config.default_connection),
        target,
    )?;

    let over = match &config.import.connection {
        Some(over) => over,
        None => return Err(ImportError::Config("import.connection is required".into())),
    };
    if over.driver.is_empty() {
        return Err(ImportError::Config(
            "import.connection.driver is required".into(),
        ));
    }
    if over.database.is_empty() {
        return Err(ImportError::Config(
            "import.connection.database is required".into(),
        ));
    }

    // The merged profile must stand on its own even when the override's
    // driver has no base profile.
    let backup = config.backup_profile()?;
    validate_profile("import.connection", &backup)?;

    Ok(())
}

fn validate_profile(label: &str, profile: &ConnectionProfile) -> Result<()> {
    match profile.driver.as_str() {
        "memory" => Ok(()),
        "postgres" | "mysql" => {
            if profile.host.is_empty() {
                return Err(ImportError::Config(format!("{}: host is required", label)));
            }
            if profile.database.is_empty() {
                return Err(ImportError::Config(format!(
                    "{}: database is required",
                    label
                )));
            }
            if profile.username.is_empty() {
                return Err(ImportError::Config(format!(
                    "{}: username is required",
                    label
                )));
            }
            Ok(())
        }
        "" => Err(ImportError::Config(format!("{}: driver is required", label))),
        other => Err(ImportError::Config(format!(
            "{}: unsupported driver '{}'. Supported drivers: postgres, mysql, memory",
            label, other
        ))),
    }
}
