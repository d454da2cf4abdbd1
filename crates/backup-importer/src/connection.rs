//! Connection establishment and health checks.
//!
//! The backup side is resolved through [`Config::backup_profile`], which
//! merges the `import.connection` override block over the matching driver
//! profile. The target side is the profile named by `default_connection`.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::core::traits::{BackupSource, TargetWriter};
use crate::drivers;
use crate::error::Result;

/// The two sides of an import run.
pub struct ImportConnections {
    pub source: Arc<dyn BackupSource>,
    pub target: Arc<dyn TargetWriter>,
}

/// Open both connections, backup side first.
pub async fn establish(config: &Config) -> Result<ImportConnections> {
    let backup = config.backup_profile()?;
    debug!("Backup connection profile: {:?}", backup);
    let source = drivers::open_source(&backup).await?;

    let target = config.target_profile()?;
    debug!("Target connection profile: {:?}", target);
    let target = drivers::open_target(target).await?;

    Ok(ImportConnections { source, target })
}

/// Result of probing both sides of the import.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub source_connected: bool,
    pub source_latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_error: Option<String>,
    pub target_connected: bool,
    pub target_latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_error: Option<String>,
    pub healthy: bool,
}

/// Probe both sides independently, so one dead side still yields a full
/// report for the other.
pub async fn health_check(config: &Config) -> HealthReport {
    let (source_connected, source_latency_ms, source_error) = match probe_source(config).await {
        Ok(latency) => (true, latency, None),
        Err(e) => (false, 0, Some(e.to_string())),
    };
    let (target_connected, target_latency_ms, target_error) = match probe_target(config).await {
        Ok(latency) => (true, latency, None),
        Err(e) => (false, 0, Some(e.to_string())),
    };

    HealthReport {
        healthy: source_connected && target_connected,
        source_connected,
        source_latency_ms,
        source_error,
        target_connected,
        target_latency_ms,
        target_error,
    }
}

async fn probe_source(config: &Config) -> Result<u64> {
    let profile = config.backup_profile()?;
    let start = Instant::now();
    let source = drivers::open_source(&profile).await?;
    source.ping().await?;
    Ok(start.elapsed().as_millis() as u64)
}

async fn probe_target(config: &Config) -> Result<u64> {
    let profile = config.target_profile()?;
    let start = Instant::now();
    let target = drivers::open_target(profile).await?;
    target.ping().await?;
    Ok(start.elapsed().as_millis() as u64)
}
