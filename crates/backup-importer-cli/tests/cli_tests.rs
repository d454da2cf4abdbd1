//! CLI integration tests for backup-importer.
//!
//! These tests verify command-line argument parsing, help output,
//! exit codes for error conditions, and full runs against the in-memory
//! driver.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

/// Get a command for the backup-importer binary.
fn cmd() -> Command {
    Command::cargo_bin("backup-importer").unwrap()
}

/// Write a config that wires both sides to the in-memory driver.
fn memory_config() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "default_connection: memory").unwrap();
    writeln!(file, "connections:").unwrap();
    writeln!(file, "  memory:").unwrap();
    writeln!(file, "    driver: memory").unwrap();
    writeln!(file, "import:").unwrap();
    writeln!(file, "  connection:").unwrap();
    writeln!(file, "    driver: memory").unwrap();
    writeln!(file, "    database: backup").unwrap();
    file
}

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_help_shows_all_commands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("new"))
        .stdout(predicate::str::contains("health-check"));
}

#[test]
fn test_run_subcommand_help() {
    cmd()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--importer"))
        .stdout(predicate::str::contains("--quiet"));
}

#[test]
fn test_version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("backup-importer"));
}

#[test]
fn test_config_default_path() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("[default: backup-importer.yaml]"));
}

#[test]
fn test_log_flags_have_defaults() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--log-format"))
        .stdout(predicate::str::contains("[default: text]"))
        .stdout(predicate::str::contains("--verbosity"))
        .stdout(predicate::str::contains("[default: info]"));
}

#[test]
fn test_health_check_command_exists() {
    cmd()
        .args(["health-check", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Test database connections"));
}

#[test]
fn test_no_subcommand_shows_help() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

// =============================================================================
// Exit Code Tests
// =============================================================================

#[test]
fn test_missing_config_exits_with_code_7() {
    // Missing file is an IO error (code 7), not config error (code 1)
    cmd()
        .args(["--config", "nonexistent_config_file.yaml", "health-check"])
        .assert()
        .code(7);
}

#[test]
fn test_invalid_yaml_exits_with_code_1() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "invalid: yaml: content: [").unwrap();

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "health-check"])
        .assert()
        .code(1);
}

#[test]
fn test_empty_config_exits_with_code_1() {
    let file = tempfile::NamedTempFile::new().unwrap();
    // Empty file is invalid YAML config

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "health-check"])
        .assert()
        .code(1);
}

#[test]
fn test_missing_import_connection_exits_with_code_1() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    // Valid YAML but no import.connection block
    writeln!(file, "default_connection: memory").unwrap();
    writeln!(file, "connections:").unwrap();
    writeln!(file, "  memory:").unwrap();
    writeln!(file, "    driver: memory").unwrap();

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "run"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("import.connection is required"));
}

#[test]
fn test_unknown_importer_exits_with_code_4() {
    let file = memory_config();

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "run"])
        .args(["--importer", "GhostImporter"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("GhostImporter"));
}

// =============================================================================
// Run Tests (in-memory driver)
// =============================================================================

#[test]
fn test_run_with_memory_driver_succeeds() {
    let file = memory_config();

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Import completed!"))
        .stdout(predicate::str::contains("Records: 0"));
}

#[test]
fn test_run_narrates_progress_by_default() {
    let file = memory_config();

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("starting import run (1 importers)"))
        .stdout(predicate::str::contains("UserImporter: initialized"))
        .stdout(predicate::str::contains("UserImporter: imported 0 records"))
        .stdout(predicate::str::contains("UserImporter: cleaned up"))
        .stdout(predicate::str::contains("UserImporter: done"))
        .stdout(predicate::str::contains("import run complete (0 records)"));
}

#[test]
fn test_run_quiet_suppresses_progress() {
    let file = memory_config();

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "run", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("starting import run").not())
        .stdout(predicate::str::contains("Import completed!"));
}

#[test]
fn test_run_output_json() {
    let file = memory_config();

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "run", "--quiet"])
        .arg("--output-json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\": \"completed\""))
        .stdout(predicate::str::contains("\"records_imported\": 0"));
}

#[test]
fn test_run_selects_named_importer() {
    let file = memory_config();

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "run"])
        .args(["--importer", "UserImporter"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Records: 0"));
}

// =============================================================================
// Health Check Tests
// =============================================================================

#[test]
fn test_health_check_memory_is_healthy() {
    let file = memory_config();

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "health-check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("HEALTHY"))
        .stdout(predicate::str::contains("Backup source: OK"));
}

#[test]
fn test_health_check_output_json() {
    let file = memory_config();

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "health-check"])
        .arg("--output-json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"healthy\": true"));
}

// =============================================================================
// New (scaffold) Tests
// =============================================================================

#[test]
fn test_new_scaffolds_importer_file() {
    let dir = tempfile::tempdir().unwrap();

    cmd()
        .args(["new", "Customer", "--dir", dir.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created importer at"));

    let expected = dir.path().join("src/backup/importers/customer_importer.rs");
    assert!(expected.exists());
    let content = std::fs::read_to_string(expected).unwrap();
    assert!(content.contains("pub struct CustomerImporter"));
}

#[test]
fn test_new_refuses_overwrite() {
    let dir = tempfile::tempdir().unwrap();

    cmd()
        .args(["new", "Customer", "--dir", dir.path().to_str().unwrap()])
        .assert()
        .success();
    cmd()
        .args(["new", "Customer", "--dir", dir.path().to_str().unwrap()])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_new_uses_namespace_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "default_connection: memory").unwrap();
    writeln!(file, "connections:").unwrap();
    writeln!(file, "  memory:").unwrap();
    writeln!(file, "    driver: memory").unwrap();
    writeln!(file, "import:").unwrap();
    writeln!(file, "  namespace: app::legacy").unwrap();
    writeln!(file, "  connection:").unwrap();
    writeln!(file, "    driver: memory").unwrap();
    writeln!(file, "    database: backup").unwrap();

    cmd()
        .args(["--config", file.path().to_str().unwrap()])
        .args(["new", "Order", "--dir", dir.path().to_str().unwrap()])
        .assert()
        .success();

    assert!(dir.path().join("src/legacy/order_importer.rs").exists());
}
