//! backup-importer CLI - import legacy backup records into the active database.

mod importers;
mod scaffold;

use backup_importer::{connection, Config, ImportConfig, ImportError, ImporterRegistry, Orchestrator};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, Level};
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser)]
#[command(name = "backup-importer")]
#[command(about = "Import records from a legacy backup database into the active database")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, default_value = "backup-importer.yaml")]
    config: PathBuf,

    /// Output JSON result to stdout
    #[arg(long, global = true)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the configured importers
    Run {
        /// Run only the named importer (repeatable, overrides config order)
        #[arg(long = "importer")]
        importer: Vec<String>,

        /// Suppress progress messages
        #[arg(long)]
        quiet: bool,
    },

    /// Scaffold a new importer source file
    New {
        /// Importer name, e.g. CustomerImporter (suffix added if missing)
        name: String,

        /// Project root to write into [default: current directory]
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Test database connections
    HealthCheck,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), ImportError> {
    let cli = Cli::parse();

    // Handle new command separately (works without an existing config)
    if let Commands::New { name, dir } = cli.command {
        // No logging setup for scaffolding - keeps output clean
        let root = dir.unwrap_or_else(|| PathBuf::from("."));
        let namespace = if cli.config.exists() {
            Config::load(&cli.config)?.import.namespace
        } else {
            ImportConfig::default().namespace
        };
        let path = scaffold::write(&root, &namespace, &name)?;
        println!("Created importer at {}", path.display());
        return Ok(());
    }

    // Setup logging
    setup_logging(&cli.verbosity, &cli.log_format).map_err(ImportError::Config)?;

    let mut config = Config::load(&cli.config)?;
    info!("Loaded configuration from {:?}", cli.config);

    match cli.command {
        Commands::New { .. } => unreachable!(), // Handled above

        Commands::Run { importer, quiet } => {
            // Apply overrides
            if !importer.is_empty() {
                config.import.importers = importer;
            }
            if quiet {
                config.import.messages = false;
            }

            let mut registry = ImporterRegistry::new();
            importers::register_all(&mut registry)?;

            let orchestrator = Orchestrator::new(config, registry).await?;
            let report = orchestrator.run().await?;

            if cli.output_json {
                println!("{}", report.to_json()?);
            } else {
                println!("\nImport completed!");
                println!("  Run ID: {}", report.run_id);
                println!("  Duration: {:.2}s", report.duration_seconds);
                println!(
                    "  Importers: {}/{}",
                    report.outcomes.len(),
                    report.importers_total
                );
                println!("  Records: {}", report.records_imported);
            }
        }

        Commands::HealthCheck => {
            let report = connection::health_check(&config).await;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Health Check Results:");
                println!(
                    "  Backup source: {} ({}ms)",
                    if report.source_connected { "OK" } else { "FAILED" },
                    report.source_latency_ms
                );
                if let Some(ref err) = report.source_error {
                    println!("    Error: {}", err);
                }
                println!(
                    "  Target: {} ({}ms)",
                    if report.target_connected { "OK" } else { "FAILED" },
                    report.target_latency_ms
                );
                if let Some(ref err) = report.target_error {
                    println!("    Error: {}", err);
                }
                println!(
                    "\n  Overall: {}",
                    if report.healthy { "HEALTHY" } else { "UNHEALTHY" }
                );
            }

            if !report.healthy {
                return Err(ImportError::Config("Health check failed".to_string()));
            }
        }
    }

    Ok(())
}

fn setup_logging(verbosity: &str, format: &str) -> Result<(), String> {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    Ok(())
}
