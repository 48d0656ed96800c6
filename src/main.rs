use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod autosync;
mod commands;
mod config;

use commands::{
    ConfigCommand, ContractorCommand, ContractorSubcommand, DeviceCommand, ExchangeCommand,
    ExchangeSubcommand, ReportCommand, ScanCommand, SyncCommand,
};
use config::Config;
use scanledger_core::{AppContext, FileStore};

#[derive(Parser)]
#[command(name = "scanledger")]
#[command(version)]
#[command(about = "Warehouse scan sessions with a synced contractor directory", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the contractor directory
    Contractor(ContractorCommand),

    /// Work with the active scan session
    Scan(ScanCommand),

    /// Browse the report ledger
    Report(ReportCommand),

    /// Synchronize with the cloud gateway
    Sync(SyncCommand),

    /// Exchange contractors directly with another device
    Exchange(ExchangeCommand),

    /// Show device identity
    Device(DeviceCommand),

    /// Inspect configuration
    Config(ConfigCommand),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = Config::load(cli.config)?;

    let store = Arc::new(FileStore::new(config.data_dir.value.clone()));
    let mut ctx = AppContext::load(store);

    // Auto-sync BEFORE directory reads
    if is_directory_read(&cli.command) {
        autosync::try_auto_sync(&config, &mut ctx);
    }

    let result = execute_command(&cli.command, &mut ctx, &config);

    // Auto-sync AFTER directory writes (only if the command succeeded)
    if result.is_ok() && is_directory_write(&cli.command) {
        autosync::try_auto_sync(&config, &mut ctx);
    }

    result
}

fn execute_command(
    command: &Option<Commands>,
    ctx: &mut AppContext,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Some(Commands::Contractor(cmd)) => cmd.run(ctx)?,
        Some(Commands::Scan(cmd)) => cmd.run(ctx)?,
        Some(Commands::Report(cmd)) => cmd.run(ctx)?,
        Some(Commands::Sync(cmd)) => cmd.run(ctx, config)?,
        Some(Commands::Exchange(cmd)) => cmd.run(ctx)?,
        Some(Commands::Device(cmd)) => cmd.run(ctx)?,
        Some(Commands::Config(cmd)) => cmd.run(config),
        None => println!("Use --help to see available commands"),
    }
    Ok(())
}

/// Returns true if the command reads the contractor directory and should
/// sync before execution.
fn is_directory_read(cmd: &Option<Commands>) -> bool {
    matches!(
        cmd,
        Some(Commands::Contractor(c)) if matches!(c.command,
            ContractorSubcommand::List | ContractorSubcommand::Export { .. })
    ) || matches!(
        cmd,
        Some(Commands::Exchange(e)) if matches!(e.command, ExchangeSubcommand::Export { .. })
    )
}

/// Returns true if the command mutates the contractor directory and should
/// sync after execution.
fn is_directory_write(cmd: &Option<Commands>) -> bool {
    matches!(
        cmd,
        Some(Commands::Contractor(c)) if matches!(c.command,
            ContractorSubcommand::Add { .. }
            | ContractorSubcommand::Update { .. }
            | ContractorSubcommand::Remove { .. }
            | ContractorSubcommand::Import { .. })
    ) || matches!(
        cmd,
        Some(Commands::Exchange(e)) if matches!(e.command, ExchangeSubcommand::Import { .. })
    )
}
