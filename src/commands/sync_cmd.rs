//! Cloud sync commands.

use clap::{Args, Subcommand};

use scanledger_core::sync::{run_cycle, RetryPolicy, SyncOutcome};
use scanledger_core::{AppContext, DeviceId, DeviceIdError, HttpGateway, SyncError, SyncGateway};

use crate::config::Config;

/// Synchronize the contractor directory with the cloud
#[derive(Args)]
pub struct SyncCommand {
    #[command(subcommand)]
    pub command: SyncSubcommand,
}

#[derive(Subcommand)]
pub enum SyncSubcommand {
    /// Run one sync cycle now
    Now,
    /// Show sync configuration and reachability
    Status,
}

impl SyncCommand {
    pub fn run(&self, ctx: &mut AppContext, config: &Config) -> Result<(), SyncCmdError> {
        match &self.command {
            SyncSubcommand::Now => self.sync_now(ctx, config),
            SyncSubcommand::Status => self.status(ctx, config),
        }
    }

    fn sync_now(&self, ctx: &mut AppContext, config: &Config) -> Result<(), SyncCmdError> {
        let gateway = build_gateway(ctx, config)?;
        let rt = tokio::runtime::Runtime::new().map_err(SyncCmdError::Runtime)?;

        let outcome = rt.block_on(run_cycle(
            &mut ctx.directory,
            gateway.as_ref(),
            &RetryPolicy::default(),
        ))?;

        match outcome {
            SyncOutcome::Offline => println!("Sync skipped: gateway not configured or unreachable."),
            SyncOutcome::Bootstrapped { pushed } => {
                println!("Remote was empty; pushed {} contractor(s).", pushed)
            }
            SyncOutcome::Merged { total, pulled } => println!(
                "Synced: {} contractor(s) after merging {} from remote.",
                total, pulled
            ),
        }
        Ok(())
    }

    fn status(&self, ctx: &mut AppContext, config: &Config) -> Result<(), SyncCmdError> {
        let Some(gateway) = build_gateway(ctx, config)? else {
            println!("Sync: not configured (no server_url).");
            return Ok(());
        };

        println!("Server: {}", gateway.base_url());
        println!("Device: {}", gateway.device_id());
        println!("Auto-sync: {}", config.sync.auto_sync);

        let rt = tokio::runtime::Runtime::new().map_err(SyncCmdError::Runtime)?;
        let reachable = rt.block_on(gateway.is_connected());
        println!(
            "Reachable: {}",
            if reachable { "yes" } else { "no" }
        );
        Ok(())
    }
}

/// Builds the optional gateway capability from config. `None` means sync
/// is simply not configured.
pub fn build_gateway(
    ctx: &AppContext,
    config: &Config,
) -> Result<Option<HttpGateway>, SyncCmdError> {
    let Some(server_url) = config.sync.server_url.as_deref() else {
        return Ok(None);
    };

    let device_id = DeviceId::load_or_create(ctx.store().as_ref())?;
    Ok(Some(HttpGateway::new(
        server_url,
        config.sync.api_key.clone(),
        device_id,
    )))
}

/// Errors from sync commands
#[derive(Debug)]
pub enum SyncCmdError {
    DeviceId(DeviceIdError),
    Sync(SyncError),
    Runtime(std::io::Error),
}

impl std::fmt::Display for SyncCmdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncCmdError::DeviceId(e) => write!(f, "{}", e),
            SyncCmdError::Sync(e) => write!(f, "{}", e),
            SyncCmdError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
        }
    }
}

impl std::error::Error for SyncCmdError {}

impl From<DeviceIdError> for SyncCmdError {
    fn from(e: DeviceIdError) -> Self {
        SyncCmdError::DeviceId(e)
    }
}

impl From<SyncError> for SyncCmdError {
    fn from(e: SyncError) -> Self {
        SyncCmdError::Sync(e)
    }
}
