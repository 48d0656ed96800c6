//! Device identity commands.

use clap::{Args, Subcommand};

use scanledger_core::{AppContext, DeviceId, DeviceIdError};

/// Show device identity
#[derive(Args)]
pub struct DeviceCommand {
    #[command(subcommand)]
    command: DeviceSubcommand,
}

#[derive(Subcommand)]
enum DeviceSubcommand {
    /// Show the stable identifier this device syncs under
    Show,
}

impl DeviceCommand {
    pub fn run(&self, ctx: &AppContext) -> Result<(), DeviceCmdError> {
        match &self.command {
            DeviceSubcommand::Show => {
                let device_id = DeviceId::load_or_create(ctx.store().as_ref())?;
                println!("Device ID: {}", device_id);
                println!();
                println!("The cloud gateway keys this device's contractor directory");
                println!("by this identifier. It is issued once and never changes.");
                Ok(())
            }
        }
    }
}

/// Errors from device commands
#[derive(Debug)]
pub enum DeviceCmdError {
    DeviceId(DeviceIdError),
}

impl std::fmt::Display for DeviceCmdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceCmdError::DeviceId(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for DeviceCmdError {}

impl From<DeviceIdError> for DeviceCmdError {
    fn from(e: DeviceIdError) -> Self {
        DeviceCmdError::DeviceId(e)
    }
}
