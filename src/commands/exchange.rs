//! Device-to-device exchange commands (JSON payload over file/clipboard).

use std::path::PathBuf;

use clap::{Args, Subcommand};

use scanledger_core::{export_payload, import_payload, AppContext, ExchangeError};

/// Exchange the contractor list directly with another device
#[derive(Args)]
pub struct ExchangeCommand {
    #[command(subcommand)]
    pub command: ExchangeSubcommand,
}

#[derive(Subcommand)]
pub enum ExchangeSubcommand {
    /// Write the exchange payload (JSON) to a file or stdout
    Export {
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Import a payload from a file, merging by contractor name
    Import { file: PathBuf },
}

impl ExchangeCommand {
    pub fn run(&self, ctx: &mut AppContext) -> Result<(), ExchangeCmdError> {
        match &self.command {
            ExchangeSubcommand::Export { output } => {
                let json = export_payload(ctx.directory.list())?;
                match output {
                    Some(path) => {
                        std::fs::write(path, &json)
                            .map_err(|e| ExchangeCmdError::Io(path.clone(), e))?;
                        println!("Wrote exchange payload to {}", path.display());
                    }
                    None => println!("{}", json),
                }
            }
            ExchangeSubcommand::Import { file } => {
                let json = std::fs::read_to_string(file)
                    .map_err(|e| ExchangeCmdError::Io(file.clone(), e))?;
                let outcome = import_payload(&mut ctx.directory, &json)?;
                println!(
                    "Merged exchange payload: {} contractor(s) total, {} new",
                    outcome.total, outcome.added
                );
            }
        }
        Ok(())
    }
}

/// Errors from exchange commands
#[derive(Debug)]
pub enum ExchangeCmdError {
    Exchange(ExchangeError),
    Io(PathBuf, std::io::Error),
}

impl std::fmt::Display for ExchangeCmdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExchangeCmdError::Exchange(e) => write!(f, "{}", e),
            ExchangeCmdError::Io(path, e) => {
                write!(f, "Failed to access '{}': {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for ExchangeCmdError {}

impl From<ExchangeError> for ExchangeCmdError {
    fn from(e: ExchangeError) -> Self {
        ExchangeCmdError::Exchange(e)
    }
}
