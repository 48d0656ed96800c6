//! Contractor directory commands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use scanledger_core::directory::{DirectoryError, ImportOptions};
use scanledger_core::AppContext;

/// Manage the contractor directory
#[derive(Args)]
pub struct ContractorCommand {
    #[command(subcommand)]
    pub command: ContractorSubcommand,
}

#[derive(Subcommand)]
pub enum ContractorSubcommand {
    /// Add a contractor
    Add {
        /// Contractor name (unique, case-insensitive)
        name: String,
        /// Category label
        #[arg(long, short)]
        category: Option<String>,
    },
    /// List all contractors
    List,
    /// Update a contractor's name and category
    Update {
        id: i64,
        name: String,
        #[arg(long, short, default_value = "")]
        category: String,
    },
    /// Remove a contractor
    Remove { id: i64 },
    /// Import contractors from a delimited text file
    Import {
        file: PathBuf,
        /// Unconditionally drop the first row instead of relying on
        /// keyword-based header detection
        #[arg(long)]
        skip_first_row: bool,
    },
    /// Export the directory as delimited text
    Export {
        /// Write to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

impl ContractorCommand {
    pub fn run(&self, ctx: &mut AppContext) -> Result<(), ContractorCmdError> {
        match &self.command {
            ContractorSubcommand::Add { name, category } => {
                let contractor = ctx.directory.add(name, category.as_deref())?;
                println!("Added {}", contractor);
            }
            ContractorSubcommand::List => {
                if ctx.directory.is_empty() {
                    println!("No contractors.");
                    return Ok(());
                }
                for contractor in ctx.directory.list() {
                    println!("{}", contractor);
                }
            }
            ContractorSubcommand::Update { id, name, category } => {
                if ctx.directory.update(*id, name, category)? {
                    println!("Updated contractor {}", id);
                } else {
                    println!("No contractor with id {}", id);
                }
            }
            ContractorSubcommand::Remove { id } => {
                if ctx.directory.remove(*id) {
                    println!("Removed contractor {}", id);
                } else {
                    println!("No contractor with id {}", id);
                }
            }
            ContractorSubcommand::Import {
                file,
                skip_first_row,
            } => {
                let text = std::fs::read_to_string(file)
                    .map_err(|e| ContractorCmdError::Io(file.clone(), e))?;
                let options = ImportOptions {
                    skip_first_row: *skip_first_row,
                    ..ImportOptions::default()
                };
                let summary = ctx.directory.import_delimited_with(&text, options)?;
                println!(
                    "Imported {} contractor(s), skipped {}",
                    summary.imported, summary.skipped
                );
            }
            ContractorSubcommand::Export { output } => {
                let text = ctx.directory.export_delimited();
                match output {
                    Some(path) => {
                        std::fs::write(path, &text)
                            .map_err(|e| ContractorCmdError::Io(path.clone(), e))?;
                        println!("Exported {} contractor(s) to {}", ctx.directory.len(), path.display());
                    }
                    None => print!("{}", text),
                }
            }
        }
        Ok(())
    }
}

/// Errors from contractor commands
#[derive(Debug)]
pub enum ContractorCmdError {
    Directory(DirectoryError),
    Io(PathBuf, std::io::Error),
}

impl std::fmt::Display for ContractorCmdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContractorCmdError::Directory(e) => write!(f, "{}", e),
            ContractorCmdError::Io(path, e) => {
                write!(f, "Failed to access '{}': {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for ContractorCmdError {}

impl From<DirectoryError> for ContractorCmdError {
    fn from(e: DirectoryError) -> Self {
        ContractorCmdError::Directory(e)
    }
}
