//! Scan session commands.

use clap::{Args, Subcommand};

use scanledger_core::{AppContext, ContextError, SessionError};

/// Work with the active scan session
#[derive(Args)]
pub struct ScanCommand {
    #[command(subcommand)]
    pub command: ScanSubcommand,
}

#[derive(Subcommand)]
pub enum ScanSubcommand {
    /// Start a session for the given contractor ids, replacing any
    /// in-progress session
    Start {
        /// Comma-separated contractor ids
        #[arg(value_delimiter = ',', required = true)]
        contractors: Vec<i64>,
    },
    /// Scan a code into the active session
    Add { code: String },
    /// Remove a code from the active session
    Remove { code: String },
    /// Show the active session
    Status,
    /// Discard the active session without a report
    Clear,
    /// Close the session into a numbered report
    Close,
}

impl ScanCommand {
    pub fn run(&self, ctx: &mut AppContext) -> Result<(), ScanCmdError> {
        match &self.command {
            ScanSubcommand::Start { contractors } => {
                let session = ctx.session.start(contractors.clone())?;
                println!(
                    "Started session {} for contractor(s) {:?}",
                    session.id, session.contractor_ids
                );
            }
            ScanSubcommand::Add { code } => match ctx.session.add_code(code) {
                Ok(stored) => println!("Scanned {} at {}", stored.code, stored.timestamp),
                // Re-scanning the same label happens routinely in the
                // field; warn and keep the session going.
                Err(SessionError::DuplicateCode(code)) => {
                    println!("Warning: code {} already scanned in this session", code)
                }
                Err(e) => return Err(e.into()),
            },
            ScanSubcommand::Remove { code } => {
                ctx.session.remove_code(code);
                println!("Removed {}", code);
            }
            ScanSubcommand::Status => match ctx.session.current() {
                Some(session) => {
                    println!("Session {}", session.id);
                    println!("Contractors: {:?}", session.contractor_ids);
                    println!("Codes ({}):", session.code_count());
                    for code in &session.scanned_codes {
                        println!("  {} ({})", code.code, code.timestamp);
                    }
                }
                None => println!("No active session."),
            },
            ScanSubcommand::Clear => {
                ctx.session.clear();
                println!("Session cleared.");
            }
            ScanSubcommand::Close => {
                let report = ctx.close_session()?;
                println!(
                    "Saved report #{} with {} code(s) for {} contractor(s)",
                    report.sequential_number,
                    report.codes.len(),
                    report.contractors.len()
                );
            }
        }
        Ok(())
    }
}

/// Errors from scan commands
#[derive(Debug)]
pub enum ScanCmdError {
    Session(SessionError),
    Context(ContextError),
}

impl std::fmt::Display for ScanCmdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanCmdError::Session(e) => write!(f, "{}", e),
            ScanCmdError::Context(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ScanCmdError {}

impl From<SessionError> for ScanCmdError {
    fn from(e: SessionError) -> Self {
        ScanCmdError::Session(e)
    }
}

impl From<ContextError> for ScanCmdError {
    fn from(e: ContextError) -> Self {
        ScanCmdError::Context(e)
    }
}
