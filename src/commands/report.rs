//! Report ledger commands.

use clap::{Args, Subcommand};

use scanledger_core::AppContext;

/// Browse the report ledger
#[derive(Args)]
pub struct ReportCommand {
    #[command(subcommand)]
    pub command: ReportSubcommand,
}

#[derive(Subcommand)]
pub enum ReportSubcommand {
    /// List reports, most recent first
    List,
    /// Show one report in full
    Show { number: u64 },
    /// Record a report as sent
    MarkSent { number: u64 },
}

impl ReportCommand {
    pub fn run(&self, ctx: &mut AppContext) -> Result<(), ReportCmdError> {
        match &self.command {
            ReportSubcommand::List => {
                if ctx.ledger.list().is_empty() {
                    println!("No reports.");
                    return Ok(());
                }
                for report in ctx.ledger.list() {
                    println!(
                        "#{} {} - {} code(s), {} contractor(s) [{}]",
                        report.sequential_number,
                        report.submitted_at,
                        report.codes.len(),
                        report.contractors.len(),
                        report.status
                    );
                }
            }
            ReportSubcommand::Show { number } => {
                let report = ctx
                    .ledger
                    .get(*number)
                    .ok_or(ReportCmdError::NotFound(*number))?;

                println!("Report #{}", report.sequential_number);
                println!("Submitted: {}", report.submitted_at);
                println!("Status: {}", report.status);
                println!("Contractors:");
                for contractor in &report.contractors {
                    println!("  {}", contractor);
                }
                println!("Codes:");
                for code in &report.codes {
                    println!("  {} ({})", code.code, code.timestamp);
                }
            }
            ReportSubcommand::MarkSent { number } => {
                if ctx.ledger.mark_sent(*number) {
                    println!("Report #{} marked as sent", number);
                } else {
                    return Err(ReportCmdError::NotFound(*number));
                }
            }
        }
        Ok(())
    }
}

/// Errors from report commands
#[derive(Debug)]
pub enum ReportCmdError {
    NotFound(u64),
}

impl std::fmt::Display for ReportCmdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportCmdError::NotFound(number) => write!(f, "No report #{}", number),
        }
    }
}

impl std::error::Error for ReportCmdError {}
