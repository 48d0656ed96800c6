//! Core data model: contractors, scan sessions and reports.

mod contractor;
mod report;
mod session;

pub use contractor::{Contractor, DEFAULT_CATEGORY};
pub use report::{Report, ReportStatus};
pub use session::{ScanSession, ScannedCode};
