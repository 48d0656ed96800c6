//! CLI command definitions.

pub mod config_cmd;
pub mod contractor;
pub mod device;
pub mod exchange;
pub mod report;
pub mod scan;
pub mod sync_cmd;

pub use config_cmd::ConfigCommand;
pub use contractor::{ContractorCommand, ContractorSubcommand};
pub use device::DeviceCommand;
pub use exchange::{ExchangeCommand, ExchangeSubcommand};
pub use report::ReportCommand;
pub use scan::ScanCommand;
pub use sync_cmd::SyncCommand;
