//! Scanledger Core Library
//!
//! State and synchronization engine for warehouse code scanning: the
//! contractor directory, scan sessions, the report ledger, and the merge
//! machinery that keeps a per-device contractor list converging with a
//! shared cloud copy.

pub mod context;
pub mod device;
pub mod directory;
pub mod exchange;
pub mod gateway;
pub mod ledger;
pub mod merge;
pub mod models;
pub mod session;
pub mod storage;
pub mod sync;

pub use context::{AppContext, ContextError};
pub use device::{DeviceId, DeviceIdError};
pub use directory::{
    ContractorDirectory, DirectoryError, ImportOptions, ImportSummary,
};
pub use exchange::{export_payload, import_payload, ExchangeError, ImportOutcome};
pub use gateway::{GatewayError, HttpGateway, SyncGateway};
pub use ledger::{LedgerError, ReportLedger};
pub use merge::{merge_by_name, merge_cloud_priority};
pub use models::{Contractor, Report, ReportStatus, ScanSession, ScannedCode};
pub use session::{SessionError, SessionSlot};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use sync::{run_cycle, RetryPolicy, SyncError, SyncOutcome};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
