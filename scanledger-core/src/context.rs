//! The engine's explicit context object.
//!
//! One [`AppContext`] is constructed at process start and passed by
//! reference to whatever needs it; there are no ambient singletons. It
//! owns the directory, the session slot and the ledger, all backed by one
//! shared store.

use std::sync::Arc;

use crate::directory::ContractorDirectory;
use crate::ledger::{LedgerError, ReportLedger};
use crate::models::Report;
use crate::session::{SessionError, SessionSlot};
use crate::storage::KeyValueStore;

/// Errors from cross-component flows.
#[derive(Debug)]
pub enum ContextError {
    Session(SessionError),
    Ledger(LedgerError),
}

impl std::fmt::Display for ContextError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContextError::Session(e) => write!(f, "{}", e),
            ContextError::Ledger(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ContextError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ContextError::Session(e) => Some(e),
            ContextError::Ledger(e) => Some(e),
        }
    }
}

impl From<SessionError> for ContextError {
    fn from(e: SessionError) -> Self {
        ContextError::Session(e)
    }
}

impl From<LedgerError> for ContextError {
    fn from(e: LedgerError) -> Self {
        ContextError::Ledger(e)
    }
}

/// Everything the engine keeps between operations.
pub struct AppContext {
    store: Arc<dyn KeyValueStore>,
    pub directory: ContractorDirectory,
    pub session: SessionSlot,
    pub ledger: ReportLedger,
}

impl AppContext {
    /// Loads all components from one shared store.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            directory: ContractorDirectory::load(store.clone()),
            session: SessionSlot::load(store.clone()),
            ledger: ReportLedger::load(store.clone()),
            store,
        }
    }

    /// The shared store backing every component.
    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Closes the active session into a report.
    ///
    /// Snapshots the selected contractors from the directory (copies, not
    /// references), hands the session to the ledger, and clears the slot.
    /// Fails without touching the ledger when there is no session, the
    /// session has no codes, or none of the selected contractors still
    /// exist.
    pub fn close_session(&mut self) -> Result<Report, ContextError> {
        let session = self
            .session
            .current()
            .ok_or(SessionError::NoActiveSession)?
            .clone();

        let contractors = session
            .contractor_ids
            .iter()
            .filter_map(|id| self.directory.get(*id).cloned())
            .collect();

        let report = self.ledger.save(&session, contractors)?;
        self.session.clear();

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReportStatus;
    use crate::storage::MemoryStore;

    fn test_context() -> AppContext {
        AppContext::load(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_close_without_session_fails() {
        let mut ctx = test_context();
        let result = ctx.close_session();
        assert!(matches!(
            result,
            Err(ContextError::Session(SessionError::NoActiveSession))
        ));
        assert!(ctx.ledger.list().is_empty());
    }

    #[test]
    fn test_close_empty_session_fails_and_ledger_untouched() {
        let mut ctx = test_context();
        let acme = ctx.directory.add("Acme", None).unwrap();
        ctx.session.start(vec![acme.id]).unwrap();

        let result = ctx.close_session();
        assert!(matches!(result, Err(ContextError::Ledger(_))));
        assert!(ctx.ledger.list().is_empty());

        // The session survives the failed close.
        assert!(ctx.session.current().is_some());
    }

    #[test]
    fn test_close_freezes_snapshot_and_clears_session() {
        let mut ctx = test_context();
        let acme = ctx.directory.add("Acme", Some("Carrier")).unwrap();
        ctx.session.start(vec![acme.id]).unwrap();
        ctx.session.add_code("CODE-1").unwrap();
        ctx.session.add_code("CODE-2").unwrap();

        let report = ctx.close_session().unwrap();

        assert_eq!(report.sequential_number, 1);
        assert_eq!(report.status, ReportStatus::Pending);
        assert_eq!(report.codes.len(), 2);
        assert_eq!(report.contractors.len(), 1);
        assert_eq!(report.contractors[0].name, "Acme");

        assert!(ctx.session.current().is_none());
        assert_eq!(ctx.ledger.list().len(), 1);
    }

    #[test]
    fn test_report_snapshot_outlives_directory_changes() {
        let mut ctx = test_context();
        let acme = ctx.directory.add("Acme", None).unwrap();
        ctx.session.start(vec![acme.id]).unwrap();
        ctx.session.add_code("X").unwrap();

        let report = ctx.close_session().unwrap();
        ctx.directory.remove(acme.id);

        // The ledger still has the contractor as it was at save time.
        let saved = ctx.ledger.get(report.sequential_number).unwrap();
        assert_eq!(saved.contractors[0].name, "Acme");
    }

    #[test]
    fn test_close_with_all_contractors_deleted_fails() {
        let mut ctx = test_context();
        let acme = ctx.directory.add("Acme", None).unwrap();
        ctx.session.start(vec![acme.id]).unwrap();
        ctx.session.add_code("X").unwrap();
        ctx.directory.remove(acme.id);

        let result = ctx.close_session();
        assert!(matches!(result, Err(ContextError::Ledger(_))));
        assert!(ctx.ledger.list().is_empty());
    }

    #[test]
    fn test_sequential_reports_across_sessions() {
        let mut ctx = test_context();
        let acme = ctx.directory.add("Acme", None).unwrap();

        for code in ["A", "B", "C"] {
            ctx.session.start(vec![acme.id]).unwrap();
            ctx.session.add_code(code).unwrap();
            ctx.close_session().unwrap();
        }

        let numbers: Vec<u64> = ctx
            .ledger
            .list()
            .iter()
            .map(|r| r.sequential_number)
            .collect();
        assert_eq!(numbers, vec![3, 2, 1]);
    }
}
