//! The single active scan session slot.
//!
//! At most one session exists per process. Starting a new session replaces
//! the current one wholesale; in-progress codes that were never closed into
//! a report are lost. The slot persists the session after every mutation
//! and keeps the selected-contractor-ids cache current.

use std::sync::Arc;

use crate::models::{ScanSession, ScannedCode};
use crate::storage::{keys, KeyValueStore};

/// Errors from session operations.
#[derive(Debug)]
pub enum SessionError {
    /// Caller supplied invalid input (empty contractor selection).
    Validation(String),
    /// The code has already been scanned in this session. Non-fatal: the
    /// scan flow continues, the duplicate is just not stored.
    DuplicateCode(String),
    /// No session is active.
    NoActiveSession,
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::Validation(msg) => write!(f, "Validation error: {}", msg),
            SessionError::DuplicateCode(code) => {
                write!(f, "Code already scanned in this session: {}", code)
            }
            SessionError::NoActiveSession => write!(f, "No active scan session"),
        }
    }
}

impl std::error::Error for SessionError {}

/// Owner of the current scan session.
pub struct SessionSlot {
    store: Arc<dyn KeyValueStore>,
    current: Option<ScanSession>,
}

impl SessionSlot {
    /// Loads the slot from the store. An unreadable persisted session is
    /// dropped with a warning.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let current = match store.get(keys::CURRENT_SESSION) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(session) => Some(session),
                Err(e) => {
                    tracing::warn!("Corrupt persisted session, discarding: {}", e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Failed to read persisted session: {}", e);
                None
            }
        };

        Self { store, current }
    }

    /// Starts a new session for the given contractors, replacing any
    /// existing one. The selection must be non-empty.
    pub fn start(&mut self, contractor_ids: Vec<i64>) -> Result<&ScanSession, SessionError> {
        if contractor_ids.is_empty() {
            return Err(SessionError::Validation(
                "at least one contractor must be selected".to_string(),
            ));
        }

        self.cache_selected_ids(&contractor_ids);
        self.current = Some(ScanSession::new(contractor_ids));
        self.persist();

        Ok(self.current.as_ref().unwrap())
    }

    /// Appends a scanned code to the active session. Exact duplicates are
    /// rejected, not stored.
    pub fn add_code(&mut self, code: &str) -> Result<&ScannedCode, SessionError> {
        let session = self.current.as_mut().ok_or(SessionError::NoActiveSession)?;

        if session.has_code(code) {
            return Err(SessionError::DuplicateCode(code.to_string()));
        }

        session.scanned_codes.push(ScannedCode::new(code));
        self.persist();

        let session = self.current.as_ref().unwrap();
        Ok(session.scanned_codes.last().unwrap())
    }

    /// Removes every entry matching `code` exactly. Absent codes are a
    /// no-op, not an error.
    pub fn remove_code(&mut self, code: &str) {
        if let Some(session) = self.current.as_mut() {
            let before = session.scanned_codes.len();
            session.scanned_codes.retain(|c| c.code != code);
            if session.scanned_codes.len() != before {
                self.persist();
            }
        }
    }

    /// Exact-match lookup used by capture adapters before calling
    /// [`Self::add_code`]; the add itself remains the authoritative guard.
    pub fn has_code(&self, code: &str) -> bool {
        self.current
            .as_ref()
            .map(|s| s.has_code(code))
            .unwrap_or(false)
    }

    pub fn current(&self) -> Option<&ScanSession> {
        self.current.as_ref()
    }

    /// Resets the slot to empty, discarding unsaved codes. Irreversible.
    pub fn clear(&mut self) {
        self.current = None;
        if let Err(e) = self.store.remove(keys::CURRENT_SESSION) {
            tracing::warn!("Failed to remove persisted session: {}", e);
        }
    }

    /// Contractor ids selected when the last session was started.
    pub fn last_selected_ids(&self) -> Vec<i64> {
        match self.store.get(keys::SELECTED_IDS) {
            Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    fn cache_selected_ids(&self, ids: &[i64]) {
        match serde_json::to_string(ids) {
            Ok(json) => {
                if let Err(e) = self.store.set(keys::SELECTED_IDS, &json) {
                    tracing::warn!("Failed to cache selected contractor ids: {}", e);
                }
            }
            Err(e) => tracing::warn!("Failed to serialize selected ids: {}", e),
        }
    }

    fn persist(&self) {
        let Some(session) = self.current.as_ref() else {
            return;
        };
        match serde_json::to_string(session) {
            Ok(json) => {
                if let Err(e) = self.store.set(keys::CURRENT_SESSION, &json) {
                    tracing::warn!("Failed to persist session: {}", e);
                }
            }
            Err(e) => tracing::warn!("Failed to serialize session: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn test_slot() -> SessionSlot {
        SessionSlot::load(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_slot_starts_empty() {
        let slot = test_slot();
        assert!(slot.current().is_none());
        assert!(!slot.has_code("anything"));
    }

    #[test]
    fn test_start_requires_contractors() {
        let mut slot = test_slot();
        assert!(matches!(
            slot.start(vec![]),
            Err(SessionError::Validation(_))
        ));
        assert!(slot.current().is_none());
    }

    #[test]
    fn test_start_replaces_previous_session() {
        let mut slot = test_slot();
        slot.start(vec![1]).unwrap();
        slot.add_code("OLD").unwrap();

        slot.start(vec![2]).unwrap();
        let session = slot.current().unwrap();
        assert_eq!(session.contractor_ids, vec![2]);
        assert!(session.scanned_codes.is_empty());
    }

    #[test]
    fn test_add_code_without_session_fails() {
        let mut slot = test_slot();
        assert!(matches!(
            slot.add_code("ABC"),
            Err(SessionError::NoActiveSession)
        ));
    }

    #[test]
    fn test_duplicate_code_rejected_and_not_stored() {
        let mut slot = test_slot();
        slot.start(vec![1]).unwrap();

        slot.add_code("ABC").unwrap();
        let result = slot.add_code("ABC");

        assert!(matches!(result, Err(SessionError::DuplicateCode(_))));
        assert_eq!(slot.current().unwrap().code_count(), 1);
    }

    #[test]
    fn test_codes_keep_scan_order() {
        let mut slot = test_slot();
        slot.start(vec![1]).unwrap();
        slot.add_code("A").unwrap();
        slot.add_code("B").unwrap();
        slot.add_code("C").unwrap();

        let codes: Vec<_> = slot
            .current()
            .unwrap()
            .scanned_codes
            .iter()
            .map(|c| c.code.as_str())
            .collect();
        assert_eq!(codes, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_remove_code_absent_is_noop() {
        let mut slot = test_slot();
        slot.start(vec![1]).unwrap();
        slot.add_code("A").unwrap();

        slot.remove_code("MISSING");
        assert_eq!(slot.current().unwrap().code_count(), 1);
    }

    #[test]
    fn test_remove_code_exact_match_only() {
        let mut slot = test_slot();
        slot.start(vec![1]).unwrap();
        slot.add_code("abc").unwrap();
        slot.add_code("ABC").unwrap();

        slot.remove_code("abc");
        let session = slot.current().unwrap();
        assert_eq!(session.code_count(), 1);
        assert_eq!(session.scanned_codes[0].code, "ABC");
    }

    #[test]
    fn test_clear_discards_session() {
        let mut slot = test_slot();
        slot.start(vec![1]).unwrap();
        slot.add_code("A").unwrap();

        slot.clear();
        assert!(slot.current().is_none());
    }

    #[test]
    fn test_same_code_allowed_after_new_session() {
        let mut slot = test_slot();
        slot.start(vec![1]).unwrap();
        slot.add_code("ABC").unwrap();

        slot.start(vec![1]).unwrap();
        slot.add_code("ABC").unwrap();
        assert_eq!(slot.current().unwrap().code_count(), 1);
    }

    #[test]
    fn test_session_persists_across_reload() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        {
            let mut slot = SessionSlot::load(store.clone());
            slot.start(vec![1, 2]).unwrap();
            slot.add_code("X9").unwrap();
        }

        let slot = SessionSlot::load(store);
        let session = slot.current().unwrap();
        assert_eq!(session.contractor_ids, vec![1, 2]);
        assert!(session.has_code("X9"));
    }

    #[test]
    fn test_selected_ids_cache_survives_clear() {
        let mut slot = test_slot();
        slot.start(vec![4, 5]).unwrap();
        slot.clear();

        assert_eq!(slot.last_selected_ids(), vec![4, 5]);
    }
}
