use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single scanned code. Immutable once created; uniqueness is scoped to
/// the session it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScannedCode {
    pub code: String,
    pub timestamp: DateTime<Utc>,
}

impl ScannedCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            timestamp: Utc::now(),
        }
    }
}

/// The in-progress batch of scans tied to one or more contractors.
///
/// Codes are kept in scan order and are append-only for the session's life.
/// At most one session exists per process; the slot that owns it lives in
/// [`crate::session::SessionSlot`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScanSession {
    pub id: Uuid,
    pub contractor_ids: Vec<i64>,
    pub scanned_codes: Vec<ScannedCode>,
    pub created_at: DateTime<Utc>,
}

impl ScanSession {
    pub fn new(contractor_ids: Vec<i64>) -> Self {
        Self {
            id: Uuid::new_v4(),
            contractor_ids,
            scanned_codes: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Exact-match lookup for a code in this session.
    pub fn has_code(&self, code: &str) -> bool {
        self.scanned_codes.iter().any(|c| c.code == code)
    }

    pub fn code_count(&self) -> usize {
        self.scanned_codes.len()
    }
}
