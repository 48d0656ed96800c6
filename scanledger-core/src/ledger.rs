//! Append-only report ledger.
//!
//! Reports are immutable snapshots numbered by a persisted counter. The
//! counter is read-increment-persist with no cross-process atomicity; that
//! is safe only because each device's ledger is local and never shared.
//! Sent-state is tracked in a separate log keyed by sequence number so the
//! snapshots themselves are never rewritten.

use std::sync::Arc;

use chrono::Utc;

use crate::models::{Contractor, Report, ReportStatus, ScanSession};
use crate::storage::{keys, KeyValueStore};

/// Errors from ledger operations.
#[derive(Debug)]
pub enum LedgerError {
    /// The session or snapshot handed in is not reportable (no codes, no
    /// contractors).
    Validation(String),
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerError::Validation(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for LedgerError {}

/// The device-local report ledger.
pub struct ReportLedger {
    store: Arc<dyn KeyValueStore>,
    reports: Vec<Report>,
    next_number: u64,
    sent: Vec<u64>,
}

impl ReportLedger {
    /// Loads the ledger, counter and sent-log from the store. Unreadable
    /// values fall back to an empty ledger with the counter at 1.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let mut reports: Vec<Report> = match store.get(keys::REPORTS) {
            Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_else(|e| {
                tracing::warn!("Corrupt report ledger, starting empty: {}", e);
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read report ledger: {}", e);
                Vec::new()
            }
        };

        let next_number = match store.get(keys::REPORT_COUNTER) {
            Ok(Some(raw)) => raw.trim().parse().unwrap_or(1),
            _ => 1,
        };

        let sent: Vec<u64> = match store.get(keys::SENT_LOG) {
            Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_default(),
            _ => Vec::new(),
        };

        // Status is derived from the sent-log, not stored on the snapshot.
        for report in reports.iter_mut() {
            report.status = if sent.contains(&report.sequential_number) {
                ReportStatus::Sent
            } else {
                ReportStatus::Pending
            };
        }

        Self {
            store,
            reports,
            next_number,
            sent,
        }
    }

    /// Freezes a session into a numbered report and prepends it to the
    /// ledger (most-recent-first). Requires at least one scanned code and
    /// at least one contractor in the snapshot.
    pub fn save(
        &mut self,
        session: &ScanSession,
        contractors: Vec<Contractor>,
    ) -> Result<Report, LedgerError> {
        if session.scanned_codes.is_empty() {
            return Err(LedgerError::Validation(
                "session has no scanned codes".to_string(),
            ));
        }
        if contractors.is_empty() {
            return Err(LedgerError::Validation(
                "report needs at least one contractor".to_string(),
            ));
        }

        let report = Report {
            sequential_number: self.next_number,
            contractors,
            codes: session.scanned_codes.clone(),
            submitted_at: Utc::now(),
            status: ReportStatus::Pending,
        };
        self.next_number += 1;

        self.reports.insert(0, report.clone());
        self.persist();

        Ok(report)
    }

    /// All reports, most-recent-first.
    pub fn list(&self) -> &[Report] {
        &self.reports
    }

    pub fn get(&self, sequential_number: u64) -> Option<&Report> {
        self.reports
            .iter()
            .find(|r| r.sequential_number == sequential_number)
    }

    /// Records a report as sent. Returns `false` for unknown numbers;
    /// marking twice is a no-op returning `true`.
    pub fn mark_sent(&mut self, sequential_number: u64) -> bool {
        let Some(report) = self
            .reports
            .iter_mut()
            .find(|r| r.sequential_number == sequential_number)
        else {
            return false;
        };

        report.status = ReportStatus::Sent;
        if !self.sent.contains(&sequential_number) {
            self.sent.push(sequential_number);
            self.persist_sent_log();
        }
        true
    }

    /// The number the next saved report will receive.
    pub fn next_number(&self) -> u64 {
        self.next_number
    }

    fn persist(&self) {
        match serde_json::to_string(&self.reports) {
            Ok(json) => {
                if let Err(e) = self.store.set(keys::REPORTS, &json) {
                    tracing::warn!("Failed to persist report ledger: {}", e);
                }
            }
            Err(e) => tracing::warn!("Failed to serialize report ledger: {}", e),
        }
        if let Err(e) = self
            .store
            .set(keys::REPORT_COUNTER, &self.next_number.to_string())
        {
            tracing::warn!("Failed to persist report counter: {}", e);
        }
    }

    fn persist_sent_log(&self) {
        match serde_json::to_string(&self.sent) {
            Ok(json) => {
                if let Err(e) = self.store.set(keys::SENT_LOG, &json) {
                    tracing::warn!("Failed to persist sent log: {}", e);
                }
            }
            Err(e) => tracing::warn!("Failed to serialize sent log: {}", e),
        }
    }
}
