use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::contractor::Contractor;
use super::session::ScannedCode;

/// Delivery state of a report. The transition to `Sent` is driven from
/// outside the engine; the ledger only records it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Pending,
    Sent,
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportStatus::Pending => write!(f, "pending"),
            ReportStatus::Sent => write!(f, "sent"),
        }
    }
}

/// An immutable, sequentially numbered snapshot produced by closing a
/// scan session.
///
/// `contractors` and `codes` are copies taken at save time, not references
/// into the live directory or session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub sequential_number: u64,
    pub contractors: Vec<Contractor>,
    pub codes: Vec<ScannedCode>,
    pub submitted_at: DateTime<Utc>,
    #[serde(default = "default_status")]
    pub status: ReportStatus,
}

fn default_status() -> ReportStatus {
    ReportStatus::Pending
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ReportStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(
            serde_json::to_string(&ReportStatus::Sent).unwrap(),
            "\"sent\""
        );
    }

    #[test]
    fn test_report_json_roundtrip() {
        let report = Report {
            sequential_number: 5,
            contractors: vec![Contractor::new(1, "Acme", None)],
            codes: vec![ScannedCode::new("A1")],
            submitted_at: Utc::now(),
            status: ReportStatus::Pending,
        };

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"sequentialNumber\":5"));

        let parsed: Report = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
    }

    #[test]
    fn test_missing_status_defaults_to_pending() {
        let json = r#"{
            "sequentialNumber": 1,
            "contractors": [],
            "codes": [],
            "submittedAt": "2024-01-01T00:00:00Z"
        }"#;
        let parsed: Report = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.status, ReportStatus::Pending);
    }
}
