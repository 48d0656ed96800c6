//! Device-to-device exchange payload.
//!
//! One neutral JSON shape backs every direct transport (CSV attachment,
//! QR payload, clipboard): `{ "contractors": [...], "timestamp": ...,
//! "version": ... }`. Import applies the name-keyed merge policy and then
//! renumbers through the directory, so the id invariants keep holding.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::directory::ContractorDirectory;
use crate::merge::merge_by_name;
use crate::models::Contractor;

/// Payload format version.
pub const EXCHANGE_VERSION: u32 = 1;

/// Errors from exchange payload handling. The directory is left unchanged
/// on every failure.
#[derive(Debug)]
pub enum ExchangeError {
    /// The payload is not valid JSON at all.
    Malformed(String),
    /// The `contractors` field is absent or not an array.
    MissingContractors,
}

impl std::fmt::Display for ExchangeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExchangeError::Malformed(e) => write!(f, "Malformed exchange payload: {}", e),
            ExchangeError::MissingContractors => {
                write!(f, "Exchange payload has no contractor list")
            }
        }
    }
}

impl std::error::Error for ExchangeError {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportPayload<'a> {
    contractors: &'a [Contractor],
    timestamp: DateTime<Utc>,
    version: u32,
}

/// What an exchange import did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOutcome {
    /// Directory size after the merge.
    pub total: usize,
    /// Names that did not exist locally before.
    pub added: usize,
}

/// Serializes the contractor list into the exchange JSON shape.
pub fn export_payload(contractors: &[Contractor]) -> Result<String, ExchangeError> {
    let payload = ExportPayload {
        contractors,
        timestamp: Utc::now(),
        version: EXCHANGE_VERSION,
    };
    serde_json::to_string(&payload).map_err(|e| ExchangeError::Malformed(e.to_string()))
}

/// Imports an exchange payload into the directory.
///
/// Incoming records win name ties (first-seen-wins over the
/// incoming-then-local concatenation). The merged list is renumbered
/// sequentially so ids stay unique regardless of what the sending device
/// used. A payload whose `contractors` field is absent or not an array is
/// rejected without touching the directory.
pub fn import_payload(
    directory: &mut ContractorDirectory,
    json: &str,
) -> Result<ImportOutcome, ExchangeError> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| ExchangeError::Malformed(e.to_string()))?;

    let contractors = value
        .get("contractors")
        .filter(|v| v.is_array())
        .ok_or(ExchangeError::MissingContractors)?;

    let incoming: Vec<Contractor> = serde_json::from_value(contractors.clone())
        .map_err(|e| ExchangeError::Malformed(e.to_string()))?;

    let existing: std::collections::HashSet<String> = directory
        .list()
        .iter()
        .map(|c| c.name.trim().to_lowercase())
        .collect();
    let merged = merge_by_name(&incoming, directory.list());

    let renumbered: Vec<Contractor> = merged
        .into_iter()
        .enumerate()
        .map(|(index, mut contractor)| {
            contractor.id = index as i64 + 1;
            contractor
        })
        .collect();

    // Counted against the pre-merge name set rather than by list-length
    // arithmetic: the name-keyed merge can shrink the list when the stored
    // data already carried a duplicate name.
    let added = renumbered
        .iter()
        .filter(|c| !existing.contains(&c.name.trim().to_lowercase()))
        .count();

    let total = renumbered.len();
    directory.replace_all(renumbered);

    Ok(ImportOutcome { total, added })
}
