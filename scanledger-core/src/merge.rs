//! Contractor list reconciliation.
//!
//! Two distinct policies co-exist and are not interchangeable:
//!
//! - [`merge_cloud_priority`] keys by `id` and lets the remote (cloud) side
//!   win on collision. The sync orchestrator uses this one; callers must
//!   always pass the authoritative cloud copy as `remote`.
//! - [`merge_by_name`] keys by case-sensitive name, first-seen-wins after
//!   concatenating incoming-then-local. The device-to-device exchange path
//!   uses this one.

use std::collections::{BTreeMap, HashSet};

use crate::models::Contractor;

/// Reconciles a local contractor list with the cloud copy.
///
/// The result contains every remote record, plus every local record whose
/// id does not collide with a remote one. On an id collision the remote
/// version wins outright; no field-level reconciliation is attempted. The
/// output is sorted by ascending id.
///
/// Deliberately asymmetric: `merge_cloud_priority(a, b)` and
/// `merge_cloud_priority(b, a)` differ whenever ids collide.
pub fn merge_cloud_priority(local: &[Contractor], remote: &[Contractor]) -> Vec<Contractor> {
    let mut by_id: BTreeMap<i64, Contractor> = remote
        .iter()
        .map(|c| (c.id, c.clone()))
        .collect();

    for contractor in local {
        by_id
            .entry(contractor.id)
            .or_insert_with(|| contractor.clone());
    }

    // BTreeMap iteration yields ascending ids.
    by_id.into_values().collect()
}

/// Reconciles two lists by contractor name for direct device exchange.
///
/// Concatenates `incoming` then `local` and keeps the first occurrence of
/// each name (case-sensitive), so an incoming record shadows a local one
/// with the same exact name. Ids in the output are whatever the winning
/// record carried; callers are expected to renumber through the directory.
pub fn merge_by_name(incoming: &[Contractor], local: &[Contractor]) -> Vec<Contractor> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut merged = Vec::new();

    for contractor in incoming.iter().chain(local.iter()) {
        if seen.insert(contractor.name.as_str()) {
            merged.push(contractor.clone());
        }
    }

    merged
}
