//! Sync orchestrator: the startup/periodic reconciliation cycle.
//!
//! load local -> probe gateway -> pull remote -> merge -> push -> apply
//! locally. The push happens before the local overwrite, so a cycle that
//! fails partway never corrupts local data; the merge policy is the sole
//! conflict-resolution mechanism between devices, there is no lock.

use std::collections::HashSet;
use std::time::Duration;

use crate::directory::ContractorDirectory;
use crate::gateway::{GatewayError, SyncGateway};
use crate::merge::merge_cloud_priority;
use crate::models::Contractor;

/// Bounded connectivity retry: `attempts` probes with a fixed `delay`
/// between them before the cycle is declared offline.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Single immediate probe, no waiting. Used in tests and one-shot CLI
    /// calls.
    pub fn immediate() -> Self {
        Self {
            attempts: 1,
            delay: Duration::ZERO,
        }
    }
}

/// What a completed sync cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// No gateway configured, or the remote side never became reachable.
    /// Local state stays authoritative.
    Offline,
    /// Remote side was empty; the local list was pushed up as-is.
    Bootstrapped { pushed: usize },
    /// Local and remote were merged, pushed, and applied locally.
    Merged { total: usize, pulled: usize },
}

/// Errors that abort a sync cycle. Local state is untouched in every case;
/// the cycle is retried only on the next scheduled trigger.
#[derive(Debug)]
pub enum SyncError {
    /// Fetching the remote list failed.
    Pull(GatewayError),
    /// Writing the reconciled list back failed.
    Push(GatewayError),
}

impl std::fmt::Display for SyncError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncError::Pull(e) => write!(f, "Pull failed: {}", e),
            SyncError::Push(e) => write!(f, "Push failed: {}", e),
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncError::Pull(e) | SyncError::Push(e) => Some(e),
        }
    }
}

/// Runs one reconciliation cycle.
///
/// `gateway` is an explicit optional capability: `None` means sync is not
/// configured and the cycle is a no-op. The local directory is only
/// overwritten after the merged list has been pushed successfully.
pub async fn run_cycle<G: SyncGateway>(
    directory: &mut ContractorDirectory,
    gateway: Option<&G>,
    policy: &RetryPolicy,
) -> Result<SyncOutcome, SyncError> {
    let Some(gateway) = gateway else {
        tracing::debug!("Sync gateway not configured, skipping cycle");
        return Ok(SyncOutcome::Offline);
    };

    if !probe_connectivity(gateway, policy).await {
        tracing::info!("Sync gateway unreachable, operating local-only");
        return Ok(SyncOutcome::Offline);
    }

    let remote = normalize_remote(gateway.pull().await.map_err(SyncError::Pull)?);

    if remote.is_empty() {
        let local = directory.list().to_vec();
        gateway.push(&local).await.map_err(SyncError::Push)?;
        tracing::info!("Remote directory empty, bootstrapped with {} contractor(s)", local.len());
        return Ok(SyncOutcome::Bootstrapped { pushed: local.len() });
    }

    let pulled = remote.len();
    let merged = merge_cloud_priority(directory.list(), &remote);

    // Push first; apply locally only once the cloud copy has accepted it.
    gateway.push(&merged).await.map_err(SyncError::Push)?;

    let total = merged.len();
    directory.replace_all(merged);
    tracing::info!("Sync cycle merged {} contractor(s) ({} from remote)", total, pulled);

    Ok(SyncOutcome::Merged { total, pulled })
}

/// Drops pulled records that repeat an earlier record's name, keeping the
/// first occurrence. The local directory never holds two contractors with
/// the same trimmed, case-folded name; remote data gets the same guarantee
/// before it reaches the merge.
fn normalize_remote(remote: Vec<Contractor>) -> Vec<Contractor> {
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(remote.len());
    for contractor in remote {
        if seen.insert(contractor.name.trim().to_lowercase()) {
            kept.push(contractor);
        } else {
            tracing::warn!(
                "Dropping remote contractor '{}' (id {}): duplicate name",
                contractor.name,
                contractor.id
            );
        }
    }
    kept
}

async fn probe_connectivity<G: SyncGateway>(gateway: &G, policy: &RetryPolicy) -> bool {
    for attempt in 1..=policy.attempts.max(1) {
        if gateway.is_connected().await {
            return true;
        }
        tracing::debug!(
            "Gateway connectivity probe {}/{} failed",
            attempt,
            policy.attempts
        );
        if attempt < policy.attempts {
            tokio::time::sleep(policy.delay).await;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    use crate::models::Contractor;
    use crate::storage::MemoryStore;

    /// In-memory gateway standing in for the cloud side.
    struct MockGateway {
        connected: bool,
        remote: Mutex<Vec<Contractor>>,
        fail_pull: bool,
        fail_push: bool,
        probes: AtomicU32,
    }

    impl MockGateway {
        fn new(remote: Vec<Contractor>) -> Self {
            Self {
                connected: true,
                remote: Mutex::new(remote),
                fail_pull: false,
                fail_push: false,
                probes: AtomicU32::new(0),
            }
        }

        fn remote(&self) -> Vec<Contractor> {
            self.remote.lock().unwrap().clone()
        }
    }

    impl SyncGateway for MockGateway {
        async fn is_connected(&self) -> bool {
            self.probes.fetch_add(1, Ordering::SeqCst);
            self.connected
        }

        async fn pull(&self) -> Result<Vec<Contractor>, GatewayError> {
            if self.fail_pull {
                return Err(GatewayError::Http("pull refused".into()));
            }
            Ok(self.remote())
        }

        async fn push(&self, contractors: &[Contractor]) -> Result<(), GatewayError> {
            if self.fail_push {
                return Err(GatewayError::Status(503));
            }
            *self.remote.lock().unwrap() = contractors.to_vec();
            Ok(())
        }
    }

    fn directory_with(names: &[(i64, &str)]) -> ContractorDirectory {
        let mut dir = ContractorDirectory::load(Arc::new(MemoryStore::new()));
        dir.replace_all(
            names
                .iter()
                .map(|(id, name)| Contractor::new(*id, *name, None))
                .collect(),
        );
        dir
    }

    #[tokio::test]
    async fn test_no_gateway_is_offline_noop() {
        let mut dir = directory_with(&[(1, "A")]);
        let outcome = run_cycle::<MockGateway>(&mut dir, None, &RetryPolicy::immediate())
            .await
            .unwrap();

        assert_eq!(outcome, SyncOutcome::Offline);
        assert_eq!(dir.len(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_gateway_is_offline_after_bounded_probes() {
        let mut dir = directory_with(&[(1, "A")]);
        let mut gateway = MockGateway::new(vec![]);
        gateway.connected = false;

        let policy = RetryPolicy {
            attempts: 3,
            delay: Duration::ZERO,
        };
        let outcome = run_cycle(&mut dir, Some(&gateway), &policy).await.unwrap();

        assert_eq!(outcome, SyncOutcome::Offline);
        assert_eq!(gateway.probes.load(Ordering::SeqCst), 3);
        assert_eq!(dir.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_remote_bootstraps_from_local() {
        let mut dir = directory_with(&[(1, "A"), (2, "B")]);
        let gateway = MockGateway::new(vec![]);

        let outcome = run_cycle(&mut dir, Some(&gateway), &RetryPolicy::immediate())
            .await
            .unwrap();

        assert_eq!(outcome, SyncOutcome::Bootstrapped { pushed: 2 });
        assert_eq!(gateway.remote().len(), 2);
        assert_eq!(dir.len(), 2);
    }

    #[tokio::test]
    async fn test_merge_pushes_then_applies_locally() {
        let mut dir = directory_with(&[(1, "local-one"), (3, "local-three")]);
        let gateway = MockGateway::new(vec![
            Contractor::new(1, "cloud-one", None),
            Contractor::new(2, "cloud-two", None),
        ]);

        let outcome = run_cycle(&mut dir, Some(&gateway), &RetryPolicy::immediate())
            .await
            .unwrap();

        assert_eq!(outcome, SyncOutcome::Merged { total: 3, pulled: 2 });

        // Remote wins the id collision; union is sorted by id.
        let names: Vec<_> = dir.list().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["cloud-one", "cloud-two", "local-three"]);

        // Cloud copy matches what was applied locally.
        assert_eq!(gateway.remote(), dir.list().to_vec());
    }

    #[tokio::test]
    async fn test_duplicate_remote_names_collapse_before_merge() {
        let mut dir = directory_with(&[(1, "local")]);
        let gateway = MockGateway::new(vec![
            Contractor::new(2, "Acme", Some("First")),
            Contractor::new(3, "acme ", Some("Second")),
        ]);

        let outcome = run_cycle(&mut dir, Some(&gateway), &RetryPolicy::immediate())
            .await
            .unwrap();

        // Only the first remote "Acme" survives normalization.
        assert_eq!(outcome, SyncOutcome::Merged { total: 2, pulled: 1 });
        let acme: Vec<_> = dir
            .list()
            .iter()
            .filter(|c| c.name_matches("acme"))
            .collect();
        assert_eq!(acme.len(), 1);
        assert_eq!(acme[0].category, "First");
    }

    #[tokio::test]
    async fn test_pull_failure_leaves_local_untouched() {
        let mut dir = directory_with(&[(1, "A")]);
        let mut gateway = MockGateway::new(vec![Contractor::new(9, "remote", None)]);
        gateway.fail_pull = true;

        let result = run_cycle(&mut dir, Some(&gateway), &RetryPolicy::immediate()).await;

        assert!(matches!(result, Err(SyncError::Pull(_))));
        assert_eq!(dir.list()[0].name, "A");
    }

    #[tokio::test]
    async fn test_push_failure_does_not_apply_merge_locally() {
        let mut dir = directory_with(&[(1, "local")]);
        let mut gateway = MockGateway::new(vec![Contractor::new(1, "cloud", None)]);
        gateway.fail_push = true;

        let result = run_cycle(&mut dir, Some(&gateway), &RetryPolicy::immediate()).await;

        assert!(matches!(result, Err(SyncError::Push(_))));
        // Cycle aborted before the local overwrite.
        assert_eq!(dir.list()[0].name, "local");
    }
}
