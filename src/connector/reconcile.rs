//! Role assignment reconciliation: fetch the current list, compute the
//! target list, replace it in one write.
//!
//! The remote list offers no compare-and-swap, so a grant or revoke racing
//! another writer for the same principal can lose an update. Per-principal
//! serialization is the caller's job. A failed write is not retried or
//! re-read.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::client::RingCentralClient;
use crate::error::{ApiError, SyncError};

/// Storage for per-principal role assignment lists.
#[async_trait]
pub trait AssignmentStore: Send + Sync {
    /// Role ids currently held by the principal, in remote order.
    async fn fetch_assignments(&self, principal_id: &str) -> Result<Vec<String>, ApiError>;

    /// Replace the principal's role ids with exactly `role_ids`.
    async fn replace_assignments(
        &self,
        principal_id: &str,
        role_ids: &[String],
    ) -> Result<(), ApiError>;
}

#[async_trait]
impl AssignmentStore for RingCentralClient {
    async fn fetch_assignments(&self, principal_id: &str) -> Result<Vec<String>, ApiError> {
        let roles = self.get_assigned_roles(principal_id).await?;
        Ok(roles.into_iter().map(|r| r.id).collect())
    }

    async fn replace_assignments(
        &self,
        principal_id: &str,
        role_ids: &[String],
    ) -> Result<(), ApiError> {
        self.replace_assigned_roles(principal_id, role_ids).await
    }
}

/// Target list for granting `role_id`: current roles in order, then `role_id`.
///
/// Fails without a write when the role is already held.
pub fn plan_grant(
    current: &[String],
    role_id: &str,
    principal_id: &str,
) -> Result<Vec<String>, SyncError> {
    if current.iter().any(|id| id == role_id) {
        return Err(SyncError::AlreadyAssigned {
            role_id: role_id.to_string(),
            principal_id: principal_id.to_string(),
        });
    }

    let mut target = dedup(current.iter().map(String::as_str));
    target.push(role_id.to_string());
    Ok(target)
}

/// Target list for revoking `role_id`: current roles in order, minus `role_id`.
pub fn plan_revoke(current: &[String], role_id: &str) -> Vec<String> {
    dedup(current.iter().map(String::as_str).filter(|id| *id != role_id))
}

/// Drop repeated ids, keeping first occurrences in order.
fn dedup<'a>(ids: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id))
        .map(String::from)
        .collect()
}

/// Applies grant/revoke to a principal's assignment list.
#[derive(Clone)]
pub struct RoleAssignmentReconciler {
    store: Arc<dyn AssignmentStore>,
}

impl RoleAssignmentReconciler {
    pub fn new(store: Arc<dyn AssignmentStore>) -> Self {
        Self { store }
    }

    /// Add `role_id` to the principal's roles.
    pub async fn grant(&self, principal_id: &str, role_id: &str) -> Result<(), SyncError> {
        // Read the current list; nothing is written if this fails
        let current = self.store.fetch_assignments(principal_id).await?;

        // Already held is a conflict, not a no-op
        let target = plan_grant(&current, role_id, principal_id)?;

        // Replace the whole list in one write
        self.store.replace_assignments(principal_id, &target).await?;
        info!("Granted role {} to user {}", role_id, principal_id);
        Ok(())
    }

    /// Remove `role_id` from the principal's roles.
    ///
    /// The write is issued even when the role was not held.
    pub async fn revoke(&self, principal_id: &str, role_id: &str) -> Result<(), SyncError> {
        let current = self.store.fetch_assignments(principal_id).await?;
        if !current.iter().any(|id| id == role_id) {
            warn!(
                "Role {} not assigned to user {}, rewriting list unchanged",
                role_id, principal_id
            );
        }

        // Write even when unchanged
        let target = plan_revoke(&current, role_id);
        self.store.replace_assignments(principal_id, &target).await?;
        info!("Revoked role {} from user {}", role_id, principal_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory store recording every write.
    #[derive(Default)]
    struct MemoryStore {
        pub lists: Mutex<HashMap<String, Vec<String>>>,
        pub writes: Mutex<Vec<(String, Vec<String>)>>,
        pub fail_fetch: bool,
        pub fail_write: bool,
    }

    impl MemoryStore {
        pub fn with(principal: &str, roles: &[&str]) -> Self {
            let store = Self::default();
            store.lists.lock().unwrap().insert(
                principal.to_string(),
                roles.iter().map(|r| r.to_string()).collect(),
            );
            store
        }

        pub fn roles(&self, principal: &str) -> Vec<String> {
            self.lists
                .lock()
                .unwrap()
                .get(principal)
                .cloned()
                .unwrap_or_default()
        }

        fn failure() -> ApiError {
            ApiError::Status {
                status: 503,
                method: "GET".into(),
                url: "memory://".into(),
                body: "unavailable".into(),
            }
        }
    }

    #[async_trait]
    impl AssignmentStore for MemoryStore {
        async fn fetch_assignments(&self, principal_id: &str) -> Result<Vec<String>, ApiError> {
            if self.fail_fetch {
                return Err(Self::failure());
            }
            Ok(self.roles(principal_id))
        }

        async fn replace_assignments(
            &self,
            principal_id: &str,
            role_ids: &[String],
        ) -> Result<(), ApiError> {
            self.writes
                .lock()
                .unwrap()
                .push((principal_id.to_string(), role_ids.to_vec()));
            if self.fail_write {
                return Err(Self::failure());
            }
            self.lists
                .lock()
                .unwrap()
                .insert(principal_id.to_string(), role_ids.to_vec());
            Ok(())
        }
    }

    fn ids(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn reconciler(store: &Arc<MemoryStore>) -> RoleAssignmentReconciler {
        RoleAssignmentReconciler::new(store.clone())
    }

    #[test]
    fn test_plan_grant_appends() {
        let target = plan_grant(&ids(&["role1", "role2"]), "role3", "1001").unwrap();
        assert_eq!(target, ids(&["role1", "role2", "role3"]));
    }

    #[test]
    fn test_plan_grant_conflict() {
        let err = plan_grant(&ids(&["role1", "role2"]), "role2", "1001").unwrap_err();
        match err {
            SyncError::AlreadyAssigned {
                role_id,
                principal_id,
            } => {
                assert_eq!(role_id, "role2");
                assert_eq!(principal_id, "1001");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_plan_revoke() {
        assert_eq!(
            plan_revoke(&ids(&["a", "b", "c"]), "b"),
            ids(&["a", "c"])
        );
        assert_eq!(plan_revoke(&ids(&["a", "c"]), "b"), ids(&["a", "c"]));
        assert!(plan_revoke(&ids(&["a"]), "a").is_empty());
    }

    #[test]
    fn test_plans_never_duplicate() {
        let current = ids(&["a", "b", "a"]);
        assert_eq!(plan_grant(&current, "c", "1").unwrap(), ids(&["a", "b", "c"]));
        assert_eq!(plan_revoke(&current, "b"), ids(&["a"]));
    }

    #[tokio::test]
    async fn test_grant_conflict_issues_no_write() {
        let store = Arc::new(MemoryStore::with("1001", &["A", "B"]));
        let result = reconciler(&store).grant("1001", "B").await;

        assert!(matches!(result, Err(SyncError::AlreadyAssigned { .. })));
        assert!(store.writes.lock().unwrap().is_empty());
        assert_eq!(store.roles("1001"), ids(&["A", "B"]));
    }

    #[tokio::test]
    async fn test_revoke_absent_still_writes() {
        let store = Arc::new(MemoryStore::with("1001", &["A", "B"]));
        reconciler(&store).revoke("1001", "C").await.unwrap();

        let writes = store.writes.lock().unwrap();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].1, ids(&["A", "B"]));
        drop(writes);
        assert_eq!(store.roles("1001"), ids(&["A", "B"]));
    }

    #[tokio::test]
    async fn test_grant_then_revoke_round_trip() {
        let store = Arc::new(MemoryStore::with("1001", &["A", "B"]));
        let reconciler = reconciler(&store);

        reconciler.grant("1001", "C").await.unwrap();
        assert_eq!(store.roles("1001"), ids(&["A", "B", "C"]));

        reconciler.revoke("1001", "C").await.unwrap();
        assert_eq!(store.roles("1001"), ids(&["A", "B"]));
    }

    #[tokio::test]
    async fn test_revoke_last_role_writes_empty_list() {
        let store = Arc::new(MemoryStore::with("1001", &["A"]));
        reconciler(&store).revoke("1001", "A").await.unwrap();

        let writes = store.writes.lock().unwrap();
        assert_eq!(writes.len(), 1);
        assert!(writes[0].1.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts_before_write() {
        let store = Arc::new(MemoryStore {
            fail_fetch: true,
            ..MemoryStore::with("1001", &["A"])
        });
        let reconciler = reconciler(&store);

        assert!(reconciler.grant("1001", "B").await.unwrap_err().is_transport());
        assert!(reconciler.revoke("1001", "A").await.unwrap_err().is_transport());
        assert!(store.writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_write_failure_surfaces() {
        let store = Arc::new(MemoryStore {
            fail_write: true,
            ..MemoryStore::with("1001", &["A"])
        });
        let err = reconciler(&store).grant("1001", "B").await.unwrap_err();

        assert!(err.is_transport());
        assert_eq!(store.writes.lock().unwrap().len(), 1);
    }
}
