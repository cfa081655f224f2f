//! The optimistic view updater: one (task event, user) pair reconciled
//! against storage.

use taskview_core::{project, TaskRecord};
use taskview_storage::{StorageError, ViewStore};

use crate::error::MaterializerError;
use crate::retry::RetryPolicy;

/// Make one user's persisted view reflect one task mutation.
///
/// The compare-and-swap loop:
///
/// 1. Read the current view document and its version token.
/// 2. Project the mutation onto it.
/// 3. Non-empty candidate: conditional write (create when nothing was
///    read, replace under the token otherwise). Empty candidate:
///    conditional delete -- an empty view document is never persisted.
/// 4. On a version conflict, discard the candidate, wait out the
///    policy's backoff, and restart from a fresh read.
///
/// A delete that finds the document already gone is success, and an
/// empty candidate with nothing stored needs no storage call at all (a
/// completion for a user who never had a view). Any other storage error
/// propagates unchanged.
///
/// On success the persisted view reflects this mutation merged with
/// whatever concurrent writers did; a write that loses the race is
/// always recomputed against the latest state, so this writer's change
/// is never lost.
pub async fn apply_to_user<S: ViewStore>(
    store: &S,
    policy: &RetryPolicy,
    user_id: &str,
    record: &TaskRecord,
) -> Result<(), MaterializerError> {
    let mut attempts: u32 = 0;
    loop {
        let (current, version) = match store.read(user_id).await? {
            Some((doc, version)) => (Some(doc), Some(version)),
            None => (None, None),
        };

        let candidate = project(user_id, record, current);

        let conflict = if candidate.is_empty() {
            let Some(version) = version else {
                // Nothing stored, nothing to store.
                return Ok(());
            };
            match store.delete(user_id, &version).await {
                Ok(()) | Err(StorageError::NotFound { .. }) => {
                    tracing::info!(user_id, task_id = %record.id, "deleted empty view document");
                    return Ok(());
                }
                Err(e) => e,
            }
        } else {
            match store.write(&candidate, version.as_ref()).await {
                Ok(_) => {
                    tracing::info!(
                        user_id,
                        task_id = %record.id,
                        status = ?record.status,
                        created = version.is_none(),
                        "updated view document"
                    );
                    return Ok(());
                }
                Err(e) => e,
            }
        };

        match conflict {
            StorageError::VersionConflict { .. } => {
                attempts += 1;
                if policy.exhausted(attempts) {
                    return Err(MaterializerError::RetryExhausted {
                        user_id: user_id.to_string(),
                        task_id: record.id.clone(),
                        attempts,
                    });
                }
                tracing::debug!(user_id, task_id = %record.id, attempts, "version conflict, re-reading");
                tokio::time::sleep(policy.next_delay(attempts)).await;
            }
            other => return Err(other.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use taskview_core::{Approver, TaskStatus, TaskViewDocument};
    use taskview_storage::{MemoryViewStore, Version};

    fn task(id: &str, status: TaskStatus) -> TaskRecord {
        TaskRecord {
            id: id.to_string(),
            task_type: "invoice".to_string(),
            status,
            submittedby: "alice".to_string(),
            summary: "pay vendor".to_string(),
            detail: String::new(),
            approvers: vec![Approver {
                id: "bob".to_string(),
                name: "Bob".to_string(),
            }],
            ttl: None,
            createddate: None,
            completeddate: None,
            extra: serde_json::Map::new(),
        }
    }

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts: Some(max_attempts),
            base_delay: Duration::ZERO,
            jitter: false,
            ..RetryPolicy::default()
        }
    }

    /// Store wrapper that fails the first `conflicts` mutating calls
    /// with VersionConflict, then delegates to the in-memory store.
    struct ConflictingStore {
        inner: MemoryViewStore,
        remaining: AtomicU32,
        writes: AtomicU32,
    }

    impl ConflictingStore {
        fn new(conflicts: u32) -> Self {
            Self {
                inner: MemoryViewStore::new(),
                remaining: AtomicU32::new(conflicts),
                writes: AtomicU32::new(0),
            }
        }

        fn take_conflict(&self, user_id: &str) -> Option<StorageError> {
            let stale = self
                .remaining
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            stale.then(|| StorageError::VersionConflict {
                user_id: user_id.to_string(),
            })
        }
    }

    #[async_trait]
    impl ViewStore for ConflictingStore {
        async fn read(
            &self,
            user_id: &str,
        ) -> Result<Option<(TaskViewDocument, Version)>, StorageError> {
            self.inner.read(user_id).await
        }

        async fn write(
            &self,
            doc: &TaskViewDocument,
            expected: Option<&Version>,
        ) -> Result<Version, StorageError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            if let Some(conflict) = self.take_conflict(&doc.id) {
                return Err(conflict);
            }
            self.inner.write(doc, expected).await
        }

        async fn delete(&self, user_id: &str, expected: &Version) -> Result<(), StorageError> {
            if let Some(conflict) = self.take_conflict(user_id) {
                return Err(conflict);
            }
            self.inner.delete(user_id, expected).await
        }
    }

    #[tokio::test]
    async fn pending_event_creates_the_view() {
        let store = MemoryViewStore::new();
        apply_to_user(&store, &fast_policy(4), "bob", &task("t-1", TaskStatus::Pending))
            .await
            .unwrap();

        let (view, _) = store.read("bob").await.unwrap().unwrap();
        assert_eq!(view.approvaltasks.len(), 1);
        assert_eq!(view.approvaltasks[0].id, "t-1");
    }

    #[tokio::test]
    async fn conflicts_are_retried_until_the_write_lands() {
        let store = ConflictingStore::new(2);
        apply_to_user(&store, &fast_policy(8), "bob", &task("t-1", TaskStatus::Pending))
            .await
            .unwrap();

        assert_eq!(store.writes.load(Ordering::SeqCst), 3);
        let (view, _) = store.read("bob").await.unwrap().unwrap();
        assert_eq!(view.approvaltasks.len(), 1);
    }

    #[tokio::test]
    async fn exhausting_the_retry_budget_surfaces_the_failure() {
        let store = ConflictingStore::new(u32::MAX);
        let err = apply_to_user(&store, &fast_policy(3), "bob", &task("t-1", TaskStatus::Pending))
            .await
            .unwrap_err();

        match err {
            MaterializerError::RetryExhausted {
                user_id,
                task_id,
                attempts,
            } => {
                assert_eq!(user_id, "bob");
                assert_eq!(task_id, "t-1");
                assert_eq!(attempts, 3);
            }
            other => panic!("expected RetryExhausted, got: {other}"),
        }
    }

    #[tokio::test]
    async fn completion_for_a_user_with_no_view_touches_nothing() {
        let store = ConflictingStore::new(0);
        apply_to_user(&store, &fast_policy(4), "bob", &task("t-1", TaskStatus::Complete))
            .await
            .unwrap();

        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
        assert!(store.read("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn completing_the_only_task_deletes_the_document() {
        let store = MemoryViewStore::new();
        let policy = fast_policy(4);
        apply_to_user(&store, &policy, "bob", &task("t-1", TaskStatus::Pending))
            .await
            .unwrap();
        apply_to_user(&store, &policy, "bob", &task("t-1", TaskStatus::Complete))
            .await
            .unwrap();

        assert!(store.read("bob").await.unwrap().is_none());
    }

    /// A backend fault that is not a version conflict must not be
    /// retried.
    #[tokio::test]
    async fn backend_faults_propagate_without_retry() {
        struct FailingStore;

        #[async_trait]
        impl ViewStore for FailingStore {
            async fn read(
                &self,
                _user_id: &str,
            ) -> Result<Option<(TaskViewDocument, Version)>, StorageError> {
                Err(StorageError::Backend("throttled".to_string()))
            }

            async fn write(
                &self,
                _doc: &TaskViewDocument,
                _expected: Option<&Version>,
            ) -> Result<Version, StorageError> {
                unreachable!("read already failed")
            }

            async fn delete(
                &self,
                _user_id: &str,
                _expected: &Version,
            ) -> Result<(), StorageError> {
                unreachable!("read already failed")
            }
        }

        let err = apply_to_user(
            &FailingStore,
            &fast_policy(4),
            "bob",
            &task("t-1", TaskStatus::Pending),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            MaterializerError::Storage(StorageError::Backend(_))
        ));
    }
}
