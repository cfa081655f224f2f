use std::future::Future;

use super::{make_entry, make_view, TestResult};
use crate::{StorageError, ViewStore};

pub(super) async fn run_delete_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: ViewStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "delete",
            "delete_with_current_token_removes_the_document",
            delete_with_current_token_removes_the_document(factory).await,
        ),
        TestResult::from_result(
            "delete",
            "delete_with_stale_token_conflicts",
            delete_with_stale_token_conflicts(factory).await,
        ),
        TestResult::from_result(
            "delete",
            "delete_of_an_absent_document_is_not_found",
            delete_of_an_absent_document_is_not_found(factory).await,
        ),
    ]
}

async fn delete_with_current_token_removes_the_document<S, F, Fut>(
    factory: &F,
) -> Result<(), String>
where
    S: ViewStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    let v1 = store
        .write(&make_view("alice", "t-1"), None)
        .await
        .map_err(|e| format!("create: {e}"))?;

    store
        .delete("alice", &v1)
        .await
        .map_err(|e| format!("delete: {e}"))?;

    match store.read("alice").await {
        Ok(None) => Ok(()),
        Ok(Some(_)) => Err("document still readable after delete".to_string()),
        Err(e) => Err(format!("read after delete: {e}")),
    }
}

/// A delete holding a token invalidated by an interleaved write must
/// conflict and leave the newer document in place.
async fn delete_with_stale_token_conflicts<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ViewStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    let mut doc = make_view("alice", "t-1");
    let v1 = store
        .write(&doc, None)
        .await
        .map_err(|e| format!("create: {e}"))?;

    doc.approvaltasks.push(make_entry("t-2", Some("bob")));
    store
        .write(&doc, Some(&v1))
        .await
        .map_err(|e| format!("interleaved replace: {e}"))?;

    match store.delete("alice", &v1).await {
        Err(StorageError::VersionConflict { .. }) => {}
        Ok(()) => return Err("stale delete succeeded; expected VersionConflict".to_string()),
        Err(e) => return Err(format!("expected VersionConflict, got: {e}")),
    }

    match store.read("alice").await {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err("stale delete removed the newer document".to_string()),
        Err(e) => Err(format!("read after stale delete: {e}")),
    }
}

async fn delete_of_an_absent_document_is_not_found<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ViewStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    let v1 = store
        .write(&make_view("alice", "t-1"), None)
        .await
        .map_err(|e| format!("create: {e}"))?;
    store
        .delete("alice", &v1)
        .await
        .map_err(|e| format!("first delete: {e}"))?;

    match store.delete("alice", &v1).await {
        Err(StorageError::NotFound { .. }) => Ok(()),
        Ok(()) => Err("second delete succeeded; expected NotFound".to_string()),
        Err(e) => Err(format!("expected NotFound, got: {e}")),
    }
}
