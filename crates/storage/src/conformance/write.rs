use std::future::Future;

use super::{make_entry, make_view, TestResult};
use crate::{StorageError, ViewStore};

pub(super) async fn run_write_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: ViewStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "write",
            "create_succeeds_when_absent",
            create_succeeds_when_absent(factory).await,
        ),
        TestResult::from_result(
            "write",
            "create_conflicts_when_a_document_exists",
            create_conflicts_when_a_document_exists(factory).await,
        ),
        TestResult::from_result(
            "write",
            "replace_with_current_token_succeeds",
            replace_with_current_token_succeeds(factory).await,
        ),
        TestResult::from_result(
            "write",
            "replace_with_stale_token_conflicts",
            replace_with_stale_token_conflicts(factory).await,
        ),
        TestResult::from_result(
            "write",
            "replace_of_an_absent_document_conflicts",
            replace_of_an_absent_document_conflicts(factory).await,
        ),
    ]
}

async fn create_succeeds_when_absent<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ViewStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    store
        .write(&make_view("alice", "t-1"), None)
        .await
        .map(|_| ())
        .map_err(|e| format!("create failed: {e}"))
}

/// A second unconditional create must conflict, not overwrite -- this is
/// what keeps racing first-writers from losing each other's updates.
async fn create_conflicts_when_a_document_exists<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ViewStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    let first = make_view("alice", "t-1");
    store
        .write(&first, None)
        .await
        .map_err(|e| format!("first create: {e}"))?;

    match store.write(&make_view("alice", "t-2"), None).await {
        Err(StorageError::VersionConflict { .. }) => {}
        Ok(_) => return Err("second create succeeded; expected VersionConflict".to_string()),
        Err(e) => return Err(format!("expected VersionConflict, got: {e}")),
    }

    // The original document must be untouched.
    let (doc, _) = store
        .read("alice")
        .await
        .map_err(|e| format!("read back: {e}"))?
        .ok_or("document vanished after conflicting create")?;
    if doc != first {
        return Err("conflicting create modified the stored document".to_string());
    }
    Ok(())
}

/// Replace with the token from the latest read succeeds and mints a new
/// token.
async fn replace_with_current_token_succeeds<S, F, Fut>(factory: &F) -> Result<(), String>
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
    let v2 = store
        .write(&doc, Some(&v1))
        .await
        .map_err(|e| format!("replace: {e}"))?;

    if v2 == v1 {
        return Err("replace did not mint a fresh version token".to_string());
    }

    let (read_doc, read_version) = store
        .read("alice")
        .await
        .map_err(|e| format!("read: {e}"))?
        .ok_or("document missing after replace")?;
    if read_doc != doc {
        return Err("replace did not persist the new document".to_string());
    }
    if read_version != v2 {
        return Err("read token does not match the replace's token".to_string());
    }
    Ok(())
}

/// A token invalidated by an interleaved write must conflict and leave
/// the interleaved write in place.
async fn replace_with_stale_token_conflicts<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ViewStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    let doc = make_view("alice", "t-1");
    let v1 = store
        .write(&doc, None)
        .await
        .map_err(|e| format!("create: {e}"))?;

    let mut interleaved = doc.clone();
    interleaved.approvaltasks.push(make_entry("t-2", Some("bob")));
    store
        .write(&interleaved, Some(&v1))
        .await
        .map_err(|e| format!("interleaved replace: {e}"))?;

    let mut stale_attempt = doc.clone();
    stale_attempt.mytasks.push(make_entry("t-3", None));
    match store.write(&stale_attempt, Some(&v1)).await {
        Err(StorageError::VersionConflict { .. }) => {}
        Ok(_) => return Err("stale replace succeeded; expected VersionConflict".to_string()),
        Err(e) => return Err(format!("expected VersionConflict, got: {e}")),
    }

    let (read_doc, _) = store
        .read("alice")
        .await
        .map_err(|e| format!("read back: {e}"))?
        .ok_or("document missing after stale replace")?;
    if read_doc != interleaved {
        return Err("stale replace clobbered the interleaved write".to_string());
    }
    Ok(())
}

/// Replacing a document that was concurrently deleted conflicts, sending
/// the writer back to a fresh read.
async fn replace_of_an_absent_document_conflicts<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ViewStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    let doc = make_view("alice", "t-1");
    let v1 = store
        .write(&doc, None)
        .await
        .map_err(|e| format!("create: {e}"))?;
    store
        .delete("alice", &v1)
        .await
        .map_err(|e| format!("delete: {e}"))?;

    match store.write(&doc, Some(&v1)).await {
        Err(StorageError::VersionConflict { .. }) => Ok(()),
        Ok(_) => Err("replace of a deleted document succeeded".to_string()),
        Err(e) => Err(format!("expected VersionConflict, got: {e}")),
    }
}
