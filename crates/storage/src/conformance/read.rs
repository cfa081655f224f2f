use std::future::Future;

use super::{make_view, TestResult};
use crate::ViewStore;

pub(super) async fn run_read_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: ViewStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "read",
            "absent_view_reads_as_none",
            absent_view_reads_as_none(factory).await,
        ),
        TestResult::from_result(
            "read",
            "written_view_reads_back_with_its_token",
            written_view_reads_back_with_its_token(factory).await,
        ),
        TestResult::from_result(
            "read",
            "reads_are_isolated_per_user",
            reads_are_isolated_per_user(factory).await,
        ),
    ]
}

/// A user with no view document reads as `None`, never as an error and
/// never as an empty document.
async fn absent_view_reads_as_none<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ViewStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    match store.read("nobody").await {
        Ok(None) => Ok(()),
        Ok(Some(_)) => Err("expected None for an absent view, got a document".to_string()),
        Err(e) => Err(format!("expected Ok(None), got error: {e}")),
    }
}

/// A created view reads back equal to what was written, and the read
/// token equals the token the write returned.
async fn written_view_reads_back_with_its_token<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ViewStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    let doc = make_view("alice", "t-1");

    let written = store
        .write(&doc, None)
        .await
        .map_err(|e| format!("create: {e}"))?;

    let (read_doc, read_version) = store
        .read("alice")
        .await
        .map_err(|e| format!("read: {e}"))?
        .ok_or("expected the created view, got None")?;

    if read_doc != doc {
        return Err("document did not read back equal to what was written".to_string());
    }
    if read_version != written {
        return Err(format!(
            "read token {read_version} does not match written token {written}"
        ));
    }
    Ok(())
}

/// Writing one user's view must not become visible under another user id.
async fn reads_are_isolated_per_user<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ViewStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    store
        .write(&make_view("alice", "t-1"), None)
        .await
        .map_err(|e| format!("create: {e}"))?;

    match store.read("bob").await {
        Ok(None) => Ok(()),
        Ok(Some(_)) => Err("bob read alice's document".to_string()),
        Err(e) => Err(format!("read bob: {e}")),
    }
}
