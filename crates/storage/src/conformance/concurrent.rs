use std::future::Future;
use std::sync::Arc;

use super::{make_entry, make_view, TestResult};
use crate::{StorageError, ViewStore};

/// Number of concurrent tasks to spawn in each test.
const N: usize = 10;

pub(super) async fn run_concurrent_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: ViewStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "concurrent",
            "concurrent_replaces_exactly_one_wins",
            concurrent_replaces_exactly_one_wins(factory).await,
        ),
        TestResult::from_result(
            "concurrent",
            "concurrent_creates_exactly_one_wins",
            concurrent_creates_exactly_one_wins(factory).await,
        ),
        TestResult::from_result(
            "concurrent",
            "concurrent_writes_to_distinct_users_all_succeed",
            concurrent_writes_to_distinct_users_all_succeed(factory).await,
        ),
    ]
}

// ── Concurrent replace: exactly one wins ────────────────────────────────────

/// N tasks all hold the same version token and race a conditional
/// replace. Exactly one commit succeeds; the rest must get
/// VersionConflict. `tokio::spawn` makes this a real race against the
/// CAS check, not a sequential simulation.
async fn concurrent_replaces_exactly_one_wins<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ViewStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = Arc::new(factory().await);
    let base = make_view("bob", "t-0");
    let token = store
        .write(&base, None)
        .await
        .map_err(|e| format!("create: {e}"))?;

    let mut handles = Vec::new();
    for i in 0..N {
        let s = store.clone();
        let token = token.clone();
        let mut candidate = base.clone();
        candidate
            .approvaltasks
            .push(make_entry(&format!("t-{i}"), Some("alice")));
        handles.push(tokio::spawn(async move {
            match s.write(&candidate, Some(&token)).await {
                Ok(_) => Ok(true), // won the race
                Err(StorageError::VersionConflict { .. }) => Ok(false), // lost
                Err(e) => Err(e),
            }
        }));
    }

    let mut winners = 0usize;
    for handle in handles {
        let won = handle
            .await
            .map_err(|e| format!("task panic: {e}"))?
            .map_err(|e: StorageError| format!("storage error: {e}"))?;
        if won {
            winners += 1;
        }
    }

    if winners != 1 {
        return Err(format!("expected exactly 1 winner, got {winners}"));
    }

    // The stored document must be one of the candidates, not a blend.
    let (doc, _) = store
        .read("bob")
        .await
        .map_err(|e| format!("read: {e}"))?
        .ok_or("document missing after the race")?;
    if doc.approvaltasks.len() != 1 {
        return Err(format!(
            "expected exactly one approval entry after the race, got {}",
            doc.approvaltasks.len()
        ));
    }
    Ok(())
}

// ── Concurrent create: exactly one wins ─────────────────────────────────────

/// N tasks each attempt to create the same user's first document.
/// Exactly one succeeds; the rest must get VersionConflict.
async fn concurrent_creates_exactly_one_wins<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ViewStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = Arc::new(factory().await);

    let mut handles = Vec::new();
    for i in 0..N {
        let s = store.clone();
        let doc = make_view("bob", &format!("t-{i}"));
        handles.push(tokio::spawn(async move {
            match s.write(&doc, None).await {
                Ok(_) => Ok(true),
                Err(StorageError::VersionConflict { .. }) => Ok(false),
                Err(e) => Err(e),
            }
        }));
    }

    let mut winners = 0usize;
    for handle in handles {
        let won = handle
            .await
            .map_err(|e| format!("task panic: {e}"))?
            .map_err(|e: StorageError| format!("storage error: {e}"))?;
        if won {
            winners += 1;
        }
    }

    if winners != 1 {
        return Err(format!("expected exactly 1 winner, got {winners}"));
    }
    Ok(())
}

// ── Concurrent writes to distinct users: all succeed ────────────────────────

/// N tasks each create a different user's document. All should succeed --
/// no false conflicts when there is no contention.
async fn concurrent_writes_to_distinct_users_all_succeed<S, F, Fut>(
    factory: &F,
) -> Result<(), String>
where
    S: ViewStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = Arc::new(factory().await);

    let mut handles = Vec::new();
    for i in 0..N {
        let s = store.clone();
        let doc = make_view(&format!("user-{i}"), "t-1");
        handles.push(tokio::spawn(async move {
            s.write(&doc, None).await.map(|_| ())
        }));
    }

    for (i, handle) in handles.into_iter().enumerate() {
        handle
            .await
            .map_err(|e| format!("task {i} panic: {e}"))?
            .map_err(|e| format!("task {i} failed: {e}"))?;
    }

    for i in 0..N {
        let user = format!("user-{i}");
        match store.read(&user).await {
            Ok(Some(_)) => {}
            Ok(None) => return Err(format!("{user}: document missing after create")),
            Err(e) => return Err(format!("{user}: read failed: {e}")),
        }
    }
    Ok(())
}
