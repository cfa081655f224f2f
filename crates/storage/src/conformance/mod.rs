//! Conformance test suite for `ViewStore` implementations.
//!
//! A backend-agnostic suite that any `ViewStore` implementation can run
//! to verify its compare-and-swap contract. The suite covers:
//!
//! - **read**: absent views read as `None`, written views read back intact
//! - **write**: create-if-absent and replace-if-unchanged, with the
//!   conflict cases for stale tokens, lost documents, and double creates
//! - **delete**: conditional delete, stale-token conflicts, absent
//!   documents
//! - **concurrent**: real `tokio::spawn` races where exactly one writer
//!   must win
//!
//! # Usage
//!
//! Backend crates call [`run_conformance_suite`] with a factory function
//! that creates a fresh, empty store for each test:
//!
//! ```ignore
//! use taskview_storage::conformance::run_conformance_suite;
//!
//! #[tokio::test]
//! async fn cosmos_conformance() {
//!     let report = run_conformance_suite(|| async {
//!         create_test_cosmos_store().await
//!     }).await;
//!     assert_eq!(report.failed, 0, "{report}");
//! }
//! ```

mod concurrent;
mod delete;
mod read;
mod write;

use std::fmt;
use std::future::Future;

use taskview_core::{TaskViewDocument, TaskViewEntry};

use crate::ViewStore;

/// Result of a single conformance test.
#[derive(Debug, Clone)]
pub struct TestResult {
    /// Test category (e.g. "read", "write", "concurrent").
    pub category: String,
    /// Test name (e.g. "create_conflicts_when_a_document_exists").
    pub name: String,
    /// Whether the test passed.
    pub passed: bool,
    /// Error message if the test failed.
    pub message: Option<String>,
}

impl TestResult {
    fn from_result(category: &str, name: &str, result: Result<(), String>) -> Self {
        let (passed, message) = match result {
            Ok(()) => (true, None),
            Err(msg) => (false, Some(msg)),
        };
        Self {
            category: category.to_string(),
            name: name.to_string(),
            passed,
            message,
        }
    }
}

/// Aggregated report from a full conformance suite run.
#[derive(Debug, Clone)]
pub struct ConformanceReport {
    pub results: Vec<TestResult>,
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Conformance: {}/{} passed ({} failed)",
            self.passed, self.total, self.failed
        )?;
        for r in &self.results {
            if !r.passed {
                writeln!(
                    f,
                    "  FAIL [{}/{}]: {}",
                    r.category,
                    r.name,
                    r.message.as_deref().unwrap_or("(no message)")
                )?;
            }
        }
        Ok(())
    }
}

/// Run the full conformance suite against a storage backend.
///
/// The `factory` function is called once per test to create a fresh,
/// empty store, ensuring test isolation.
pub async fn run_conformance_suite<S, F, Fut>(factory: F) -> ConformanceReport
where
    S: ViewStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.extend(read::run_read_tests(&factory).await);
    results.extend(write::run_write_tests(&factory).await);
    results.extend(delete::run_delete_tests(&factory).await);
    results.extend(concurrent::run_concurrent_tests(&factory).await);

    let passed = results.iter().filter(|r| r.passed).count();
    let total = results.len();

    ConformanceReport {
        results,
        passed,
        failed: total - passed,
        total,
    }
}

// ── Helpers: document constructors with sensible defaults ────────────────────

fn make_entry(task_id: &str, submittedby: Option<&str>) -> TaskViewEntry {
    TaskViewEntry {
        id: task_id.to_string(),
        task_type: "vacation".to_string(),
        summary: "conformance fixture".to_string(),
        submittedby: submittedby.map(str::to_owned),
    }
}

/// A view for `user_id` holding one submitted task, so fixtures never
/// persist an empty document.
fn make_view(user_id: &str, task_id: &str) -> TaskViewDocument {
    TaskViewDocument {
        id: user_id.to_string(),
        mytasks: vec![make_entry(task_id, None)],
        approvaltasks: Vec::new(),
    }
}
