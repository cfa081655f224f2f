use std::fmt;

use async_trait::async_trait;
use taskview_core::TaskViewDocument;

use crate::error::StorageError;

/// Opaque version token for optimistic concurrency.
///
/// The backend mints a fresh token on every successful write; a token is
/// only meaningful to the store that issued it. Holding a token between a
/// read and a conditional write is the sole ownership mechanism -- there
/// are no locks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version(String);

impl Version {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The storage trait for task-view backends.
///
/// A `ViewStore` holds at most one [`TaskViewDocument`] per user id, the
/// owning user id being the partition key. There are no cross-document
/// transactions; consistency is enforced entirely through single-document
/// compare-and-swap on the [`Version`] token.
///
/// ## OCC semantics
///
/// - `read` returns the current document together with its version token,
///   or `None` when the user has no document. Absence is a normal branch,
///   never an error.
/// - `write` with `expected = Some(v)` replaces the document only while
///   the stored token still equals `v`; a mismatch -- including a
///   concurrent delete -- is `StorageError::VersionConflict`.
/// - `write` with `expected = None` creates the document only if none
///   exists; an existing document is `VersionConflict`. An unconditional
///   create would let two racing first-writers silently overwrite each
///   other, so creation participates in the same conflict-and-retry
///   protocol as replacement.
/// - `delete` removes the document only while the stored token matches;
///   a stale token is `VersionConflict`, an absent document is
///   `StorageError::NotFound`.
///
/// ## Thread safety
///
/// Implementations must be `Send + Sync + 'static` so a single handle can
/// be shared across async tasks racing on the same views.
#[async_trait]
pub trait ViewStore: Send + Sync + 'static {
    /// Point-read one user's view document and its version token.
    async fn read(
        &self,
        user_id: &str,
    ) -> Result<Option<(TaskViewDocument, Version)>, StorageError>;

    /// Conditionally write a view document, returning the new token.
    ///
    /// `Some(v)` means replace-if-unchanged; `None` means
    /// create-if-absent. Both fail with `VersionConflict` when the
    /// condition does not hold.
    async fn write(
        &self,
        doc: &TaskViewDocument,
        expected: Option<&Version>,
    ) -> Result<Version, StorageError>;

    /// Conditionally delete one user's view document.
    async fn delete(&self, user_id: &str, expected: &Version) -> Result<(), StorageError>;
}
