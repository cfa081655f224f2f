use taskview_core::EventError;
use taskview_storage::StorageError;

/// All errors that can escape the materializer.
///
/// Version conflicts never appear here -- they are absorbed by the retry
/// loop. What does escape aborts the current batch and is left to the
/// event source's redelivery mechanism; re-processing already-applied
/// events is safe because projection is idempotent.
#[derive(Debug, thiserror::Error)]
pub enum MaterializerError {
    /// A payload in the batch failed boundary validation. Fatal for the
    /// batch; there is no partial-batch skip-and-continue.
    #[error(transparent)]
    InvalidEvent(#[from] EventError),

    /// A non-conflict storage fault, propagated unchanged.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The conflict-retry bound was hit while reconciling one user's
    /// view; the view converges on redelivery.
    #[error(
        "gave up reconciling view {user_id} for task {task_id} after {attempts} conflict retries"
    )]
    RetryExhausted {
        user_id: String,
        task_id: String,
        attempts: u32,
    },
}
