//! The batch driver: decode a delivered batch and fan each event out to
//! every affected user's view.

use std::sync::Arc;

use taskview_core::TaskRecord;
use taskview_storage::ViewStore;

use crate::error::MaterializerError;
use crate::retry::RetryPolicy;
use crate::updater::apply_to_user;

/// Drives batches of task mutation events into a [`ViewStore`].
///
/// The store handle and the retry policy are passed in at construction;
/// there is no ambient client state. Events are processed sequentially in
/// delivery order -- in-order delivery per task id is the event source's
/// contract, and the driver must not reorder within it. Distinct
/// (event, user) pairs could safely run concurrently (each pair is
/// isolated to one document and its own CAS loop), but sequential
/// processing keeps the ordering reasoning trivial.
pub struct Materializer<S> {
    store: Arc<S>,
    policy: RetryPolicy,
}

impl<S: ViewStore> Materializer<S> {
    pub fn new(store: Arc<S>, policy: RetryPolicy) -> Self {
        Self { store, policy }
    }

    /// Process one delivered batch of raw event payloads, in delivery
    /// order. Zero-length batches are no-ops.
    ///
    /// The first failure aborts the batch: a malformed payload or a
    /// non-conflict storage fault surfaces to the event source, whose
    /// at-least-once contract redelivers the batch. Re-processing events
    /// that already reached storage is harmless because projection
    /// upserts and removes by task id.
    pub async fn process_batch(&self, batch: &[Vec<u8>]) -> Result<(), MaterializerError> {
        if batch.is_empty() {
            return Ok(());
        }
        tracing::info!(events = batch.len(), "processing task mutation batch");

        for payload in batch {
            let record = TaskRecord::from_slice(payload)?;
            self.process_record(&record).await?;
        }
        Ok(())
    }

    /// Apply one task mutation to every affected user's view, each to
    /// completion before the next.
    pub async fn process_record(&self, record: &TaskRecord) -> Result<(), MaterializerError> {
        for user_id in record.affected_users() {
            apply_to_user(self.store.as_ref(), &self.policy, user_id, record).await?;
        }
        Ok(())
    }
}
