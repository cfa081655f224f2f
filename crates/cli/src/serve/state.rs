//! Application state shared across request handlers.

use std::collections::HashMap;
use std::sync::Arc;

use taskview_core::TaskRecord;
use taskview_storage::MemoryViewStore;
use tokio::sync::{mpsc, RwLock};

pub(crate) struct AppState {
    /// Stored tasks keyed by task id: the demo's source-of-truth store.
    pub(crate) tasks: RwLock<HashMap<String, TaskRecord>>,
    /// View store read by the dashboard endpoint and written by the
    /// materializer loop.
    pub(crate) views: Arc<MemoryViewStore>,
    /// In-process change feed; mutations accepted by the API are queued
    /// here for the materializer.
    pub(crate) feed: mpsc::Sender<TaskRecord>,
}
