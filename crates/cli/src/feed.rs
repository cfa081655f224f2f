//! `taskview feed` -- apply a batch of task events offline.
//!
//! Reads a JSON array of task mutation events, runs them through a
//! `Materializer` over a fresh in-memory store, and prints every
//! resulting view document as a JSON object keyed by user id.

use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use taskview_materializer::{Materializer, RetryPolicy};
use taskview_storage::{MemoryViewStore, ViewStore};

pub(crate) async fn run(events_path: &Path) -> Result<(), Box<dyn Error>> {
    let raw = std::fs::read_to_string(events_path)?;
    let events: Vec<serde_json::Value> = serde_json::from_str(&raw)?;
    let batch: Vec<Vec<u8>> = events
        .iter()
        .map(serde_json::to_vec)
        .collect::<Result<_, _>>()?;

    let store = Arc::new(MemoryViewStore::new());
    let materializer = Materializer::new(store.clone(), RetryPolicy::default());
    materializer.process_batch(&batch).await?;

    let mut views = serde_json::Map::new();
    for user_id in store.user_ids() {
        if let Some((doc, _)) = store.read(&user_id).await? {
            views.insert(user_id, serde_json::to_value(doc)?);
        }
    }
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::Value::Object(views))?
    );
    Ok(())
}
