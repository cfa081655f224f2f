//! `taskview serve` -- HTTP JSON API for the task-approval demo.
//!
//! Exposes the task endpoints and the per-user dashboard views as an
//! async HTTP service using `axum` + `tokio`. Task mutations accepted by
//! the API are queued on an in-process change feed and drained by a
//! spawned materializer loop, which keeps the view store consistent with
//! the pending tasks.
//!
//! Endpoints:
//! - GET  /health           - Server status
//! - PUT  /tasks            - Create or update a task (returns the task id)
//! - GET  /tasks/{id}       - One stored task
//! - GET  /views/{userid}   - One user's task view document
//!
//! All responses use Content-Type: application/json. CORS is permissive
//! for local dev.

mod handlers;
mod state;

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::{Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::{Json, Router};
use tokio::sync::{mpsc, RwLock};
use tower_http::cors::{Any, CorsLayer};

use taskview_materializer::{Materializer, RetryPolicy};
use taskview_storage::MemoryViewStore;

use self::handlers::{
    handle_get_task, handle_get_view, handle_health, handle_not_found, handle_put_task,
};
use self::state::AppState;

/// Retention window for completed task records: 5 minutes, after which
/// the source store may purge them.
const COMPLETED_TASK_TTL_SECS: i64 = 60 * 5;

/// Capacity of the in-process change feed.
const FEED_CAPACITY: usize = 256;

/// Construct a JSON error response with the given status code and message.
fn json_error(status: StatusCode, message: &str) -> impl IntoResponse {
    (status, Json(serde_json::json!({"error": message})))
}

/// RFC 3339 timestamp for stamping created/completed dates.
fn now_rfc3339() -> String {
    let now = time::OffsetDateTime::now_utc();
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
        now.year(),
        now.month() as u8,
        now.day(),
        now.hour(),
        now.minute(),
        now.second()
    )
}

/// Start the HTTP server on the given port.
///
/// The materializer's conflict-retry bound can be overridden via the
/// TASKVIEW_RETRY_MAX env var.
pub async fn start_server(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let mut policy = RetryPolicy::default();
    if let Some(max) = std::env::var("TASKVIEW_RETRY_MAX")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
    {
        policy.max_attempts = Some(max);
    }

    let views = Arc::new(MemoryViewStore::new());
    let (feed_tx, mut feed_rx) = mpsc::channel(FEED_CAPACITY);

    // Drain loop: the in-process stand-in for the source store's change
    // feed. A failed mutation is logged and dropped here; redelivery
    // policy belongs to a real event source, not the demo loop.
    let materializer = Materializer::new(views.clone(), policy);
    tokio::spawn(async move {
        while let Some(record) = feed_rx.recv().await {
            if let Err(e) = materializer.process_record(&record).await {
                tracing::error!(task_id = %record.id, error = %e, "failed to apply task mutation");
            }
        }
    });

    let state = Arc::new(AppState {
        tasks: RwLock::new(HashMap::new()),
        views,
        feed: feed_tx,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::PUT])
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(handle_health))
        .route("/tasks", put(handle_put_task))
        .route("/tasks/{id}", get(handle_get_task))
        .route("/views/{userid}", get(handle_get_view))
        .fallback(handle_not_found)
        .layer(cors)
        .with_state(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    eprintln!("taskview listening on http://0.0.0.0:{}", port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    eprintln!("\nServer shut down.");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
    eprintln!("\nReceived shutdown signal...");
}
