//! HTTP route handlers: health, tasks, views.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::Value;
use uuid::Uuid;

use taskview_core::TaskRecord;
use taskview_storage::ViewStore;

use super::state::AppState;
use super::{json_error, now_rfc3339, COMPLETED_TASK_TTL_SECS};

/// Fallback handler for unmatched routes.
pub(crate) async fn handle_not_found() -> impl IntoResponse {
    json_error(StatusCode::NOT_FOUND, "not found")
}

/// GET /health
pub(crate) async fn handle_health() -> impl IntoResponse {
    let response = serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    });
    (StatusCode::OK, Json(response))
}

/// PUT /tasks
///
/// Create or update a task. A new task (no `id` in the payload) gets a
/// server-minted UUID and a `createddate`; a completed task gets a
/// retention `ttl` and a `completeddate`. The stored record is queued on
/// the change feed for the materializer.
pub(crate) async fn handle_put_task(
    State(state): State<Arc<AppState>>,
    Json(mut payload): Json<Value>,
) -> impl IntoResponse {
    let Some(task) = payload.as_object_mut() else {
        return json_error(StatusCode::BAD_REQUEST, "task payload must be a JSON object")
            .into_response();
    };

    if !task.contains_key("id") {
        task.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
        // The client data generator may stamp dates itself to simulate
        // date ranges; only fill in what is missing.
        if !task.contains_key("createddate") {
            task.insert("createddate".to_string(), Value::String(now_rfc3339()));
        }
    }

    // A completed record is left for the change feed to propagate, then
    // purged by the source store after the retention window.
    if task.get("status").and_then(Value::as_str) == Some("complete") {
        task.insert("ttl".to_string(), Value::from(COMPLETED_TASK_TTL_SECS));
        if !task.contains_key("completeddate") {
            task.insert("completeddate".to_string(), Value::String(now_rfc3339()));
        }
    }

    let record = match TaskRecord::from_value(payload) {
        Ok(record) => record,
        Err(e) => return json_error(StatusCode::BAD_REQUEST, &e.to_string()).into_response(),
    };

    state
        .tasks
        .write()
        .await
        .insert(record.id.clone(), record.clone());

    let id = record.id.clone();
    if state.feed.send(record).await.is_err() {
        return json_error(StatusCode::INTERNAL_SERVER_ERROR, "change feed unavailable")
            .into_response();
    }

    tracing::info!(task_id = %id, "accepted task mutation");
    (StatusCode::OK, Json(serde_json::json!({ "id": id }))).into_response()
}

/// GET /tasks/{id}
pub(crate) async fn handle_get_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let tasks = state.tasks.read().await;
    match tasks.get(&id) {
        Some(task) => (StatusCode::OK, Json(task.clone())).into_response(),
        None => {
            json_error(StatusCode::NOT_FOUND, &format!("task '{}' not found", id)).into_response()
        }
    }
}

/// GET /views/{userid}
///
/// A user with no pending tasks has no view document, so an absent
/// document is a plain 404, not an empty view.
pub(crate) async fn handle_get_view(
    State(state): State<Arc<AppState>>,
    Path(userid): Path<String>,
) -> impl IntoResponse {
    match state.views.read(&userid).await {
        Ok(Some((doc, _))) => (StatusCode::OK, Json(doc)).into_response(),
        Ok(None) => json_error(
            StatusCode::NOT_FOUND,
            &format!("no task view for user '{}'", userid),
        )
        .into_response(),
        Err(e) => json_error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()).into_response(),
    }
}
