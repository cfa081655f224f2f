//! The canonical task payload and its boundary validation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::project::Role;

/// Lifecycle status of a task as observed by the view materializer.
///
/// `Pending -> Complete` is the only transition; `Complete` is terminal.
/// Any other wire value is rejected at the event boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Complete,
}

/// A user who must approve a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approver {
    pub id: String,
    pub name: String,
}

/// The canonical task payload. The stored task and the change-feed event
/// are the same shape.
///
/// Known fields are typed; anything type-specific (`vacationdays`,
/// `invoiceamount`, ...) rides in the `extra` bag and round-trips
/// untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: String,
    /// Open-ended task kind tag, e.g. "vacation" or "invoice".
    #[serde(rename = "type")]
    pub task_type: String,
    pub status: TaskStatus,
    /// User id of the submitter.
    pub submittedby: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub detail: String,
    /// A well-formed task names at least one approver, but a record with
    /// none is still processable (the affected set is the submitter alone).
    #[serde(default)]
    pub approvers: Vec<Approver>,
    /// Retention hint in seconds: a completed record is due for physical
    /// removal from the source store after this window. Carried opaquely;
    /// the purge itself is the source store's concern.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<i64>,
    /// RFC 3339 timestamp string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub createddate: Option<String>,
    /// RFC 3339 timestamp string. None until the task completes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completeddate: Option<String>,
    /// Open extension bag for type-specific fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A task event that failed boundary validation: not JSON, not an object,
/// a missing required field, or an unknown status value.
#[derive(Debug, thiserror::Error)]
#[error("malformed task event: {0}")]
pub struct EventError(#[from] serde_json::Error);

impl TaskRecord {
    /// Decode and validate one raw change-feed payload.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, EventError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Decode and validate an already-parsed JSON payload.
    pub fn from_value(value: Value) -> Result<Self, EventError> {
        Ok(serde_json::from_value(value)?)
    }

    /// The users whose view this mutation touches: the submitter first,
    /// then the approvers in declaration order, duplicates skipped.
    pub fn affected_users(&self) -> Vec<&str> {
        let mut users = vec![self.submittedby.as_str()];
        for approver in &self.approvers {
            if !users.contains(&approver.id.as_str()) {
                users.push(approver.id.as_str());
            }
        }
        users
    }

    /// How this task relates to the given user's view.
    pub fn role_for(&self, user_id: &str) -> Role {
        if self.submittedby == user_id {
            Role::Owner
        } else {
            Role::Approver
        }
    }
}
