//! The per-user denormalized view document.

use serde::{Deserialize, Serialize};

/// One pending task as it appears in a user's view.
///
/// `submittedby` is present exactly when the entry lives in
/// `approvaltasks` -- an approver needs to know who is asking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskViewEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub task_type: String,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submittedby: Option<String>,
}

/// The denormalized dashboard document for one user.
///
/// `id` is the owning user id and doubles as the storage partition key.
/// A document with both collections empty is never persisted; it is
/// deleted instead, so "no view document" and "no pending tasks" are the
/// same observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskViewDocument {
    pub id: String,
    /// Pending tasks this user submitted.
    #[serde(default)]
    pub mytasks: Vec<TaskViewEntry>,
    /// Pending tasks awaiting this user's approval.
    #[serde(default)]
    pub approvaltasks: Vec<TaskViewEntry>,
}

impl TaskViewDocument {
    /// A fresh, empty view for a user seen for the first time.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            id: user_id.into(),
            mytasks: Vec::new(),
            approvaltasks: Vec::new(),
        }
    }

    /// True when the document holds no entries at all and must not be
    /// persisted.
    pub fn is_empty(&self) -> bool {
        self.mytasks.is_empty() && self.approvaltasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_view_is_empty() {
        let view = TaskViewDocument::new("alice");
        assert_eq!(view.id, "alice");
        assert!(view.is_empty());
    }

    #[test]
    fn view_with_any_entry_is_not_empty() {
        let mut view = TaskViewDocument::new("bob");
        view.approvaltasks.push(TaskViewEntry {
            id: "t-1".to_string(),
            task_type: "invoice".to_string(),
            summary: "pay it".to_string(),
            submittedby: Some("alice".to_string()),
        });
        assert!(!view.is_empty());
    }

    #[test]
    fn owner_entries_omit_submittedby_on_the_wire() {
        let entry = TaskViewEntry {
            id: "t-1".to_string(),
            task_type: "vacation".to_string(),
            summary: "time off".to_string(),
            submittedby: None,
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("submittedby"));
    }

    #[test]
    fn missing_collections_deserialize_as_empty() {
        let view: TaskViewDocument = serde_json::from_str(r#"{"id": "carol"}"#).unwrap();
        assert!(view.is_empty());
    }
}
