//! The pure view projector: one task mutation applied to one user's view.

use crate::task::{TaskRecord, TaskStatus};
use crate::view::{TaskViewDocument, TaskViewEntry};

/// How a task relates to the user whose view is being projected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The user submitted the task; it belongs in `mytasks`.
    Owner,
    /// The user must approve the task; it belongs in `approvaltasks`.
    Approver,
}

/// Apply one task mutation to one user's current view, returning the new
/// desired view document.
///
/// - No current document means the user is seen for the first time; the
///   projection starts from an empty view.
/// - A `pending` task is upserted into the role-appropriate collection,
///   keyed by task id: a redelivered event replaces the existing entry
///   instead of duplicating it.
/// - A `complete` task removes any matching entry; removing an entry that
///   was never there is a no-op, so completions are idempotent and an
///   out-of-band `complete` with no prior `pending` is harmless.
///
/// Total and deterministic; the result may be empty, in which case the
/// caller deletes the stored document rather than persisting it.
pub fn project(
    user_id: &str,
    record: &TaskRecord,
    current: Option<TaskViewDocument>,
) -> TaskViewDocument {
    let mut view = current.unwrap_or_else(|| TaskViewDocument::new(user_id));
    let role = record.role_for(user_id);

    let tasks = match role {
        Role::Owner => &mut view.mytasks,
        Role::Approver => &mut view.approvaltasks,
    };

    match record.status {
        TaskStatus::Pending => {
            let entry = TaskViewEntry {
                id: record.id.clone(),
                task_type: record.task_type.clone(),
                summary: record.summary.clone(),
                submittedby: match role {
                    Role::Owner => None,
                    Role::Approver => Some(record.submittedby.clone()),
                },
            };
            match tasks.iter_mut().find(|existing| existing.id == record.id) {
                Some(existing) => *existing = entry,
                None => tasks.push(entry),
            }
        }
        TaskStatus::Complete => {
            tasks.retain(|existing| existing.id != record.id);
        }
    }

    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Approver;

    fn task(id: &str, status: TaskStatus) -> TaskRecord {
        TaskRecord {
            id: id.to_string(),
            task_type: "vacation".to_string(),
            status,
            submittedby: "alice".to_string(),
            summary: "two weeks off".to_string(),
            detail: String::new(),
            approvers: vec![Approver {
                id: "bob".to_string(),
                name: "Bob".to_string(),
            }],
            ttl: None,
            createddate: None,
            completeddate: None,
            extra: serde_json::Map::new(),
        }
    }

    #[test]
    fn pending_task_lands_in_mytasks_for_the_owner() {
        let view = project("alice", &task("t-1", TaskStatus::Pending), None);

        assert_eq!(view.id, "alice");
        assert_eq!(view.mytasks.len(), 1);
        assert!(view.approvaltasks.is_empty());
        assert_eq!(view.mytasks[0].id, "t-1");
        assert_eq!(view.mytasks[0].submittedby, None);
    }

    #[test]
    fn pending_task_lands_in_approvaltasks_with_submitter_for_an_approver() {
        let view = project("bob", &task("t-1", TaskStatus::Pending), None);

        assert!(view.mytasks.is_empty());
        assert_eq!(view.approvaltasks.len(), 1);
        assert_eq!(view.approvaltasks[0].id, "t-1");
        assert_eq!(
            view.approvaltasks[0].submittedby,
            Some("alice".to_string())
        );
    }

    #[test]
    fn redelivered_pending_replaces_instead_of_duplicating() {
        let first = project("bob", &task("t-1", TaskStatus::Pending), None);

        let mut updated = task("t-1", TaskStatus::Pending);
        updated.summary = "three weeks off".to_string();
        let second = project("bob", &updated, Some(first));

        assert_eq!(second.approvaltasks.len(), 1);
        assert_eq!(second.approvaltasks[0].summary, "three weeks off");
    }

    #[test]
    fn upsert_is_keyed_by_task_id_not_position() {
        let one = project("bob", &task("t-1", TaskStatus::Pending), None);
        let two = project("bob", &task("t-2", TaskStatus::Pending), Some(one));
        let three = project("bob", &task("t-1", TaskStatus::Pending), Some(two));

        let ids: Vec<&str> = three.approvaltasks.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["t-1", "t-2"]);
    }

    #[test]
    fn complete_removes_the_entry() {
        let pending = project("alice", &task("t-1", TaskStatus::Pending), None);
        let done = project("alice", &task("t-1", TaskStatus::Complete), Some(pending));
        assert!(done.is_empty());
    }

    #[test]
    fn complete_for_an_unknown_task_is_a_noop() {
        let view = project("alice", &task("t-9", TaskStatus::Complete), None);
        assert!(view.is_empty());
    }

    #[test]
    fn complete_only_touches_the_matching_task() {
        let one = project("alice", &task("t-1", TaskStatus::Pending), None);
        let two = project("alice", &task("t-2", TaskStatus::Pending), Some(one));
        let after = project("alice", &task("t-1", TaskStatus::Complete), Some(two));

        assert_eq!(after.mytasks.len(), 1);
        assert_eq!(after.mytasks[0].id, "t-2");
    }

    #[test]
    fn projection_is_deterministic() {
        let record = task("t-1", TaskStatus::Pending);
        assert_eq!(
            project("bob", &record, None),
            project("bob", &record, None)
        );
    }
}
