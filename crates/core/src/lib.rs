//! taskview-core: data model and pure logic for the task-view system.
//!
//! Tasks are approval-style work items: a submitter creates a task naming
//! one or more approvers, and the task is later marked complete. Every
//! affected user has a denormalized [`TaskViewDocument`] listing the
//! pending tasks they submitted and the pending tasks awaiting their
//! approval, so dashboards are a single point read instead of a scan over
//! all tasks.
//!
//! This crate holds only data types and pure functions:
//!
//! - [`TaskRecord`] -- the canonical task payload, also the change-feed
//!   event shape, with boundary validation via [`TaskRecord::from_slice`]
//! - [`TaskViewDocument`] / [`TaskViewEntry`] -- the per-user view
//! - [`project()`] -- the pure view projector: one task mutation applied
//!   to one user's current view
//!
//! No I/O, no async. Storage and orchestration live in `taskview-storage`
//! and `taskview-materializer`.

pub mod project;
pub mod task;
pub mod view;

pub use project::{project, Role};
pub use task::{Approver, EventError, TaskRecord, TaskStatus};
pub use view::{TaskViewDocument, TaskViewEntry};
