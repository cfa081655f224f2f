//! taskview-materializer: keeps per-user view documents consistent with
//! the stream of task mutation events.
//!
//! The materializer consumes batches of task mutations delivered
//! at-least-once, with ordering guaranteed only among events of the same
//! task id, and reconciles every affected user's [view document] through
//! a compare-and-swap retry loop against a [`ViewStore`]. There is no
//! cross-document atomicity: each (event, user) pair is reconciled
//! independently, and consistency is eventual once all affected users
//! have been processed.
//!
//! - [`Materializer`] -- the batch driver: decode, fan out to affected
//!   users, reconcile each to completion
//! - [`apply_to_user`] -- the optimistic updater for one (event, user)
//!   pair: read, project, conditional write/delete, retry on conflict
//! - [`RetryPolicy`] -- bounded, jittered backoff between conflict
//!   retries
//!
//! [view document]: taskview_core::TaskViewDocument
//! [`ViewStore`]: taskview_storage::ViewStore

mod driver;
mod error;
mod retry;
mod updater;

pub use driver::Materializer;
pub use error::MaterializerError;
pub use retry::RetryPolicy;
pub use updater::apply_to_user;
