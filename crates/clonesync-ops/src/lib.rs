//! Execution engine for clonesync.
//!
//! This crate carries out action plans against a destination through a
//! [`SyncTool`](clonesync_core::SyncTool): batch copies, batch deletes,
//! deepest-first directory purges and directory creation. [`RcloneCli`] is
//! the production tool, driving the `rclone` binary one blocking process per
//! call.

mod executor;
mod operation;
mod progress;
mod rclone;

pub use executor::Executor;
pub use operation::{DeleteFailureReason, OperationError};
pub use progress::{BatchOutcome, ExecutionReport, ItemOutcome, OperationType};
pub use rclone::{transfer_args, RcloneCli};
