//! Differ and action planner for clonesync.
//!
//! This crate turns two listings into an ordered plan:
//!
//! - **Differ** - Compare listings in directory mode (presence only) or file
//!   mode (size and modification time at whole-second precision)
//! - **Planner** - Partition differences into copy and delete batches, order
//!   deletions deepest first and pre-compute parent directories
//!
//! Both stages are pure functions over their inputs.
//!
//! ```rust,ignore
//! use clonesync_analyze::{diff_listings, plan_actions, DiffSummary};
//!
//! let records = diff_listings(&source_files, &destination_files);
//! println!("{}", DiffSummary::from_records(&records));
//!
//! let plan = plan_actions(&records);
//! for path in &plan.delete_order {
//!     println!("delete {path}");
//! }
//! ```

mod diff;
mod plan;

pub use diff::{diff_directories, diff_listings, DiffSummary, DirectoryDiff};
pub use plan::{
    order_deepest_first, parent_dirs, plan_actions, plan_directories, prune_covered, ActionPlan,
};

// Re-export core types for convenience
pub use clonesync_core::{path_depth, DiffKind, DifferenceRecord, ListingEntry};
