//! Core types for clonesync.
//!
//! This crate provides the data model shared by the lister, differ, planner
//! and executor: listing entries, difference records, run configuration,
//! batch input, the per-run context and the interface to the external sync
//! tool.

mod batch;
mod config;
mod context;
mod difference;
mod entry;
mod error;
mod tool;

pub use batch::{read_batch, read_batch_file, BatchPair};
pub use config::{RunConfig, TransferOptions, TransferOptionsBuilder};
pub use context::{RunContext, RUN_STAMP_FORMAT};
pub use difference::{DiffKind, DifferenceRecord};
pub use entry::{ancestors, normalize_path, path_depth, ListingEntry, ModTime};
pub use error::{BatchError, ConfigError, ListError, ToolError};
pub use tool::{join_location, CommandOutput, ListingQuery, LsJsonItem, SyncTool};
