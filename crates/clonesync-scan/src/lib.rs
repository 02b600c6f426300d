//! Structure lister for clonesync.
//!
//! Lists the full subtree under a location through a [`SyncTool`] and
//! normalizes the result into typed [`ListingEntry`] values. Two modes are
//! supported:
//!
//! - **Directories**: a sorted set of directory paths, for presence-only
//!   reconciliation.
//! - **Files**: files with size, modification time and hash, for
//!   attribute-aware reconciliation.
//!
//! When the tool has no structured listing call, the lister runs the raw
//! `lsjson` command and parses its JSON output; both paths produce the same
//! entries.
//!
//! # Example
//!
//! ```rust,ignore
//! use clonesync_scan::{ListingMode, StructureLister};
//!
//! let lister = StructureLister::new(&tool, &ctx);
//! let dirs = lister.list_directories("remote:backup")?;
//! println!("{} folders", dirs.len());
//! ```

mod lister;

pub use lister::{parse_lsjson, to_entry, Listing, ListingMode, StructureLister};

// Re-export core types for convenience
pub use clonesync_core::{ListError, ListingEntry, ModTime, SyncTool};
