//! Action planning: turning differences into ordered copy and delete batches.
//!
//! Planning is pure. Deletions are ordered deepest first so a directory is
//! never removed while something beneath it is still queued, and entries
//! already covered by a queued ancestor are dropped since purging the
//! ancestor removes them.

use std::collections::BTreeSet;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use clonesync_core::{ancestors, path_depth, DifferenceRecord};

use crate::diff::DirectoryDiff;

/// Ordered operation batches for one source/destination pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPlan {
    /// Paths to copy from source to destination, sorted.
    pub copy_set: Vec<String>,
    /// Paths to remove from the destination, sorted, without entries whose
    /// ancestor is also queued.
    pub delete_set: Vec<String>,
    /// `delete_set` ordered by depth descending, ties by path.
    pub delete_order: Vec<String>,
    /// Every ancestor directory implied by `copy_set`, sorted (shallow first).
    pub parent_dirs: Vec<String>,
    /// Known source bytes in `copy_set`.
    pub copy_bytes: u64,
}

impl ActionPlan {
    /// Whether there is nothing to do.
    pub fn is_empty(&self) -> bool {
        self.copy_set.is_empty() && self.delete_set.is_empty()
    }
}

/// Plan file-mode actions from difference records.
pub fn plan_actions(records: &[DifferenceRecord]) -> ActionPlan {
    let mut copy_set = Vec::new();
    let mut to_delete = Vec::new();
    let mut copy_bytes = 0u64;

    for record in records {
        if record.kind().needs_copy() {
            copy_set.push(record.relative_path().to_string());
            copy_bytes += record.source_entry().and_then(|e| e.size).unwrap_or(0);
        } else if record.kind().needs_delete() {
            to_delete.push(record.relative_path().to_string());
        }
    }

    copy_set.sort();
    copy_set.dedup();
    build_plan(copy_set, to_delete, copy_bytes)
}

/// Plan directory-mode actions from a presence-only comparison.
pub fn plan_directories(diff: &DirectoryDiff) -> ActionPlan {
    let copy_set: Vec<String> = diff.to_create.iter().cloned().sorted().dedup().collect();
    build_plan(copy_set, diff.to_delete.clone(), 0)
}

fn build_plan(copy_set: Vec<String>, to_delete: Vec<String>, copy_bytes: u64) -> ActionPlan {
    let delete_set = prune_covered(&to_delete);
    let delete_order = order_deepest_first(&delete_set);
    let parent_dirs = parent_dirs(&copy_set);

    ActionPlan {
        copy_set,
        delete_set,
        delete_order,
        parent_dirs,
        copy_bytes,
    }
}

/// Drop paths whose ancestor is also in the set. Result is sorted.
pub fn prune_covered(paths: &[String]) -> Vec<String> {
    let all: BTreeSet<&str> = paths
        .iter()
        .map(String::as_str)
        .filter(|p| !p.is_empty())
        .collect();

    all.iter()
        .filter(|path| !ancestors(path).any(|ancestor| all.contains(ancestor)))
        .map(|path| path.to_string())
        .collect()
}

/// Sort paths by depth descending, ties broken lexically ascending.
pub fn order_deepest_first(paths: &[String]) -> Vec<String> {
    paths
        .iter()
        .cloned()
        .sorted_by(|a, b| path_depth(b).cmp(&path_depth(a)).then_with(|| a.cmp(b)))
        .collect()
}

/// Every proper ancestor directory of the given paths, sorted.
pub fn parent_dirs(paths: &[String]) -> Vec<String> {
    let dirs: BTreeSet<&str> = paths.iter().flat_map(|path| ancestors(path)).collect();
    dirs.into_iter().map(str::to_string).collect()
}
