//! Listing comparison.
//!
//! Two modes:
//! 1. Directory mode: presence only, two sorted set differences.
//! 2. File mode: path-keyed comparison of size and modification time
//!    (truncated to whole seconds), one record per path in the union.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use clonesync_core::{DiffKind, DifferenceRecord, ListingEntry};

/// Directory-mode comparison result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryDiff {
    /// Directories on the source missing from the destination, sorted.
    pub to_create: Vec<String>,
    /// Directories on the destination missing from the source, sorted.
    pub to_delete: Vec<String>,
}

impl DirectoryDiff {
    /// Whether the two structures already match.
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_delete.is_empty()
    }
}

/// Compare two directory sets by presence only.
pub fn diff_directories(source: &BTreeSet<String>, destination: &BTreeSet<String>) -> DirectoryDiff {
    DirectoryDiff {
        to_create: source.difference(destination).cloned().collect(),
        to_delete: destination.difference(source).cloned().collect(),
    }
}

/// Compare two file listings, producing one record per path in either.
///
/// Records are sorted by path. Duplicate paths within one listing resolve to
/// the last entry.
pub fn diff_listings(source: &[ListingEntry], destination: &[ListingEntry]) -> Vec<DifferenceRecord> {
    let mut source_map = index_by_path(source);
    let mut destination_map = index_by_path(destination);

    let all_paths: BTreeSet<&str> = source_map
        .keys()
        .chain(destination_map.keys())
        .copied()
        .collect();

    all_paths
        .into_iter()
        .filter_map(|path| {
            match (source_map.remove(path), destination_map.remove(path)) {
                (Some(src), Some(dst)) => Some(DifferenceRecord::classify(src.clone(), dst.clone())),
                (Some(src), None) => Some(DifferenceRecord::missing_on_destination(src.clone())),
                (None, Some(dst)) => Some(DifferenceRecord::missing_on_source(dst.clone())),
                (None, None) => None,
            }
        })
        .collect()
}

fn index_by_path(entries: &[ListingEntry]) -> BTreeMap<&str, &ListingEntry> {
    entries
        .iter()
        .map(|entry| (entry.relative_path.as_str(), entry))
        .collect()
}

/// Counts of records per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    pub missing_on_destination: usize,
    pub missing_on_source: usize,
    pub changed: usize,
    pub equal: usize,
}

impl DiffSummary {
    /// Tally a set of records.
    pub fn from_records(records: &[DifferenceRecord]) -> Self {
        let mut summary = Self::default();
        for record in records {
            match record.kind() {
                DiffKind::MissingOnDestination => summary.missing_on_destination += 1,
                DiffKind::MissingOnSource => summary.missing_on_source += 1,
                DiffKind::Changed => summary.changed += 1,
                DiffKind::Equal => summary.equal += 1,
            }
        }
        summary
    }

    /// Number of records that are not [`DiffKind::Equal`].
    pub fn differences(&self) -> usize {
        self.missing_on_destination + self.missing_on_source + self.changed
    }

    /// Total number of records.
    pub fn total(&self) -> usize {
        self.differences() + self.equal
    }
}

impl std::fmt::Display for DiffSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} new, {} changed, {} deleted, {} equal",
            self.missing_on_destination, self.changed, self.missing_on_source, self.equal
        )
    }
}
