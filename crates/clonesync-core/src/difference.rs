//! Difference classification types.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::entry::ListingEntry;

/// How one relative path compares across two listings.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiffKind {
    /// Present on the source only.
    MissingOnDestination,
    /// Present on the destination only.
    MissingOnSource,
    /// Present on both sides with differing size or modification time.
    Changed,
    /// Present on both sides with matching size and modification time.
    Equal,
}

impl DiffKind {
    /// Short label used in planned-action log lines.
    pub fn action_label(&self) -> &'static str {
        match self {
            Self::MissingOnDestination => "NEWFILE",
            Self::Changed => "CHANGED",
            Self::MissingOnSource => "DELETED",
            Self::Equal => "EQUAL",
        }
    }

    /// Whether this kind requires a copy to the destination.
    pub fn needs_copy(&self) -> bool {
        matches!(self, Self::MissingOnDestination | Self::Changed)
    }

    /// Whether this kind requires a deletion on the destination.
    pub fn needs_delete(&self) -> bool {
        matches!(self, Self::MissingOnSource)
    }
}

/// Classification of one path across a source and a destination listing.
///
/// Records can only be built through the constructors below, which keep
/// `kind` consistent with the entries and flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifferenceRecord {
    relative_path: String,
    kind: DiffKind,
    source_entry: Option<ListingEntry>,
    destination_entry: Option<ListingEntry>,
    size_differs: bool,
    time_differs: bool,
}

impl DifferenceRecord {
    /// A path present only on the source.
    pub fn missing_on_destination(source: ListingEntry) -> Self {
        Self {
            relative_path: source.relative_path.clone(),
            kind: DiffKind::MissingOnDestination,
            source_entry: Some(source),
            destination_entry: None,
            size_differs: false,
            time_differs: false,
        }
    }

    /// A path present only on the destination.
    pub fn missing_on_source(destination: ListingEntry) -> Self {
        Self {
            relative_path: destination.relative_path.clone(),
            kind: DiffKind::MissingOnSource,
            source_entry: None,
            destination_entry: Some(destination),
            size_differs: false,
            time_differs: false,
        }
    }

    /// A path present on both sides. Size is compared directly and
    /// modification times at whole-second precision; the hash is ignored.
    pub fn classify(source: ListingEntry, destination: ListingEntry) -> Self {
        let size_differs = source.size != destination.size;
        let time_differs = !source.modified_at.same_second(&destination.modified_at);
        let kind = if size_differs || time_differs {
            DiffKind::Changed
        } else {
            DiffKind::Equal
        };

        Self {
            relative_path: source.relative_path.clone(),
            kind,
            source_entry: Some(source),
            destination_entry: Some(destination),
            size_differs,
            time_differs,
        }
    }

    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    pub fn kind(&self) -> DiffKind {
        self.kind
    }

    pub fn source_entry(&self) -> Option<&ListingEntry> {
        self.source_entry.as_ref()
    }

    pub fn destination_entry(&self) -> Option<&ListingEntry> {
        self.destination_entry.as_ref()
    }

    pub fn size_differs(&self) -> bool {
        self.size_differs
    }

    pub fn time_differs(&self) -> bool {
        self.time_differs
    }

    /// Human-readable detail for a planned-action log line.
    pub fn describe(&self) -> String {
        match self.kind {
            DiffKind::MissingOnDestination | DiffKind::MissingOnSource => {
                let entry = self.source_entry.as_ref().or(self.destination_entry.as_ref());
                match entry {
                    Some(e) => format!(
                        "{} (Size: {}, ModTime: {})",
                        self.relative_path,
                        format_size(e.size),
                        e.modified_at
                    ),
                    None => self.relative_path.clone(),
                }
            }
            DiffKind::Changed => {
                let mut changes = Vec::new();
                if let (Some(src), Some(dst)) = (&self.source_entry, &self.destination_entry) {
                    if self.size_differs {
                        changes.push(format!(
                            "Size: {} -> {}",
                            format_size(src.size),
                            format_size(dst.size)
                        ));
                    }
                    if self.time_differs {
                        changes.push(format!(
                            "ModTime: {} -> {}",
                            src.modified_at, dst.modified_at
                        ));
                    }
                }
                format!("{} ({})", self.relative_path, changes.join(", "))
            }
            DiffKind::Equal => self.relative_path.clone(),
        }
    }
}

fn format_size(size: Option<u64>) -> String {
    size.map(|s| s.to_string()).unwrap_or_else(|| "-1".to_string())
}
