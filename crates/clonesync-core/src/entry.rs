//! Listing entry types.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Modification time as reported by the sync tool.
///
/// The raw text is kept for reports and as a comparison fallback when the
/// value is not valid RFC 3339.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModTime {
    /// Text exactly as reported.
    pub raw: String,
    /// Parsed instant, if the text was valid RFC 3339.
    pub parsed: Option<DateTime<FixedOffset>>,
}

impl ModTime {
    /// Parse a modification time, keeping the raw text on failure.
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let parsed = DateTime::parse_from_rfc3339(raw.trim()).ok();
        Self { raw, parsed }
    }

    /// An absent modification time.
    pub fn unknown() -> Self {
        Self {
            raw: String::new(),
            parsed: None,
        }
    }

    /// Seconds since the Unix epoch, truncated to whole seconds.
    pub fn whole_seconds(&self) -> Option<i64> {
        self.parsed.map(|t| t.timestamp())
    }

    /// Compare two modification times at whole-second precision.
    ///
    /// Falls back to raw text equality when either side did not parse.
    pub fn same_second(&self, other: &ModTime) -> bool {
        match (self.whole_seconds(), other.whole_seconds()) {
            (Some(a), Some(b)) => a == b,
            _ => self.raw == other.raw,
        }
    }
}

impl std::fmt::Display for ModTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// One filesystem object observed at a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingEntry {
    /// Path relative to the listed location, forward-slash separated.
    pub relative_path: String,
    /// Whether this entry is a directory.
    pub is_directory: bool,
    /// Size in bytes, `None` for directories or when unknown.
    pub size: Option<u64>,
    /// Last modification time.
    pub modified_at: ModTime,
    /// Content hash (for reporting only), `None` when unavailable.
    pub content_hash: Option<String>,
}

impl ListingEntry {
    /// Create a file entry.
    pub fn file(relative_path: &str, size: u64, modified_at: ModTime) -> Self {
        Self {
            relative_path: normalize_path(relative_path),
            is_directory: false,
            size: Some(size),
            modified_at,
            content_hash: None,
        }
    }

    /// Create a directory entry.
    pub fn directory(relative_path: &str, modified_at: ModTime) -> Self {
        Self {
            relative_path: normalize_path(relative_path),
            is_directory: true,
            size: None,
            modified_at,
            content_hash: None,
        }
    }

    /// Attach a content hash.
    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        let hash = hash.into();
        self.content_hash = (!hash.is_empty()).then_some(hash);
        self
    }

    /// Number of path components.
    pub fn depth(&self) -> usize {
        path_depth(&self.relative_path)
    }
}

/// Normalize a relative path: backslashes become forward slashes and
/// leading/trailing separators are removed.
pub fn normalize_path(path: &str) -> String {
    path.trim().replace('\\', "/").trim_matches('/').to_string()
}

/// Depth of a relative path: the number of `/` separators plus one.
pub fn path_depth(path: &str) -> usize {
    path.matches('/').count() + 1
}

/// Every proper ancestor of a relative path, nearest last.
///
/// `"a/b/c.txt"` yields `["a", "a/b"]`.
pub fn ancestors(path: &str) -> impl Iterator<Item = &str> {
    path.match_indices('/').map(move |(idx, _)| &path[..idx])
}
