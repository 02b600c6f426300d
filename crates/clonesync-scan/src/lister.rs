//! Recursive structure listing through the sync tool.

use std::collections::BTreeSet;

use tracing::{debug, error, info, warn};

use clonesync_core::{
    normalize_path, ListError, ListingEntry, ListingQuery, LsJsonItem, ModTime, RunContext,
    SyncTool, ToolError,
};

/// What to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingMode {
    /// Directory paths only.
    Directories,
    /// Files with size, modification time and hash.
    Files,
}

/// Result of a listing, shaped by its [`ListingMode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    Directories(BTreeSet<String>),
    Files(Vec<ListingEntry>),
}

impl Listing {
    /// Number of entries listed.
    pub fn len(&self) -> usize {
        match self {
            Self::Directories(dirs) => dirs.len(),
            Self::Files(files) => files.len(),
        }
    }

    /// Whether nothing was listed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Lists the full subtree under a location.
pub struct StructureLister<'a, T: SyncTool + ?Sized> {
    tool: &'a T,
    hash_type: String,
}

impl<'a, T: SyncTool + ?Sized> StructureLister<'a, T> {
    /// Create a lister using the run's hash selection.
    pub fn new(tool: &'a T, ctx: &RunContext) -> Self {
        Self {
            tool,
            hash_type: ctx.hash_type.clone(),
        }
    }

    /// List `location` in the given mode.
    pub fn list(&self, location: &str, mode: ListingMode) -> Result<Listing, ListError> {
        match mode {
            ListingMode::Directories => self.list_directories(location).map(Listing::Directories),
            ListingMode::Files => self.list_files(location).map(Listing::Files),
        }
    }

    /// Every directory under `location`, as relative paths.
    pub fn list_directories(&self, location: &str) -> Result<BTreeSet<String>, ListError> {
        let items = self.query(location, &ListingQuery::directories())?;
        let dirs: BTreeSet<String> = items
            .into_iter()
            .filter(|item| item.is_dir)
            .map(|item| normalize_path(&item.path))
            .filter(|path| !path.is_empty())
            .collect();

        info!("Collected {} folders from {}", dirs.len(), location);
        Ok(dirs)
    }

    /// Every file under `location`, with metadata.
    pub fn list_files(&self, location: &str) -> Result<Vec<ListingEntry>, ListError> {
        let items = self.query(location, &ListingQuery::files(&self.hash_type))?;
        let total = items.len();

        let mut seen = BTreeSet::new();
        let mut entries = Vec::with_capacity(total);
        for item in items.into_iter().filter(|item| !item.is_dir) {
            let entry = to_entry(&item, &self.hash_type);
            if entry.relative_path.is_empty() {
                continue;
            }
            if !seen.insert(entry.relative_path.clone()) {
                warn!("Duplicate path {} in listing of {}", entry.relative_path, location);
            }
            entries.push(entry);
        }

        if entries.len() != total {
            debug!(
                "Dropped {} non-file items from listing of {}",
                total - entries.len(),
                location
            );
        }
        info!("Collected {} items from {}", entries.len(), location);
        Ok(entries)
    }

    /// Structured listing, falling back to the raw command when the tool has
    /// no structured interface.
    fn query(&self, location: &str, query: &ListingQuery) -> Result<Vec<LsJsonItem>, ListError> {
        let result = match self.tool.list_json(location, query) {
            Err(ToolError::Unsupported { .. }) => {
                debug!(
                    "{} has no structured listing, running lsjson directly",
                    self.tool.name()
                );
                self.tool
                    .run(&query.to_args(location))
                    .map_err(|source| ListError::Query {
                        location: location.to_string(),
                        source,
                    })
                    .and_then(|output| parse_lsjson(location, &output.stdout))
            }
            other => other.map_err(|source| ListError::Query {
                location: location.to_string(),
                source,
            }),
        };

        result.inspect_err(|err| error!("Failed to collect structure of {}: {}", location, err))
    }
}

/// Parse raw `lsjson` output.
pub fn parse_lsjson(location: &str, stdout: &str) -> Result<Vec<LsJsonItem>, ListError> {
    if stdout.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(stdout).map_err(|err| ListError::Decode {
        location: location.to_string(),
        message: err.to_string(),
    })
}

/// Convert one `lsjson` item to a typed entry.
pub fn to_entry(item: &LsJsonItem, hash_type: &str) -> ListingEntry {
    let size = if item.is_dir || item.size < 0 {
        None
    } else {
        Some(item.size as u64)
    };
    let modified_at = if item.mod_time.is_empty() {
        ModTime::unknown()
    } else {
        ModTime::parse(item.mod_time.as_str())
    };

    ListingEntry {
        relative_path: normalize_path(&item.path),
        is_directory: item.is_dir,
        size,
        modified_at,
        content_hash: item.hash(hash_type).map(str::to_string),
    }
}
