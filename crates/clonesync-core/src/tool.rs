//! Interface to the external sync tool.
//!
//! The reconciliation core never transfers data itself. Listing, copying,
//! deleting and directory creation all go through a [`SyncTool`], which the
//! binary backs with the rclone command line and tests back with fakes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::TransferOptions;
use crate::error::ToolError;

/// Captured output of a successful tool invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Output with the given stdout and empty stderr.
    pub fn stdout(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }
}

/// What a listing query should return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingQuery {
    /// Only directories.
    pub dirs_only: bool,
    /// Only files.
    pub files_only: bool,
    /// Use a single recursive listing call where the backend supports it.
    pub fast_list: bool,
    /// Hash to include, if any.
    pub hash_type: Option<String>,
}

impl ListingQuery {
    /// Recursive directory-only listing.
    pub fn directories() -> Self {
        Self {
            dirs_only: true,
            files_only: false,
            fast_list: true,
            hash_type: None,
        }
    }

    /// Recursive file-only listing with the given hash.
    pub fn files(hash_type: impl Into<String>) -> Self {
        Self {
            dirs_only: false,
            files_only: true,
            fast_list: false,
            hash_type: Some(hash_type.into()),
        }
    }

    /// Raw `lsjson` argument vector for this query.
    pub fn to_args(&self, location: &str) -> Vec<String> {
        let mut args = vec![
            "lsjson".to_string(),
            location.to_string(),
            "--recursive".to_string(),
        ];
        if self.fast_list {
            args.push("--fast-list".to_string());
        }
        if self.dirs_only {
            args.push("--dirs-only".to_string());
        }
        if self.files_only {
            args.push("--files-only".to_string());
        }
        if let Some(hash) = &self.hash_type {
            args.push("--hash".to_string());
            args.push("--hash-type".to_string());
            args.push(hash.clone());
        }
        args
    }
}

/// One item of `lsjson` output, as emitted by the tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LsJsonItem {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "unknown_size")]
    pub size: i64,
    #[serde(default)]
    pub mod_time: String,
    #[serde(default)]
    pub is_dir: bool,
    #[serde(default)]
    pub hashes: BTreeMap<String, String>,
}

fn unknown_size() -> i64 {
    -1
}

impl LsJsonItem {
    /// Look up a hash by name, ignoring case and `-` (`CRC-32` matches `crc32`).
    pub fn hash(&self, hash_type: &str) -> Option<&str> {
        let wanted = hash_key(hash_type);
        self.hashes
            .iter()
            .find(|(name, _)| hash_key(name) == wanted)
            .map(|(_, value)| value.as_str())
            .filter(|value| !value.is_empty())
    }
}

fn hash_key(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// The external sync tool.
///
/// Every call blocks until the tool returns. A call that ran but failed is
/// reported as [`ToolError::Failed`] carrying the exit code and stderr.
pub trait SyncTool {
    /// Program name used in log lines.
    fn name(&self) -> &str;

    /// Structured listing. Tools without one return [`ToolError::Unsupported`]
    /// and callers fall back to [`SyncTool::run`] with
    /// [`ListingQuery::to_args`].
    fn list_json(
        &self,
        location: &str,
        query: &ListingQuery,
    ) -> Result<Vec<LsJsonItem>, ToolError> {
        let _ = (location, query);
        Err(ToolError::Unsupported {
            operation: "list_json",
        })
    }

    /// Run the tool with a raw argument vector.
    fn run(&self, args: &[String]) -> Result<CommandOutput, ToolError>;

    /// Copy `files` (relative to `source`) into `destination`.
    fn copy_files(
        &self,
        source: &str,
        destination: &str,
        files: &[String],
        options: &TransferOptions,
    ) -> Result<CommandOutput, ToolError>;

    /// Delete `files` (relative to `root`), removing directories left empty.
    fn delete_files(&self, root: &str, files: &[String]) -> Result<CommandOutput, ToolError>;

    /// Remove a directory and everything under it.
    fn purge(&self, location: &str) -> Result<CommandOutput, ToolError>;

    /// Create a directory.
    fn mkdir(&self, location: &str) -> Result<CommandOutput, ToolError>;

    /// Whether [`SyncTool::copy_files`] creates missing parent directories.
    fn creates_parent_dirs(&self) -> bool {
        true
    }
}

/// Join a location root and a relative path.
///
/// Remote roots ending in `:` are joined without a separator
/// (`remote:` + `a/b` = `remote:a/b`).
pub fn join_location(root: &str, relative: &str) -> String {
    let relative = relative.trim_matches('/');
    if relative.is_empty() {
        return root.to_string();
    }
    if root.ends_with(':') || root.is_empty() {
        format!("{root}{relative}")
    } else {
        format!("{}/{relative}", root.trim_end_matches('/'))
    }
}
