//! Item-level failure types.

use serde::{Deserialize, Serialize};

use clonesync_core::ToolError;

/// rclone exit status for "directory not found".
const EXIT_DIRECTORY_NOT_FOUND: i32 = 3;
/// rclone exit status for "file not found".
const EXIT_FILE_NOT_FOUND: i32 = 4;

/// Why a deletion failed, used to decide its severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeleteFailureReason {
    /// The directory still has content the tool refused to remove.
    DirectoryNotEmpty,
    /// The target is already gone.
    NotFound,
    /// Anything else.
    Other,
}

impl DeleteFailureReason {
    /// Classify a failure from the tool's exit code, falling back to its
    /// error text.
    pub fn classify(exit_code: Option<i32>, stderr: &str) -> Self {
        match exit_code {
            Some(EXIT_DIRECTORY_NOT_FOUND) | Some(EXIT_FILE_NOT_FOUND) => return Self::NotFound,
            _ => {}
        }

        let text = stderr.to_lowercase();
        if text.contains("directory not empty") {
            Self::DirectoryNotEmpty
        } else if text.contains("not found") || text.contains("exit status 3") {
            Self::NotFound
        } else {
            Self::Other
        }
    }

    /// Classify a tool error.
    pub fn from_error(err: &ToolError) -> Self {
        match err {
            ToolError::Failed {
                exit_code, stderr, ..
            } => Self::classify(*exit_code, stderr),
            _ => Self::Other,
        }
    }

    /// Whether the failure is downgraded to a warning and the item skipped.
    pub fn is_benign(&self) -> bool {
        !matches!(self, Self::Other)
    }
}

impl std::fmt::Display for DeleteFailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DirectoryNotEmpty => write!(f, "directory not empty"),
            Self::NotFound => write!(f, "not found"),
            Self::Other => write!(f, "failed"),
        }
    }
}

/// An error that occurred for one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationError {
    /// Full location of the item.
    pub location: String,
    /// A human-readable error message.
    pub message: String,
}

impl OperationError {
    /// Create a new operation error.
    pub fn new(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for OperationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}
