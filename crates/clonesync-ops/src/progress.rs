//! Outcome reporting types for executed batches.

use serde::{Deserialize, Serialize};

use crate::OperationError;

/// The type of operation being performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationType {
    Copy,
    Delete,
    Purge,
    CreateDirectory,
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Copy => write!(f, "Copy"),
            Self::Delete => write!(f, "Delete"),
            Self::Purge => write!(f, "Purge"),
            Self::CreateDirectory => write!(f, "Create directory"),
        }
    }
}

/// What happened to a single item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemOutcome {
    Succeeded,
    /// Not attempted (dry run) or a benign failure.
    Skipped,
    Failed,
}

/// Result of one batch of items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    /// The type of operation.
    pub operation_type: OperationType,
    /// Number of items successfully processed.
    pub succeeded: usize,
    /// Number of items skipped.
    pub skipped: usize,
    /// Number of items that failed.
    pub failed: usize,
    /// Known bytes of successfully processed items.
    pub bytes_processed: u64,
    /// Errors that occurred.
    pub errors: Vec<OperationError>,
}

impl BatchOutcome {
    /// An empty outcome.
    pub fn new(operation_type: OperationType) -> Self {
        Self {
            operation_type,
            succeeded: 0,
            skipped: 0,
            failed: 0,
            bytes_processed: 0,
            errors: Vec::new(),
        }
    }

    /// Record `count` items with the same outcome.
    pub fn record(&mut self, outcome: ItemOutcome, count: usize) {
        match outcome {
            ItemOutcome::Succeeded => self.succeeded += count,
            ItemOutcome::Skipped => self.skipped += count,
            ItemOutcome::Failed => self.failed += count,
        }
    }

    /// Add an error.
    pub fn add_error(&mut self, error: OperationError) {
        self.errors.push(error);
    }

    /// Total items accounted for.
    pub fn total(&self) -> usize {
        self.succeeded + self.skipped + self.failed
    }

    /// Check if no item failed.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Get a human-readable summary of the batch.
    pub fn summary(&self) -> String {
        let action = match self.operation_type {
            OperationType::Copy => "Copied",
            OperationType::Delete => "Deleted",
            OperationType::Purge => "Purged",
            OperationType::CreateDirectory => "Created",
        };

        let mut summary = format!("{} {} items", action, self.succeeded);
        if self.skipped > 0 {
            summary.push_str(&format!(", {} skipped", self.skipped));
        }
        if self.failed > 0 {
            summary.push_str(&format!(", {} failed", self.failed));
        }
        summary
    }
}

/// Outcomes of a file-mode execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub mkdir: BatchOutcome,
    pub copy: BatchOutcome,
    pub delete: BatchOutcome,
}

impl Default for ExecutionReport {
    fn default() -> Self {
        Self {
            mkdir: BatchOutcome::new(OperationType::CreateDirectory),
            copy: BatchOutcome::new(OperationType::Copy),
            delete: BatchOutcome::new(OperationType::Delete),
        }
    }
}

impl ExecutionReport {
    /// Check if every batch succeeded.
    pub fn is_success(&self) -> bool {
        self.mkdir.is_success() && self.copy.is_success() && self.delete.is_success()
    }

    /// Failed items across all batches.
    pub fn failed(&self) -> usize {
        self.mkdir.failed + self.copy.failed + self.delete.failed
    }
}
