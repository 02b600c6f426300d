//! Per-run context shared by every component.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::config::TransferOptions;

/// Format of the timestamp prefixed to every run artifact.
pub const RUN_STAMP_FORMAT: &str = "%Y-%m-%d-%H%M%S";

/// Values fixed for the duration of one run.
///
/// Built once per invocation and passed to the lister, planner and executor.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// When the run started.
    pub started_at: DateTime<Local>,
    /// Directory receiving log artifacts.
    pub log_dir: PathBuf,
    /// Transfer tuning forwarded to the tool.
    pub transfer: TransferOptions,
    /// Analyse and log only.
    pub dry_run: bool,
    /// Hash name to collect in file listings.
    pub hash_type: String,
}

impl RunContext {
    /// Create a context starting now.
    pub fn new(log_dir: impl Into<PathBuf>, transfer: TransferOptions) -> Self {
        Self {
            started_at: Local::now(),
            log_dir: log_dir.into(),
            transfer,
            dry_run: false,
            hash_type: "crc32".to_string(),
        }
    }

    /// Set dry-run mode.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Set the hash collected in file listings.
    pub fn with_hash_type(mut self, hash_type: impl Into<String>) -> Self {
        self.hash_type = hash_type.into();
        self
    }

    /// Timestamp prefix shared by all artifacts of this run.
    pub fn stamp(&self) -> String {
        self.started_at.format(RUN_STAMP_FORMAT).to_string()
    }

    /// Path of a run artifact: `<log_dir>/<stamp>_<name>`.
    pub fn artifact_path(&self, name: &str) -> PathBuf {
        self.log_dir.join(format!("{}_{name}", self.stamp()))
    }

    /// Directory receiving log artifacts.
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_artifact_path_uses_run_stamp() {
        let mut ctx = RunContext::new("log", TransferOptions::default());
        ctx.started_at = Local.with_ymd_and_hms(2025, 2, 3, 4, 5, 6).unwrap();

        assert_eq!(ctx.stamp(), "2025-02-03-040506");
        assert_eq!(
            ctx.artifact_path("diff_list.txt"),
            PathBuf::from("log/2025-02-03-040506_diff_list.txt")
        );
    }
}
