//! Plan executor.
//!
//! Carries out an [`ActionPlan`] against a destination through a
//! [`SyncTool`]. Item failures never abort a batch: each one is triaged,
//! logged and counted in the returned outcome.

use std::collections::BTreeMap;

use humansize::{format_size, DECIMAL};
use tracing::{debug, error, info, warn};

use clonesync_analyze::ActionPlan;
use clonesync_core::{join_location, RunContext, SyncTool};

use crate::operation::{DeleteFailureReason, OperationError};
use crate::progress::{BatchOutcome, ExecutionReport, ItemOutcome, OperationType};

/// Executes action plans for one run.
pub struct Executor<'a, T: SyncTool + ?Sized> {
    tool: &'a T,
    ctx: &'a RunContext,
}

impl<'a, T: SyncTool + ?Sized> Executor<'a, T> {
    /// Create an executor driving `tool` with the run's settings.
    pub fn new(tool: &'a T, ctx: &'a RunContext) -> Self {
        Self { tool, ctx }
    }

    /// Execute a file-mode plan: parent directories (when the tool does not
    /// create them), then the copy batch, then the delete batch.
    pub fn execute(
        &self,
        source_root: &str,
        destination_root: &str,
        plan: &ActionPlan,
    ) -> ExecutionReport {
        let mut report = ExecutionReport::default();

        if !self.tool.creates_parent_dirs() && !plan.copy_set.is_empty() {
            report.mkdir = self.make_directories(destination_root, &plan.parent_dirs);
        }
        report.copy = self.copy_batch(source_root, destination_root, plan);
        report.delete = self.delete_batch(destination_root, plan);

        report
    }

    /// Purge every directory in the plan's delete order, deepest first.
    pub fn purge_directories(&self, destination_root: &str, plan: &ActionPlan) -> BatchOutcome {
        let mut outcome = BatchOutcome::new(OperationType::Purge);
        if plan.delete_order.is_empty() {
            return outcome;
        }
        info!("Planned folder deletions: {}", plan.delete_order.len());

        for relative in &plan.delete_order {
            let location = join_location(destination_root, relative);
            if self.ctx.dry_run {
                info!("[dry-run] Purge {}", location);
                outcome.record(ItemOutcome::Skipped, 1);
                continue;
            }

            match self.tool.purge(&location) {
                Ok(_) => {
                    info!("Purged folder and contents: {}", location);
                    outcome.record(ItemOutcome::Succeeded, 1);
                }
                Err(err) => match DeleteFailureReason::from_error(&err) {
                    DeleteFailureReason::DirectoryNotEmpty => {
                        warn!("Skipped non-empty folder {}: {}", location, err);
                        outcome.record(ItemOutcome::Skipped, 1);
                    }
                    DeleteFailureReason::NotFound => {
                        warn!("Folder already deleted or not found {}: {}", location, err);
                        outcome.record(ItemOutcome::Skipped, 1);
                    }
                    DeleteFailureReason::Other => {
                        error!("Failed to delete {}: {}", location, err);
                        outcome.record(ItemOutcome::Failed, 1);
                        outcome.add_error(OperationError::new(location, err.to_string()));
                    }
                },
            }
        }

        info!("{}", outcome.summary());
        outcome
    }

    /// Create every directory in the plan's copy set, shallow first.
    pub fn create_directories(&self, destination_root: &str, plan: &ActionPlan) -> BatchOutcome {
        if !plan.copy_set.is_empty() {
            info!("Planned folder creations: {}", plan.copy_set.len());
        }
        self.make_directories(destination_root, &plan.copy_set)
    }

    fn make_directories(&self, destination_root: &str, directories: &[String]) -> BatchOutcome {
        let mut outcome = BatchOutcome::new(OperationType::CreateDirectory);

        for relative in directories {
            let location = join_location(destination_root, relative);
            if self.ctx.dry_run {
                info!("[dry-run] Create directory {}", location);
                outcome.record(ItemOutcome::Skipped, 1);
                continue;
            }

            match self.tool.mkdir(&location) {
                Ok(_) => {
                    info!("Created directory: {}", location);
                    outcome.record(ItemOutcome::Succeeded, 1);
                }
                Err(err) => {
                    error!("Failed to create directory {}: {}", location, err);
                    outcome.record(ItemOutcome::Failed, 1);
                    outcome.add_error(OperationError::new(location, err.to_string()));
                }
            }
        }

        if !directories.is_empty() {
            info!("{}", outcome.summary());
        }
        outcome
    }

    fn copy_batch(&self, source_root: &str, destination_root: &str, plan: &ActionPlan) -> BatchOutcome {
        let mut outcome = BatchOutcome::new(OperationType::Copy);
        if plan.copy_set.is_empty() {
            return outcome;
        }
        info!(
            "Planned copies/updates: {} files ({})",
            plan.copy_set.len(),
            format_size(plan.copy_bytes, DECIMAL)
        );

        for (group, files) in group_by_top_level(&plan.copy_set) {
            let source = join_location(source_root, group);
            let destination = join_location(destination_root, group);

            if self.ctx.dry_run {
                for file in &files {
                    info!(
                        "[dry-run] Copy {} -> {}",
                        join_location(&source, file),
                        join_location(&destination, file)
                    );
                }
                outcome.record(ItemOutcome::Skipped, files.len());
                continue;
            }

            debug!("Copying {} files from {} to {}", files.len(), source, destination);
            match self
                .tool
                .copy_files(&source, &destination, &files, &self.ctx.transfer)
            {
                Ok(_) => {
                    for file in &files {
                        info!("Copied: {}", join_location(&destination, file));
                    }
                    outcome.record(ItemOutcome::Succeeded, files.len());
                }
                Err(err) => {
                    error!(
                        "Copy of {} files from {} to {} failed: {}",
                        files.len(),
                        source,
                        destination,
                        err
                    );
                    outcome.record(ItemOutcome::Failed, files.len());
                    outcome.add_error(OperationError::new(destination, err.to_string()));
                }
            }
        }

        if outcome.failed == 0 && outcome.skipped == 0 {
            outcome.bytes_processed = plan.copy_bytes;
        }
        info!("{}", outcome.summary());
        outcome
    }

    fn delete_batch(&self, destination_root: &str, plan: &ActionPlan) -> BatchOutcome {
        let mut outcome = BatchOutcome::new(OperationType::Delete);
        let count = plan.delete_order.len();
        if count == 0 {
            return outcome;
        }
        info!("Planned deletions: {} files", count);

        if self.ctx.dry_run {
            for relative in &plan.delete_order {
                info!("[dry-run] Delete {}", join_location(destination_root, relative));
            }
            outcome.record(ItemOutcome::Skipped, count);
            return outcome;
        }

        match self.tool.delete_files(destination_root, &plan.delete_order) {
            Ok(_) => {
                for relative in &plan.delete_order {
                    info!("Deleted: {}", join_location(destination_root, relative));
                }
                outcome.record(ItemOutcome::Succeeded, count);
            }
            Err(err) => {
                let reason = DeleteFailureReason::from_error(&err);
                if reason.is_benign() {
                    warn!("Deletions in {} skipped ({}): {}", destination_root, reason, err);
                    outcome.record(ItemOutcome::Skipped, count);
                } else {
                    error!("Deletions in {} failed: {}", destination_root, err);
                    outcome.record(ItemOutcome::Failed, count);
                    outcome.add_error(OperationError::new(destination_root, err.to_string()));
                }
            }
        }

        info!("{}", outcome.summary());
        outcome
    }
}

/// Split paths by their first component, keeping the rest relative to it.
/// Top-level files share the empty group.
fn group_by_top_level(paths: &[String]) -> BTreeMap<&str, Vec<String>> {
    let mut groups: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for path in paths {
        let (group, rest) = path.split_once('/').unwrap_or(("", path.as_str()));
        groups.entry(group).or_default().push(rest.to_string());
    }
    groups
}
