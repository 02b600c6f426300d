//! Per-pair reconciliation: list, diff, plan, execute.

use color_eyre::eyre::{Result, WrapErr};
use humansize::{format_size, DECIMAL};
use tracing::{info, warn};

use clonesync_analyze::{diff_directories, diff_listings, plan_actions, plan_directories, DiffSummary};
use clonesync_core::{BatchPair, DiffKind, RunContext, SyncTool};
use clonesync_ops::Executor;
use clonesync_scan::StructureLister;

use crate::report::RunReports;

/// Which reconciliation phases run for each pair.
#[derive(Debug, Clone, Copy)]
pub struct Phases {
    pub directories: bool,
    pub files: bool,
    /// Create destination directories found only on the source.
    pub create_missing_dirs: bool,
}

/// Item counts for one reconciled pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PairStats {
    pub differences: usize,
    pub failed_items: usize,
}

/// Runs the reconciliation phases for each batch pair of a run.
pub struct PairRunner<'a, T: SyncTool + ?Sized> {
    tool: &'a T,
    ctx: &'a RunContext,
    phases: Phases,
    reports: RunReports,
}

impl<'a, T: SyncTool + ?Sized> PairRunner<'a, T> {
    pub fn new(tool: &'a T, ctx: &'a RunContext, phases: Phases) -> Self {
        Self {
            tool,
            ctx,
            phases,
            reports: RunReports::new(ctx),
        }
    }

    pub fn reports(&self) -> &RunReports {
        &self.reports
    }

    /// Reconcile one pair. Listing failures abort the pair; item failures
    /// are counted and logged by the executor.
    pub fn run_pair(&mut self, pair: &BatchPair) -> Result<PairStats> {
        info!("Processing {}", pair);
        let mut stats = PairStats::default();

        if self.phases.directories {
            let dir_stats = self
                .reconcile_directories(&pair.source, &pair.destination)
                .wrap_err_with(|| format!("Folder structure sync failed for {pair}"))?;
            stats.differences += dir_stats.differences;
            stats.failed_items += dir_stats.failed_items;
        }

        if self.phases.files {
            let file_stats = self
                .reconcile_files(&pair.source, &pair.destination)
                .wrap_err_with(|| format!("File sync failed for {pair}"))?;
            stats.differences += file_stats.differences;
            stats.failed_items += file_stats.failed_items;
        }

        Ok(stats)
    }

    fn reconcile_directories(&mut self, source_root: &str, destination_root: &str) -> Result<PairStats> {
        info!("Starting folder structure sync: {} -> {}", source_root, destination_root);
        let lister = StructureLister::new(self.tool, self.ctx);

        let source = lister.list_directories(source_root)?;
        let destination = lister.list_directories(destination_root)?;
        if let Err(err) = self
            .reports
            .record_folders(source_root, destination_root, &source, &destination)
        {
            warn!("Failed to write {}: {}", self.reports.folders().path().display(), err);
        }

        let diff = diff_directories(&source, &destination);
        info!(
            "Folders missing on destination: {}, folders to delete: {}",
            diff.to_create.len(),
            diff.to_delete.len()
        );
        for path in &diff.to_create {
            info!("NEWFOLDER: {}", path);
        }
        for path in &diff.to_delete {
            info!("DELETED folder: {}", path);
        }

        let plan = plan_directories(&diff);
        let executor = Executor::new(self.tool, self.ctx);
        let purged = executor.purge_directories(destination_root, &plan);
        let mut failed_items = purged.failed;

        if self.phases.create_missing_dirs {
            failed_items += executor.create_directories(destination_root, &plan).failed;
        } else if !plan.copy_set.is_empty() {
            info!(
                "{} folders missing on destination are left to the file copy",
                plan.copy_set.len()
            );
        }

        info!("Folder structure sync completed");
        Ok(PairStats {
            differences: diff.to_create.len() + diff.to_delete.len(),
            failed_items,
        })
    }

    fn reconcile_files(&mut self, source_root: &str, destination_root: &str) -> Result<PairStats> {
        info!("Starting file sync: {} -> {}", source_root, destination_root);
        let lister = StructureLister::new(self.tool, self.ctx);

        let source = lister.list_files(source_root)?;
        let destination = lister.list_files(destination_root)?;
        let source_bytes: u64 = source.iter().filter_map(|entry| entry.size).sum();
        info!(
            "Source holds {} files ({}), destination {} files",
            source.len(),
            format_size(source_bytes, DECIMAL),
            destination.len()
        );
        if let Err(err) = self
            .reports
            .record_files(source_root, destination_root, &source, &destination)
        {
            warn!("Failed to write {}: {}", self.reports.files().path().display(), err);
        }

        let records = diff_listings(&source, &destination);
        if let Err(err) = self
            .reports
            .record_differences(source_root, destination_root, &records)
        {
            warn!(
                "Failed to write {}: {}",
                self.reports.differences().path().display(),
                err
            );
        }

        let summary = DiffSummary::from_records(&records);
        info!("Differences: {}", summary);
        for record in records.iter().filter(|r| r.kind() != DiffKind::Equal) {
            info!("{}: {}", record.kind().action_label(), record.describe());
        }

        let plan = plan_actions(&records);
        let report = Executor::new(self.tool, self.ctx).execute(source_root, destination_root, &plan);
        if !report.is_success() {
            warn!("{} items failed for {} -> {}", report.failed(), source_root, destination_root);
        }

        info!("File sync completed");
        Ok(PairStats {
            differences: summary.differences(),
            failed_items: report.failed(),
        })
    }
}
