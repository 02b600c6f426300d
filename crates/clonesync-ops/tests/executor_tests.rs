use std::cell::RefCell;
use std::collections::HashMap;

use clonesync_analyze::{diff_directories, plan_actions, plan_directories, ActionPlan};
use clonesync_core::{
    CommandOutput, DifferenceRecord, ListingEntry, ModTime, RunContext, SyncTool, ToolError,
    TransferOptions,
};
use clonesync_ops::{Executor, ItemOutcome, OperationType};

/// Fake tool recording every call, with scripted failures per location.
#[derive(Default)]
struct RecordingTool {
    calls: RefCell<Vec<String>>,
    failures: HashMap<String, (Option<i32>, String)>,
    no_parent_dirs: bool,
}

impl RecordingTool {
    fn failing(mut self, location: &str, exit_code: Option<i32>, stderr: &str) -> Self {
        self.failures
            .insert(location.to_string(), (exit_code, stderr.to_string()));
        self
    }

    fn respond(&self, call: String, location: &str) -> Result<CommandOutput, ToolError> {
        self.calls.borrow_mut().push(call.clone());
        match self.failures.get(location) {
            Some((exit_code, stderr)) => Err(ToolError::Failed {
                command: call,
                exit_code: *exit_code,
                stderr: stderr.clone(),
            }),
            None => Ok(CommandOutput::default()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl SyncTool for RecordingTool {
    fn name(&self) -> &str {
        "recording"
    }

    fn run(&self, args: &[String]) -> Result<CommandOutput, ToolError> {
        self.respond(args.join(" "), "")
    }

    fn copy_files(
        &self,
        source: &str,
        destination: &str,
        files: &[String],
        _options: &TransferOptions,
    ) -> Result<CommandOutput, ToolError> {
        self.respond(
            format!("copy {source} {destination} [{}]", files.join(",")),
            destination,
        )
    }

    fn delete_files(&self, root: &str, files: &[String]) -> Result<CommandOutput, ToolError> {
        self.respond(format!("delete {root} [{}]", files.join(",")), root)
    }

    fn purge(&self, location: &str) -> Result<CommandOutput, ToolError> {
        self.respond(format!("purge {location}"), location)
    }

    fn mkdir(&self, location: &str) -> Result<CommandOutput, ToolError> {
        self.respond(format!("mkdir {location}"), location)
    }

    fn creates_parent_dirs(&self) -> bool {
        !self.no_parent_dirs
    }
}

fn ctx() -> RunContext {
    RunContext::new("log", TransferOptions::default())
}

fn delete_plan(paths: &[&str]) -> ActionPlan {
    let destination = paths.iter().map(|p| p.to_string()).collect();
    plan_directories(&diff_directories(&Default::default(), &destination))
}

fn file_plan() -> ActionPlan {
    let t = ModTime::parse("2024-01-01T00:00:00Z");
    let records = vec![
        DifferenceRecord::missing_on_destination(ListingEntry::file("a/x.txt", 3, t.clone())),
        DifferenceRecord::missing_on_destination(ListingEntry::file("a/b/y.txt", 4, t.clone())),
        DifferenceRecord::missing_on_destination(ListingEntry::file("top.txt", 5, t.clone())),
        DifferenceRecord::missing_on_source(ListingEntry::file("old/z.txt", 1, t)),
    ];
    plan_actions(&records)
}

#[test]
fn test_purge_runs_deepest_first() {
    let tool = RecordingTool::default();
    let ctx = ctx();
    let plan = delete_plan(&["p", "q/r/s", "t/u"]);

    let outcome = Executor::new(&tool, &ctx).purge_directories("dst:", &plan);

    assert_eq!(
        tool.calls(),
        vec!["purge dst:q/r/s", "purge dst:t/u", "purge dst:p"]
    );
    assert_eq!(outcome.operation_type, OperationType::Purge);
    assert_eq!(outcome.succeeded, 3);
    assert!(outcome.is_success());
}

#[test]
fn test_purge_triage_continues_past_failures() {
    let tool = RecordingTool::default()
        .failing("dst:a/full", Some(1), "rmdir failed: directory not empty")
        .failing("dst:b/gone", Some(3), "directory not found")
        .failing("dst:c/denied", Some(1), "permission denied");
    let ctx = ctx();
    let plan = delete_plan(&["a/full", "b/gone", "c/denied", "d/ok"]);

    let outcome = Executor::new(&tool, &ctx).purge_directories("dst:", &plan);

    assert_eq!(tool.calls().len(), 4);
    assert_eq!(outcome.succeeded, 1);
    assert_eq!(outcome.skipped, 2);
    assert_eq!(outcome.failed, 1);
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].location, "dst:c/denied");
}

#[test]
fn test_dry_run_makes_no_calls() {
    let tool = RecordingTool::default();
    let ctx = ctx().with_dry_run(true);
    let executor = Executor::new(&tool, &ctx);

    let purge = executor.purge_directories("dst:", &delete_plan(&["x", "y/z"]));
    let report = executor.execute("src:", "dst:", &file_plan());

    assert!(tool.calls().is_empty());
    assert_eq!(purge.skipped, 2);
    assert_eq!(report.copy.skipped, 3);
    assert_eq!(report.delete.skipped, 1);
    assert_eq!(report.copy.bytes_processed, 0);
}

#[test]
fn test_execute_groups_copies_and_batches_deletes() {
    let tool = RecordingTool::default();
    let ctx = ctx();

    let report = Executor::new(&tool, &ctx).execute("src:", "dst:", &file_plan());

    assert_eq!(
        tool.calls(),
        vec![
            "copy src: dst: [top.txt]",
            "copy src:a dst:a [b/y.txt,x.txt]",
            "delete dst: [old/z.txt]",
        ]
    );
    assert!(report.is_success());
    assert_eq!(report.copy.succeeded, 3);
    assert_eq!(report.copy.bytes_processed, 12);
    assert_eq!(report.delete.succeeded, 1);
    assert_eq!(report.mkdir.total(), 0);
}

#[test]
fn test_failed_copy_group_marks_its_items_failed() {
    let tool = RecordingTool::default().failing("dst:a", Some(1), "quota exceeded");
    let ctx = ctx();

    let report = Executor::new(&tool, &ctx).execute("src:", "dst:", &file_plan());

    assert_eq!(report.copy.succeeded, 1);
    assert_eq!(report.copy.failed, 2);
    assert_eq!(report.failed(), 2);
    assert_eq!(report.copy.bytes_processed, 0);
    // The delete batch still runs.
    assert_eq!(report.delete.succeeded, 1);
}

#[test]
fn test_parent_dirs_created_when_tool_does_not() {
    let tool = RecordingTool {
        no_parent_dirs: true,
        ..Default::default()
    };
    let ctx = ctx();

    let report = Executor::new(&tool, &ctx).execute("src:", "dst:", &file_plan());

    let calls = tool.calls();
    assert_eq!(calls[0], "mkdir dst:a");
    assert_eq!(calls[1], "mkdir dst:a/b");
    assert_eq!(report.mkdir.succeeded, 2);
}

#[test]
fn test_benign_delete_failure_is_skipped() {
    let tool = RecordingTool::default().failing("dst:", Some(4), "file not found");
    let ctx = ctx();

    let report = Executor::new(&tool, &ctx).execute("src:", "dst:", &file_plan());

    assert_eq!(report.delete.skipped, 1);
    assert!(report.delete.is_success());
}

#[test]
fn test_create_directories_in_order() {
    let tool = RecordingTool::default().failing("dst:b", Some(1), "access denied");
    let ctx = ctx();
    let source = ["a", "a/c", "b"].iter().map(|p| p.to_string()).collect();
    let plan = plan_directories(&diff_directories(&source, &Default::default()));

    let outcome = Executor::new(&tool, &ctx).create_directories("dst:", &plan);

    assert_eq!(tool.calls(), vec!["mkdir dst:a", "mkdir dst:a/c", "mkdir dst:b"]);
    assert_eq!(outcome.succeeded, 2);
    assert_eq!(outcome.failed, 1);
}

#[test]
fn test_item_outcome_recording() {
    let mut outcome = clonesync_ops::BatchOutcome::new(OperationType::Copy);
    outcome.record(ItemOutcome::Succeeded, 4);
    assert_eq!(outcome.summary(), "Copied 4 items");
}
