//! rclone command-line backend.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use itertools::Itertools;
use tempfile::NamedTempFile;
use tracing::debug;

use clonesync_core::{CommandOutput, SyncTool, ToolError, TransferOptions};

/// [`SyncTool`] backed by the `rclone` binary.
///
/// Every call spawns one blocking process and waits for it.
#[derive(Debug, Clone)]
pub struct RcloneCli {
    binary: PathBuf,
    config: Option<PathBuf>,
}

impl RcloneCli {
    /// Use the given binary (a bare name is resolved through `PATH`).
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            config: None,
        }
    }

    /// Pass `--config <path>` on every invocation.
    pub fn with_config(mut self, config: impl Into<PathBuf>) -> Self {
        self.config = Some(config.into());
        self
    }

    /// The rclone config file in use, if one was set.
    pub fn config(&self) -> Option<&Path> {
        self.config.as_deref()
    }

    /// Full argument vector for one invocation, including `--config`.
    pub fn command_args(&self, args: &[String]) -> Vec<String> {
        let mut full = args.to_vec();
        if let Some(config) = &self.config {
            full.push("--config".to_string());
            full.push(config.display().to_string());
        }
        full
    }

    fn run_with_file_list(&self, mut args: Vec<String>, files: &[String]) -> Result<CommandOutput, ToolError> {
        let list = write_file_list(files)?;
        args.extend(file_list_args(list.path()));
        // `list` is removed when dropped, after the process has exited
        self.run(&args)
    }
}

impl Default for RcloneCli {
    fn default() -> Self {
        Self::new("rclone")
    }
}

impl SyncTool for RcloneCli {
    fn name(&self) -> &str {
        self.binary
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("rclone")
    }

    fn run(&self, args: &[String]) -> Result<CommandOutput, ToolError> {
        let args = self.command_args(args);
        let command_line = format!("{} {}", self.name(), args.join(" "));
        debug!("Running {}", command_line);

        let output = Command::new(&self.binary)
            .args(&args)
            .output()
            .map_err(|source| ToolError::Spawn {
                program: self.binary.display().to_string(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if output.status.success() {
            Ok(CommandOutput { stdout, stderr })
        } else {
            Err(ToolError::Failed {
                command: command_line,
                exit_code: output.status.code(),
                stderr: stderr.trim().to_string(),
            })
        }
    }

    fn copy_files(
        &self,
        source: &str,
        destination: &str,
        files: &[String],
        options: &TransferOptions,
    ) -> Result<CommandOutput, ToolError> {
        let mut args = vec![
            "copy".to_string(),
            source.to_string(),
            destination.to_string(),
        ];
        args.extend(transfer_args(options));
        self.run_with_file_list(args, files)
    }

    fn delete_files(&self, root: &str, files: &[String]) -> Result<CommandOutput, ToolError> {
        let args = vec![
            "delete".to_string(),
            root.to_string(),
            "--rmdirs".to_string(),
        ];
        self.run_with_file_list(args, files)
    }

    fn purge(&self, location: &str) -> Result<CommandOutput, ToolError> {
        self.run(&["purge".to_string(), location.to_string()])
    }

    fn mkdir(&self, location: &str) -> Result<CommandOutput, ToolError> {
        self.run(&["mkdir".to_string(), location.to_string()])
    }
}

/// Flags forwarding the transfer tuning to `rclone copy`.
pub fn transfer_args(options: &TransferOptions) -> Vec<String> {
    let mut args = vec![
        format!("--transfers={}", options.transfers),
        format!("--checkers={}", options.checkers),
        format!("--multi-thread-streams={}", options.multi_thread_streams),
        format!("--low-level-retries={}", options.low_level_retries),
        format!("--retries={}", options.retries),
        format!("--retries-sleep={}", options.retries_sleep),
        format!("--timeout={}", options.timeout),
        format!("--max-backlog={}", options.max_backlog),
    ];
    if !options.check {
        args.push("--no-check-dest".to_string());
    }
    args.extend(options.extra_args.iter().cloned());
    args
}

/// Flags pointing the tool at a file list.
///
/// The raw variant reads every line verbatim; plain `--files-from` would
/// drop lines starting with `#` or `;` and trim surrounding whitespace.
pub fn file_list_args(list: &Path) -> [String; 2] {
    ["--files-from-raw".to_string(), list.display().to_string()]
}

/// Write one relative path per line to a temporary file.
fn write_file_list(files: &[String]) -> Result<NamedTempFile, ToolError> {
    let mut list = tempfile::Builder::new()
        .prefix("clonesync-files-")
        .suffix(".txt")
        .tempfile()?;
    writeln!(list, "{}", files.iter().join("\n"))?;
    list.flush()?;
    Ok(list)
}
