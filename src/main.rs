//! clonesync - Reconcile destination trees with their sources through rclone.
//!
//! Usage:
//!   clonesync                      Reconcile every pair in the batch file
//!   clonesync --dry-run            Analyse and log only
//!   clonesync check-config         Show the effective configuration
//!   clonesync --help               Show help

mod logging;
mod pipeline;
mod report;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::Local;
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use tracing::{error, info, warn};

use clonesync_core::{read_batch_file, BatchPair, RunConfig, RunContext};
use clonesync_ops::RcloneCli;

use crate::pipeline::{PairRunner, Phases};

#[derive(Parser)]
#[command(
    name = "clonesync",
    version,
    about = "Reconcile destination trees with their sources through rclone",
    long_about = "clonesync reads source/destination pairs from a CSV batch file and, for \
                  each pair, mirrors the source folder structure and files onto the \
                  destination.\n\nEvery planned and executed action is written to a \
                  timestamped run log, together with listing and difference reports."
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "clonesync.toml")]
    config: PathBuf,

    /// Analyse and log planned actions without changing the destination
    #[arg(long)]
    dry_run: bool,

    /// Skip the folder structure phase
    #[arg(long)]
    skip_directories: bool,

    /// Skip the file phase
    #[arg(long)]
    skip_files: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Load the configuration and print it with defaults filled in
    CheckConfig,
}

fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let config = match RunConfig::load(&cli.config) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err}");
            if let Err(log_err) =
                logging::log_startup_error(Path::new(logging::DEFAULT_LOG_DIR), &err.to_string())
            {
                eprintln!("Failed to write run log: {log_err}");
            }
            return Ok(ExitCode::FAILURE);
        }
    };

    if let Some(Command::CheckConfig) = cli.command {
        let text = toml::to_string_pretty(&config).wrap_err("Failed to render configuration")?;
        println!("{text}");
        return Ok(ExitCode::SUCCESS);
    }

    let ctx = RunContext::new(&config.log_dir, config.transfer.clone())
        .with_dry_run(cli.dry_run)
        .with_hash_type(config.hash_type.as_str());
    let _guard = logging::init_logger(&ctx)
        .wrap_err_with(|| format!("Failed to set up logging in {}", config.log_dir.display()))?;

    Ok(run(&cli, &config, &ctx))
}

fn run(cli: &Cli, config: &RunConfig, ctx: &RunContext) -> ExitCode {
    info!("Loaded configuration from {}", cli.config.display());

    let rclone_config = match config.locate_rclone_config() {
        Ok(path) => path,
        Err(err) => {
            eprintln!("Error: {err}");
            error!("{}", err);
            return ExitCode::FAILURE;
        }
    };
    let tool = RcloneCli::new(&config.rclone_binary).with_config(&rclone_config);
    info!("Using rclone config {}", rclone_config.display());

    let pairs = match read_batch_file(&config.batch_file) {
        Ok(pairs) => pairs,
        Err(err) => {
            error!("{}", err);
            return ExitCode::FAILURE;
        }
    };
    if !has_pairs(&pairs, &config.batch_file) {
        return ExitCode::SUCCESS;
    }
    if ctx.dry_run {
        info!("Dry run mode: no actual operations performed (analysis only)");
    }

    let phases = Phases {
        directories: !cli.skip_directories,
        files: !cli.skip_files,
        create_missing_dirs: config.create_missing_dirs,
    };
    let mut runner = PairRunner::new(&tool, ctx, phases);

    let mut failed_pairs = 0;
    let mut failed_items = 0;
    for pair in &pairs {
        match runner.run_pair(pair) {
            Ok(stats) => failed_items += stats.failed_items,
            Err(err) => {
                failed_pairs += 1;
                error!("{:#}", err);
            }
        }
    }

    let elapsed = Local::now() - ctx.started_at;
    info!(
        "Processed {} pairs, {} failed, {} failed items in {}s",
        pairs.len(),
        failed_pairs,
        failed_items,
        elapsed.num_seconds()
    );
    info!(
        "Reports: {}, {}, {}",
        runner.reports().folders().path().display(),
        runner.reports().files().path().display(),
        runner.reports().differences().path().display()
    );

    ExitCode::SUCCESS
}

/// Log how many pairs were read; warn and report `false` when there are none.
fn has_pairs(pairs: &[BatchPair], batch_file: &Path) -> bool {
    if pairs.is_empty() {
        warn!("No valid source-target pairs found in {}", batch_file.display());
        return false;
    }
    info!("Read {} pairs from {}", pairs.len(), batch_file.display());
    true
}
