//! Run configuration types.

use std::path::{Path, PathBuf};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Transfer tuning forwarded to the sync tool's batch primitives.
///
/// None of these values are interpreted here; they are passed through as
/// command-line flags.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
#[serde(default)]
pub struct TransferOptions {
    /// Check the destination before transferring.
    #[builder(default = "true")]
    #[serde(alias = "user_check")]
    pub check: bool,

    /// Number of file transfers to run in parallel.
    #[builder(default = "4")]
    #[serde(alias = "user_transfers")]
    pub transfers: u32,

    /// Number of checkers to run in parallel.
    #[builder(default = "8")]
    #[serde(alias = "user_checkers")]
    pub checkers: u32,

    /// Streams per multi-thread transfer (0 disables multi-thread copies).
    #[builder(default = "4")]
    #[serde(alias = "user_multi_thread_streams")]
    pub multi_thread_streams: u32,

    /// Low-level retries per operation.
    #[builder(default = "10")]
    #[serde(alias = "user_low_level_retries")]
    pub low_level_retries: u32,

    /// Whole-batch retries.
    #[builder(default = "3")]
    #[serde(alias = "user_retries")]
    pub retries: u32,

    /// Interval between retries, in the tool's duration syntax.
    #[builder(default = "\"10s\".to_string()")]
    #[serde(alias = "user_retries_sleep")]
    pub retries_sleep: String,

    /// IO idle timeout, in the tool's duration syntax.
    #[builder(default = "\"5m\".to_string()")]
    #[serde(alias = "user_timeout")]
    pub timeout: String,

    /// Maximum queued operations backlog.
    #[builder(default = "10000")]
    #[serde(alias = "user_max_backlog")]
    pub max_backlog: u32,

    /// Additional flags appended verbatim to copy invocations.
    #[builder(default)]
    pub extra_args: Vec<String>,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            check: true,
            transfers: 4,
            checkers: 8,
            multi_thread_streams: 4,
            low_level_retries: 10,
            retries: 3,
            retries_sleep: "10s".to_string(),
            timeout: "5m".to_string(),
            max_backlog: 10000,
            extra_args: Vec::new(),
        }
    }
}

impl TransferOptionsBuilder {
    fn validate(&self) -> Result<(), String> {
        check_positive(&[
            ("transfers", self.transfers),
            ("checkers", self.checkers),
            ("retries", self.retries),
            ("max_backlog", self.max_backlog),
        ])
    }
}

impl TransferOptions {
    /// Create a new transfer options builder.
    pub fn builder() -> TransferOptionsBuilder {
        TransferOptionsBuilder::default()
    }

    /// Check the counts that the tool rejects when zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive(&[
            ("transfers", Some(self.transfers)),
            ("checkers", Some(self.checkers)),
            ("retries", Some(self.retries)),
            ("max_backlog", Some(self.max_backlog)),
        ])
        .map_err(|message| ConfigError::Invalid { message })
    }
}

fn check_positive(values: &[(&str, Option<u32>)]) -> Result<(), String> {
    for (name, value) in values {
        if *value == Some(0) {
            return Err(format!("{name} must be greater than zero"));
        }
    }
    Ok(())
}

/// Top-level transfer keys as written by older configuration files.
#[derive(Debug, Default, Deserialize)]
struct FlatTransferKeys {
    user_check: Option<bool>,
    user_transfers: Option<u32>,
    user_checkers: Option<u32>,
    user_multi_thread_streams: Option<u32>,
    user_low_level_retries: Option<u32>,
    user_retries: Option<u32>,
    user_retries_sleep: Option<String>,
    user_timeout: Option<String>,
    user_max_backlog: Option<u32>,
}

impl FlatTransferKeys {
    fn apply(self, options: &mut TransferOptions) {
        if let Some(v) = self.user_check {
            options.check = v;
        }
        if let Some(v) = self.user_transfers {
            options.transfers = v;
        }
        if let Some(v) = self.user_checkers {
            options.checkers = v;
        }
        if let Some(v) = self.user_multi_thread_streams {
            options.multi_thread_streams = v;
        }
        if let Some(v) = self.user_low_level_retries {
            options.low_level_retries = v;
        }
        if let Some(v) = self.user_retries {
            options.retries = v;
        }
        if let Some(v) = self.user_retries_sleep {
            options.retries_sleep = v;
        }
        if let Some(v) = self.user_timeout {
            options.timeout = v;
        }
        if let Some(v) = self.user_max_backlog {
            options.max_backlog = v;
        }
    }
}

/// Configuration file as written on disk.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(alias = "csv_file")]
    batch_file: Option<PathBuf>,
    #[serde(alias = "log_folder")]
    log_dir: Option<PathBuf>,
    #[serde(default = "default_rclone_binary")]
    rclone_binary: String,
    #[serde(default)]
    rclone_config: Option<PathBuf>,
    #[serde(default)]
    create_missing_dirs: bool,
    #[serde(default = "default_hash_type")]
    hash_type: String,
    #[serde(default)]
    transfer: Option<TransferOptions>,
    #[serde(flatten)]
    flat: FlatTransferKeys,
}

fn default_rclone_binary() -> String {
    "rclone".to_string()
}

fn default_hash_type() -> String {
    "crc32".to_string()
}

/// Validated configuration for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunConfig {
    /// CSV file of source/destination pairs.
    pub batch_file: PathBuf,
    /// Directory receiving the run log and report artifacts.
    pub log_dir: PathBuf,
    /// Sync tool executable.
    pub rclone_binary: String,
    /// Explicit rclone configuration file, if set.
    pub rclone_config: Option<PathBuf>,
    /// Create destination directories missing from the directory listing.
    pub create_missing_dirs: bool,
    /// Hash reported for file listings.
    pub hash_type: String,
    /// Transfer tuning forwarded to the tool.
    pub transfer: TransferOptions,
}

impl RunConfig {
    /// Load and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        Self::from_toml_str(&text, path)
    }

    /// Parse and validate configuration text; `origin` is used in errors.
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;

        let batch_file = file.batch_file.ok_or_else(|| missing("batch_file"))?;
        let log_dir = file.log_dir.ok_or_else(|| missing("log_dir"))?;
        if file.rclone_binary.trim().is_empty() {
            return Err(missing("rclone_binary"));
        }

        // Top-level `user_*` keys only apply to files without a `[transfer]` table
        let transfer = match file.transfer {
            Some(transfer) => transfer,
            None => {
                let mut transfer = TransferOptions::default();
                file.flat.apply(&mut transfer);
                transfer
            }
        };
        transfer.validate()?;

        Ok(Self {
            batch_file,
            log_dir,
            rclone_binary: file.rclone_binary,
            rclone_config: file.rclone_config,
            create_missing_dirs: file.create_missing_dirs,
            hash_type: file.hash_type,
            transfer,
        })
    }

    /// Resolve the rclone configuration file.
    ///
    /// Uses `rclone_config` when set, otherwise `<config dir>/rclone/rclone.conf`.
    /// The file must exist either way.
    pub fn locate_rclone_config(&self) -> Result<PathBuf, ConfigError> {
        let path = match &self.rclone_config {
            Some(path) => path.clone(),
            None => dirs::config_dir()
                .ok_or(ConfigError::NoConfigDir)?
                .join("rclone")
                .join("rclone.conf"),
        };

        if path.is_file() {
            Ok(path)
        } else {
            Err(ConfigError::RcloneConfigMissing { path })
        }
    }
}

fn missing(key: &str) -> ConfigError {
    ConfigError::Invalid {
        message: format!("missing required key '{key}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> &'static Path {
        Path::new("test.toml")
    }

    #[test]
    fn test_transfer_builder_defaults() {
        let options = TransferOptions::builder().transfers(16u32).build().unwrap();
        assert_eq!(options.transfers, 16);
        assert_eq!(options.checkers, 8);
        assert!(options.check);
        assert_eq!(options.timeout, "5m");
        assert_eq!(options.retries_sleep, "10s");
        assert_eq!(TransferOptions::default(), TransferOptions::builder().build().unwrap());
    }

    #[test]
    fn test_transfer_builder_rejects_zero() {
        let result = TransferOptions::builder().checkers(0u32).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_nested_transfer_table() {
        let config = RunConfig::from_toml_str(
            r#"
            batch_file = "pairs.csv"
            log_dir = "log"

            [transfer]
            transfers = 8
            timeout = "1m"
            "#,
            origin(),
        )
        .unwrap();

        assert_eq!(config.batch_file, PathBuf::from("pairs.csv"));
        assert_eq!(config.transfer.transfers, 8);
        assert_eq!(config.transfer.timeout, "1m");
        assert_eq!(config.transfer.checkers, 8);
        assert_eq!(config.rclone_binary, "rclone");
        assert_eq!(config.hash_type, "crc32");
    }

    #[test]
    fn test_flat_legacy_keys() {
        let config = RunConfig::from_toml_str(
            r#"
            csv_file = "folders.csv"
            log_folder = "logs"
            user_check = false
            user_transfers = 2
            user_checkers = 64
            user_multi_thread_streams = 0
            user_low_level_retries = 5
            user_retries = 1
            user_retries_sleep = "30s"
            user_timeout = "10m"
            user_max_backlog = 500
            "#,
            origin(),
        )
        .unwrap();

        assert_eq!(config.log_dir, PathBuf::from("logs"));
        assert!(!config.transfer.check);
        assert_eq!(config.transfer.transfers, 2);
        assert_eq!(config.transfer.checkers, 64);
        assert_eq!(config.transfer.multi_thread_streams, 0);
        assert_eq!(config.transfer.retries_sleep, "30s");
        assert_eq!(config.transfer.max_backlog, 500);
    }

    #[test]
    fn test_transfer_table_wins_over_flat_keys() {
        let config = RunConfig::from_toml_str(
            r#"
            batch_file = "pairs.csv"
            log_dir = "log"
            user_transfers = 2
            user_timeout = "10m"

            [transfer]
            transfers = 9
            "#,
            origin(),
        )
        .unwrap();

        assert_eq!(config.transfer.transfers, 9);
        assert_eq!(config.transfer.timeout, "5m");
    }

    #[test]
    fn test_missing_required_key() {
        let err = RunConfig::from_toml_str("log_dir = \"log\"", origin()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
        assert!(err.to_string().contains("batch_file"));
    }

    #[test]
    fn test_zero_transfers_rejected() {
        let err = RunConfig::from_toml_str(
            "batch_file = \"a.csv\"\nlog_dir = \"log\"\nuser_transfers = 0\n",
            origin(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("transfers"));
    }

    #[test]
    fn test_unparsable_config() {
        let err = RunConfig::from_toml_str("batch_file = [", origin()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let err = RunConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn test_explicit_rclone_config() {
        let dir = tempfile::tempdir().unwrap();
        let conf = dir.path().join("rclone.conf");

        let mut config = RunConfig::from_toml_str(
            "batch_file = \"a.csv\"\nlog_dir = \"log\"\n",
            origin(),
        )
        .unwrap();
        config.rclone_config = Some(conf.clone());

        assert!(matches!(
            config.locate_rclone_config(),
            Err(ConfigError::RcloneConfigMissing { .. })
        ));

        std::fs::write(&conf, "[remote]\ntype = local\n").unwrap();
        assert_eq!(config.locate_rclone_config().unwrap(), conf);
    }
}
