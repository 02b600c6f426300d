//! Error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading the run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file does not exist.
    #[error("Config file not found: {path}")]
    NotFound { path: PathBuf },

    /// The configuration file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for this schema.
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A value is present but unusable.
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    /// The rclone configuration file could not be located.
    #[error("rclone config not found at {path}; create it with 'rclone config'")]
    RcloneConfigMissing { path: PathBuf },

    /// No platform configuration directory to look for the rclone config in.
    #[error("Cannot determine the platform config directory; set rclone_config explicitly")]
    NoConfigDir,
}

/// Errors raised while reading the batch input.
#[derive(Debug, Error)]
pub enum BatchError {
    /// The batch file could not be opened.
    #[error("Failed to open batch file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A record could not be read.
    #[error("Failed to read batch file {path} at line {line}: {source}")]
    Read {
        path: PathBuf,
        line: u64,
        #[source]
        source: csv::Error,
    },
}

/// Errors raised by the external sync tool.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The tool process could not be started.
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The tool ran and exited unsuccessfully.
    #[error("{command} exited with status {}: {stderr}", display_code(.exit_code))]
    Failed {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    /// The tool does not offer this operation.
    #[error("Operation not supported by this tool: {operation}")]
    Unsupported { operation: &'static str },

    /// Local I/O needed to drive the tool failed (e.g. writing a file list).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn display_code(code: &Option<i32>) -> String {
    code.map(|c| c.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

impl ToolError {
    /// Exit code of a failed invocation, if any.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Failed { exit_code, .. } => *exit_code,
            _ => None,
        }
    }

    /// Standard error text of a failed invocation, if any.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::Failed { stderr, .. } => Some(stderr),
            _ => None,
        }
    }
}

/// Errors raised while listing a location.
#[derive(Debug, Error)]
pub enum ListError {
    /// The listing query itself failed.
    #[error("Failed to list {location}: {source}")]
    Query {
        location: String,
        #[source]
        source: ToolError,
    },

    /// The listing output could not be decoded.
    #[error("Failed to decode listing of {location}: {message}")]
    Decode { location: String, message: String },
}

impl ListError {
    /// The location whose listing failed.
    pub fn location(&self) -> &str {
        match self {
            Self::Query { location, .. } | Self::Decode { location, .. } => location,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_error_accessors() {
        let err = ToolError::Failed {
            command: "rclone purge remote:x".to_string(),
            exit_code: Some(3),
            stderr: "directory not found".to_string(),
        };
        assert_eq!(err.exit_code(), Some(3));
        assert_eq!(err.stderr(), Some("directory not found"));
        assert!(err.to_string().contains("status 3"));
    }

    #[test]
    fn test_list_error_location() {
        let err = ListError::Decode {
            location: "remote:data".to_string(),
            message: "bad json".to_string(),
        };
        assert_eq!(err.location(), "remote:data");
    }
}
