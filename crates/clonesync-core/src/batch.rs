//! Batch input: the list of source/destination pairs to reconcile.

use std::io::Read;
use std::path::Path;

use serde::Serialize;

use crate::error::BatchError;

/// One source/destination pair from the batch input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchPair {
    /// Source location, forward-slash separated.
    pub source: String,
    /// Destination location.
    pub destination: String,
}

impl BatchPair {
    /// Build a pair from raw column values, or `None` if either is empty.
    ///
    /// The source has backslashes converted to forward slashes; the
    /// destination has surrounding quotes and whitespace stripped.
    pub fn from_columns(source: &str, destination: &str) -> Option<Self> {
        let source = source.trim().replace('\\', "/");
        let destination = destination.trim().trim_matches('"').trim().to_string();
        if source.is_empty() || destination.is_empty() {
            return None;
        }
        Some(Self {
            source,
            destination,
        })
    }
}

impl std::fmt::Display for BatchPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.source, self.destination)
    }
}

/// Read batch pairs from a CSV file. The first row is a header.
pub fn read_batch_file(path: impl AsRef<Path>) -> Result<Vec<BatchPair>, BatchError> {
    let path = path.as_ref();
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|source| BatchError::Open {
            path: path.to_path_buf(),
            source,
        })?;
    collect_pairs(reader, path)
}

/// Read batch pairs from any CSV reader. The first row is a header.
pub fn read_batch<R: Read>(input: R) -> Result<Vec<BatchPair>, BatchError> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input);
    collect_pairs(reader, Path::new("<input>"))
}

fn collect_pairs<R: Read>(
    mut reader: csv::Reader<R>,
    path: &Path,
) -> Result<Vec<BatchPair>, BatchError> {
    let mut pairs = Vec::new();

    for result in reader.records() {
        let record = result.map_err(|source| BatchError::Read {
            path: path.to_path_buf(),
            line: source.position().map(|p| p.line()).unwrap_or(0),
            source,
        })?;

        let (Some(source), Some(destination)) = (record.get(0), record.get(1)) else {
            continue;
        };

        if let Some(pair) = BatchPair::from_columns(source, destination) {
            pairs.push(pair);
        }
    }

    Ok(pairs)
}
