//! CSV report artifacts written alongside the run log.

use std::collections::BTreeSet;
use std::fs::File;
use std::path::{Path, PathBuf};

use clonesync_core::{DifferenceRecord, ListingEntry, RunContext};

pub const FOLDER_LIST_NAME: &str = "folder_list.txt";
pub const FILE_LIST_NAME: &str = "file_list.txt";
pub const DIFF_LIST_NAME: &str = "diff_list.txt";

const FOLDER_HEADER: &[&str] = &["ORIGIN", "ROOT", "PATH"];
const FILE_HEADER: &[&str] = &["ORIGIN", "ROOT", "PATH", "MODTIME", "SIZE", "HASH", "ISDIR"];
const DIFF_HEADER: &[&str] = &[
    "SOURCE_ROOT",
    "DESTINATION_ROOT",
    "TYPE",
    "PATH",
    "SOURCE_SIZE",
    "SOURCE_MODTIME",
    "DESTINATION_SIZE",
    "DESTINATION_MODTIME",
    "SIZE_DIFF",
    "MODTIME_DIFF",
];

const SOURCE: &str = "SOURCE";
const DESTINATION: &str = "DESTINATION";

/// One CSV artifact, created with its header on first write and appended to
/// for every later pair of the run.
pub struct Artifact {
    path: PathBuf,
    header: &'static [&'static str],
    writer: Option<csv::Writer<File>>,
}

impl Artifact {
    fn new(path: PathBuf, header: &'static [&'static str]) -> Self {
        Self {
            path,
            header,
            writer: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_rows<I>(&mut self, rows: I) -> Result<(), csv::Error>
    where
        I: IntoIterator<Item = Vec<String>>,
    {
        if self.writer.is_none() {
            let mut writer = csv::WriterBuilder::new().from_path(&self.path)?;
            writer.write_record(self.header)?;
            self.writer = Some(writer);
        }

        if let Some(writer) = self.writer.as_mut() {
            for row in rows {
                writer.write_record(&row)?;
            }
            writer.flush()?;
        }
        Ok(())
    }
}

/// The folder, file and difference reports of one run.
pub struct RunReports {
    folders: Artifact,
    files: Artifact,
    differences: Artifact,
}

impl RunReports {
    pub fn new(ctx: &RunContext) -> Self {
        Self {
            folders: Artifact::new(ctx.artifact_path(FOLDER_LIST_NAME), FOLDER_HEADER),
            files: Artifact::new(ctx.artifact_path(FILE_LIST_NAME), FILE_HEADER),
            differences: Artifact::new(ctx.artifact_path(DIFF_LIST_NAME), DIFF_HEADER),
        }
    }

    pub fn folders(&self) -> &Artifact {
        &self.folders
    }

    pub fn files(&self) -> &Artifact {
        &self.files
    }

    pub fn differences(&self) -> &Artifact {
        &self.differences
    }

    /// Append both directory listings of a pair.
    pub fn record_folders(
        &mut self,
        source_root: &str,
        destination_root: &str,
        source: &BTreeSet<String>,
        destination: &BTreeSet<String>,
    ) -> Result<(), csv::Error> {
        let tagged = |origin: &str, root: &str, dirs: &BTreeSet<String>| -> Vec<Vec<String>> {
            dirs.iter()
                .map(|path| vec![origin.to_string(), root.to_string(), path.clone()])
                .collect()
        };

        let mut rows = tagged(SOURCE, source_root, source);
        rows.extend(tagged(DESTINATION, destination_root, destination));
        self.folders.write_rows(rows)
    }

    /// Append both file listings of a pair.
    pub fn record_files(
        &mut self,
        source_root: &str,
        destination_root: &str,
        source: &[ListingEntry],
        destination: &[ListingEntry],
    ) -> Result<(), csv::Error> {
        let rows = source
            .iter()
            .map(|entry| file_row(SOURCE, source_root, entry))
            .chain(
                destination
                    .iter()
                    .map(|entry| file_row(DESTINATION, destination_root, entry)),
            );
        self.files.write_rows(rows)
    }

    /// Append one row per difference record of a pair.
    pub fn record_differences(
        &mut self,
        source_root: &str,
        destination_root: &str,
        records: &[DifferenceRecord],
    ) -> Result<(), csv::Error> {
        let rows = records.iter().map(|record| {
            let (source_size, source_time) = entry_columns(record.source_entry());
            let (destination_size, destination_time) = entry_columns(record.destination_entry());
            vec![
                source_root.to_string(),
                destination_root.to_string(),
                record.kind().to_string(),
                record.relative_path().to_string(),
                source_size,
                source_time,
                destination_size,
                destination_time,
                record.size_differs().to_string(),
                record.time_differs().to_string(),
            ]
        });
        self.differences.write_rows(rows)
    }
}

fn file_row(origin: &str, root: &str, entry: &ListingEntry) -> Vec<String> {
    vec![
        origin.to_string(),
        root.to_string(),
        entry.relative_path.clone(),
        entry.modified_at.to_string(),
        size_column(entry.size),
        entry.content_hash.clone().unwrap_or_default(),
        entry.is_directory.to_string(),
    ]
}

fn entry_columns(entry: Option<&ListingEntry>) -> (String, String) {
    match entry {
        Some(entry) => (size_column(entry.size), entry.modified_at.to_string()),
        None => (String::new(), String::new()),
    }
}

fn size_column(size: Option<u64>) -> String {
    size.map(|s| s.to_string()).unwrap_or_else(|| "-1".to_string())
}
