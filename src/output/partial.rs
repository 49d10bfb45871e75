//! Per-worker partial output files
//!
//! Each worker appends its records to its own CSV file, flushing after every
//! combination, so a crash loses at most the combination in flight.

use crate::record::{source_header, Record};
use crate::SweepError;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

const PARTIAL_PREFIX: &str = "partial-";
const PARTIAL_SUFFIX: &str = ".csv";

/// File name of the partial output owned by the named worker
pub fn partial_file_name(worker: &str) -> String {
    format!("{}{}{}", PARTIAL_PREFIX, worker, PARTIAL_SUFFIX)
}

/// Lists partial output files in `dir`, sorted by name
///
/// A missing directory has no partial files.
pub fn list_partial_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_partial = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(PARTIAL_PREFIX) && name.ends_with(PARTIAL_SUFFIX));
        if is_partial && path.is_file() {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Append-only CSV file of one worker's records
pub struct PartialOutput {
    path: PathBuf,
    writer: csv::Writer<File>,
    rows_written: usize,
}

impl PartialOutput {
    /// Opens (or continues) the partial file of a worker
    ///
    /// The header row is written only when the file is new or empty.
    pub fn open(dir: &Path, worker: &str) -> Result<Self, SweepError> {
        fs::create_dir_all(dir)?;
        let path = dir.join(partial_file_name(worker));

        let size = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if size == 0 {
            writer.write_record(source_header())?;
            writer.flush()?;
        }

        Ok(Self {
            path,
            writer,
            rows_written: 0,
        })
    }

    /// Appends a batch of records and flushes them to disk
    pub fn append(&mut self, records: &[Record]) -> Result<(), SweepError> {
        for record in records {
            self.writer.write_record(record.to_row())?;
        }
        self.writer.flush()?;
        self.rows_written += records.len();
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rows appended through this handle
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Flushes and closes the file
    pub fn finish(mut self) -> Result<PathBuf, SweepError> {
        self.writer.flush()?;
        Ok(self.path)
    }
}
