//! Merge & reconciliation of partial outputs
//!
//! Runs once every worker has terminated. Concatenates the partial files,
//! switches the header to the English labels, drops duplicate rows and
//! writes the dated dataset.

use crate::config::OutputConfig;
use crate::output::partial::list_partial_files;
use crate::output::stats::FieldCounts;
use crate::record::{output_header, source_header, Field, Record};
use crate::SweepError;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// What a merge did
#[derive(Debug, Clone)]
pub struct MergeReport {
    pub output_path: PathBuf,
    pub files_merged: usize,
    pub rows_read: usize,
    pub rows_malformed: usize,
    pub duplicates_removed: usize,
    pub rows_written: usize,
    pub field_counts: FieldCounts,
}

/// Path of the merged dataset for a run date
pub fn dataset_path(output: &OutputConfig, date: NaiveDate) -> PathBuf {
    Path::new(&output.output_dir).join(format!(
        "{}-{}.csv",
        output.dataset_prefix,
        date.format("%Y-%m-%d")
    ))
}

/// Resolves the configured `dedup-ignore` labels to fields
///
/// Labels were checked when the config was loaded; unknown ones are dropped.
pub fn ignored_fields(output: &OutputConfig) -> Vec<Field> {
    output
        .dedup_ignore
        .iter()
        .filter_map(|label| Field::from_output_label(label))
        .collect()
}

/// Removes rows identical in every field outside `ignore`
///
/// The first occurrence of each identity is kept, order is preserved.
/// Returns the kept rows and the number removed.
pub fn dedup_records(records: Vec<Record>, ignore: &[Field]) -> (Vec<Record>, usize) {
    let key_fields: Vec<Field> = Field::ALL
        .into_iter()
        .filter(|field| !ignore.contains(field))
        .collect();

    let mut seen: HashSet<Vec<Option<String>>> = HashSet::with_capacity(records.len());
    let mut kept = Vec::with_capacity(records.len());
    let mut removed = 0;

    for record in records {
        let key: Vec<Option<String>> = key_fields
            .iter()
            .map(|field| record.get(*field).map(str::to_string))
            .collect();

        if seen.insert(key) {
            kept.push(record);
        } else {
            removed += 1;
        }
    }

    (kept, removed)
}

/// Merges every partial file in `partial-dir` into the dated dataset
///
/// Partial files are deleted after the dataset is written, unless
/// `keep-partials` is set. Rows that do not have one cell per field are
/// skipped with a warning.
pub fn merge_partials(output: &OutputConfig, date: NaiveDate) -> Result<MergeReport, SweepError> {
    let partial_dir = Path::new(&output.partial_dir);
    let files = list_partial_files(partial_dir)?;
    tracing::info!("Merging {} partial files", files.len());

    let mut records = Vec::new();
    let mut rows_malformed = 0;

    for file in &files {
        let (mut file_records, malformed) = read_partial(file)?;
        rows_malformed += malformed;
        records.append(&mut file_records);
    }

    let rows_read = records.len() + rows_malformed;

    let ignore = ignored_fields(output);
    let (records, duplicates_removed) = dedup_records(records, &ignore);
    tracing::info!(
        "Removed {} duplicate rows, {} rows remain",
        duplicates_removed,
        records.len()
    );

    let output_path = dataset_path(output, date);
    if output_path.exists() {
        tracing::warn!("Overwriting existing dataset {}", output_path.display());
    }
    write_dataset(&output_path, &records)?;
    tracing::info!("Dataset written to {}", output_path.display());

    if !output.keep_partials {
        for file in &files {
            if let Err(e) = std::fs::remove_file(file) {
                tracing::warn!("Could not remove {}: {}", file.display(), e);
            }
        }
    }

    Ok(MergeReport {
        output_path,
        files_merged: files.len(),
        rows_read,
        rows_malformed,
        duplicates_removed,
        rows_written: records.len(),
        field_counts: FieldCounts::from_records(&records),
    })
}

/// Reads one partial file, returning its records and the malformed row count
fn read_partial(path: &Path) -> Result<(Vec<Record>, usize), SweepError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let expected = source_header();
    let header_matches = reader.headers()?.iter().eq(expected.iter().copied());
    if !header_matches {
        tracing::warn!(
            "Unexpected header in {}, mapping columns by position",
            path.display()
        );
    }

    let mut records = Vec::new();
    let mut malformed = 0;

    for (line, row) in reader.records().enumerate() {
        let parsed = row.ok().and_then(|row| Record::from_row(row.iter()));
        match parsed {
            Some(record) => records.push(record),
            None => {
                malformed += 1;
                tracing::warn!("Skipping malformed row {} in {}", line + 1, path.display());
            }
        }
    }

    Ok((records, malformed))
}

fn write_dataset(path: &Path, records: &[Record]) -> Result<(), SweepError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(output_header())?;
    for record in records {
        writer.write_record(record.to_row())?;
    }
    writer.flush()?;

    Ok(())
}
