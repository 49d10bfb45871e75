//! Output module for partial files, the merged dataset and run statistics
//!
//! This module handles:
//! - Per-worker append-only partial CSV files
//! - Merging, renaming and de-duplicating them into the final dataset
//! - Per-field populated counts and the end-of-run summary

mod merge;
mod partial;
pub mod stats;

pub use merge::{dataset_path, dedup_records, ignored_fields, merge_partials, MergeReport};
pub use partial::{list_partial_files, partial_file_name, PartialOutput};
pub use stats::{print_field_counts, print_run_summary, FieldCounts, RunSummary};
