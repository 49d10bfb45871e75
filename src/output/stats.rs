//! Run statistics
//!
//! Per-field populated counts of the merged dataset and the end-of-run
//! summary printed to stdout.

use crate::record::{Field, Record};
use std::time::Duration;

/// Number of rows with a value in each field, in column order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCounts {
    /// Rows counted
    pub total_rows: usize,

    /// Populated count per field
    pub counts: Vec<(Field, usize)>,
}

impl FieldCounts {
    pub fn from_records(records: &[Record]) -> Self {
        let mut counts: Vec<(Field, usize)> = Field::ALL.iter().map(|f| (*f, 0)).collect();

        for record in records {
            for (slot, value) in counts.iter_mut().zip(record.values()) {
                if value.is_some() {
                    slot.1 += 1;
                }
            }
        }

        Self {
            total_rows: records.len(),
            counts,
        }
    }

    /// Populated count of one field
    pub fn get(&self, field: Field) -> usize {
        self.counts
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }
}

/// Totals of a whole run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub combinations_enumerated: usize,
    pub chunks: usize,
    pub combinations_scraped: usize,
    pub combinations_abandoned: usize,
    pub records_written: usize,
    pub worker_failures: usize,
    pub elapsed: Duration,
}

/// Prints per-field populated counts to stdout
pub fn print_field_counts(counts: &FieldCounts) {
    println!("=== Dataset Field Counts ({} rows) ===\n", counts.total_rows);

    let width = Field::ALL
        .iter()
        .map(|f| f.output_label().chars().count())
        .max()
        .unwrap_or(0);

    for (field, count) in &counts.counts {
        let percentage = if counts.total_rows > 0 {
            (*count as f64 / counts.total_rows as f64) * 100.0
        } else {
            0.0
        };
        println!(
            "  {:<width$}  {:>8} ({:.1}%)",
            field.output_label(),
            count,
            percentage,
            width = width
        );
    }
    println!();
}

/// Prints the run summary to stdout
pub fn print_run_summary(summary: &RunSummary) {
    println!("=== Sweep Summary ===\n");

    println!("Work:");
    println!("  Combinations enumerated: {}", summary.combinations_enumerated);
    println!("  Chunks: {}", summary.chunks);
    println!("  Combinations scraped: {}", summary.combinations_scraped);
    println!("  Combinations abandoned: {}", summary.combinations_abandoned);
    println!("  Records written: {}", summary.records_written);
    if summary.worker_failures > 0 {
        println!("  Worker failures: {}", summary.worker_failures);
    }
    println!();

    let coverage = coverage_rate(summary);
    println!("Coverage: {:.1}% of combinations scraped", coverage);
    println!(
        "Execution time: {:.3} hours",
        summary.elapsed.as_secs_f64() / 3600.0
    );
    println!();
}

fn coverage_rate(summary: &RunSummary) -> f64 {
    let attempted = summary.combinations_scraped + summary.combinations_abandoned;
    if attempted == 0 {
        return 0.0;
    }
    (summary.combinations_scraped as f64 / attempted as f64) * 100.0
}
