//! Merge & reconciliation over partial files on disk

use chrono::NaiveDate;
use offer_sweep::config::OutputConfig;
use offer_sweep::output::{list_partial_files, merge_partials, PartialOutput};
use offer_sweep::record::source_header;
use offer_sweep::{Field, Record};
use std::path::Path;
use tempfile::tempdir;

fn output_config(scratch: &Path) -> OutputConfig {
    OutputConfig {
        partial_dir: scratch.join("temp").to_string_lossy().into_owned(),
        output_dir: scratch.join("output").to_string_lossy().into_owned(),
        ..OutputConfig::default()
    }
}

fn offer(make: &str, model: &str, views: &str, price: &str) -> Record {
    let mut record = Record::new();
    record.set(Field::Make, make);
    record.set(Field::Model, model);
    record.set(Field::Views, views);
    record.set(Field::Price, price);
    record.set(Field::Title, format!("{} {}", make, model));
    record
}

fn run_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 17).unwrap()
}

#[test]
fn test_merge_renames_header_and_removes_duplicates() {
    let scratch = tempdir().unwrap();
    let output = output_config(scratch.path());
    let partial_dir = Path::new(&output.partial_dir);

    let mut first = PartialOutput::open(partial_dir, "w0-g0").unwrap();
    first
        .append(&[offer("Audi", "A4", "100", "20 000 лв."), offer("BMW", "320", "5", "9 000 лв.")])
        .unwrap();
    first.finish().unwrap();

    // Same offer seen later with more views
    let mut second = PartialOutput::open(partial_dir, "w1-g0").unwrap();
    second
        .append(&[offer("Audi", "A4", "180", "20 000 лв.")])
        .unwrap();
    second.finish().unwrap();

    let report = merge_partials(&output, run_date()).unwrap();

    assert_eq!(report.files_merged, 2);
    assert_eq!(report.rows_read, 3);
    assert_eq!(report.duplicates_removed, 1);
    assert_eq!(report.rows_written, 2);
    assert_eq!(report.field_counts.get(Field::Make), 2);
    assert_eq!(report.field_counts.get(Field::Vin), 0);
    assert!(report
        .output_path
        .ends_with("output/mobile.bg-offers-2024-05-17.csv"));

    let mut reader = csv::Reader::from_path(&report.output_path).unwrap();
    let header: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(header.len(), 26);
    assert_eq!(header[0], "Make");
    assert_eq!(header[25], "Title");

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);
    // First occurrence wins
    assert_eq!(&rows[0][Field::Views.index()], "100");

    assert!(list_partial_files(partial_dir).unwrap().is_empty());
}

#[test]
fn test_merge_keeps_partials_when_asked() {
    let scratch = tempdir().unwrap();
    let output = OutputConfig {
        keep_partials: true,
        ..output_config(scratch.path())
    };
    let partial_dir = Path::new(&output.partial_dir);

    let mut partial = PartialOutput::open(partial_dir, "w0-g0").unwrap();
    partial.append(&[offer("Audi", "A4", "1", "1 лв.")]).unwrap();
    partial.finish().unwrap();

    merge_partials(&output, run_date()).unwrap();

    assert_eq!(list_partial_files(partial_dir).unwrap().len(), 1);
}

#[test]
fn test_merge_skips_malformed_rows() {
    let scratch = tempdir().unwrap();
    let output = output_config(scratch.path());
    let partial_dir = Path::new(&output.partial_dir);
    std::fs::create_dir_all(partial_dir).unwrap();

    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(partial_dir.join("partial-w0-g0.csv"))
        .unwrap();
    writer.write_record(source_header()).unwrap();
    writer.write_record(["Audi", "A4", "Седан"]).unwrap();
    writer
        .write_record(offer("BMW", "320", "5", "9 000 лв.").to_row())
        .unwrap();
    writer.flush().unwrap();
    drop(writer);

    let report = merge_partials(&output, run_date()).unwrap();

    assert_eq!(report.rows_read, 2);
    assert_eq!(report.rows_malformed, 1);
    assert_eq!(report.rows_written, 1);
}

#[test]
fn test_merge_without_partials_writes_empty_dataset() {
    let scratch = tempdir().unwrap();
    let output = output_config(scratch.path());

    let report = merge_partials(&output, run_date()).unwrap();

    assert_eq!(report.files_merged, 0);
    assert_eq!(report.rows_written, 0);
    let mut reader = csv::Reader::from_path(&report.output_path).unwrap();
    assert_eq!(reader.headers().unwrap().len(), 26);
    assert_eq!(reader.records().count(), 0);
}

#[test]
fn test_rerun_on_same_day_replaces_dataset() {
    let scratch = tempdir().unwrap();
    let output = output_config(scratch.path());
    let partial_dir = Path::new(&output.partial_dir);

    let mut morning = PartialOutput::open(partial_dir, "w0-g0").unwrap();
    morning
        .append(&[offer("Audi", "A4", "100", "20 000 лв."), offer("BMW", "320", "5", "9 000 лв.")])
        .unwrap();
    morning.finish().unwrap();
    let first = merge_partials(&output, run_date()).unwrap();
    assert_eq!(first.rows_written, 2);

    let mut evening = PartialOutput::open(partial_dir, "w0-g0").unwrap();
    evening
        .append(&[offer("Skoda", "Octavia", "12", "15 500 лв.")])
        .unwrap();
    evening.finish().unwrap();
    let second = merge_partials(&output, run_date()).unwrap();

    assert_eq!(second.output_path, first.output_path);
    assert_eq!(second.rows_written, 1);

    let mut reader = csv::Reader::from_path(&second.output_path).unwrap();
    let makes: Vec<String> = reader
        .records()
        .map(|row| row.unwrap()[Field::Make.index()].to_string())
        .collect();
    assert_eq!(makes, vec!["Skoda"]);
}
