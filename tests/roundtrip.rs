mod common;

use std::fs;

use chrono::NaiveDate;
use common::{config_for, num, text, write_key_table, write_source};
use poxc_merge::config::OutputFormat;
use poxc_merge::io::{delimited, excel_read, excel_write, output};
use poxc_merge::pipeline;
use tempfile::tempdir;

fn march_seventh() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 7).expect("valid date")
}

#[test]
fn outputs_are_named_after_the_run_date() {
    assert_eq!(
        output::output_file_name(march_seventh(), OutputFormat::Csv),
        "output_03-07-2024.csv"
    );
    assert_eq!(
        output::output_file_name(march_seventh(), OutputFormat::Xlsx),
        "output_03-07-2024.xlsx"
    );
}

#[test]
fn csv_output_reads_back_with_the_same_rows_and_columns() {
    let temp_dir = tempdir().expect("temporary directory");
    let data_dir = temp_dir.path().join("data");
    let output_dir = temp_dir.path().join("output");
    fs::create_dir(&data_dir).expect("data directory created");
    write_key_table(
        &data_dir,
        &[
            vec![num(1.0), text("0-10"), text("A")],
            vec![num(2.0), text("0-10"), text("B")],
        ],
    );
    write_source(
        &data_dir,
        "F1.xlsx",
        &[
            vec![num(2.0), text("0-10"), num(7.25)],
            vec![num(1.0), text("0-10"), num(5.0)],
            vec![num(3.0), text("0-10"), num(9.0)],
        ],
    );

    let config = config_for(&data_dir, &output_dir);
    let output = pipeline::run(&config, march_seventh(), |_| {}).expect("run succeeds");

    assert_eq!(
        output.written,
        vec![
            output_dir.join("output_03-07-2024.xlsx"),
            output_dir.join("output_03-07-2024.csv"),
        ]
    );

    let dataset = &output.run.dataset;
    let restored = delimited::read_table(&output_dir.join("output_03-07-2024.csv"))
        .expect("CSV read back");
    assert_eq!(restored.columns, dataset.columns);
    assert_eq!(restored.rows.len(), dataset.len());
    for (restored_row, record) in restored.rows.iter().zip(&dataset.records) {
        let restored_text: Vec<String> = restored_row.iter().map(ToString::to_string).collect();
        let original_text: Vec<String> = record.cells.iter().map(ToString::to_string).collect();
        assert_eq!(restored_text, original_text);
    }

    let sheet = excel_read::read_sheet(
        &output_dir.join("output_03-07-2024.xlsx"),
        excel_write::OUTPUT_SHEET,
    )
    .expect("workbook read back");
    assert_eq!(sheet.columns, dataset.columns);
    let cells: Vec<_> = dataset.records.iter().map(|record| record.cells.clone()).collect();
    assert_eq!(sheet.rows, cells);
}

#[test]
fn rerunning_on_the_same_date_overwrites_previous_output() {
    let temp_dir = tempdir().expect("temporary directory");
    let data_dir = temp_dir.path().join("data");
    let output_dir = temp_dir.path().join("output");
    fs::create_dir(&data_dir).expect("data directory created");
    fs::create_dir(&output_dir).expect("output directory created ahead of the run");
    write_key_table(&data_dir, &[vec![num(1.0), text("0-10"), text("A")]]);
    write_source(&data_dir, "F1.xlsx", &[vec![num(1.0), text("0-10"), num(5.0)]]);

    let mut config = config_for(&data_dir, &output_dir);
    config.formats = vec![OutputFormat::Csv];
    pipeline::run(&config, march_seventh(), |_| {}).expect("first run succeeds");

    write_source(
        &data_dir,
        "F2.xlsx",
        &[vec![num(1.0), text("10-20"), num(6.0)]],
    );
    let output = pipeline::run(&config, march_seventh(), |_| {}).expect("second run succeeds");

    let entries: Vec<_> = fs::read_dir(&output_dir)
        .expect("output directory listed")
        .collect();
    assert_eq!(entries.len(), 1);
    let restored = delimited::read_table(&output.written[0]).expect("CSV read back");
    assert_eq!(restored.rows.len(), 2);
}

#[test]
fn summary_document_lists_outcomes_and_findings() {
    let temp_dir = tempdir().expect("temporary directory");
    let data_dir = temp_dir.path();
    write_key_table(
        data_dir,
        &[
            vec![num(1.0), text("0-10"), text("A")],
            vec![num(2.0), text("0-10"), text("B")],
        ],
    );
    write_source(data_dir, "F1.xlsx", &[vec![num(1.0), text("0-10"), num(5.0)]]);
    fs::write(data_dir.join("broken.xlsx"), b"garbage").expect("fixture written");

    let config = config_for(data_dir, &data_dir.join("output"));
    let run = pipeline::merge_sources(&config, |_| {}).expect("run succeeds");
    let summary_path = data_dir.join("summary.json");
    pipeline::write_summary(&summary_path, &run, &[]).expect("summary written");

    let written = fs::read_to_string(&summary_path).expect("summary read");
    let parsed: serde_json::Value = serde_json::from_str(&written).expect("JSON parsed");

    assert_eq!(parsed["rows"], 1);
    assert_eq!(parsed["files"][0]["status"], "skipped");
    assert_eq!(parsed["files"][0]["file"], "broken.xlsx");
    assert_eq!(parsed["files"][1]["status"], "merged");
    assert_eq!(parsed["validation"]["missing_keys"][0]["plot"], "2");
}
