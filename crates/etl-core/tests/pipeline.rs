//! Tests for pipeline orchestration and configuration.

use std::fs;
use std::path::Path;

use etl_core::{
    JobConfig, Pipeline, PipelineConfig, PipelineError, ReportConfig, SourceConfig,
    TransformConfig,
};
use etl_ingest::{IngestError, IngestOptions, SourceKind};
use etl_model::{ChartSpec, DataSummary, MissingValueStrategy, Scalar, TargetType};
use etl_report::{DestinationKind, ExportOptions, ReportError};
use etl_transform::{CalculatedColumn, TransformStep};
use polars::prelude::*;
use tempfile::TempDir;

const SAMPLE: &str = "id,value,category\n1,10,A\n2,20,B\n2,20,B\n3,,C\n4,40,A\n";

fn pipeline_in(dir: &TempDir) -> Pipeline {
    let config = PipelineConfig::default().with_output_dir(dir.path().join("reports"));
    Pipeline::new(config).unwrap()
}

fn write_sample(dir: &TempDir) -> String {
    let path = dir.path().join("sample.csv");
    fs::write(&path, SAMPLE).unwrap();
    path.to_string_lossy().into_owned()
}

fn names(df: &DataFrame) -> Vec<String> {
    df.get_column_names().iter().map(|s| s.to_string()).collect()
}

fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

// ============================================================================
// State and preconditions
// ============================================================================

#[test]
fn summary_before_extract_is_sentinel_but_get_data_fails() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline_in(&dir);

    assert_eq!(pipeline.get_summary(), DataSummary::NoData);
    insta::assert_json_snapshot!(pipeline.get_summary(), @r###"
    {
      "status": "no_data"
    }
    "###);
    assert!(matches!(pipeline.get_data(), Err(PipelineError::NoData)));
}

#[test]
fn stages_require_data() {
    let dir = TempDir::new().unwrap();
    let mut pipeline = pipeline_in(&dir);

    let err = pipeline.transform(&TransformConfig::default()).unwrap_err();
    assert!(matches!(err, PipelineError::NoData));

    let err = pipeline
        .load(
            DestinationKind::Csv,
            dir.path().join("out.csv"),
            &ExportOptions::default(),
        )
        .unwrap_err();
    assert!(matches!(err, PipelineError::NoData));

    let err = pipeline.generate_report(&ReportConfig::default()).unwrap_err();
    assert!(matches!(err, PipelineError::NoData));
}

#[test]
fn output_dir_is_created_on_construction() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline_in(&dir);
    assert!(dir.path().join("reports").is_dir());
    assert!(pipeline.reporter().artifacts().is_empty());
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn missing_config_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let err = Pipeline::from_config_path(dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, PipelineError::ConfigNotFound { path } if path.ends_with("absent.yaml")));
}

#[test]
fn config_file_sets_reader_defaults_and_output_dir() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("custom-out");
    let config_path = dir.path().join("config.yaml");
    fs::write(
        &config_path,
        format!(
            "ingestion:\n  delimiter: ';'\nreporting:\n  output_dir: {}\n",
            out.display()
        ),
    )
    .unwrap();
    let data = dir.path().join("semi.csv");
    fs::write(&data, "a;b\n1;x\n2;y\n").unwrap();

    let mut pipeline = Pipeline::from_config_path(&config_path).unwrap();
    assert!(out.is_dir());
    pipeline
        .extract(
            SourceKind::Csv,
            &data.to_string_lossy(),
            &IngestOptions::default(),
        )
        .unwrap();
    assert_eq!(pipeline.get_data().unwrap().shape(), (2, 2));
}

// ============================================================================
// Extract and transform
// ============================================================================

#[test]
fn dedupe_then_drop_leaves_three_complete_rows() {
    let dir = TempDir::new().unwrap();
    let path = write_sample(&dir);
    let mut pipeline = pipeline_in(&dir);

    let transform = TransformConfig::default().with_missing(MissingValueStrategy::Drop, None);
    pipeline
        .extract(SourceKind::Csv, &path, &IngestOptions::default())
        .unwrap()
        .transform(&transform)
        .unwrap();

    let df = pipeline.get_data().unwrap();
    assert_eq!(df.height(), 3);
    let nulls: usize = df.get_columns().iter().map(|c| c.null_count()).sum();
    assert_eq!(nulls, 0);
    let ids: Vec<Option<i64>> = df.column("id").unwrap().i64().unwrap().into_iter().collect();
    assert_eq!(ids, [Some(1), Some(2), Some(4)]);

    let DataSummary::Loaded(stats) = pipeline.get_summary() else {
        panic!("expected loaded summary");
    };
    assert_eq!(stats.rows, 3);
    assert_eq!(stats.columns, 3);
    assert_eq!(stats.column_names, ["id", "value", "category"]);
    assert!(stats.memory_bytes > 0);
    assert!(stats.memory_usage().ends_with(" MB"));
}

#[test]
fn transform_applies_steps_in_fixed_order() {
    let dir = TempDir::new().unwrap();
    let path = write_sample(&dir);
    let mut pipeline = pipeline_in(&dir);

    let transform = TransformConfig::default()
        .with_missing(MissingValueStrategy::Fill, Some(Scalar::Int(0)))
        .with_conversion("value", TargetType::Float64)
        .with_conversion("not_there", TargetType::Int64)
        .with_calculated_column("double", CalculatedColumn::formula("value * 2").unwrap());
    pipeline
        .extract(SourceKind::Csv, &path, &IngestOptions::default())
        .unwrap()
        .transform(&transform)
        .unwrap();

    let df = pipeline.get_data().unwrap();
    assert_eq!(df.height(), 4);
    assert_eq!(names(&df), ["id", "value", "category", "double"]);
    let double: Vec<Option<f64>> = df
        .column("double")
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(double, [Some(20.0), Some(40.0), Some(0.0), Some(80.0)]);

    let steps: Vec<&str> = pipeline
        .transformer()
        .history()
        .iter()
        .map(|report| report.step.name())
        .collect();
    assert_eq!(
        steps,
        ["remove_duplicates", "handle_missing", "convert_types", "add_calculated_column"]
    );
}

#[test]
fn conversions_run_in_the_order_given() {
    let dir = TempDir::new().unwrap();
    let path = write_sample(&dir);
    let mut pipeline = pipeline_in(&dir);

    let transform = TransformConfig::default()
        .with_conversion("value", TargetType::Float64)
        .with_conversion("id", TargetType::String)
        .with_conversion("category", TargetType::String);
    pipeline
        .extract(SourceKind::Csv, &path, &IngestOptions::default())
        .unwrap()
        .transform(&transform)
        .unwrap();

    let converted = pipeline
        .transformer()
        .history()
        .iter()
        .find_map(|report| match &report.step {
            TransformStep::ConvertTypes { columns } => Some(columns.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(converted, ["value", "id", "category"]);
}

#[test]
fn fill_without_value_is_a_configuration_error() {
    let dir = TempDir::new().unwrap();
    let path = write_sample(&dir);
    let mut pipeline = pipeline_in(&dir);
    pipeline
        .extract(SourceKind::Csv, &path, &IngestOptions::default())
        .unwrap();

    let transform = TransformConfig::default().with_missing(MissingValueStrategy::Fill, None);
    let err = pipeline.transform(&transform).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Transform(etl_transform::TransformError::Configuration { .. })
    ));
    // The current table is untouched by the failed transform.
    assert_eq!(pipeline.get_data().unwrap().height(), 5);
}

#[test]
fn earlier_copies_are_unaffected_by_later_transforms() {
    let dir = TempDir::new().unwrap();
    let path = write_sample(&dir);
    let mut pipeline = pipeline_in(&dir);
    pipeline
        .extract(SourceKind::Csv, &path, &IngestOptions::default())
        .unwrap();

    let before = pipeline.get_data().unwrap();
    pipeline.transform(&TransformConfig::default()).unwrap();

    assert_eq!(before.height(), 5);
    assert_eq!(pipeline.get_data().unwrap().height(), 4);
}

#[test]
fn database_extract_requires_query() {
    let dir = TempDir::new().unwrap();
    let mut pipeline = pipeline_in(&dir);
    let err = pipeline
        .extract(SourceKind::Database, ":memory:", &IngestOptions::default())
        .unwrap_err();
    assert!(matches!(err, PipelineError::Ingest(IngestError::MissingQuery)));
}

#[test]
fn unsupported_source_aborts_full_run() {
    let dir = TempDir::new().unwrap();
    let mut pipeline = pipeline_in(&dir);
    let source = SourceConfig {
        kind: "xml".to_string(),
        path: "data.xml".to_string(),
        options: IngestOptions::default(),
    };
    let err = pipeline
        .run_full_pipeline(&source, None, Some(&ReportConfig::default()))
        .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Ingest(IngestError::UnsupportedSource { kind }) if kind == "xml"
    ));
    assert!(files_in(&dir.path().join("reports")).is_empty());
}

// ============================================================================
// Load and report
// ============================================================================

#[test]
fn csv_load_round_trips() {
    let dir = TempDir::new().unwrap();
    let path = write_sample(&dir);
    let mut pipeline = pipeline_in(&dir);
    let out = dir.path().join("exports").join("clean.csv");

    pipeline
        .extract(SourceKind::Csv, &path, &IngestOptions::default())
        .unwrap()
        .load(DestinationKind::Csv, &out, &ExportOptions::default())
        .unwrap();

    let original = pipeline.get_data().unwrap();
    let mut reloaded = pipeline_in(&dir);
    reloaded
        .extract(SourceKind::Csv, &out.to_string_lossy(), &IngestOptions::default())
        .unwrap();
    let reloaded = reloaded.get_data().unwrap();
    assert_eq!(reloaded.height(), original.height());
    assert_eq!(names(&reloaded), names(&original));
}

#[test]
fn unknown_destination_tag_is_rejected() {
    let err = "parquet".parse::<DestinationKind>().unwrap_err();
    assert!(matches!(err, ReportError::UnsupportedDestination { .. }));
}

#[test]
fn report_skips_unknown_chart_types() {
    let dir = TempDir::new().unwrap();
    let path = write_sample(&dir);
    let mut pipeline = pipeline_in(&dir);
    pipeline
        .extract(SourceKind::Csv, &path, &IngestOptions::default())
        .unwrap();

    let report = ReportConfig::default()
        .with_title("Sample")
        .with_chart(ChartSpec::new("scatter").with_x("id").with_y("value"));
    pipeline.generate_report(&report).unwrap();

    let artifacts = pipeline.reporter().artifacts();
    assert_eq!(artifacts.len(), 1);
    assert_eq!(artifacts[0].extension().unwrap(), "html");
    let files = files_in(&dir.path().join("reports"));
    assert_eq!(files.len(), 1);
    assert!(files[0].starts_with("report_"));
}

#[test]
fn report_draws_configured_charts_after_html() {
    let dir = TempDir::new().unwrap();
    let path = write_sample(&dir);
    let mut pipeline = pipeline_in(&dir);
    pipeline
        .extract(SourceKind::Csv, &path, &IngestOptions::default())
        .unwrap();

    let report = ReportConfig::default()
        .with_chart(ChartSpec::new("bar").with_x("category").with_y("value"))
        .with_chart(ChartSpec::new("heatmap"));
    pipeline.generate_report(&report).unwrap();

    let artifacts = pipeline.reporter().artifacts();
    assert_eq!(artifacts.len(), 3);
    assert_eq!(artifacts[0].extension().unwrap(), "html");
    let bar = artifacts[1].file_name().unwrap().to_string_lossy();
    assert!(bar.starts_with("bar_chart_category_value_"), "{bar}");
    let heatmap = artifacts[2].file_name().unwrap().to_string_lossy();
    assert!(heatmap.starts_with("correlation_heatmap_"), "{heatmap}");
    assert!(artifacts.iter().all(|path| path.is_file()));
}

#[test]
fn bar_chart_without_y_is_a_config_error() {
    let dir = TempDir::new().unwrap();
    let path = write_sample(&dir);
    let mut pipeline = pipeline_in(&dir);
    pipeline
        .extract(SourceKind::Csv, &path, &IngestOptions::default())
        .unwrap();

    let report = ReportConfig::default().with_chart(ChartSpec::new("bar").with_x("category"));
    let err = pipeline.generate_report(&report).unwrap_err();
    assert!(matches!(err, PipelineError::Config { .. }));
    // The HTML report written before the failure stays on disk.
    assert_eq!(files_in(&dir.path().join("reports")).len(), 1);
}

#[test]
fn job_file_drives_full_run() {
    let dir = TempDir::new().unwrap();
    let data = write_sample(&dir);
    let job = JobConfig::from_yaml_str(&format!(
        "source:\n  type: csv\n  path: {data}\ntransform:\n  handle_missing: mean\n  calculated_columns:\n    - name: scaled\n      formula: value / 10\nreport:\n  title: Job\n  include_summary: false\n"
    ))
    .unwrap();

    let mut pipeline = pipeline_in(&dir);
    let df = pipeline
        .run_full_pipeline(&job.source, job.transform.as_ref(), job.report.as_ref())
        .unwrap();

    assert_eq!(df.height(), 4);
    let scaled: Vec<Option<f64>> = df
        .column("scaled")
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect();
    // Mean of 10, 20 and 40 fills the gap.
    assert!((scaled[2].unwrap() - 70.0 / 30.0).abs() < 1e-9);
    assert_eq!(pipeline.reporter().artifacts().len(), 1);
}
