use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use etl_cli::insights::top_groups;
use etl_cli::plan::{parse_bar, parse_conversion, parse_derived, parse_line};
use etl_core::{JobConfig, Pipeline, PipelineConfig, ReportConfig, TransformConfig};
use etl_ingest::{IngestOptions, Ingestor, SourceKind};
use etl_model::{ChartSpec, FrameStats, Scalar};
use etl_report::{DestinationKind, ExportOptions};
use etl_transform::Transformer;
use tracing::{info, info_span};

use crate::cli::{JobArgs, RunArgs, SourceArgs, SummaryArgs};
use crate::types::{GroupInsights, RunOutcome, SourceSummary};

pub fn run_pipeline(args: &RunArgs) -> Result<RunOutcome> {
    let source = &args.source;
    let span = info_span!("run", source = %source.source);
    let _guard = span.enter();

    let mut config = load_config(source.config.as_deref())?;
    if let Some(dir) = &args.output_dir {
        config = config.with_output_dir(dir);
    }
    let transform = transform_config(args)?;
    let report = if args.no_report {
        None
    } else {
        Some(report_config(args)?)
    };

    let mut pipeline = Pipeline::new(config).context("create pipeline")?;
    pipeline
        .extract(
            source.source_type.into(),
            &source.source,
            &ingest_options(source),
        )
        .with_context(|| format!("extract {}", source.source))?
        .transform(&transform)
        .context("transform")?;
    if let Some(report) = &report {
        pipeline.generate_report(report).context("generate report")?;
    }
    let export = match &args.export {
        Some(path) => {
            let kind = DestinationKind::from(args.export_type);
            pipeline
                .load(kind, path, &ExportOptions::default())
                .with_context(|| format!("export {}", path.display()))?;
            Some(path.clone())
        }
        None => None,
    };
    Ok(outcome(&pipeline, &source.source, export))
}

pub fn run_job(args: &JobArgs) -> Result<RunOutcome> {
    let job = JobConfig::from_path(&args.job)
        .with_context(|| format!("load job {}", args.job.display()))?;
    let span = info_span!("job", source = %job.source.path);
    let _guard = span.enter();

    let mut settings = job.settings.clone();
    if let Some(dir) = &args.output_dir {
        settings = settings.with_output_dir(dir);
    }
    let mut pipeline = Pipeline::new(settings).context("create pipeline")?;
    pipeline
        .run_full_pipeline(&job.source, job.transform.as_ref(), job.report.as_ref())
        .with_context(|| format!("run job {}", args.job.display()))?;
    let export = match &job.export {
        Some(export) => {
            let kind = export.destination_kind()?;
            pipeline
                .load(kind, &export.path, &export.options)
                .with_context(|| format!("export {}", export.path.display()))?;
            Some(export.path.clone())
        }
        None => None,
    };
    Ok(outcome(&pipeline, &job.source.path, export))
}

pub fn run_summary(args: &SummaryArgs) -> Result<SourceSummary> {
    let source = &args.source;
    let config = load_config(source.config.as_deref())?;
    let kind: SourceKind = source.source_type.into();
    let df = Ingestor::new(config.ingestion)
        .load(kind, &source.source, &ingest_options(source))
        .with_context(|| format!("extract {}", source.source))?;

    let columns = Transformer::with_data(&df).summary()?;
    let stats = FrameStats {
        rows: df.height(),
        columns: df.width(),
        column_names: columns
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect(),
        memory_bytes: df.estimated_size(),
    };
    let insights = match (&args.group_by, &args.metric) {
        (Some(group_by), Some(metric)) => {
            let func = args.agg.into();
            let table = top_groups(&df, group_by, metric, func, args.top)?;
            info!(groups = table.height(), "computed top groups");
            Some(GroupInsights {
                group_by: group_by.clone(),
                metric: metric.clone(),
                func,
                table,
            })
        }
        _ => None,
    };
    Ok(SourceSummary {
        source: source.source.clone(),
        stats,
        columns,
        insights,
    })
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::from_path(path)
            .with_context(|| format!("load config {}", path.display())),
        None => Ok(PipelineConfig::default()),
    }
}

fn ingest_options(source: &SourceArgs) -> IngestOptions {
    IngestOptions {
        query: source.query.clone(),
        delimiter: source.delimiter,
        sheet_name: source.sheet.clone(),
        ..IngestOptions::default()
    }
}

fn transform_config(args: &RunArgs) -> Result<TransformConfig> {
    let mut config = TransformConfig::default();
    if args.keep_duplicates {
        config = config.keep_duplicates();
    }
    if let Some(missing) = args.missing {
        let fill_value = args.fill_value.as_deref().map(|text| {
            let Ok(value) = text.parse::<Scalar>();
            value
        });
        config = config.with_missing(missing.into(), fill_value);
    }
    for text in &args.convert {
        let (column, target) = parse_conversion(text)?;
        config = config.with_conversion(column, target);
    }
    for text in &args.derive {
        config.calculated_columns.push(parse_derived(text)?);
    }
    Ok(config)
}

fn report_config(args: &RunArgs) -> Result<ReportConfig> {
    let mut config = ReportConfig::default();
    if let Some(title) = &args.title {
        config = config.with_title(title.clone());
    }
    config.include_summary = !args.no_summary;
    for text in &args.bar {
        config = config.with_chart(parse_bar(text)?);
    }
    for text in &args.line {
        config = config.with_chart(parse_line(text)?);
    }
    if args.heatmap {
        config = config.with_chart(ChartSpec::new("heatmap"));
    }
    Ok(config)
}

fn outcome(pipeline: &Pipeline, source: &str, export: Option<PathBuf>) -> RunOutcome {
    RunOutcome {
        source: source.to_string(),
        stats: pipeline.get_summary().stats().cloned(),
        steps: pipeline.transformer().history().to_vec(),
        output_dir: pipeline.reporter().output_dir().to_path_buf(),
        artifacts: pipeline.reporter().artifacts().to_vec(),
        export,
    }
}
