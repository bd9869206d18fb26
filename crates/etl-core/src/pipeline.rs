//! Extract, transform and report against one current table.

use std::path::Path;
use std::time::Instant;

use etl_ingest::{IngestOptions, Ingestor, SourceKind};
use etl_model::{ChartSpec, DataSummary, DuplicateKeep, FrameStats};
use etl_report::{ChartKind, DestinationKind, ExportOptions, Reporter, export};
use etl_transform::Transformer;
use polars::prelude::DataFrame;
use tracing::{debug, info, info_span};

use crate::config::{PipelineConfig, ReportConfig, SourceConfig, TransformConfig};
use crate::error::{PipelineError, Result};

/// Orchestrates extract → transform → report for one table.
///
/// The pipeline holds at most one current table. `extract` sets it and seeds
/// the transformer with a copy; `transform` replaces it with the
/// transformer's result. Every stage method returns `&mut Self` so calls
/// chain with `?`.
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    ingestor: Ingestor,
    transformer: Transformer,
    reporter: Reporter,
    data: Option<DataFrame>,
}

fn required<'a>(value: Option<&'a str>, field: &str, chart: &ChartSpec) -> Result<&'a str> {
    value.ok_or_else(|| {
        PipelineError::config(format!("{} chart requires '{field}'", chart.kind))
    })
}

impl Pipeline {
    /// Builds a pipeline; creates the report output directory.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let reporter = Reporter::new(&config.reporting.output_dir)?;
        Ok(Self {
            ingestor: Ingestor::new(config.ingestion.clone()),
            transformer: Transformer::new(),
            reporter,
            data: None,
            config,
        })
    }

    /// Builds a pipeline from a YAML config file.
    pub fn from_config_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(PipelineConfig::from_path(path)?)
    }

    /// Builds a pipeline with default settings (reports under `reports/`).
    pub fn with_defaults() -> Result<Self> {
        Self::new(PipelineConfig::default())
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn transformer(&self) -> &Transformer {
        &self.transformer
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    fn current(&self) -> Result<&DataFrame> {
        self.data.as_ref().ok_or(PipelineError::NoData)
    }

    /// Loads a table from `location` and makes it the current table.
    ///
    /// Database sources need `options.query`.
    pub fn extract(
        &mut self,
        kind: SourceKind,
        location: &str,
        options: &IngestOptions,
    ) -> Result<&mut Self> {
        let df = self.ingestor.load(kind, location, options)?;
        self.transformer.set_data(&df);
        self.data = Some(df);
        Ok(self)
    }

    /// Applies duplicate removal, missing-value handling, type conversions
    /// and calculated columns, in that order, then replaces the current table.
    pub fn transform(&mut self, config: &TransformConfig) -> Result<&mut Self> {
        let rows_before = self.current()?.height();
        let span = info_span!("transform");
        let _guard = span.enter();
        let start = Instant::now();

        if config.remove_duplicates {
            self.transformer
                .remove_duplicates(None, DuplicateKeep::First)?;
        }
        if let Some(strategy) = config.handle_missing {
            self.transformer
                .handle_missing_values(strategy, config.fill_value.as_ref(), None)?;
        }
        if !config.type_conversions.is_empty() {
            self.transformer.convert_types(
                config
                    .type_conversions
                    .iter()
                    .map(|(column, target)| (column.as_str(), *target)),
            )?;
        }
        for derived in &config.calculated_columns {
            self.transformer
                .add_calculated_column(&derived.name, &derived.calculation)?;
        }

        let df = self.transformer.to_data()?;
        info!(
            rows_before,
            rows_after = df.height(),
            duration_ms = start.elapsed().as_millis(),
            "transformation complete"
        );
        self.data = Some(df);
        Ok(self)
    }

    /// Writes the current table to `location`.
    pub fn load(
        &mut self,
        kind: DestinationKind,
        location: impl AsRef<Path>,
        options: &ExportOptions,
    ) -> Result<&mut Self> {
        let df = self.current()?;
        export(kind, df, location.as_ref(), options)?;
        Ok(self)
    }

    /// Writes the HTML report, then each recognised chart.
    ///
    /// Unknown chart types are skipped. Files written are listed by
    /// [`Reporter::artifacts`].
    pub fn generate_report(&mut self, config: &ReportConfig) -> Result<&mut Self> {
        let span = info_span!("report", title = %config.title);
        let _guard = span.enter();
        let df = self.data.as_ref().ok_or(PipelineError::NoData)?;

        self.reporter
            .generate_html_report(df, &config.title, config.include_summary)?;

        for chart in &config.charts {
            let Some(kind) = ChartKind::from_tag(&chart.kind) else {
                debug!(chart_type = %chart.kind, "skipping unknown chart type");
                continue;
            };
            let title = chart.title.as_deref().unwrap_or(kind.default_title());
            match kind {
                ChartKind::Bar => {
                    let x = required(chart.x.as_deref(), "x", chart)?;
                    let y = required(chart.y.as_deref(), "y", chart)?;
                    self.reporter.create_bar_chart(df, x, y, title)?;
                }
                ChartKind::Line => {
                    let x = required(chart.x.as_deref(), "x", chart)?;
                    let y = required(chart.y.as_deref(), "y", chart)?;
                    self.reporter
                        .create_line_chart(df, x, y, title, chart.hue.as_deref())?;
                }
                ChartKind::Pie => {
                    let values = chart.values.as_deref().or(chart.y.as_deref());
                    let labels = chart.names.as_deref().or(chart.x.as_deref());
                    let values = required(values, "values", chart)?;
                    let labels = required(labels, "names", chart)?;
                    self.reporter.create_pie_chart(df, values, labels, title)?;
                }
                ChartKind::Heatmap => {
                    self.reporter.create_heatmap(df, title)?;
                }
            }
        }
        Ok(self)
    }

    /// Copy of the current table.
    pub fn get_data(&self) -> Result<DataFrame> {
        self.current().cloned()
    }

    /// Shape and memory of the current table, or [`DataSummary::NoData`].
    pub fn get_summary(&self) -> DataSummary {
        match &self.data {
            None => DataSummary::NoData,
            Some(df) => DataSummary::Loaded(FrameStats {
                rows: df.height(),
                columns: df.width(),
                column_names: df
                    .get_column_names()
                    .iter()
                    .map(|name| name.to_string())
                    .collect(),
                memory_bytes: df.estimated_size(),
            }),
        }
    }

    /// Runs extract, then transform and report when configured, and returns
    /// the final table. The first failure aborts the remaining stages.
    pub fn run_full_pipeline(
        &mut self,
        source: &SourceConfig,
        transform: Option<&TransformConfig>,
        report: Option<&ReportConfig>,
    ) -> Result<DataFrame> {
        let kind = source.source_kind()?;
        self.extract(kind, &source.path, &source.options)?;
        if let Some(config) = transform {
            self.transform(config)?;
        }
        if let Some(config) = report {
            self.generate_report(config)?;
        }
        let df = self.get_data()?;
        info!(rows = df.height(), "pipeline completed, processed {} rows", df.height());
        Ok(df)
    }
}
