//! Report generation into an output directory.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use polars::prelude::DataFrame;
use tracing::{debug, info};

use crate::charts;
use crate::common::file_component;
use crate::error::{ReportError, Result};
use crate::export::{ExportOptions, write_csv};
use crate::html::render_html;
use crate::stats::summary_statistics;

/// Writes HTML reports, chart images and CSV exports under one directory
/// and remembers every file it produced.
#[derive(Debug, Clone)]
pub struct Reporter {
    output_dir: PathBuf,
    artifacts: Vec<PathBuf>,
}

impl Reporter {
    /// Creates the reporter, creating `output_dir` if it does not exist.
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir).map_err(|source| ReportError::Io {
            path: output_dir.clone(),
            source,
        })?;
        debug!(output_dir = %output_dir.display(), "reporter ready");
        Ok(Self {
            output_dir,
            artifacts: Vec::new(),
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Files written so far, in order.
    pub fn artifacts(&self) -> &[PathBuf] {
        &self.artifacts
    }

    /// Forgets recorded artifacts. Files on disk are left alone.
    pub fn clear_artifacts(&mut self) {
        self.artifacts.clear();
    }

    fn timestamped(&self, stem: &str, extension: &str) -> PathBuf {
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        self.output_dir.join(format!("{stem}_{stamp}.{extension}"))
    }

    fn record(&mut self, path: PathBuf) -> PathBuf {
        info!(path = %path.display(), "artifact written");
        self.artifacts.push(path.clone());
        path
    }

    /// See [`summary_statistics`].
    pub fn summary_statistics(&self, df: &DataFrame, numeric_only: bool) -> Result<DataFrame> {
        summary_statistics(df, numeric_only)
    }

    /// Writes `report_<timestamp>.html` with a preview of the table and,
    /// when `include_summary` is set, its summary statistics.
    pub fn generate_html_report(
        &mut self,
        df: &DataFrame,
        title: &str,
        include_summary: bool,
    ) -> Result<PathBuf> {
        let summary = if include_summary {
            Some(summary_statistics(df, false)?)
        } else {
            None
        };
        let generated_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let html = render_html(df, title, summary.as_ref(), &generated_at)?;

        let path = self.timestamped("report", "html");
        fs::write(&path, html).map_err(|source| ReportError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(self.record(path))
    }

    /// Bar chart of the mean of `y` per `x` category.
    pub fn create_bar_chart(
        &mut self,
        df: &DataFrame,
        x: &str,
        y: &str,
        title: &str,
    ) -> Result<PathBuf> {
        let stem = format!("bar_chart_{}_{}", file_component(x), file_component(y));
        let path = self.timestamped(&stem, "png");
        charts::bar_chart(df, x, y, title, &path)?;
        Ok(self.record(path))
    }

    /// Line chart of `y` over `x`, split into one line per `hue` value.
    pub fn create_line_chart(
        &mut self,
        df: &DataFrame,
        x: &str,
        y: &str,
        title: &str,
        hue: Option<&str>,
    ) -> Result<PathBuf> {
        let stem = format!("line_chart_{}_{}", file_component(x), file_component(y));
        let path = self.timestamped(&stem, "png");
        charts::line_chart(df, x, y, hue, title, &path)?;
        Ok(self.record(path))
    }

    pub fn create_pie_chart(
        &mut self,
        df: &DataFrame,
        values: &str,
        labels: &str,
        title: &str,
    ) -> Result<PathBuf> {
        let stem = format!("pie_chart_{}", file_component(values));
        let path = self.timestamped(&stem, "png");
        charts::pie_chart(df, values, labels, title, &path)?;
        Ok(self.record(path))
    }

    /// Correlation heatmap over the numeric columns.
    pub fn create_heatmap(&mut self, df: &DataFrame, title: &str) -> Result<PathBuf> {
        let path = self.timestamped("correlation_heatmap", "png");
        charts::heatmap(df, title, &path)?;
        Ok(self.record(path))
    }

    /// Writes `filename` under the output directory as CSV with a header.
    pub fn export_to_csv(&mut self, df: &DataFrame, filename: &str) -> Result<PathBuf> {
        let path = self.output_dir.join(filename);
        write_csv(df, &path, &ExportOptions::default())?;
        Ok(self.record(path))
    }
}
