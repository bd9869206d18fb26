use std::collections::{HashMap, HashSet};
use std::time::Instant;

use etl_model::{
    AggFunc, ColumnSummary, DuplicateKeep, FrameSummary, MissingValueStrategy, Scalar, TargetType,
};
use polars::prelude::*;
use tracing::{debug, info};

use crate::aggregate;
use crate::calculated::CalculatedColumn;
use crate::convert;
use crate::error::{Result, TransformError};
use crate::history::{StepReport, TransformStep};
use crate::missing;

/// Holds one table and applies operations to it in call order.
///
/// Every operation replaces the held table with its result and returns
/// `&mut Self`, so calls chain with `?`. A failed operation leaves the held
/// table untouched.
#[derive(Debug, Default)]
pub struct Transformer {
    data: Option<DataFrame>,
    history: Vec<StepReport>,
}

fn keep_strategy(keep: DuplicateKeep) -> UniqueKeepStrategy {
    match keep {
        DuplicateKeep::First => UniqueKeepStrategy::First,
        DuplicateKeep::Last => UniqueKeepStrategy::Last,
        DuplicateKeep::None => UniqueKeepStrategy::None,
    }
}

fn ensure_columns(df: &DataFrame, columns: &[String]) -> Result<()> {
    match columns.iter().find(|c| df.column(c).is_err()) {
        Some(missing) => Err(TransformError::ColumnNotFound {
            column: missing.clone(),
        }),
        None => Ok(()),
    }
}

/// Column names after applying `mapping` to the names of `df`. When a key
/// repeats, the last pair wins.
fn renamed_columns(df: &DataFrame, mapping: &[(String, String)]) -> Result<Vec<String>> {
    let lookup: HashMap<&str, &str> = mapping
        .iter()
        .map(|(old, new)| (old.as_str(), new.as_str()))
        .collect();
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| {
            lookup
                .get(name.as_str())
                .map_or_else(|| name.to_string(), |new| (*new).to_string())
        })
        .collect();
    let mut seen = HashSet::new();
    if let Some(duplicate) = names.iter().find(|name| !seen.insert(name.as_str())) {
        return Err(TransformError::config(format!(
            "renaming would produce duplicate column '{duplicate}'"
        )));
    }
    Ok(names)
}

fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names().iter().map(|n| n.to_string()).collect()
}

impl Transformer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transformer holding a copy of `df`.
    pub fn with_data(df: &DataFrame) -> Self {
        Self {
            data: Some(df.clone()),
            history: Vec::new(),
        }
    }

    /// Replaces the held table with a copy of `df` and clears the history.
    pub fn set_data(&mut self, df: &DataFrame) -> &mut Self {
        self.data = Some(df.clone());
        self.history.clear();
        self
    }

    pub fn data(&self) -> Option<&DataFrame> {
        self.data.as_ref()
    }

    /// Copy of the held table.
    pub fn to_data(&self) -> Result<DataFrame> {
        self.frame().cloned()
    }

    pub fn history(&self) -> &[StepReport] {
        &self.history
    }

    pub fn summary(&self) -> Result<FrameSummary> {
        let df = self.frame()?;
        Ok(FrameSummary {
            rows: df.height(),
            columns: df
                .get_columns()
                .iter()
                .map(|c| ColumnSummary {
                    name: c.name().to_string(),
                    dtype: c.dtype().to_string(),
                    missing: c.null_count(),
                })
                .collect(),
        })
    }

    fn frame(&self) -> Result<&DataFrame> {
        self.data.as_ref().ok_or(TransformError::NoData)
    }

    fn apply<F>(&mut self, step: TransformStep, op: F) -> Result<StepReport>
    where
        F: FnOnce(&DataFrame) -> Result<DataFrame>,
    {
        let current = self.frame()?;
        let start = Instant::now();
        let rows_before = current.height();
        let next = op(current)?;
        let report = StepReport {
            step,
            rows_before,
            rows_after: next.height(),
        };
        debug!(
            step = %report.step,
            rows_before = report.rows_before,
            rows_after = report.rows_after,
            duration_ms = start.elapsed().as_millis(),
            "applied transform step"
        );
        self.data = Some(next);
        self.history.push(report.clone());
        Ok(report)
    }

    /// Removes duplicated rows, comparing `subset` columns (all when `None`).
    pub fn remove_duplicates(
        &mut self,
        subset: Option<&[String]>,
        keep: DuplicateKeep,
    ) -> Result<&mut Self> {
        let subset = subset.filter(|s| !s.is_empty());
        let report = self.apply(TransformStep::RemoveDuplicates { keep }, |df| {
            if let Some(columns) = subset {
                ensure_columns(df, columns)?;
            }
            Ok(df.unique_stable(subset, keep_strategy(keep), None)?)
        })?;
        info!(removed = report.rows_removed(), "removed {} duplicate rows", report.rows_removed());
        Ok(self)
    }

    /// Handles missing values in `columns` (all when `None`).
    pub fn handle_missing_values(
        &mut self,
        strategy: MissingValueStrategy,
        fill_value: Option<&Scalar>,
        columns: Option<&[String]>,
    ) -> Result<&mut Self> {
        let report = self.apply(TransformStep::HandleMissing { strategy }, |df| {
            let targets = match columns {
                Some(columns) => {
                    ensure_columns(df, columns)?;
                    columns.to_vec()
                }
                None => column_names(df),
            };
            missing::apply(df, strategy, fill_value, &targets)
        })?;
        info!(
            strategy = %strategy,
            removed = report.rows_removed(),
            "handled missing values using strategy: {strategy}"
        );
        Ok(self)
    }

    /// Coerces columns to target types. Columns that do not exist are skipped.
    pub fn convert_types<I, K>(&mut self, mapping: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = (K, TargetType)>,
        K: AsRef<str>,
    {
        let mapping: Vec<(String, TargetType)> = mapping
            .into_iter()
            .map(|(column, target)| (column.as_ref().to_string(), target))
            .collect();
        let step = TransformStep::ConvertTypes {
            columns: mapping.iter().map(|(c, _)| c.clone()).collect(),
        };
        self.apply(step, |df| {
            let mut out = df.clone();
            for (column, target) in &mapping {
                let Ok(existing) = df.column(column) else {
                    debug!(column = %column, "skipping conversion of absent column");
                    continue;
                };
                let converted = convert::coerce(existing.as_materialized_series(), *target)?;
                out.with_column(converted)?;
                debug!(column = %column, target = %target, "converted column");
            }
            Ok(out)
        })?;
        Ok(self)
    }

    /// Adds (or overwrites) column `name` computed by `calculation`.
    pub fn add_calculated_column(
        &mut self,
        name: &str,
        calculation: &CalculatedColumn,
    ) -> Result<&mut Self> {
        let step = TransformStep::AddCalculatedColumn {
            name: name.to_string(),
        };
        self.apply(step, |df| calculation.apply(df, name))?;
        info!(column = name, "added calculated column: {name}");
        Ok(self)
    }

    /// Keeps the rows where `predicate` is true; missing mask entries drop
    /// the row.
    pub fn filter_rows<F>(&mut self, predicate: F) -> Result<&mut Self>
    where
        F: FnOnce(&DataFrame) -> PolarsResult<BooleanChunked>,
    {
        let report = self.apply(TransformStep::FilterRows, |df| {
            let mask = predicate(df)?;
            if mask.len() != df.height() {
                return Err(TransformError::Shape {
                    context: "filter mask",
                    expected: df.height(),
                    actual: mask.len(),
                });
            }
            Ok(df.filter(&mask)?)
        })?;
        info!(
            removed = report.rows_removed(),
            "filtered {} rows",
            report.rows_removed()
        );
        Ok(self)
    }

    /// Renames columns of the current table in one pass: every key is
    /// matched against the names before the call, so swaps work and keys
    /// that match no column are ignored. Renames that would leave two
    /// columns with the same name are a configuration error.
    pub fn rename_columns<I, K, V>(&mut self, mapping: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mapping: Vec<(String, String)> = mapping
            .into_iter()
            .map(|(old, new)| (old.as_ref().to_string(), new.as_ref().to_string()))
            .collect();
        let renamed = {
            let df = self.frame()?;
            mapping
                .iter()
                .filter(|(old, new)| old != new && df.column(old).is_ok())
                .count()
        };
        self.apply(TransformStep::RenameColumns { renamed }, |df| {
            let mut out = df.clone();
            out.set_column_names(renamed_columns(df, &mapping)?)?;
            Ok(out)
        })?;
        info!(renamed, "renamed {renamed} columns");
        Ok(self)
    }

    /// Replaces the held table with one row per `group_by` key combination.
    pub fn aggregate<I, K>(&mut self, group_by: &[String], aggregations: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = (K, AggFunc)>,
        K: AsRef<str>,
    {
        let aggregations: Vec<(String, AggFunc)> = aggregations
            .into_iter()
            .map(|(column, func)| (column.as_ref().to_string(), func))
            .collect();
        let step = TransformStep::Aggregate {
            group_by: group_by.to_vec(),
        };
        let report = self.apply(step, |df| {
            ensure_columns(df, group_by)?;
            aggregate::aggregate(df, group_by, &aggregations)
        })?;
        info!(
            groups = report.rows_after,
            "aggregated data by {}",
            group_by.join(", ")
        );
        Ok(self)
    }
}
