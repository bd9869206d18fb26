//! Descriptive statistics per column.
//!
//! Numeric columns get count, mean, sample standard deviation, min,
//! quartiles (linear interpolation) and max. When non-numeric columns are
//! included, the table also carries the distinct count, the most frequent
//! value and its frequency, and every cell is rendered as text.

use std::collections::HashMap;

use etl_ingest::format_numeric;
use polars::prelude::*;

use crate::common::{cell_text, is_null_at};
use crate::error::Result;

/// Name of the leading column that labels each statistic row.
pub const STATISTIC_COLUMN: &str = "statistic";

const NUMERIC_ROWS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];
const ALL_ROWS: [&str; 11] = [
    "count", "unique", "top", "freq", "mean", "std", "min", "25%", "50%", "75%", "max",
];

#[derive(Debug, Clone, PartialEq)]
struct NumericSummary {
    count: usize,
    mean: Option<f64>,
    std: Option<f64>,
    min: Option<f64>,
    q1: Option<f64>,
    median: Option<f64>,
    q3: Option<f64>,
    max: Option<f64>,
}

impl NumericSummary {
    fn from_values(mut values: Vec<f64>) -> Self {
        values.retain(|v| !v.is_nan());
        values.sort_by(f64::total_cmp);
        let count = values.len();
        if count == 0 {
            return Self {
                count,
                mean: None,
                std: None,
                min: None,
                q1: None,
                median: None,
                q3: None,
                max: None,
            };
        }
        let mean = values.iter().sum::<f64>() / count as f64;
        let std = (count > 1).then(|| {
            let squares: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (squares / (count - 1) as f64).sqrt()
        });
        Self {
            count,
            mean: Some(mean),
            std,
            min: values.first().copied(),
            q1: Some(quantile(&values, 0.25)),
            median: Some(quantile(&values, 0.5)),
            q3: Some(quantile(&values, 0.75)),
            max: values.last().copied(),
        }
    }

    fn moments(&self) -> [Option<f64>; 7] {
        [
            self.mean,
            self.std,
            self.min,
            self.q1,
            self.median,
            self.q3,
            self.max,
        ]
    }
}

/// Linear interpolation between closest ranks; `sorted` must be non-empty.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (position - lower as f64)
}

struct Frequencies {
    unique: usize,
    top: Option<String>,
    freq: Option<usize>,
}

fn frequencies(column: &Column) -> Frequencies {
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    for idx in 0..column.len() {
        if is_null_at(column, idx) {
            continue;
        }
        let next = counts.len();
        let entry = counts.entry(cell_text(column, idx)).or_insert((next, 0));
        entry.1 += 1;
    }
    // Ties go to the value seen first.
    let top = counts
        .iter()
        .max_by(|a, b| a.1.1.cmp(&b.1.1).then(b.1.0.cmp(&a.1.0)))
        .map(|(value, (_, freq))| (value.clone(), *freq));
    Frequencies {
        unique: counts.len(),
        top: top.as_ref().map(|(value, _)| value.clone()),
        freq: top.map(|(_, freq)| freq),
    }
}

fn numeric_summary(column: &Column) -> Result<NumericSummary> {
    let values = etl_ingest::numeric_values(column)?;
    Ok(NumericSummary::from_values(values))
}

/// Computes per-column statistics.
///
/// With `numeric_only`, only numeric columns are described and the result
/// holds `Float64` columns. Otherwise every column is described and the
/// result holds text columns, with statistics that do not apply left null.
pub fn summary_statistics(df: &DataFrame, numeric_only: bool) -> Result<DataFrame> {
    if numeric_only {
        let mut columns = vec![Column::new(STATISTIC_COLUMN.into(), NUMERIC_ROWS.to_vec())];
        for column in df.get_columns() {
            if !column.dtype().is_numeric() {
                continue;
            }
            let summary = numeric_summary(column)?;
            let mut values = vec![Some(summary.count as f64)];
            values.extend(summary.moments());
            columns.push(Column::new(column.name().clone(), values));
        }
        return Ok(DataFrame::new(columns)?);
    }

    let mut columns = vec![Column::new(STATISTIC_COLUMN.into(), ALL_ROWS.to_vec())];
    for column in df.get_columns() {
        let count = column.len() - column.null_count();
        let mut values: Vec<Option<String>> = Vec::with_capacity(ALL_ROWS.len());
        values.push(Some(count.to_string()));
        if column.dtype().is_numeric() {
            let summary = numeric_summary(column)?;
            values.extend([None, None, None]);
            values.extend(summary.moments().map(|v| v.map(format_numeric)));
        } else {
            let freq = frequencies(column);
            values.push(Some(freq.unique.to_string()));
            values.push(freq.top);
            values.push(freq.freq.map(|f| f.to_string()));
            values.extend([None, None, None, None, None, None, None]);
        }
        columns.push(Column::new(column.name().clone(), values));
    }
    Ok(DataFrame::new(columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(df: &DataFrame, column: &str, row: usize) -> Option<f64> {
        df.column(column)
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap().get(row)
    }

    #[test]
    fn numeric_statistics_follow_sample_definitions() {
        let df = df!(
            "value" => [Some(10.0), Some(20.0), Some(20.0), None, Some(40.0)],
            "category" => ["A", "B", "B", "C", "A"],
        )
        .unwrap();
        let stats = summary_statistics(&df, true).unwrap();

        assert_eq!(stats.width(), 2);
        assert_eq!(stats.height(), 8);
        assert_eq!(value(&stats, "value", 0), Some(4.0));
        assert_eq!(value(&stats, "value", 1), Some(22.5));
        let std = value(&stats, "value", 2).unwrap();
        assert!((std - 12.583_057).abs() < 1e-5);
        assert_eq!(value(&stats, "value", 3), Some(10.0));
        assert_eq!(value(&stats, "value", 4), Some(17.5));
        assert_eq!(value(&stats, "value", 5), Some(20.0));
        assert_eq!(value(&stats, "value", 6), Some(25.0));
        assert_eq!(value(&stats, "value", 7), Some(40.0));
    }

    #[test]
    fn single_value_has_no_std() {
        let df = df!("v" => [3i64]).unwrap();
        let stats = summary_statistics(&df, true).unwrap();
        assert_eq!(value(&stats, "v", 2), None);
        assert_eq!(value(&stats, "v", 5), Some(3.0));
    }

    #[test]
    fn include_all_reports_top_values() {
        let df = df!(
            "id" => [1i64, 2, 3, 4],
            "category" => [Some("B"), Some("A"), Some("B"), None],
        )
        .unwrap();
        let stats = summary_statistics(&df, false).unwrap();
        assert_eq!(stats.height(), ALL_ROWS.len());

        let category = stats.column("category").unwrap().as_materialized_series().str().unwrap();
        assert_eq!(category.get(0), Some("3"));
        assert_eq!(category.get(1), Some("2"));
        assert_eq!(category.get(2), Some("B"));
        assert_eq!(category.get(3), Some("2"));
        assert_eq!(category.get(4), None);

        let id = stats.column("id").unwrap().as_materialized_series().str().unwrap();
        assert_eq!(id.get(0), Some("4"));
        assert_eq!(id.get(1), None);
        assert_eq!(id.get(4), Some("2.5"));
    }

    #[test]
    fn frequency_ties_keep_first_seen() {
        let column = Column::new("c".into(), ["x", "y", "y", "x", "z"]);
        let freq = frequencies(&column);
        assert_eq!(freq.unique, 3);
        assert_eq!(freq.top.as_deref(), Some("x"));
        assert_eq!(freq.freq, Some(2));
    }
}
