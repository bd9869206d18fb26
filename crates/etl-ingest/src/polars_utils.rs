//! Polars AnyValue utility functions.
//!
//! Helpers for turning cell values into display text and numbers, shared by
//! the readers here and by report rendering.

use polars::prelude::*;

/// Display text for one cell: nulls are empty, text is unquoted and floats
/// go through [`format_numeric`].
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => other.to_string(),
    }
}

/// Formats a float for display: integral values without a fraction, NaN as
/// `NaN`, everything else with at most six decimals.
pub fn format_numeric(v: f64) -> String {
    if v.is_nan() {
        return "NaN".to_string();
    }
    if v.fract() == 0.0 && v.abs() < 1e15 {
        return format!("{v:.0}");
    }
    let s = format!("{v:.6}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Numeric cells as f64; `None` for nulls, text, booleans and temporals.
pub fn any_to_f64(value: AnyValue<'_>) -> Option<f64> {
    if value.dtype().is_numeric() {
        value.extract::<f64>()
    } else {
        None
    }
}

/// Collects the present values of a numeric column as f64.
pub fn numeric_values(column: &Column) -> PolarsResult<Vec<f64>> {
    let cast = column.cast(&DataType::Float64)?;
    Ok(cast.as_materialized_series().f64()?.into_iter().flatten().collect())
}
