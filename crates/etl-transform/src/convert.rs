//! Column type coercion.
//!
//! Numeric and text targets use polars' strict cast, so any present value
//! that cannot be represented in the target type is an error rather than a
//! silent null. Text columns converted to `datetime`, `date` or `bool` are
//! parsed here.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use etl_model::TargetType;
use polars::prelude::*;

use crate::error::{Result, TransformError};

/// Days between 0001-01-01 and 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y", "%Y%m%d"];

/// Parses a calendar timestamp or date. Dates map to midnight; offsets are
/// normalized to UTC.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| parse_date(value).and_then(|d| d.and_hms_opt(0, 0, 0)))
}

/// Parses a calendar date, accepting a timestamp and keeping its date part.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

/// Parses every present, non-blank value of a text series with `parse`;
/// blank strings become missing.
fn parse_text<T, F>(series: &Series, target: TargetType, parse: F) -> Result<Vec<Option<T>>>
where
    F: Fn(&str) -> Option<T>,
{
    let mut values = Vec::with_capacity(series.len());
    for raw in series.str()? {
        match raw {
            None => values.push(None),
            Some(text) if text.trim().is_empty() => values.push(None),
            Some(text) => match parse(text) {
                Some(value) => values.push(Some(value)),
                None => {
                    return Err(TransformError::TypeConversion {
                        column: series.name().to_string(),
                        target,
                        message: format!("cannot parse '{text}'"),
                    });
                }
            },
        }
    }
    Ok(values)
}

fn polars_type(target: TargetType) -> DataType {
    match target {
        TargetType::Int64 => DataType::Int64,
        TargetType::Int32 => DataType::Int32,
        TargetType::Float64 => DataType::Float64,
        TargetType::Float32 => DataType::Float32,
        TargetType::String => DataType::String,
        TargetType::Boolean => DataType::Boolean,
        TargetType::Datetime => DataType::Datetime(TimeUnit::Milliseconds, None),
        TargetType::Date => DataType::Date,
    }
}

/// Coerces `series` to `target`, keeping its name.
pub fn coerce(series: &Series, target: TargetType) -> Result<Series> {
    let name = series.name().clone();
    let is_text = series.dtype() == &DataType::String;
    let converted = match target {
        TargetType::Datetime if is_text => {
            let millis: Vec<Option<i64>> = parse_text(series, target, |text| {
                parse_timestamp(text).map(|dt| dt.and_utc().timestamp_millis())
            })?;
            Series::new(name, millis).cast(&polars_type(target))
        }
        TargetType::Date if is_text => {
            let days: Vec<Option<i32>> = parse_text(series, target, |text| {
                parse_date(text).map(|d| d.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE)
            })?;
            Series::new(name, days).cast(&polars_type(target))
        }
        TargetType::Boolean if is_text => {
            let flags: Vec<Option<bool>> = parse_text(series, target, parse_bool)?;
            Ok(Series::new(name, flags))
        }
        _ => series.strict_cast(&polars_type(target)),
    };
    converted.map_err(|e| TransformError::TypeConversion {
        column: series.name().to_string(),
        target,
        message: e.to_string(),
    })
}
