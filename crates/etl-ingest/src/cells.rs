//! Column building for row-oriented sources (Excel sheets, SQL result sets).
//!
//! Cells are collected per column and the column type is inferred once all
//! rows are read: booleans, integers, floats, and timestamps stay typed when
//! every present cell agrees; anything mixed becomes text.

use chrono::NaiveDateTime;
use polars::prelude::*;

use crate::polars_utils::format_numeric;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    DateTime(NaiveDateTime),
}

impl CellValue {
    fn to_text(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            CellValue::Bool(v) => Some(v.to_string()),
            CellValue::Int(v) => Some(v.to_string()),
            CellValue::Float(v) => Some(format_numeric(*v)),
            CellValue::Text(v) => Some(v.clone()),
            CellValue::DateTime(v) => Some(v.format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Inferred {
    Empty,
    Bool,
    Int,
    Float,
    DateTime,
    Text,
}

fn widen(current: Inferred, cell: &CellValue) -> Inferred {
    let next = match cell {
        CellValue::Null => return current,
        CellValue::Bool(_) => Inferred::Bool,
        CellValue::Int(_) => Inferred::Int,
        CellValue::Float(_) => Inferred::Float,
        CellValue::DateTime(_) => Inferred::DateTime,
        CellValue::Text(_) => Inferred::Text,
    };
    match (current, next) {
        (Inferred::Empty, next) => next,
        (a, b) if a == b => a,
        (Inferred::Int, Inferred::Float) | (Inferred::Float, Inferred::Int) => Inferred::Float,
        _ => Inferred::Text,
    }
}

pub(crate) struct ColumnBuilder {
    name: String,
    cells: Vec<CellValue>,
}

impl ColumnBuilder {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, cell: CellValue) {
        self.cells.push(cell);
    }

    pub(crate) fn finish(self) -> PolarsResult<Column> {
        let inferred = self.cells.iter().fold(Inferred::Empty, widen);
        let name: PlSmallStr = self.name.as_str().into();
        let series = match inferred {
            Inferred::Empty => Series::full_null(name, self.cells.len(), &DataType::Float64),
            Inferred::Bool => {
                let values: Vec<Option<bool>> = self
                    .cells
                    .iter()
                    .map(|c| match c {
                        CellValue::Bool(v) => Some(*v),
                        _ => None,
                    })
                    .collect();
                Series::new(name, values)
            }
            Inferred::Int => {
                let values: Vec<Option<i64>> = self
                    .cells
                    .iter()
                    .map(|c| match c {
                        CellValue::Int(v) => Some(*v),
                        _ => None,
                    })
                    .collect();
                Series::new(name, values)
            }
            Inferred::Float => {
                let values: Vec<Option<f64>> = self
                    .cells
                    .iter()
                    .map(|c| match c {
                        CellValue::Int(v) => Some(*v as f64),
                        CellValue::Float(v) => Some(*v),
                        _ => None,
                    })
                    .collect();
                Series::new(name, values)
            }
            Inferred::DateTime => {
                let values: Vec<Option<i64>> = self
                    .cells
                    .iter()
                    .map(|c| match c {
                        CellValue::DateTime(v) => Some(v.and_utc().timestamp_millis()),
                        _ => None,
                    })
                    .collect();
                Series::new(name, values)
                    .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
            }
            Inferred::Text => {
                let values: Vec<Option<String>> =
                    self.cells.iter().map(CellValue::to_text).collect();
                Series::new(name, values)
            }
        };
        Ok(series.into_column())
    }
}

/// Builds a frame from named builders, keeping their order.
pub(crate) fn frame_from_builders(builders: Vec<ColumnBuilder>) -> PolarsResult<DataFrame> {
    let columns = builders
        .into_iter()
        .map(ColumnBuilder::finish)
        .collect::<PolarsResult<Vec<_>>>()?;
    DataFrame::new(columns)
}
