//! Excel extraction through calamine (xlsx, xlsm, xls, ods).

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use polars::prelude::*;
use tracing::debug;

use crate::cells::{CellValue, ColumnBuilder, frame_from_builders};
use crate::error::{IngestError, Result};
use crate::options::IngestOptions;

/// Largest integer an f64 holds exactly.
const MAX_EXACT_FLOAT_INT: f64 = 9_007_199_254_740_992.0;

fn excel_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Null,
        Data::Int(v) => CellValue::Int(*v),
        // Workbooks store every number as a float.
        Data::Float(v) if v.fract() == 0.0 && v.abs() < MAX_EXACT_FLOAT_INT => {
            CellValue::Int(*v as i64)
        }
        Data::Float(v) => CellValue::Float(*v),
        Data::Bool(v) => CellValue::Bool(*v),
        Data::String(v) if v.is_empty() => CellValue::Null,
        Data::String(v) | Data::DateTimeIso(v) | Data::DurationIso(v) => {
            CellValue::Text(v.clone())
        }
        Data::DateTime(v) => v.as_datetime().map_or(CellValue::Null, CellValue::DateTime),
    }
}

fn header_name(cell: Option<&Data>, index: usize) -> String {
    match cell {
        Some(Data::Empty) | None => format!("Unnamed: {index}"),
        Some(value) => value.to_string(),
    }
}

/// Reads one worksheet; the first row holds the column names.
pub fn read_excel(path: &Path, options: &IngestOptions) -> Result<DataFrame> {
    if !path.exists() {
        return Err(IngestError::SourceNotFound {
            path: path.to_path_buf(),
        });
    }
    let excel_error = |message: String| IngestError::Excel {
        path: path.to_path_buf(),
        message,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| excel_error(e.to_string()))?;
    let sheet = match options.sheet_name.as_deref() {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| excel_error("workbook has no sheets".to_string()))?,
    };
    debug!(path = %path.display(), sheet = %sheet, "reading worksheet");
    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| excel_error(format!("sheet '{sheet}': {e}")))?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(DataFrame::empty());
    };
    let mut builders: Vec<ColumnBuilder> = (0..range.width())
        .map(|idx| ColumnBuilder::new(header_name(header.get(idx), idx)))
        .collect();
    for row in rows {
        for (idx, builder) in builders.iter_mut().enumerate() {
            builder.push(row.get(idx).map_or(CellValue::Null, excel_cell));
        }
    }
    Ok(frame_from_builders(builders)?)
}
