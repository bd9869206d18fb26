//! CSV and Excel export of a table.

use std::fs::{self, File};
use std::path::Path;

use etl_ingest::{any_to_f64, any_to_string};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use simple_excel_writer::{Row, Workbook};
use tracing::info;

use crate::destination::DestinationKind;
use crate::error::{ReportError, Result};

/// Options for writing a table to a destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Field separator for CSV output; must be ASCII.
    pub delimiter: char,
    pub include_header: bool,
    /// Worksheet name for Excel output.
    pub sheet_name: Option<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            include_header: true,
            sheet_name: None,
        }
    }
}

const DEFAULT_SHEET: &str = "Sheet1";

fn export_error(path: &Path, message: impl Into<String>) -> ReportError {
    ReportError::Export {
        path: path.to_path_buf(),
        message: message.into(),
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ReportError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

/// Writes the table as delimited text without an index column.
pub fn write_csv(df: &DataFrame, path: &Path, options: &ExportOptions) -> Result<()> {
    if !options.delimiter.is_ascii() {
        return Err(export_error(
            path,
            format!("delimiter '{}' is not ASCII", options.delimiter),
        ));
    }
    ensure_parent(path)?;
    let mut file = File::create(path).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut frame = df.clone();
    CsvWriter::new(&mut file)
        .include_header(options.include_header)
        .with_separator(options.delimiter as u8)
        .finish(&mut frame)
        .map_err(|e| export_error(path, e.to_string()))?;
    Ok(())
}

/// Writes the table to one worksheet of an xlsx workbook.
pub fn write_excel(df: &DataFrame, path: &Path, options: &ExportOptions) -> Result<()> {
    let location = path
        .to_str()
        .ok_or_else(|| export_error(path, "path is not valid UTF-8"))?;
    ensure_parent(path)?;

    let mut workbook = Workbook::create(location);
    let mut sheet = workbook.create_sheet(options.sheet_name.as_deref().unwrap_or(DEFAULT_SHEET));
    let columns = df.get_columns();
    workbook
        .write_sheet(&mut sheet, |writer| {
            if options.include_header {
                let mut header = Row::new();
                for column in columns {
                    header.add_cell(column.name().to_string());
                }
                writer.append_row(header)?;
            }
            for idx in 0..df.height() {
                let mut row = Row::new();
                for column in columns {
                    let value = column.get(idx).unwrap_or(AnyValue::Null);
                    match value {
                        AnyValue::Null => row.add_empty_cells(1),
                        AnyValue::Boolean(b) => row.add_cell(b),
                        other => match any_to_f64(other.clone()) {
                            Some(number) => row.add_cell(number),
                            None => row.add_cell(any_to_string(other)),
                        },
                    }
                }
                writer.append_row(row)?;
            }
            Ok(())
        })
        .map_err(|e| export_error(path, e.to_string()))?;
    workbook
        .close()
        .map_err(|e| export_error(path, e.to_string()))?;
    Ok(())
}

/// Writes the table to `path` in the destination's format.
pub fn export(
    kind: DestinationKind,
    df: &DataFrame,
    path: &Path,
    options: &ExportOptions,
) -> Result<()> {
    match kind {
        DestinationKind::Csv => write_csv(df, path, options)?,
        DestinationKind::Excel => write_excel(df, path, options)?,
    }
    info!(
        destination = %kind,
        path = %path.display(),
        rows = df.height(),
        "Data exported"
    );
    Ok(())
}
