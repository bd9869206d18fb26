//! Shared helpers for HTML writing and cell access.

use std::io::Write;

use etl_ingest::any_to_string;
use polars::prelude::{AnyValue, Column, DataFrame};
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::error::Result;

/// Writes `<name>text</name>`, escaping the text.
pub(crate) fn write_text_element<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    text: &str,
) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

pub(crate) fn start<W: Write>(writer: &mut Writer<W>, name: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    Ok(())
}

pub(crate) fn end<W: Write>(writer: &mut Writer<W>, name: &str) -> Result<()> {
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Display text of one cell; nulls render as an empty string.
pub(crate) fn cell_text(column: &Column, idx: usize) -> String {
    any_to_string(column.get(idx).unwrap_or(AnyValue::Null))
}

pub(crate) fn is_null_at(column: &Column, idx: usize) -> bool {
    matches!(column.get(idx), Ok(AnyValue::Null) | Err(_))
}

/// Returns the column if it holds numbers, or an invalid-chart error naming it.
pub(crate) fn numeric_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    let column = df.column(name)?;
    if !column.dtype().is_numeric() {
        return Err(crate::error::ReportError::InvalidChart {
            message: format!("column '{name}' is not numeric ({})", column.dtype()),
        });
    }
    Ok(column)
}

/// Replaces characters that are awkward in file names.
pub(crate) fn file_component(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
