//! HTML report rendering.

use std::io::Write;

use polars::prelude::DataFrame;
use quick_xml::Writer;
use quick_xml::events::{BytesStart, BytesText, Event};

use crate::common::{cell_text, end, start, write_text_element};
use crate::error::Result;

/// Rows shown in the data preview table.
pub const PREVIEW_ROWS: usize = 100;

const STYLE: &str = "
body { font-family: Arial, sans-serif; margin: 40px; }
h1 { color: #333; }
table { border-collapse: collapse; width: 100%; margin-top: 20px; }
th, td { border: 1px solid #ddd; padding: 8px; text-align: left; }
th { background-color: #4CAF50; color: white; }
tr:nth-child(even) { background-color: #f2f2f2; }
.summary { background-color: #f9f9f9; padding: 20px; margin: 20px 0; }
";

/// Renders the report page: title, generation time, optional summary
/// statistics and a preview of the first [`PREVIEW_ROWS`] rows.
pub fn render_html(
    df: &DataFrame,
    title: &str,
    summary: Option<&DataFrame>,
    generated_at: &str,
) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::DocType(BytesText::from_escaped("html")))?;
    start(&mut writer, "html")?;

    start(&mut writer, "head")?;
    let mut meta = BytesStart::new("meta");
    meta.push_attribute(("charset", "utf-8"));
    writer.write_event(Event::Empty(meta))?;
    write_text_element(&mut writer, "title", title)?;
    write_text_element(&mut writer, "style", STYLE)?;
    end(&mut writer, "head")?;

    start(&mut writer, "body")?;
    write_text_element(&mut writer, "h1", title)?;
    write_text_element(&mut writer, "p", &format!("Generated: {generated_at}"))?;

    if let Some(stats) = summary {
        let mut div = BytesStart::new("div");
        div.push_attribute(("class", "summary"));
        writer.write_event(Event::Start(div))?;
        write_text_element(&mut writer, "h2", "Summary Statistics")?;
        write_table(&mut writer, stats, stats.height())?;
        end(&mut writer, "div")?;
    }

    write_text_element(
        &mut writer,
        "h2",
        &format!("Data Preview (First {PREVIEW_ROWS} rows)"),
    )?;
    write_table(&mut writer, df, PREVIEW_ROWS)?;

    end(&mut writer, "body")?;
    end(&mut writer, "html")?;

    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}

fn write_table<W: Write>(writer: &mut Writer<W>, df: &DataFrame, limit: usize) -> Result<()> {
    let mut table = BytesStart::new("table");
    table.push_attribute(("class", "dataframe"));
    writer.write_event(Event::Start(table))?;

    start(writer, "thead")?;
    start(writer, "tr")?;
    for name in df.get_column_names() {
        write_text_element(writer, "th", name.as_str())?;
    }
    end(writer, "tr")?;
    end(writer, "thead")?;

    start(writer, "tbody")?;
    for idx in 0..df.height().min(limit) {
        start(writer, "tr")?;
        for column in df.get_columns() {
            write_text_element(writer, "td", &cell_text(column, idx))?;
        }
        end(writer, "tr")?;
    }
    end(writer, "tbody")?;

    end(writer, "table")?;
    Ok(())
}
