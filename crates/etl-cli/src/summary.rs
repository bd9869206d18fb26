use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};
use etl_ingest::any_to_string;
use polars::prelude::{AnyValue, DataFrame};

use crate::types::{GroupInsights, RunOutcome, SourceSummary};

pub fn print_run_summary(outcome: &RunOutcome) {
    println!("Source: {}", outcome.source);
    println!("Output: {}", outcome.output_dir.display());
    if let Some(path) = &outcome.export {
        println!("Exported: {}", path.display());
    }
    if let Some(stats) = &outcome.stats {
        println!(
            "Rows: {}  Columns: {}  Memory: {}",
            stats.rows,
            stats.columns,
            stats.memory_usage()
        );
    }
    print_step_table(outcome);
    if !outcome.artifacts.is_empty() {
        let mut table = Table::new();
        table.set_header(vec![header_cell("Artifact")]);
        apply_table_style(&mut table);
        for path in &outcome.artifacts {
            table.add_row(vec![Cell::new(path.display())]);
        }
        println!("{table}");
    }
}

fn print_step_table(outcome: &RunOutcome) {
    if outcome.steps.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Step"),
        header_cell("Rows before"),
        header_cell("Rows after"),
        header_cell("Removed"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for report in &outcome.steps {
        table.add_row(vec![
            Cell::new(report.step.name()),
            Cell::new(report.rows_before),
            Cell::new(report.rows_after),
            count_cell(report.rows_before.saturating_sub(report.rows_after)),
        ]);
    }
    println!("{table}");
}

pub fn print_source_summary(summary: &SourceSummary) {
    println!("Source: {}", summary.source);
    println!(
        "Rows: {}  Columns: {}  Memory: {}",
        summary.stats.rows,
        summary.stats.columns,
        summary.stats.memory_usage()
    );
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Type"),
        header_cell("Missing"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for column in &summary.columns.columns {
        table.add_row(vec![
            Cell::new(&column.name).add_attribute(Attribute::Bold),
            dim_cell(&column.dtype),
            count_cell(column.missing),
        ]);
    }
    println!("{table}");
    if let Some(insights) = &summary.insights {
        print_insights(insights);
    }
}

fn print_insights(insights: &GroupInsights) {
    println!(
        "Top {} by {}({})",
        insights.group_by, insights.func, insights.metric
    );
    println!("{}", frame_table(&insights.table));
}

/// Renders every cell of `df`; numeric columns are right-aligned and
/// nulls are dimmed.
fn frame_table(df: &DataFrame) -> Table {
    let mut table = Table::new();
    table.set_header(
        df.get_column_names()
            .iter()
            .map(|name| header_cell(name.as_str()))
            .collect::<Vec<_>>(),
    );
    apply_table_style(&mut table);
    for (idx, column) in df.get_columns().iter().enumerate() {
        if column.dtype().is_numeric() {
            align_column(&mut table, idx, CellAlignment::Right);
        }
    }
    for row in 0..df.height() {
        let cells: Vec<Cell> = df
            .get_columns()
            .iter()
            .map(|column| match column.get(row) {
                Ok(AnyValue::Null) | Err(_) => dim_cell("-"),
                Ok(value) => Cell::new(any_to_string(value)),
            })
            .collect();
        table.add_row(cells);
    }
    table
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
    if table.column_count() >= 3 {
        table.set_constraints(vec![ColumnConstraint::UpperBoundary(Width::Percentage(50))]);
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize) -> Cell {
    if count == 0 {
        dim_cell(count)
    } else {
        Cell::new(count).fg(Color::Yellow)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value.to_string()).fg(Color::DarkGrey)
}
