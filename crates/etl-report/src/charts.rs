//! PNG chart rendering with plotters.
//!
//! Figures are drawn at 300 DPI: 10x6 inches for bar, line and pie charts,
//! 12x8 inches for the correlation heatmap. Font sizes are given in points
//! and scaled to pixels at that resolution.

use std::collections::HashMap;
use std::path::Path;

use chrono::DateTime;
use plotters::element::Pie;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use polars::prelude::{DataFrame, DataType, TimeUnit};

use crate::common::{cell_text, is_null_at, numeric_column};
use crate::error::{ReportError, Result};

/// Output resolution of every chart.
pub const DPI: u32 = 300;
const FIGURE_SIZE: (u32, u32) = (10 * DPI, 6 * DPI);
const HEATMAP_SIZE: (u32, u32) = (12 * DPI, 8 * DPI);
const FONT: &str = "sans-serif";

// Seaborn "deep" palette.
const PALETTE: [RGBColor; 10] = [
    RGBColor(76, 114, 176),
    RGBColor(221, 132, 82),
    RGBColor(85, 168, 104),
    RGBColor(196, 78, 82),
    RGBColor(129, 114, 179),
    RGBColor(147, 120, 96),
    RGBColor(218, 139, 195),
    RGBColor(140, 140, 140),
    RGBColor(204, 185, 116),
    RGBColor(100, 181, 205),
];

/// Chart types understood by report configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
    Heatmap,
}

impl ChartKind {
    /// Parses a chart `type` tag; unknown tags yield `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "bar" => Some(ChartKind::Bar),
            "line" => Some(ChartKind::Line),
            "pie" => Some(ChartKind::Pie),
            "heatmap" | "correlation" => Some(ChartKind::Heatmap),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Pie => "pie",
            ChartKind::Heatmap => "heatmap",
        }
    }

    /// Title used when a chart spec does not give one.
    pub fn default_title(&self) -> &'static str {
        match self {
            ChartKind::Bar => "Bar Chart",
            ChartKind::Line => "Line Chart",
            ChartKind::Pie => "Pie Chart",
            ChartKind::Heatmap => "Correlation Heatmap",
        }
    }
}

fn px(points: f64) -> i32 {
    (points * f64::from(DPI) / 72.0).round() as i32
}

fn font(points: f64) -> FontDesc<'static> {
    (FONT, f64::from(px(points))).into_font()
}

fn invalid(message: impl Into<String>) -> ReportError {
    ReportError::InvalidChart {
        message: message.into(),
    }
}

/// Label for a categorical axis position; only whole positions are labelled.
fn category_label(labels: &[String], position: f64) -> String {
    let index = position.round();
    if (position - index).abs() > 1e-6 || index < 0.0 {
        return String::new();
    }
    labels.get(index as usize).cloned().unwrap_or_default()
}

/// Padded axis range over `values`, optionally stretched to include zero.
fn value_range(values: impl IntoIterator<Item = f64>, include_zero: bool) -> (f64, f64) {
    let (mut low, mut high) = values
        .into_iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !low.is_finite() || !high.is_finite() {
        return (0.0, 1.0);
    }
    if include_zero {
        low = low.min(0.0);
        high = high.max(0.0);
    }
    if (high - low).abs() < f64::EPSILON {
        return (low - 1.0, high + 1.0);
    }
    let pad = (high - low) * 0.05;
    (if low < 0.0 || !include_zero { low - pad } else { low }, high + pad)
}

/// Mean of `y` per distinct `x` value, in order of first appearance.
pub(crate) fn category_means(df: &DataFrame, x: &str, y: &str) -> Result<Vec<(String, f64)>> {
    let x_column = df.column(x)?;
    let values = numeric_column(df, y)?.cast(&DataType::Float64)?;
    let values = values.as_materialized_series().f64()?;

    let mut order: Vec<(String, f64, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for (idx, value) in values.into_iter().enumerate() {
        let Some(value) = value.filter(|v| !v.is_nan()) else {
            continue;
        };
        if is_null_at(x_column, idx) {
            continue;
        }
        let label = cell_text(x_column, idx);
        let slot = *index.entry(label.clone()).or_insert_with(|| {
            order.push((label, 0.0, 0));
            order.len() - 1
        });
        order[slot].1 += value;
        order[slot].2 += 1;
    }
    Ok(order
        .into_iter()
        .map(|(label, sum, count)| (label, sum / count as f64))
        .collect())
}

/// Draws one bar per category with the mean of `y` as its height.
pub fn bar_chart(df: &DataFrame, x: &str, y: &str, title: &str, path: &Path) -> Result<()> {
    let means = category_means(df, x, y)?;
    if means.is_empty() {
        return Err(invalid(format!("no values to plot for '{x}' and '{y}'")));
    }
    let labels: Vec<String> = means.iter().map(|(label, _)| label.clone()).collect();
    let (low, high) = value_range(means.iter().map(|(_, mean)| *mean), true);
    let count = means.len() as f64;
    let formatter = |v: &f64| category_label(&labels, *v);

    let root = BitMapBackend::new(path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, font(16.0))
        .margin(px(10.0))
        .x_label_area_size(px(48.0))
        .y_label_area_size(px(60.0))
        .build_cartesian_2d(-0.5f64..count - 0.5, low..high)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(means.len())
        .x_label_formatter(&formatter)
        .x_desc(x)
        .y_desc(y)
        .label_style(font(10.0))
        .axis_desc_style(font(12.0))
        .draw()?;

    chart.draw_series(means.iter().enumerate().map(|(i, (_, mean))| {
        let center = i as f64;
        Rectangle::new(
            [(center - 0.4, 0.0), (center + 0.4, *mean)],
            PALETTE[0].filled(),
        )
    }))?;

    root.present()?;
    Ok(())
}

pub(crate) enum XAxis {
    Numeric,
    Temporal,
    Categorical(Vec<String>),
}

/// Positions of the `x` column on a numeric axis, plus how to label them.
fn x_positions(df: &DataFrame, x: &str) -> Result<(Vec<Option<f64>>, XAxis)> {
    let column = df.column(x)?;
    let dtype = column.dtype();
    if dtype.is_numeric() {
        let cast = column.cast(&DataType::Float64)?;
        let values = cast.as_materialized_series().f64()?.into_iter().collect();
        return Ok((values, XAxis::Numeric));
    }
    if matches!(dtype, DataType::Date | DataType::Datetime(_, _)) {
        let cast = column
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
            .cast(&DataType::Int64)?;
        let values = cast
            .as_materialized_series()
            .i64()?
            .into_iter()
            .map(|v| v.map(|ms| ms as f64))
            .collect();
        return Ok((values, XAxis::Temporal));
    }

    let mut labels: Vec<String> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut values = Vec::with_capacity(column.len());
    for idx in 0..column.len() {
        if is_null_at(column, idx) {
            values.push(None);
            continue;
        }
        let label = cell_text(column, idx);
        let position = *index.entry(label.clone()).or_insert_with(|| {
            labels.push(label);
            labels.len() - 1
        });
        values.push(Some(position as f64));
    }
    Ok((values, XAxis::Categorical(labels)))
}

/// Sorts points by x and averages repeated x values.
fn collapse_points(mut points: Vec<(f64, f64)>) -> Vec<(f64, f64)> {
    points.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut collapsed: Vec<(f64, f64, usize)> = Vec::with_capacity(points.len());
    for (x, y) in points {
        match collapsed.last_mut() {
            Some(last) if last.0 == x => {
                last.1 += y;
                last.2 += 1;
            }
            _ => collapsed.push((x, y, 1)),
        }
    }
    collapsed
        .into_iter()
        .map(|(x, sum, count)| (x, sum / count as f64))
        .collect()
}

/// One line per `hue` value (or a single line), averaged at repeated x.
pub(crate) fn line_series(
    df: &DataFrame,
    x: &str,
    y: &str,
    hue: Option<&str>,
) -> Result<(Vec<(String, Vec<(f64, f64)>)>, XAxis)> {
    let (positions, axis) = x_positions(df, x)?;
    let values = numeric_column(df, y)?.cast(&DataType::Float64)?;
    let values = values.as_materialized_series().f64()?;
    let hue_column = hue.map(|name| df.column(name)).transpose()?;

    let mut groups: Vec<(String, Vec<(f64, f64)>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for (idx, (position, value)) in positions.into_iter().zip(values).enumerate() {
        let (Some(x_value), Some(y_value)) = (position, value) else {
            continue;
        };
        if y_value.is_nan() {
            continue;
        }
        let group = match hue_column {
            Some(column) => {
                if is_null_at(column, idx) {
                    continue;
                }
                cell_text(column, idx)
            }
            None => y.to_string(),
        };
        let slot = *index.entry(group.clone()).or_insert_with(|| {
            groups.push((group, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push((x_value, y_value));
    }
    let groups = groups
        .into_iter()
        .map(|(name, points)| (name, collapse_points(points)))
        .collect();
    Ok((groups, axis))
}

fn x_label(axis: &XAxis, value: f64) -> String {
    match axis {
        XAxis::Numeric => etl_ingest::format_numeric(value),
        XAxis::Temporal => DateTime::from_timestamp_millis(value as i64)
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        XAxis::Categorical(labels) => category_label(labels, value),
    }
}

/// Draws `y` against `x`, one coloured line per `hue` value.
pub fn line_chart(
    df: &DataFrame,
    x: &str,
    y: &str,
    hue: Option<&str>,
    title: &str,
    path: &Path,
) -> Result<()> {
    let (groups, axis) = line_series(df, x, y, hue)?;
    if groups.is_empty() {
        return Err(invalid(format!("no values to plot for '{x}' and '{y}'")));
    }
    let all_points = || groups.iter().flat_map(|(_, points)| points.iter());
    let (x_low, x_high) = match &axis {
        XAxis::Categorical(labels) => (-0.5, labels.len() as f64 - 0.5),
        _ => value_range(all_points().map(|p| p.0), false),
    };
    let (y_low, y_high) = value_range(all_points().map(|p| p.1), false);

    let root = BitMapBackend::new(path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, font(16.0))
        .margin(px(10.0))
        .x_label_area_size(px(48.0))
        .y_label_area_size(px(60.0))
        .build_cartesian_2d(x_low..x_high, y_low..y_high)?;

    let formatter = |v: &f64| x_label(&axis, *v);
    let mut mesh = chart.configure_mesh();
    if let XAxis::Categorical(labels) = &axis {
        mesh.x_labels(labels.len());
    }
    mesh.x_label_formatter(&formatter)
        .x_desc(x)
        .y_desc(y)
        .label_style(font(10.0))
        .axis_desc_style(font(12.0))
        .draw()?;

    for (i, (name, points)) in groups.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        chart
            .draw_series(LineSeries::new(
                points.iter().copied(),
                color.stroke_width(px(1.5) as u32),
            ))?
            .label(name.as_str())
            .legend(move |(lx, ly)| {
                PathElement::new(vec![(lx, ly), (lx + px(14.0), ly)], color.stroke_width(4))
            });
    }

    if hue.is_some() {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font(font(10.0))
            .draw()?;
    }

    root.present()?;
    Ok(())
}

/// Draws a pie of `values` sliced by `labels`, with percentage annotations.
pub fn pie_chart(
    df: &DataFrame,
    values: &str,
    labels: &str,
    title: &str,
    path: &Path,
) -> Result<()> {
    let value_column = numeric_column(df, values)?.cast(&DataType::Float64)?;
    let value_column = value_column.as_materialized_series().f64()?;
    let label_column = df.column(labels)?;

    let mut sizes = Vec::new();
    let mut names = Vec::new();
    for (idx, value) in value_column.into_iter().enumerate() {
        let Some(value) = value.filter(|v| !v.is_nan()) else {
            continue;
        };
        if value < 0.0 {
            return Err(invalid(format!("pie values must be non-negative, got {value}")));
        }
        sizes.push(value);
        names.push(cell_text(label_column, idx));
    }
    if sizes.iter().sum::<f64>() <= 0.0 {
        return Err(invalid(format!("column '{values}' has nothing to plot")));
    }

    let root = BitMapBackend::new(path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let area = root.titled(title, font(16.0))?;
    let (width, height) = area.dim_in_pixel();
    let center = ((width / 2) as i32, (height / 2) as i32);
    let radius = f64::from(width.min(height)) * 0.4;
    let colors: Vec<RGBColor> = (0..sizes.len())
        .map(|i| PALETTE[i % PALETTE.len()])
        .collect();

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &names);
    pie.start_angle(-90.0);
    pie.label_style(font(11.0));
    pie.percentages(font(10.0));
    area.draw(&pie)?;

    root.present()?;
    Ok(())
}

fn pearson(a: &[Option<f64>], b: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter_map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) if !x.is_nan() && !y.is_nan() => Some((*x, *y)),
            _ => None,
        })
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }
    let n = pairs.len() as f64;
    let mean_a = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_b = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut cov, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        cov += (x - mean_a) * (y - mean_b);
        var_a += (x - mean_a).powi(2);
        var_b += (y - mean_b).powi(2);
    }
    let denominator = (var_a * var_b).sqrt();
    if denominator == 0.0 {
        return f64::NAN;
    }
    (cov / denominator).clamp(-1.0, 1.0)
}

/// Pairwise-complete Pearson correlation between the numeric columns.
///
/// Returns the column names and a square matrix in the same order; pairs
/// with fewer than two shared values or no variance are NaN.
pub fn correlation_matrix(df: &DataFrame) -> Result<(Vec<String>, Vec<Vec<f64>>)> {
    let mut names = Vec::new();
    let mut columns = Vec::new();
    for column in df.get_columns() {
        if !column.dtype().is_numeric() {
            continue;
        }
        let cast = column.cast(&DataType::Float64)?;
        let values: Vec<Option<f64>> = cast.as_materialized_series().f64()?.into_iter().collect();
        names.push(column.name().to_string());
        columns.push(values);
    }
    let matrix = columns
        .iter()
        .map(|a| columns.iter().map(|b| pearson(a, b)).collect())
        .collect();
    Ok((names, matrix))
}

/// Diverging blue-white-red scale over [-1, 1].
fn coolwarm(value: f64) -> RGBColor {
    const COLD: (f64, f64, f64) = (59.0, 76.0, 192.0);
    const MID: (f64, f64, f64) = (221.0, 221.0, 221.0);
    const WARM: (f64, f64, f64) = (180.0, 4.0, 38.0);
    if value.is_nan() {
        return RGBColor(240, 240, 240);
    }
    let t = value.clamp(-1.0, 1.0);
    let (from, to, f) = if t < 0.0 {
        (MID, COLD, -t)
    } else {
        (MID, WARM, t)
    };
    let mix = |a: f64, b: f64| (a + (b - a) * f).round() as u8;
    RGBColor(mix(from.0, to.0), mix(from.1, to.1), mix(from.2, to.2))
}

fn anchored(points: f64, h: HPos, v: VPos) -> TextStyle<'static> {
    TextStyle::from(font(points)).pos(Pos::new(h, v))
}

/// Draws the annotated correlation matrix of the numeric columns.
pub fn heatmap(df: &DataFrame, title: &str, path: &Path) -> Result<()> {
    let (names, matrix) = correlation_matrix(df)?;
    if names.is_empty() {
        return Err(invalid("no numeric columns to correlate"));
    }

    let root = BitMapBackend::new(path, HEATMAP_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let area = root.titled(title, font(16.0))?;
    let (width, height) = area.dim_in_pixel();

    let (left, right, top, bottom) = (px(110.0), px(90.0), px(10.0), px(70.0));
    let n = names.len() as i32;
    let cell_w = ((width as i32 - left - right) / n).max(1);
    let cell_h = ((height as i32 - top - bottom) / n).max(1);
    let grid_bottom = top + n * cell_h;

    for (i, row) in matrix.iter().enumerate() {
        for (j, value) in row.iter().enumerate() {
            let x0 = left + j as i32 * cell_w;
            let y0 = top + i as i32 * cell_h;
            area.draw(&Rectangle::new(
                [(x0, y0), (x0 + cell_w, y0 + cell_h)],
                coolwarm(*value).filled(),
            ))?;
            let text = if value.is_nan() {
                "nan".to_string()
            } else {
                format!("{value:.2}")
            };
            area.draw(&Text::new(
                text,
                (x0 + cell_w / 2, y0 + cell_h / 2),
                anchored(10.0, HPos::Center, VPos::Center),
            ))?;
        }
    }

    for (i, name) in names.iter().enumerate() {
        let offset = i as i32;
        area.draw(&Text::new(
            name.clone(),
            (left - px(6.0), top + offset * cell_h + cell_h / 2),
            anchored(10.0, HPos::Right, VPos::Center),
        ))?;
        area.draw(&Text::new(
            name.clone(),
            (left + offset * cell_w + cell_w / 2, grid_bottom + px(6.0)),
            anchored(10.0, HPos::Center, VPos::Top),
        ))?;
    }

    // Colour bar from +1 at the top to -1 at the bottom.
    let bar_left = left + n * cell_w + px(20.0);
    let bar_width = px(14.0);
    let steps = 100;
    let step_h = f64::from(grid_bottom - top) / f64::from(steps);
    for k in 0..steps {
        let value = 1.0 - 2.0 * f64::from(k) / f64::from(steps - 1);
        let y0 = top + (f64::from(k) * step_h).round() as i32;
        let y1 = top + (f64::from(k + 1) * step_h).round() as i32;
        area.draw(&Rectangle::new(
            [(bar_left, y0), (bar_left + bar_width, y1)],
            coolwarm(value).filled(),
        ))?;
    }
    for (label, y) in [
        ("1.0", top),
        ("0.0", (top + grid_bottom) / 2),
        ("-1.0", grid_bottom),
    ] {
        area.draw(&Text::new(
            label,
            (bar_left + bar_width + px(4.0), y),
            anchored(9.0, HPos::Left, VPos::Center),
        ))?;
    }

    root.present()?;
    Ok(())
}
