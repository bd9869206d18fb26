//! Parsing of the repeatable `run` flags into pipeline settings.

use anyhow::{Context, Result, bail};
use etl_model::{ChartSpec, TargetType};
use etl_transform::{CalculatedColumn, DerivedColumn};

fn split_pair<'a>(flag: &str, text: &'a str, separator: char) -> Result<(&'a str, &'a str)> {
    let Some((left, right)) = text.split_once(separator) else {
        bail!("{flag} expects LEFT{separator}RIGHT, got '{text}'");
    };
    let (left, right) = (left.trim(), right.trim());
    if left.is_empty() || right.is_empty() {
        bail!("{flag} expects LEFT{separator}RIGHT, got '{text}'");
    }
    Ok((left, right))
}

/// `COLUMN=TYPE`, e.g. `amount=float`.
pub fn parse_conversion(text: &str) -> Result<(String, TargetType)> {
    let (column, target) = split_pair("--convert", text, '=')?;
    let target = target
        .parse::<TargetType>()
        .with_context(|| format!("--convert {text}"))?;
    Ok((column.to_string(), target))
}

/// `NAME=FORMULA`, e.g. `total=price * quantity`.
pub fn parse_derived(text: &str) -> Result<DerivedColumn> {
    let (name, formula) = split_pair("--derive", text, '=')?;
    let calculation =
        CalculatedColumn::formula(formula).with_context(|| format!("--derive {text}"))?;
    Ok(DerivedColumn::new(name, calculation))
}

/// `X:Y` for a bar chart.
pub fn parse_bar(text: &str) -> Result<ChartSpec> {
    let (x, y) = split_pair("--bar", text, ':')?;
    Ok(ChartSpec::new("bar").with_x(x).with_y(y))
}

/// `X:Y` or `X:Y:HUE` for a line chart.
pub fn parse_line(text: &str) -> Result<ChartSpec> {
    let parts: Vec<&str> = text.split(':').map(str::trim).collect();
    match parts.as_slice() {
        [x, y] if !x.is_empty() && !y.is_empty() => {
            Ok(ChartSpec::new("line").with_x(*x).with_y(*y))
        }
        [x, y, hue] if !x.is_empty() && !y.is_empty() && !hue.is_empty() => Ok(ChartSpec::new(
            "line",
        )
        .with_x(*x)
        .with_y(*y)
        .with_hue(*hue)),
        _ => bail!("--line expects X:Y or X:Y:HUE, got '{text}'"),
    }
}
