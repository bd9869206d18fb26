//! Derived columns: caller closures, polars expressions, or simple formulas.

use std::fmt;
use std::sync::Arc;

use polars::prelude::*;
use serde::Deserialize;

use crate::error::{Result, TransformError};

/// Closure computing a whole column from the current table.
pub type ColumnFn = dyn Fn(&DataFrame) -> PolarsResult<Series> + Send + Sync;

/// How a derived column is computed.
#[derive(Clone)]
pub enum CalculatedColumn {
    Function(Arc<ColumnFn>),
    Expr(Expr),
}

impl CalculatedColumn {
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&DataFrame) -> PolarsResult<Series> + Send + Sync + 'static,
    {
        CalculatedColumn::Function(Arc::new(f))
    }

    pub fn expr(expr: Expr) -> Self {
        CalculatedColumn::Expr(expr)
    }

    /// Parses `"<operand> <op> <operand>"`, where each operand is a column
    /// name or a numeric literal and `op` is one of `+ - * /`.
    pub fn formula(text: &str) -> Result<Self> {
        parse_formula(text).map(CalculatedColumn::Expr)
    }

    /// Returns `df` with the computed column stored under `name`.
    pub(crate) fn apply(&self, df: &DataFrame, name: &str) -> Result<DataFrame> {
        match self {
            CalculatedColumn::Function(f) => {
                let series = f(df)?;
                if series.len() != df.height() {
                    return Err(TransformError::Shape {
                        context: "calculated column",
                        expected: df.height(),
                        actual: series.len(),
                    });
                }
                let mut out = df.clone();
                out.with_column(series.with_name(name.into()))?;
                Ok(out)
            }
            CalculatedColumn::Expr(expr) => Ok(df
                .clone()
                .lazy()
                .with_column(expr.clone().alias(name))
                .collect()?),
        }
    }
}

impl fmt::Debug for CalculatedColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalculatedColumn::Function(_) => f.write_str("CalculatedColumn::Function(..)"),
            CalculatedColumn::Expr(expr) => write!(f, "CalculatedColumn::Expr({expr:?})"),
        }
    }
}

/// A derived column with its output name, as listed in a transform config.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "FormulaColumn")]
pub struct DerivedColumn {
    pub name: String,
    pub calculation: CalculatedColumn,
}

impl DerivedColumn {
    pub fn new(name: impl Into<String>, calculation: CalculatedColumn) -> Self {
        Self {
            name: name.into(),
            calculation,
        }
    }
}

#[derive(Deserialize)]
struct FormulaColumn {
    name: String,
    formula: String,
}

impl TryFrom<FormulaColumn> for DerivedColumn {
    type Error = TransformError;

    fn try_from(value: FormulaColumn) -> Result<Self> {
        Ok(DerivedColumn::new(
            value.name,
            CalculatedColumn::formula(&value.formula)?,
        ))
    }
}

const OPERATORS: [char; 4] = ['+', '-', '*', '/'];

fn operand(text: &str) -> Result<Expr> {
    if let Ok(number) = text.parse::<f64>() {
        return Ok(lit(number));
    }
    if text.contains(OPERATORS) || text.contains(char::is_whitespace) {
        return Err(TransformError::config(format!(
            "formula operand '{text}' must be a column name or a number"
        )));
    }
    Ok(col(text))
}

fn parse_formula(text: &str) -> Result<Expr> {
    for (idx, op) in text.char_indices() {
        if !OPERATORS.contains(&op) {
            continue;
        }
        let (left, right) = (text[..idx].trim(), text[idx + 1..].trim());
        // A sign, not an operator: "-2 * qty" or "1e-3 * qty".
        if left.is_empty() || right.is_empty() {
            continue;
        }
        if matches!(op, '+' | '-')
            && left.ends_with(['e', 'E'])
            && left[..left.len() - 1].parse::<f64>().is_ok()
        {
            continue;
        }
        let (left, right) = (operand(left)?, operand(right)?);
        return Ok(match op {
            '+' => left + right,
            '-' => left - right,
            '*' => left * right,
            _ => left / right,
        });
    }
    Err(TransformError::config(format!(
        "formula '{text}' must have the form '<operand> <op> <operand>'"
    )))
}
