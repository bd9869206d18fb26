//! Missing-value strategies applied to a set of target columns.

use etl_model::{MissingValueStrategy, Scalar};
use polars::prelude::*;
use tracing::debug;

use crate::error::{Result, TransformError};

pub(crate) fn scalar_lit(value: &Scalar) -> Expr {
    match value {
        Scalar::Bool(v) => lit(*v),
        Scalar::Int(v) => lit(*v),
        Scalar::Float(v) => lit(*v),
        Scalar::Str(v) => lit(v.clone()),
    }
}

/// Applies `strategy` to `columns`, which must already exist in `df`.
pub(crate) fn apply(
    df: &DataFrame,
    strategy: MissingValueStrategy,
    fill_value: Option<&Scalar>,
    columns: &[String],
) -> Result<DataFrame> {
    match strategy {
        MissingValueStrategy::Drop => Ok(df.drop_nulls(Some(columns))?),
        MissingValueStrategy::Fill => {
            let value = fill_value.ok_or_else(|| {
                TransformError::config("the fill strategy requires a fill value")
            })?;
            let exprs: Vec<Expr> = columns
                .iter()
                .map(|name| col(name.as_str()).fill_null(scalar_lit(value)))
                .collect();
            Ok(df.clone().lazy().with_columns(exprs).collect()?)
        }
        MissingValueStrategy::ForwardFill => {
            directional(df, columns, FillNullStrategy::Forward(None))
        }
        MissingValueStrategy::BackwardFill => {
            directional(df, columns, FillNullStrategy::Backward(None))
        }
        MissingValueStrategy::Mean | MissingValueStrategy::Median => {
            let exprs: Vec<Expr> = columns
                .iter()
                .filter(|name| is_numeric(df, name))
                .map(|name| {
                    let column = col(name.as_str());
                    let statistic = if strategy == MissingValueStrategy::Mean {
                        column.clone().mean()
                    } else {
                        column.clone().median()
                    };
                    column.fill_null(statistic)
                })
                .collect();
            if exprs.len() < columns.len() {
                debug!(
                    skipped = columns.len() - exprs.len(),
                    strategy = %strategy,
                    "skipping non-numeric columns"
                );
            }
            if exprs.is_empty() {
                return Ok(df.clone());
            }
            Ok(df.clone().lazy().with_columns(exprs).collect()?)
        }
    }
}

fn is_numeric(df: &DataFrame, name: &str) -> bool {
    df.column(name).is_ok_and(|c| c.dtype().is_numeric())
}

fn directional(
    df: &DataFrame,
    columns: &[String],
    strategy: FillNullStrategy,
) -> Result<DataFrame> {
    let mut out = df.clone();
    for name in columns {
        let filled = df
            .column(name)?
            .as_materialized_series()
            .fill_null(strategy)?;
        out.with_column(filled)?;
    }
    Ok(out)
}
