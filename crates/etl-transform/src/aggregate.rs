use etl_model::AggFunc;
use polars::prelude::*;

use crate::error::{Result, TransformError};

fn agg_expr(column: &str, func: AggFunc) -> Expr {
    let c = col(column);
    match func {
        AggFunc::Sum => c.sum(),
        AggFunc::Mean => c.mean(),
        AggFunc::Median => c.median(),
        AggFunc::Min => c.min(),
        AggFunc::Max => c.max(),
        AggFunc::Count => c.count(),
        AggFunc::Size => c.len(),
        AggFunc::First => c.first(),
        AggFunc::Last => c.last(),
        AggFunc::Std => c.std(1),
        AggFunc::Var => c.var(1),
        AggFunc::NUnique => c.n_unique(),
    }
}

/// Groups `df` by `keys` and applies one function per value column.
///
/// Rows with a missing key are excluded. The result has one row per key
/// combination, sorted by the keys, with the key columns first.
pub(crate) fn aggregate(
    df: &DataFrame,
    keys: &[String],
    aggregations: &[(String, AggFunc)],
) -> Result<DataFrame> {
    if keys.is_empty() {
        return Err(TransformError::config("aggregate requires at least one group key"));
    }
    if aggregations.is_empty() {
        return Err(TransformError::config(
            "aggregate requires at least one aggregation",
        ));
    }
    let key_exprs: Vec<Expr> = keys.iter().map(|k| col(k.as_str())).collect();
    let agg_exprs: Vec<Expr> = aggregations
        .iter()
        .map(|(column, func)| agg_expr(column, *func))
        .collect();
    let grouped = df
        .drop_nulls(Some(keys))?
        .lazy()
        .group_by(key_exprs.clone())
        .agg(agg_exprs)
        .sort_by_exprs(key_exprs, SortMultipleOptions::default())
        .collect()?;
    Ok(grouped)
}
