//! Largest groups of a table by one aggregated metric.

use anyhow::{Context, Result};
use etl_model::AggFunc;
use etl_transform::Transformer;
use polars::prelude::{DataFrame, SortMultipleOptions};

/// One row per `group_by` value with `metric` aggregated by `func`, largest
/// first, cut to `top` rows. Ties keep key order.
pub fn top_groups(
    df: &DataFrame,
    group_by: &str,
    metric: &str,
    func: AggFunc,
    top: usize,
) -> Result<DataFrame> {
    let mut transformer = Transformer::with_data(df);
    transformer
        .aggregate(&[group_by.to_string()], [(metric, func)])
        .with_context(|| format!("aggregate {metric} by {group_by}"))?;
    let grouped = transformer.to_data()?;
    let sorted = grouped.sort(
        [metric],
        SortMultipleOptions::default()
            .with_order_descending(true)
            .with_nulls_last(true)
            .with_maintain_order(true),
    )?;
    Ok(sorted.head(Some(top)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    fn orders() -> DataFrame {
        df!(
            "region" => ["East", "West", "East", "North", "West"],
            "amount" => [5.0, 2.0, 1.5, 9.0, 1.0]
        )
        .unwrap()
    }

    fn regions(df: &DataFrame) -> Vec<String> {
        df.column("region")
            .unwrap()
            .str()
            .unwrap()
            .into_no_null_iter()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn sums_sorted_descending() {
        let top = top_groups(&orders(), "region", "amount", AggFunc::Sum, 10).unwrap();
        assert_eq!(regions(&top), ["North", "East", "West"]);
        let totals: Vec<f64> = top
            .column("amount")
            .unwrap()
            .f64()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(totals, [9.0, 6.5, 3.0]);
    }

    #[test]
    fn cut_to_top() {
        let top = top_groups(&orders(), "region", "amount", AggFunc::Max, 2).unwrap();
        assert_eq!(regions(&top), ["North", "East"]);
    }

    #[test]
    fn unknown_group_column_is_an_error() {
        assert!(top_groups(&orders(), "city", "amount", AggFunc::Sum, 5).is_err());
    }
}
