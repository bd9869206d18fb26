//! Tests for the chained table transformer.

use std::collections::HashSet;

use etl_model::{AggFunc, DuplicateKeep, MissingValueStrategy, Scalar, TargetType};
use etl_transform::{CalculatedColumn, TransformError, Transformer};
use polars::prelude::*;
use proptest::prelude::*;

/// Five rows: one exact duplicate and one missing value.
fn sample() -> DataFrame {
    df!(
        "id" => [1i64, 2, 2, 3, 4],
        "value" => [Some(10.0), Some(20.0), Some(20.0), None, Some(40.0)],
        "category" => ["A", "B", "B", "C", "A"]
    )
    .unwrap()
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[test]
fn dedupe_then_fill_gives_complete_table() {
    let mut t = Transformer::with_data(&sample());
    t.remove_duplicates(None, DuplicateKeep::First)
        .unwrap()
        .handle_missing_values(MissingValueStrategy::Fill, Some(&Scalar::Int(0)), None)
        .unwrap();

    let df = t.to_data().unwrap();
    assert_eq!(df.height(), 4);
    for column in df.get_columns() {
        assert_eq!(column.null_count(), 0, "nulls left in {}", column.name());
    }
    let value = df.column("value").unwrap().f64().unwrap();
    assert_eq!(value.get(2), Some(0.0));
}

#[test]
fn dedupe_keeps_first_occurrence_order() {
    let mut t = Transformer::with_data(&sample());
    t.remove_duplicates(None, DuplicateKeep::First).unwrap();
    let ids = t.data().unwrap().column("id").unwrap().i64().unwrap().clone();
    assert_eq!(ids.into_no_null_iter().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
}

#[test]
fn dedupe_on_subset_and_keep_last() {
    let mut t = Transformer::with_data(&sample());
    t.remove_duplicates(Some(&strings(&["category"])), DuplicateKeep::Last)
        .unwrap();
    let df = t.to_data().unwrap();
    assert_eq!(df.height(), 3);
    let ids = df.column("id").unwrap().i64().unwrap();
    assert_eq!(ids.into_no_null_iter().collect::<Vec<_>>(), vec![2, 3, 4]);
}

#[test]
fn dedupe_is_idempotent() {
    let mut t = Transformer::with_data(&sample());
    t.remove_duplicates(None, DuplicateKeep::First).unwrap();
    let once = t.to_data().unwrap();
    t.remove_duplicates(None, DuplicateKeep::First).unwrap();
    assert!(t.data().unwrap().equals_missing(&once));
    assert_eq!(t.history()[1].rows_removed(), 0);
}

#[test]
fn dedupe_subset_must_exist() {
    let mut t = Transformer::with_data(&sample());
    let err = t
        .remove_duplicates(Some(&strings(&["nope"])), DuplicateKeep::First)
        .unwrap_err();
    assert!(matches!(err, TransformError::ColumnNotFound { column } if column == "nope"));
    assert_eq!(t.data().unwrap().height(), 5);
    assert!(t.history().is_empty());
}

#[test]
fn operations_without_data_fail() {
    let mut t = Transformer::new();
    assert!(matches!(
        t.remove_duplicates(None, DuplicateKeep::First),
        Err(TransformError::NoData)
    ));
    assert!(matches!(t.to_data(), Err(TransformError::NoData)));
    assert!(matches!(t.summary(), Err(TransformError::NoData)));
    assert!(t.data().is_none());
}

#[test]
fn drop_only_considers_targeted_columns() {
    let df = df!(
        "a" => [Some(1i64), None, Some(3)],
        "b" => [None, Some("x"), Some("y")]
    )
    .unwrap();
    let mut t = Transformer::with_data(&df);
    t.handle_missing_values(MissingValueStrategy::Drop, None, Some(&strings(&["a"])))
        .unwrap();
    let out = t.to_data().unwrap();
    assert_eq!(out.height(), 2);
    assert_eq!(out.column("b").unwrap().null_count(), 1);
}

#[test]
fn fill_requires_value_and_existing_columns() {
    let mut t = Transformer::with_data(&sample());
    let err = t
        .handle_missing_values(MissingValueStrategy::Fill, None, None)
        .unwrap_err();
    assert!(matches!(err, TransformError::Configuration { .. }));

    let err = t
        .handle_missing_values(
            MissingValueStrategy::Fill,
            Some(&Scalar::Int(0)),
            Some(&strings(&["missing"])),
        )
        .unwrap_err();
    assert!(matches!(err, TransformError::ColumnNotFound { .. }));
}

#[test]
fn mean_fills_numeric_columns_only() {
    let df = df!(
        "v" => [Some(1.0), None, Some(5.0)],
        "label" => [Some("a"), None, Some("c")]
    )
    .unwrap();
    let mut t = Transformer::with_data(&df);
    t.handle_missing_values(MissingValueStrategy::Mean, None, None)
        .unwrap();
    let out = t.to_data().unwrap();
    assert_eq!(out.column("v").unwrap().f64().unwrap().get(1), Some(3.0));
    assert_eq!(out.column("label").unwrap().null_count(), 1);
}

#[test]
fn forward_fill_propagates_downward() {
    let df = df!("v" => [None, Some(2i64), None, None, Some(5)]).unwrap();
    let mut t = Transformer::with_data(&df);
    t.handle_missing_values(MissingValueStrategy::ForwardFill, None, None)
        .unwrap();
    let v = t.to_data().unwrap();
    let v = v.column("v").unwrap().i64().unwrap();
    assert_eq!(
        v.into_iter().collect::<Vec<_>>(),
        vec![None, Some(2), Some(2), Some(2), Some(5)]
    );
}

#[test]
fn convert_types_skips_absent_columns() {
    let df = df!(
        "qty" => ["1", "2", "3"],
        "when" => ["2024-01-01", "2024-01-02 08:00:00", "2024-02-29"]
    )
    .unwrap();
    let mut t = Transformer::with_data(&df);
    t.convert_types([
        ("qty", TargetType::Int64),
        ("when", TargetType::Datetime),
        ("absent", TargetType::Float64),
    ])
    .unwrap();
    let out = t.to_data().unwrap();
    assert_eq!(out.column("qty").unwrap().dtype(), &DataType::Int64);
    assert_eq!(
        out.column("when").unwrap().dtype(),
        &DataType::Datetime(TimeUnit::Milliseconds, None)
    );
    assert_eq!(out.width(), 2);
}

#[test]
fn failed_conversion_reports_column() {
    let df = df!("qty" => ["1", "two"]).unwrap();
    let mut t = Transformer::with_data(&df);
    let err = t.convert_types([("qty", TargetType::Int64)]).unwrap_err();
    assert!(matches!(
        err,
        TransformError::TypeConversion { ref column, target: TargetType::Int64, .. } if column == "qty"
    ));
    assert_eq!(t.data().unwrap().column("qty").unwrap().dtype(), &DataType::String);
}

#[test]
fn calculated_column_from_closure_and_expr() {
    let mut t = Transformer::with_data(&sample());
    t.add_calculated_column(
        "double",
        &CalculatedColumn::function(|df| {
            let ids = df.column("id")?.as_materialized_series();
            Ok(ids * 2)
        }),
    )
    .unwrap()
    .add_calculated_column("id", &CalculatedColumn::expr(col("id") + lit(100)))
    .unwrap();

    let df = t.to_data().unwrap();
    assert_eq!(df.width(), 4);
    assert_eq!(df.column("double").unwrap().i64().unwrap().get(4), Some(8));
    assert_eq!(df.column("id").unwrap().i64().unwrap().get(0), Some(101));
}

#[test]
fn filter_rows_with_mask() {
    let mut t = Transformer::with_data(&sample());
    t.filter_rows(|df| df.column("value")?.as_materialized_series().gt(15.0))
        .unwrap();
    let df = t.to_data().unwrap();
    // The missing value compares as null and is dropped.
    assert_eq!(df.height(), 3);
    assert_eq!(t.history()[0].rows_removed(), 2);
}

#[test]
fn filter_rows_rejects_short_mask() {
    let mut t = Transformer::with_data(&sample());
    let err = t
        .filter_rows(|_| Ok(BooleanChunked::new("mask".into(), &[true, false])))
        .unwrap_err();
    assert!(matches!(
        err,
        TransformError::Shape { expected: 5, actual: 2, .. }
    ));
}

#[test]
fn rename_ignores_unmatched_keys() {
    let mut t = Transformer::with_data(&sample());
    t.rename_columns([("value", "amount"), ("ghost", "spirit")])
        .unwrap();
    let summary = t.summary().unwrap();
    assert_eq!(summary.column_names(), vec!["id", "amount", "category"]);
}

#[test]
fn rename_swaps_names_in_one_pass() {
    let df = df!("a" => [1i64, 2], "b" => [10i64, 20]).unwrap();
    let mut t = Transformer::with_data(&df);
    t.rename_columns([("a", "b"), ("b", "a")]).unwrap();
    assert_eq!(t.summary().unwrap().column_names(), vec!["b", "a"]);
    let out = t.to_data().unwrap();
    let b: Vec<Option<i64>> = out.column("b").unwrap().i64().unwrap().into_iter().collect();
    assert_eq!(b, vec![Some(1), Some(2)]);
}

#[test]
fn rename_keys_match_original_names_only() {
    let df = df!("a" => [1i64], "c" => [2i64]).unwrap();
    let mut t = Transformer::with_data(&df);
    t.rename_columns([("a", "b"), ("b", "c2")]).unwrap();
    assert_eq!(t.summary().unwrap().column_names(), vec!["b", "c"]);
}

#[test]
fn rename_into_existing_name_is_rejected() {
    let df = df!("a" => [1i64], "b" => [2i64]).unwrap();
    let mut t = Transformer::with_data(&df);
    let err = t.rename_columns([("a", "b")]).unwrap_err();
    assert!(matches!(err, TransformError::Configuration { .. }), "{err}");
    assert_eq!(t.summary().unwrap().column_names(), vec!["a", "b"]);
}

#[test]
fn aggregate_groups_sorted_by_key() {
    let mut t = Transformer::with_data(&sample());
    t.aggregate(
        &strings(&["category"]),
        [("value", AggFunc::Sum), ("id", AggFunc::Count)],
    )
    .unwrap();
    let df = t.to_data().unwrap();
    assert_eq!(df.height(), 3);
    let categories = df.column("category").unwrap().str().unwrap();
    assert_eq!(
        categories.into_no_null_iter().collect::<Vec<_>>(),
        vec!["A", "B", "C"]
    );
    let totals = df.column("value").unwrap().f64().unwrap();
    assert_eq!(totals.get(0), Some(50.0));
    assert_eq!(totals.get(1), Some(40.0));
}

#[test]
fn aggregate_needs_keys_and_functions() {
    let mut t = Transformer::with_data(&sample());
    let none: [(&str, AggFunc); 0] = [];
    assert!(matches!(
        t.aggregate(&strings(&["category"]), none),
        Err(TransformError::Configuration { .. })
    ));
    assert!(matches!(
        t.aggregate(&[], [("value", AggFunc::Mean)]),
        Err(TransformError::Configuration { .. })
    ));
}

#[test]
fn set_data_copies_and_resets_history() {
    let source = sample();
    let mut t = Transformer::new();
    t.set_data(&source)
        .remove_duplicates(None, DuplicateKeep::First)
        .unwrap();
    assert_eq!(source.height(), 5);
    assert_eq!(t.history().len(), 1);

    t.set_data(&source);
    assert!(t.history().is_empty());
    assert_eq!(t.data().unwrap().height(), 5);
}

#[test]
fn summary_counts_missing_per_column() {
    let t = Transformer::with_data(&sample());
    let summary = t.summary().unwrap();
    assert_eq!(summary.rows, 5);
    assert_eq!(summary.total_missing(), 1);
    assert_eq!(summary.columns[1].name, "value");
    assert_eq!(summary.columns[1].missing, 1);
}

#[test]
fn history_records_each_step() {
    let mut t = Transformer::with_data(&sample());
    t.remove_duplicates(None, DuplicateKeep::First)
        .unwrap()
        .handle_missing_values(MissingValueStrategy::Drop, None, None)
        .unwrap();
    insta::assert_json_snapshot!(t.history(), @r###"
    [
      {
        "op": "remove_duplicates",
        "keep": "first",
        "rows_before": 5,
        "rows_after": 4
      },
      {
        "op": "handle_missing",
        "strategy": "drop",
        "rows_before": 4,
        "rows_after": 3
      }
    ]
    "###);
}

fn pairs_frame(rows: &[(i64, i64)]) -> DataFrame {
    df!(
        "a" => rows.iter().map(|r| r.0).collect::<Vec<_>>(),
        "b" => rows.iter().map(|r| r.1).collect::<Vec<_>>()
    )
    .unwrap()
}

proptest! {
    #[test]
    fn dedupe_keep_first_matches_distinct_pairs(
        rows in prop::collection::vec((0i64..3, 0i64..3), 0..40)
    ) {
        let mut seen = HashSet::new();
        let expected: Vec<(i64, i64)> = rows.iter().copied().filter(|r| seen.insert(*r)).collect();

        let mut t = Transformer::with_data(&pairs_frame(&rows));
        t.remove_duplicates(None, DuplicateKeep::First).unwrap();
        let df = t.to_data().unwrap();
        let a = df.column("a").unwrap().i64().unwrap();
        let b = df.column("b").unwrap().i64().unwrap();
        let actual: Vec<(i64, i64)> = a.into_no_null_iter().zip(b.into_no_null_iter()).collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn drop_keeps_exactly_complete_rows(
        values in prop::collection::vec(prop::option::of(0i64..100), 0..40)
    ) {
        let present = values.iter().filter(|v| v.is_some()).count();
        let df = df!("v" => values.clone(), "row" => (0..values.len() as i64).collect::<Vec<_>>()).unwrap();

        let mut t = Transformer::with_data(&df);
        t.handle_missing_values(MissingValueStrategy::Drop, None, Some(&["v".to_string()])).unwrap();
        let out = t.to_data().unwrap();
        prop_assert_eq!(out.height(), present);
        prop_assert_eq!(out.column("v").unwrap().null_count(), 0);
    }

    #[test]
    fn fill_only_touches_missing_cells(
        values in prop::collection::vec(prop::option::of(1i64..100), 1..40)
    ) {
        let df = df!("v" => values.clone()).unwrap();
        let mut t = Transformer::with_data(&df);
        t.handle_missing_values(MissingValueStrategy::Fill, Some(&Scalar::Int(0)), None).unwrap();
        let out = t.to_data().unwrap();
        let filled: Vec<i64> = out.column("v").unwrap().i64().unwrap().into_no_null_iter().collect();
        let expected: Vec<i64> = values.iter().map(|v| v.unwrap_or(0)).collect();
        prop_assert_eq!(filled, expected);
    }
}
