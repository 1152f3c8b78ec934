//! Tests for the xref and uniqueness checks.

use std::collections::HashMap;

use proptest::prelude::*;

use rpt_model::{Column, Table, Value};
use rpt_validate::{ValidateError, failures_to_table, unique_keys, xref_integrity};

fn ints(values: impl IntoIterator<Item = i64>) -> Vec<Value> {
    values.into_iter().map(Value::Int).collect()
}

fn two_columns(a: Vec<Value>, b: Vec<Value>) -> Table {
    Table::new(vec![Column::new("A", a), Column::new("B", b)]).unwrap()
}

const NO_KEYS: Option<&[&str]> = None;

#[test]
fn xref_passes_when_every_key_is_present() {
    let left = two_columns(ints(0..10), ints(10..20));
    let right = Table::new(vec![
        Column::new("C", ints(10..20)),
        Column::new("D", ints((1..=10).rev())),
    ])
    .unwrap();
    let failures = xref_integrity(&left, &["B"], &right, &["C"], false).unwrap();
    assert!(failures.is_empty());
}

#[test]
fn xref_reports_each_missing_key() {
    let left = two_columns(ints(0..10), ints(10..20));
    let right = Table::new(vec![
        Column::new("C", ints((10..20).step_by(2))),
        Column::new("D", ints(0..5)),
    ])
    .unwrap();
    let failures = xref_integrity(&left, &["B"], &right, &["C"], false).unwrap();

    assert_eq!(failures.len(), 5);
    let missing: Vec<&Value> = failures.iter().filter_map(|f| f.field("B")).collect();
    assert_eq!(missing, ints([11, 13, 15, 17, 19]).iter().collect::<Vec<_>>());
    assert_eq!(failures[0].check, "xref_integrity[B == C]");
    assert_eq!(failures[0].message, "Missing right-hand record matching: {C: 11}");
}

#[test]
fn xref_can_ignore_blank_keys() {
    let left = Table::new(vec![Column::new(
        "REF",
        vec![Value::from("a"), Value::from(""), Value::from("z")],
    )])
    .unwrap();
    let right = Table::new(vec![Column::new("ID", vec![Value::from("a")])]).unwrap();

    let strict = xref_integrity(&left, &["REF"], &right, &["ID"], false).unwrap();
    assert_eq!(strict.len(), 2);

    let lenient = xref_integrity(&left, &["REF"], &right, &["ID"], true).unwrap();
    assert_eq!(lenient.len(), 1);
    assert_eq!(lenient[0].field("REF"), Some(&Value::from("z")));
}

#[test]
fn xref_multi_key_failures_render_as_a_table() {
    let left = two_columns(ints([1, 1, 2]), vec![Value::from("x"), Value::from("y"), Value::from("x")]);
    let right = Table::new(vec![
        Column::new("ID", ints([1, 2])),
        Column::new("KIND", vec![Value::from("x"), Value::from("y")]),
    ])
    .unwrap();
    let failures = xref_integrity(&left, &["A", "B"], &right, &["ID", "KIND"], false).unwrap();
    let table = failures_to_table(&failures).unwrap();

    insta::assert_json_snapshot!(failures, @r#"
    [
      {
        "check": "xref_integrity[A,B == ID,KIND]",
        "message": "Missing right-hand record matching: {ID: 1, KIND: y}",
        "fields": [
          [
            "A",
            1
          ],
          [
            "B",
            "y"
          ]
        ]
      },
      {
        "check": "xref_integrity[A,B == ID,KIND]",
        "message": "Missing right-hand record matching: {ID: 2, KIND: x}",
        "fields": [
          [
            "A",
            2
          ],
          [
            "B",
            "x"
          ]
        ]
      }
    ]
    "#);
    assert_eq!(table.column_names(), &["check", "message", "A", "B"]);
    assert_eq!(table.height(), 2);
}

#[test]
fn xref_configuration_errors() {
    let table = two_columns(ints([1]), ints([2]));
    assert!(matches!(
        xref_integrity(&table, &["A", "B"], &table, &["A"], false),
        Err(ValidateError::KeyCountMismatch { left: 2, right: 1 })
    ));
    assert!(matches!(
        xref_integrity::<&str, &str>(&table, &[], &table, &[], false),
        Err(ValidateError::NoKeys { .. })
    ));
    assert!(matches!(
        xref_integrity(&table, &["Z"], &table, &["A"], false),
        Err(ValidateError::Model(_))
    ));
}

#[test]
fn unique_keys_pass_on_distinct_values() {
    let table = two_columns(ints(0..10), ints(100..110));
    assert!(unique_keys(&table, Some(&["A"][..])).unwrap().is_empty());
}

#[test]
fn unique_keys_report_every_duplicate() {
    let table = two_columns(
        ints((0..5).chain(0..5)),
        ints((100..105).chain(100..105)),
    );
    let failures = unique_keys(&table, Some(&["A"][..])).unwrap();
    assert_eq!(failures.len(), 10);
    assert_eq!(failures[0].check, "unique_keys[A]");
    assert_eq!(failures[0].message, "duplicate keys: [0]");
    assert_eq!(failures[5].field("B"), Some(&Value::Int(100)));
}

#[test]
fn unique_multi_key_combinations() {
    let table = two_columns(
        ints((0..5).chain(0..5)),
        ints((100..105).chain(105..110)),
    );
    assert!(unique_keys(&table, Some(&["A", "B"][..])).unwrap().is_empty());
}

#[test]
fn unique_scenario_with_appended_duplicate() {
    let table = two_columns(ints([0, 1]), ints([100, 101]));
    assert!(unique_keys(&table, Some(&["A"][..])).unwrap().is_empty());

    let table = two_columns(ints([0, 1, 0]), ints([100, 101, 100]));
    let failures = unique_keys(&table, Some(&["A"][..])).unwrap();
    assert_eq!(failures.len(), 2);
}

#[test]
fn unique_whole_row_when_no_keys() {
    let table = two_columns(ints([0, 0, 1]), ints([1, 2, 1]));
    assert!(unique_keys(&table, NO_KEYS).unwrap().is_empty());

    let table = two_columns(ints([0, 0, 1]), ints([1, 1, 1]));
    let failures = unique_keys(&table, NO_KEYS).unwrap();
    assert_eq!(failures.len(), 2);
    assert_eq!(failures[0].check, "unique_keys[*]");
    assert_eq!(failures[0].message, "duplicate row");
}

#[test]
fn checks_do_not_touch_their_inputs() {
    let table = two_columns(ints([0, 0]), ints([1, 1]));
    let before = table.clone();
    let _ = unique_keys(&table, Some(&["A"][..])).unwrap();
    let _ = xref_integrity(&table, &["A"], &table, &["B"], false).unwrap();
    assert_eq!(table, before);
}

proptest! {
    #[test]
    fn unique_keys_empty_iff_all_keys_distinct(values in prop::collection::vec(0i64..6, 0..24)) {
        let table = Table::new(vec![Column::new("K", ints(values.clone()))]).unwrap();
        let failures = unique_keys(&table, Some(&["K"][..])).unwrap();

        let mut counts: HashMap<i64, usize> = HashMap::new();
        for value in &values {
            *counts.entry(*value).or_default() += 1;
        }
        let duplicated: usize = counts.values().filter(|&&count| count > 1).sum();
        prop_assert_eq!(failures.len(), duplicated);
        prop_assert_eq!(failures.is_empty(), counts.values().all(|&count| count == 1));
    }
}
