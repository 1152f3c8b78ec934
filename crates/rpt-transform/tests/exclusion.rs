//! Tests for exclusion lists.

use std::fs;

use rpt_ingest::Source;
use rpt_model::{Column, RowLabel, Table, Value};
use rpt_transform::{ExclusionError, apply_exclusion_list};

fn ints(values: impl IntoIterator<Item = i64>) -> Vec<Value> {
    values.into_iter().map(Value::Int).collect()
}

fn labels(values: &[i64]) -> Vec<RowLabel> {
    values.iter().copied().map(RowLabel::from).collect()
}

#[test]
fn removes_listed_rows_and_keeps_labels() {
    let mut table = Table::new(vec![
        Column::new("A", ints(0..10)),
        Column::new("B", ints(1..11)),
    ])
    .unwrap();
    let exclusions = Table::new(vec![Column::new("B_exclude", ints([3, 5, 7]))]).unwrap();

    let removed = apply_exclusion_list(&mut table, &exclusions, &[("B", "B_exclude")]).unwrap();

    assert_eq!(removed, 3);
    let expected = Table::new(vec![
        Column::new("A", ints([0, 1, 3, 5, 7, 8, 9])),
        Column::new("B", ints([1, 2, 4, 6, 8, 9, 10])),
    ])
    .unwrap()
    .with_index(labels(&[0, 1, 3, 5, 7, 8, 9]))
    .unwrap();
    assert_eq!(table, expected);
}

#[test]
fn every_pair_must_match() {
    let mut table = Table::new(vec![
        Column::new("SITE", vec![Value::from("S1"), Value::from("S1"), Value::from("S2")]),
        Column::new("SUBJ", vec![Value::from("001"), Value::from("002"), Value::from("001")]),
    ])
    .unwrap();
    let exclusions = Table::new(vec![
        Column::new("site", vec![Value::from("S1")]),
        Column::new("subject", vec![Value::from("001")]),
    ])
    .unwrap();

    let removed = apply_exclusion_list(
        &mut table,
        &exclusions,
        &[("SITE", "site"), ("SUBJ", "subject")],
    )
    .unwrap();
    assert_eq!(removed, 1);
    assert_eq!(table.index(), labels(&[1, 2]).as_slice());
}

#[test]
fn exclusions_can_come_from_csv() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("exclude.csv");
    fs::write(&path, "subject,reason\n002,withdrawn\n").unwrap();

    let mut table = Table::new(vec![Column::new(
        "SUBJ",
        vec![Value::from("001"), Value::from("002")],
    )])
    .unwrap();
    let source = Source::from_path(&path);
    let removed = apply_exclusion_list(&mut table, &source, &[("SUBJ", "subject")]).unwrap();
    assert_eq!(removed, 1);
    assert_eq!(table.column_values("SUBJ").unwrap(), &[Value::from("001")]);
}

#[test]
fn configuration_errors_leave_table_untouched() {
    let mut table = Table::new(vec![Column::new("A", ints(0..3))]).unwrap();
    let before = table.clone();
    let exclusions = Table::new(vec![Column::new("X", ints([1]))]).unwrap();

    let err = apply_exclusion_list(&mut table, &exclusions, &[("Z", "X")]).unwrap_err();
    assert!(matches!(err, ExclusionError::UnknownTargetColumn { ref column } if column == "Z"));

    let err = apply_exclusion_list(&mut table, &exclusions, &[("A", "Y")]).unwrap_err();
    assert!(matches!(err, ExclusionError::UnknownExclusionColumn { ref column } if column == "Y"));

    let none: &[(&str, &str)] = &[];
    assert!(matches!(
        apply_exclusion_list(&mut table, &exclusions, none),
        Err(ExclusionError::NoMatchPairs)
    ));
    assert_eq!(table, before);
}
