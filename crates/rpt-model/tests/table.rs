//! Tests for table construction, projection and row filtering.

use rpt_model::{Column, DataType, ModelError, RowLabel, Table, Value};

fn strings(values: &[&str]) -> Vec<Value> {
    values.iter().map(|v| Value::from(*v)).collect()
}

fn sample() -> Table {
    Table::new(vec![
        Column::new("A", strings(&["0", "1", "2"])),
        Column::new("B", strings(&["10", "11", "12"])),
    ])
    .expect("table")
}

#[test]
fn new_assigns_positional_index() {
    let table = sample();
    assert_eq!(table.height(), 3);
    assert_eq!(table.width(), 2);
    assert_eq!(
        table.index(),
        &[RowLabel::Int(0), RowLabel::Int(1), RowLabel::Int(2)]
    );
}

#[test]
fn new_rejects_uneven_columns() {
    let err = Table::new(vec![
        Column::new("A", strings(&["0", "1"])),
        Column::new("B", strings(&["10"])),
    ])
    .unwrap_err();
    assert!(matches!(err, ModelError::LengthMismatch { ref column, .. } if column == "B"));
}

#[test]
fn new_rejects_duplicate_names() {
    let err = Table::new(vec![
        Column::new("A", strings(&["0"])),
        Column::new("A", strings(&["1"])),
    ])
    .unwrap_err();
    assert!(matches!(err, ModelError::DuplicateColumn { .. }));
}

#[test]
fn typed_column_reports_offending_column() {
    let err = Column::typed("N", DataType::Int, strings(&["1", "x"])).unwrap_err();
    match err {
        ModelError::Cast { column, source } => {
            assert_eq!(column, "N");
            assert_eq!(source.target, DataType::Int);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unknown_column_lists_available_names() {
    let table = sample();
    let err = table.column("Z").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("'Z'"), "{message}");
    assert!(message.contains("\"A\""), "{message}");
}

#[test]
fn retain_rows_keeps_original_labels() {
    let mut table = sample();
    let removed = table.retain_rows(&[true, false, true]).expect("retain");
    assert_eq!(removed, 1);
    assert_eq!(table.index(), &[RowLabel::Int(0), RowLabel::Int(2)]);
    assert_eq!(table.column_values("B").unwrap(), strings(&["10", "12"]).as_slice());
}

#[test]
fn retain_rows_rejects_short_mask() {
    let mut table = sample();
    assert!(table.retain_rows(&[true]).is_err());
    assert_eq!(table.height(), 3);
}

#[test]
fn select_projects_in_requested_order() {
    let table = sample();
    let projected = table.select(&["B", "A"]).expect("select");
    assert_eq!(projected.column_names(), &["B".to_string(), "A".to_string()]);
    assert_eq!(projected.index(), table.index());
}

#[test]
fn set_cell_casts_to_column_type() {
    let mut table = Table::new(vec![
        Column::typed("N", DataType::Int, vec![Value::Int(1)]).unwrap(),
    ])
    .unwrap();
    table.set_cell(0, "N", Value::from("42")).expect("set");
    assert_eq!(table.cell(0, "N").unwrap(), &Value::Int(42));
    assert!(table.set_cell(0, "N", Value::from("x")).is_err());
}

#[test]
fn rename_and_reorder_drops_unlisted_columns() {
    let mut table = Table::new(vec![
        Column::new("A_1", strings(&["a"])),
        Column::new("C_4", strings(&["c"])),
        Column::new("B_2", strings(&["b"])),
    ])
    .unwrap();
    table
        .rename_and_reorder(&[("A_1", "A"), ("B_2", "B")])
        .expect("rename");
    assert_eq!(table.column_names(), &["A".to_string(), "B".to_string()]);
    assert_eq!(table.cell(0, "B").unwrap(), &Value::from("b"));
}

#[test]
fn rename_and_reorder_leaves_table_on_duplicate_destination() {
    let mut table = sample();
    let before = table.clone();
    assert!(table.rename_and_reorder(&[("A", "X"), ("B", "X")]).is_err());
    assert_eq!(table, before);
}

#[test]
fn push_column_on_empty_table_sets_height() {
    let mut table = Table::default();
    table.push_column(Column::new("A", strings(&["x", "y"]))).unwrap();
    assert_eq!(table.height(), 2);
    assert!(table.push_column(Column::new("B", strings(&["x"]))).is_err());
}

#[test]
fn push_column_reports_length_mismatch() {
    let mut table = sample();
    let err = table
        .push_column(Column::new("C", strings(&["x"])))
        .unwrap_err();
    assert!(matches!(
        err,
        ModelError::LengthMismatch { ref column, expected: 3, actual: 1 } if column == "C"
    ));
    assert_eq!(table.width(), 2);
}

#[test]
fn with_index_checks_length() {
    let table = sample();
    assert!(table.clone().with_index(vec![RowLabel::from("a")]).is_err());
    let labelled = table
        .with_index(vec!["a".into(), "b".into(), "c".into()])
        .unwrap();
    assert_eq!(labelled.index()[2], RowLabel::Text("c".to_string()));
}
