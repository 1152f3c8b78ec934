//! Tests for polars DataFrame interop.

use polars::prelude::*;

use rpt_ingest::{table_from_frame, table_to_frame};
use rpt_model::{Column as TableColumn, DataType as CellType, Table, Value};

#[test]
fn typed_columns_map_to_polars_dtypes() {
    let table = Table::new(vec![
        TableColumn::typed("N", CellType::Int, vec![Value::Int(1), Value::Null]).unwrap(),
        TableColumn::new("S", vec![Value::from("a"), Value::List(vec![Value::Int(1)])]),
    ])
    .unwrap();
    let df = table_to_frame(&table).unwrap();
    assert_eq!(df.height(), 2);
    assert_eq!(df.column("N").unwrap().dtype(), &DataType::Int64);
    assert_eq!(df.column("N").unwrap().null_count(), 1);
    assert_eq!(df.column("S").unwrap().dtype(), &DataType::String);
    assert_eq!(
        df.column("S").unwrap().get(1).unwrap(),
        AnyValue::String("[1]")
    );
}

#[test]
fn frame_cells_become_values() {
    let df = DataFrame::new(vec![
        Series::new("ID".into(), &[1i32, 2]).into(),
        Series::new("NAME".into(), &[Some("x"), None]).into(),
        Series::new("SCORE".into(), &[0.5f64, 1.0]).into(),
    ])
    .unwrap();
    let table = table_from_frame(&df).unwrap();
    assert_eq!(table.column_names(), &["ID", "NAME", "SCORE"]);
    assert_eq!(table.cell(1, "ID").unwrap(), &Value::Int(2));
    assert_eq!(table.cell(1, "NAME").unwrap(), &Value::Null);
    assert_eq!(table.cell(0, "SCORE").unwrap(), &Value::Float(0.5));
}
