//! Tests for the JSON-lines reader and writer.

use std::fs;

use rpt_ingest::{IngestError, Source, load_jsonl, load_jsonl_inferred, read_table, save_jsonl};
use rpt_model::{FieldSchema, Transform, Value, plain_fields};

#[test]
fn loads_basic_object() {
    let source = Source::from_text(r#"{"A":"0","B":"1","C":"2"}"#);
    let table = load_jsonl(&source, &plain_fields(&["A", "B", "C"]), None).unwrap();
    assert_eq!(table.height(), 1);
    assert_eq!(table.cell(0, "A").unwrap(), &Value::from("0"));
    assert_eq!(table.cell(0, "B").unwrap(), &Value::from("1"));
    assert_eq!(table.cell(0, "C").unwrap(), &Value::from("2"));
}

#[test]
fn keeps_nested_structures_and_skips_blank_lines() {
    let text = concat!(
        r#"{"ID":1,"ITEMS":[{"K":"a"},{"K":"b"}]}"#,
        "\n\n",
        r#"{"ID":2,"ITEMS":[]}"#,
        "\n",
    );
    let fields = vec![
        FieldSchema::new("ID"),
        FieldSchema::new("ITEMS").with_null_fill(None),
    ];
    let table = load_jsonl(&Source::from_text(text), &fields, None).unwrap();
    assert_eq!(table.height(), 2);
    assert_eq!(table.cell(0, "ID").unwrap(), &Value::Int(1));
    assert_eq!(table.cell(0, "ITEMS").unwrap().as_list().map(<[Value]>::len), Some(2));
    assert_eq!(table.cell(1, "ITEMS").unwrap(), &Value::List(Vec::new()));
}

#[test]
fn non_object_line_is_rejected_with_its_line_number() {
    let text = "{\"A\":1}\n[1,2]\n";
    let err = load_jsonl(&Source::from_text(text), &plain_fields(&["A"]), None).unwrap_err();
    assert!(matches!(err, IngestError::NotAnObject { line: 2, .. }));
}

#[test]
fn invalid_json_is_rejected() {
    let text = "{\"A\":1}\n{\"A\":\n";
    let err = load_jsonl(&Source::from_text(text), &plain_fields(&["A"]), None).unwrap_err();
    assert!(matches!(err, IngestError::Json { line: 2, .. }));
}

#[test]
fn split_transform_builds_lists() {
    let text = r#"{"TAGS":"a;b;c"}"#;
    let fields = vec![FieldSchema::new("TAGS").with_transform(Transform::split(";"))];
    let table = load_jsonl(&Source::from_text(text), &fields, None).unwrap();
    assert_eq!(
        table.cell(0, "TAGS").unwrap(),
        &Value::List(vec![Value::from("a"), Value::from("b"), Value::from("c")])
    );
}

#[test]
fn inferred_fields_cover_every_key() {
    let text = "{\"B\":1}\n{\"A\":\"x\",\"B\":2}\n";
    let table = load_jsonl_inferred(&Source::from_text(text)).unwrap();
    assert_eq!(table.column_names(), &["A".to_string(), "B".to_string()]);
    assert_eq!(table.cell(0, "A").unwrap(), &Value::from(""));
    assert_eq!(table.cell(1, "B").unwrap(), &Value::Int(2));
}

#[test]
fn save_emits_compact_objects_in_column_order() {
    let table = rpt_model::Table::from_rows(
        vec!["Z", "A", "N"],
        vec![
            vec![Value::from("first"), Value::Int(1), Value::Null],
            vec![Value::from("second"), Value::Float(2.5), Value::Bool(true)],
        ],
    )
    .unwrap();
    let mut out = Vec::new();
    save_jsonl(&table, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    insta::assert_snapshot!(text.trim_end(), @r#"
    {"Z":"first","A":1,"N":null}
    {"Z":"second","A":2.5,"N":true}
    "#);
}

#[test]
fn string_records_round_trip_byte_for_byte() {
    let input = "{\"A\":\"0\",\"B\":\"1\",\"C\":\"2\"}\n{\"A\":\"3\",\"B\":\"4\",\"C\":\"5\"}\n";
    let table = load_jsonl(&Source::from_text(input), &plain_fields(&["A", "B", "C"]), None).unwrap();
    let mut out = Vec::new();
    save_jsonl(&table, &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), input);
}

#[test]
fn reads_from_a_file_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rows.jsonl");
    fs::write(&path, "{\"A\":\"1\"}\n").unwrap();
    let table = read_table(&path, None).unwrap();
    assert_eq!(table.cell(0, "A").unwrap(), &Value::from("1"));
}
