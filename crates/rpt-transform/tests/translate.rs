//! Tests for value translation.

use rpt_ingest::{Source, load_csv};
use rpt_model::{Column, DataType, Record, RowAccess, Table, Value};
use rpt_transform::{TranslateError, TranslationTable, ValueTranslator};

fn text_table(columns: &[(&str, Vec<i64>)]) -> Table {
    Table::new(
        columns
            .iter()
            .map(|(name, values)| {
                Column::typed(
                    *name,
                    DataType::Str,
                    values.iter().map(|v| Value::from(v.to_string())).collect(),
                )
                .unwrap()
            })
            .collect(),
    )
    .unwrap()
}

fn texts(values: impl IntoIterator<Item = i64>) -> Vec<Value> {
    values.into_iter().map(|v| Value::from(v.to_string())).collect()
}

fn single(key: &str, replacement: &str) -> (Vec<Value>, Value) {
    (vec![Value::from(key)], Value::from(replacement))
}

#[test]
fn csv_table_rewrites_matching_values_only() {
    let mut table = text_table(&[("A", (0..10).collect()), ("B", (0..10).collect())]);
    let csv = "old-val,new-val\n0,10\n1,9\n2,8\n3,7\n4,6";
    let mut translator = ValueTranslator::new();
    translator
        .add_rule(&["B"], TranslationTable::from_csv_default(&Source::from_text(csv)).unwrap())
        .unwrap();

    let rewritten = translator.translate(&mut table).unwrap();
    assert_eq!(rewritten, 5);
    assert_eq!(
        table.column_values("B").unwrap(),
        texts([10, 9, 8, 7, 6, 5, 6, 7, 8, 9]).as_slice()
    );
    assert_eq!(table.column_values("A").unwrap(), texts(0..10).as_slice());
}

#[test]
fn full_strict_table_translates_every_row() {
    let mut table = text_table(&[("A", (0..10).collect()), ("B", (0..10).collect())]);
    let csv: String = std::iter::once("old-val,new-val".to_string())
        .chain((0..=10).map(|v| format!("{v},{}", 10 - v)))
        .collect::<Vec<_>>()
        .join("\n");
    let vtt = TranslationTable::from_csv_default(&Source::from_text(&csv))
        .unwrap()
        .with_strict(true);
    let mut translator = ValueTranslator::new();
    translator.add_rule(&["B"], vtt).unwrap();
    translator.translate(&mut table).unwrap();

    assert_eq!(
        table.column_values("B").unwrap(),
        texts((1..=10).rev()).as_slice()
    );
}

#[test]
fn large_table_loaded_from_a_table() {
    let mut table = text_table(&[("A", (0..10).collect()), ("B", (0..10).collect())]);
    let lookup = text_table(&[("old-val", (0..100).collect()), ("new-val", (1..=100).rev().collect())]);
    let mut translator = ValueTranslator::new();
    translator
        .add_rule(&["B"], TranslationTable::from_table(&lookup, &["old-val"], "new-val").unwrap())
        .unwrap();
    translator.translate(&mut table).unwrap();

    assert_eq!(
        table.column_values("B").unwrap(),
        texts((91..=100).rev()).as_slice()
    );
}

#[test]
fn masks_are_computed_before_assignment() {
    // 0 -> 1 and 1 -> 2 in one table must not turn an original 0 into 2.
    let mut table = text_table(&[("B", vec![0, 1, 2])]);
    let mut translator = ValueTranslator::new();
    translator
        .add_rule(
            &["B"],
            TranslationTable::from_entries([single("0", "1"), single("1", "2")]),
        )
        .unwrap();
    translator.translate(&mut table).unwrap();
    assert_eq!(table.column_values("B").unwrap(), texts([1, 2, 2]).as_slice());
}

#[test]
fn later_rules_see_earlier_rewrites() {
    let mut translator = ValueTranslator::new();
    translator
        .add_rule(&["B"], TranslationTable::from_entries([single("0", "1")]))
        .unwrap();
    translator
        .add_rule(
            &["A", "B"],
            TranslationTable::from_entries([(
                vec![Value::from("a"), Value::from("1")],
                Value::from("9"),
            )]),
        )
        .unwrap();

    let mut table = Table::new(vec![
        Column::new("A", vec![Value::from("a"), Value::from("a")]),
        Column::new("B", texts([0, 5])),
    ])
    .unwrap();
    translator.translate(&mut table).unwrap();
    assert_eq!(table.column_values("B").unwrap(), texts([9, 5]).as_slice());
}

#[test]
fn reregistering_a_rule_replaces_its_table() {
    let mut translator = ValueTranslator::new();
    translator
        .add_rule(&["B"], TranslationTable::from_entries([single("0", "1")]))
        .unwrap();
    translator
        .add_rule(&["B"], TranslationTable::from_entries([single("0", "7")]))
        .unwrap();
    assert_eq!(translator.len(), 1);

    let mut table = text_table(&[("B", vec![0])]);
    translator.translate(&mut table).unwrap();
    assert_eq!(table.column_values("B").unwrap(), texts([7]).as_slice());
}

#[test]
fn unknown_match_column_is_reported() {
    let mut translator = ValueTranslator::new();
    translator
        .add_rule(&["X", "B"], TranslationTable::new())
        .unwrap();
    let mut table = text_table(&[("B", vec![0])]);
    assert!(matches!(
        translator.translate(&mut table),
        Err(TranslateError::Model(_))
    ));
}

#[test]
fn multi_column_rule_rewrites_last_column() {
    let mut table = Table::new(vec![
        Column::new("colB", texts([0, 1, 0])),
        Column::new("colC", texts([1, 4, 4])),
    ])
    .unwrap();
    let vtt = TranslationTable::from_entries([
        (texts([0, 1]), Value::from("X")),
        (texts([1, 4]), Value::from("Y")),
    ]);
    let mut translator = ValueTranslator::new();
    translator.add_rule(&["colB", "colC"], vtt).unwrap();
    translator.translate(&mut table).unwrap();
    assert_eq!(
        table.column_values("colC").unwrap(),
        &[Value::from("X"), Value::from("Y"), Value::from("4")]
    );
    assert_eq!(table.column_values("colB").unwrap(), texts([0, 1, 0]).as_slice());
}

#[test]
fn strict_miss_fails_row_wise_but_not_vectorized() {
    let vtt = TranslationTable::from_entries([single("0", "10")]);

    let mut strict = ValueTranslator::new();
    strict.add_rule(&["B"], vtt.clone().with_strict(true)).unwrap();
    let mut lenient = ValueTranslator::new();
    lenient.add_rule(&["B"], vtt).unwrap();

    let mut row: Record = Record::new();
    row.set("B", Value::from("5")).unwrap();

    let err = strict.translate_row(&mut row).unwrap_err();
    assert!(matches!(err, TranslateError::LookupMiss { .. }));
    assert_eq!(
        err.to_string(),
        "translation lookup failed: table contains no key matching {B: 5}"
    );

    lenient.translate_row(&mut row).unwrap();
    assert_eq!(RowAccess::get(&row, "B").unwrap(), &Value::from("5"));

    let mut table = text_table(&[("B", vec![5])]);
    strict.translate(&mut table).unwrap();
    assert_eq!(table.column_values("B").unwrap(), texts([5]).as_slice());
}

#[test]
fn row_wise_translation_over_a_table() {
    let table = text_table(&[("A", (0..10).collect()), ("B", (0..10).collect())]);
    let mut translator = ValueTranslator::new();
    translator
        .add_rule(
            &["B"],
            TranslationTable::from_entries([single("0", "10"), single("9", "1")]),
        )
        .unwrap();
    let table = translator.translate_rows(table).unwrap();
    assert_eq!(
        table.column_values("B").unwrap(),
        texts([10, 1, 2, 3, 4, 5, 6, 7, 8, 1]).as_slice()
    );

    let mut strict = ValueTranslator::new();
    strict
        .add_rule(&["B"], TranslationTable::from_entries([single("0", "10")]).with_strict(true))
        .unwrap();
    let table = text_table(&[("B", vec![0, 1])]);
    assert!(matches!(
        strict.translate_rows(table),
        Err(TranslateError::LookupMiss { .. })
    ));
}

#[test]
fn translation_is_idempotent_without_chained_reads() {
    let csv = "old-val,new-val\n0,10\n1,9\n2,8";
    let mut translator = ValueTranslator::new();
    translator
        .add_rule(&["B"], TranslationTable::from_csv_default(&Source::from_text(csv)).unwrap())
        .unwrap();

    let mut once = text_table(&[("B", (0..5).collect())]);
    translator.translate(&mut once).unwrap();
    let mut twice = once.clone();
    translator.translate(&mut twice).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn duplicate_source_keys_keep_the_last_mapping() {
    let source = Source::from_text("old-val,new-val\n0,first\n0,second\n");
    let vtt = TranslationTable::from_csv_default(&source).unwrap();
    assert_eq!(vtt.len(), 1);
    assert_eq!(vtt.get(&[Value::from("0")]), Some(&Value::from("second")));
}

#[test]
fn custom_columns_and_width_checks() {
    let lookup = load_csv(&Source::from_text("site,code,label\nS1,A,alpha\n"), None, None).unwrap();
    let vtt = TranslationTable::from_table(&lookup, &["site", "code"], "label").unwrap();
    assert_eq!(vtt.get(&[Value::from("S1"), Value::from("A")]), Some(&Value::from("alpha")));

    let mut translator = ValueTranslator::new();
    assert!(matches!(
        translator.add_rule(&["code"], vtt),
        Err(TranslateError::KeyWidth { expected: 1, actual: 2, .. })
    ));
    assert!(matches!(
        translator.add_rule::<&str>(&[], TranslationTable::new()),
        Err(TranslateError::NoMatchColumns)
    ));
    assert!(TranslationTable::from_table(&lookup, &["missing"], "label").is_err());
}
