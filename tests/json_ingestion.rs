use tabular_preprocessing::ingestion::json::{parse_json_str, table_from_json, write_json};
use tabular_preprocessing::types::{Cell, ColumnType};
use tabular_preprocessing::PrepError;

#[test]
fn array_of_objects_defines_columns_from_first_element() {
    let table = parse_json_str(
        r#"[
            {"id": 1, "name": "Ada", "score": 98.5},
            {"id": 2, "name": "Bob", "score": null}
        ]"#,
    )
    .unwrap();

    assert_eq!(table.columns, vec!["id", "name", "score"]);
    assert_eq!(table.row_count(), 2);
    assert_eq!(
        table.types,
        vec![ColumnType::Numeric, ColumnType::Categorical, ColumnType::Numeric]
    );
    assert_eq!(table.rows[1][2], Cell::Missing);
}

#[test]
fn later_objects_are_read_positionally_against_the_first_schema() {
    let table = parse_json_str(r#"[{"a": 1, "b": 2}, {"b": 20, "a": 10, "extra": 99}]"#).unwrap();
    assert_eq!(table.columns, vec!["a", "b"]);
    assert_eq!(table.rows[1], vec![Cell::Number(10.0), Cell::Number(20.0)]);
}

#[test]
fn string_cells_use_the_shared_coercion() {
    let table = parse_json_str(r#"[{"v": "42", "w": "  hi  "}, {"v": "null", "w": "x"}]"#).unwrap();
    assert_eq!(table.rows[0][0], Cell::Number(42.0));
    assert_eq!(table.rows[0][1], Cell::Text("hi".to_string()));
    assert_eq!(table.rows[1][0], Cell::Missing);
}

#[test]
fn non_tabular_payloads_are_rejected() {
    for input in [r#"{"a": 1}"#, "[1, 2]", "\"text\"", "42"] {
        let err = parse_json_str(input).unwrap_err();
        assert!(
            matches!(err, PrepError::MalformedInput { .. }),
            "input {input:?} gave {err}"
        );
    }
}

#[test]
fn empty_array_is_an_empty_dataset() {
    assert!(matches!(
        parse_json_str("[]").unwrap_err(),
        PrepError::EmptyDataset { .. }
    ));
}

#[test]
fn table_from_json_accepts_parsed_values() {
    let value = serde_json::json!([{"x": 1.5, "y": "a"}, {"x": 2.5, "y": "b"}]);
    let table = table_from_json(&value).unwrap();
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.rows[0][0], Cell::Number(1.5));
}

#[test]
fn export_round_trip_reproduces_the_table() {
    let table = parse_json_str(
        r#"[{"id": 1, "name": "Ada", "score": null}, {"id": 2, "name": "Bob", "score": 75}]"#,
    )
    .unwrap();
    let exported = write_json(&table).unwrap();
    let reparsed = parse_json_str(&exported).unwrap();
    assert_eq!(reparsed.columns, table.columns);
    assert_eq!(reparsed.rows, table.rows);
}
