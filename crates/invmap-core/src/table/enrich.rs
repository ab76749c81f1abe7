use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::model::{Column, Table, NOT_FOUND};

pub const DEFAULT_SERIAL_COLUMN: &str = "S.No";
pub const DEFAULT_EXPAND_COLUMN: &str = "Service Address";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichOptions {
    /// Column that receives the 1-based row number.
    pub serial_column: String,
    /// Column whose list values are unpivoted into one row per element.
    pub expand_column: Option<String>,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        EnrichOptions {
            serial_column: DEFAULT_SERIAL_COLUMN.into(),
            expand_column: Some(DEFAULT_EXPAND_COLUMN.into()),
        }
    }
}

/// Number the rows, expand the multi-valued column and replace every
/// missing cell with the sentinel.
///
/// Numbering runs first, so rows exploded from one record share its serial.
pub fn enrich(table: Table, required: &[String], options: &EnrichOptions) -> Table {
    let table = number_rows(table, required, &options.serial_column);
    let table = match options.expand_column.as_deref() {
        Some(column) => expand_rows(table, column),
        None => table,
    };
    fill_missing(table)
}

/// One row per list element in `column`; other cells are copied as-is.
pub fn expand_rows(table: Table, column: &str) -> Table {
    let Some(target) = table.columns().iter().position(|c| c.name == column) else {
        return table;
    };

    let fan_out: Vec<usize> = table.columns()[target]
        .values
        .iter()
        .map(|v| match v {
            Value::Array(list) => list.len().max(1),
            _ => 1,
        })
        .collect();
    let row_count: usize = fan_out.iter().sum();
    if row_count == table.row_count() && !has_list(&table.columns()[target]) {
        return table;
    }

    debug!(column, from = table.row_count(), to = row_count, "expanding rows");

    let columns = table
        .into_columns()
        .into_iter()
        .enumerate()
        .map(|(idx, col)| {
            let mut values = Vec::with_capacity(row_count);
            for (value, &n) in col.values.into_iter().zip(&fan_out) {
                if idx == target {
                    match value {
                        Value::Array(list) if list.is_empty() => values.push(Value::Null),
                        Value::Array(list) => values.extend(list.into_iter().map(unwrap_element)),
                        other => values.push(other),
                    }
                } else {
                    values.extend(std::iter::repeat(value).take(n));
                }
            }
            Column::new(col.name, values)
        })
        .collect();

    Table::from_columns(columns, row_count)
}

fn has_list(column: &Column) -> bool {
    column.values.iter().any(Value::is_array)
}

/// `{"address": "A St"}` contributes `"A St"`; anything else is kept.
fn unwrap_element(element: Value) -> Value {
    match element {
        Value::Object(map) if map.len() == 1 => match map.into_iter().next() {
            Some((_, inner)) => inner,
            None => Value::Null,
        },
        other => other,
    }
}

/// Write `1..N` into the serial column.
///
/// An existing column keeps its place when the template names it; otherwise
/// the column is moved or inserted to the front.
pub fn number_rows(table: Table, required: &[String], serial_column: &str) -> Table {
    let row_count = table.row_count();
    let serials: Vec<Value> = (1..=row_count).map(Value::from).collect();
    let in_template = required.iter().any(|c| c == serial_column);

    let mut columns = table.into_columns();
    match columns.iter().position(|c| c.name == serial_column) {
        Some(idx) => {
            columns[idx].values = serials;
            if !in_template && idx != 0 {
                let column = columns.remove(idx);
                columns.insert(0, column);
            }
        }
        None => columns.insert(0, Column::new(serial_column, serials)),
    }

    Table::from_columns(columns, row_count)
}

/// Replace null, empty strings and empty containers with the sentinel;
/// remaining containers become compact JSON text.
pub fn fill_missing(table: Table) -> Table {
    let row_count = table.row_count();
    let columns = table
        .into_columns()
        .into_iter()
        .map(|col| {
            let values = col.values.into_iter().map(fill_cell).collect();
            Column::new(col.name, values)
        })
        .collect();
    Table::from_columns(columns, row_count)
}

fn fill_cell(value: Value) -> Value {
    match value {
        Value::Null => Value::String(NOT_FOUND.into()),
        Value::String(s) if s.is_empty() => Value::String(NOT_FOUND.into()),
        Value::Array(list) if list.is_empty() => Value::String(NOT_FOUND.into()),
        Value::Object(map) if map.is_empty() => Value::String(NOT_FOUND.into()),
        container @ (Value::Array(_) | Value::Object(_)) => Value::String(container.to_string()),
        scalar => scalar,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::is_present;
    use serde_json::json;

    fn table(columns: &[(&str, Vec<Value>)]) -> Table {
        let rows = columns.first().map(|(_, v)| v.len()).unwrap_or(0);
        Table::from_columns(
            columns
                .iter()
                .map(|(name, values)| Column::new(*name, values.clone()))
                .collect(),
            rows,
        )
    }

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_expand_service_addresses() {
        let t = table(&[
            ("Name", vec![json!("Acme")]),
            ("Service Address", vec![json!(["A St", "B Ave"])]),
        ]);
        let out = expand_rows(t, "Service Address");
        assert_eq!(out.row_count(), 2);
        assert_eq!(out.cell(0, "Name"), Some(&json!("Acme")));
        assert_eq!(out.cell(1, "Name"), Some(&json!("Acme")));
        assert_eq!(out.cell(0, "Service Address"), Some(&json!("A St")));
        assert_eq!(out.cell(1, "Service Address"), Some(&json!("B Ave")));
    }

    #[test]
    fn test_expand_three_elements_keeps_other_columns() {
        let t = table(&[
            ("Inv #", vec![json!("7"), json!("8")]),
            (
                "Service Address",
                vec![json!([{"address": "A"}, {"address": "B"}, {"address": "C"}]), json!("D")],
            ),
            ("Amt", vec![json!(10), Value::Null]),
        ]);
        let out = expand_rows(t, "Service Address");
        assert_eq!(out.row_count(), 4);
        for i in 0..3 {
            assert_eq!(out.cell(i, "Inv #"), Some(&json!("7")));
            assert_eq!(out.cell(i, "Amt"), Some(&json!(10)));
        }
        assert_eq!(out.cell(2, "Service Address"), Some(&json!("C")));
        assert_eq!(out.cell(3, "Service Address"), Some(&json!("D")));
        assert_eq!(out.cell(3, "Amt"), Some(&Value::Null));
    }

    #[test]
    fn test_expand_empty_list_keeps_row() {
        let t = table(&[("Service Address", vec![json!([])])]);
        let out = expand_rows(t, "Service Address");
        assert_eq!(out.row_count(), 1);
        assert_eq!(out.cell(0, "Service Address"), Some(&Value::Null));
    }

    #[test]
    fn test_serial_inserted_first() {
        let t = table(&[("Name", vec![json!("a"), json!("b")])]);
        let out = number_rows(t, &cols(&["Name"]), "S.No");
        assert_eq!(out.column_names(), ["S.No", "Name"]);
        assert_eq!(out.column("S.No").unwrap().values, [json!(1), json!(2)]);
    }

    #[test]
    fn test_serial_keeps_template_position() {
        let t = table(&[
            ("Name", vec![json!("a")]),
            ("S.No", vec![json!(NOT_FOUND)]),
        ]);
        let out = number_rows(t, &cols(&["Name", "S.No"]), "S.No");
        assert_eq!(out.column_names(), ["Name", "S.No"]);
        assert_eq!(out.cell(0, "S.No"), Some(&json!(1)));
    }

    #[test]
    fn test_serial_from_model_moved_front_when_not_in_template() {
        let t = table(&[("Name", vec![json!("a")]), ("S.No", vec![json!(9)])]);
        let out = number_rows(t, &cols(&["Name"]), "S.No");
        assert_eq!(out.column_names(), ["S.No", "Name"]);
        assert_eq!(out.cell(0, "S.No"), Some(&json!(1)));
    }

    #[test]
    fn test_exploded_rows_share_serial() {
        let t = table(&[
            ("Name", vec![json!("Acme"), json!("Globex")]),
            ("Service Address", vec![json!(["A St", "B Ave", "C Rd"]), json!("D Ln")]),
        ]);
        let out = enrich(t, &cols(&["S.No", "Name"]), &EnrichOptions::default());
        assert_eq!(out.row_count(), 4);
        assert_eq!(
            out.column("S.No").unwrap().values,
            [json!(1), json!(1), json!(1), json!(2)]
        );
        for i in 0..3 {
            assert_eq!(out.cell(i, "Name"), Some(&json!("Acme")));
        }
        assert_eq!(out.cell(2, "Service Address"), Some(&json!("C Rd")));
    }

    #[test]
    fn test_no_missing_cells_after_enrich() {
        let t = table(&[
            ("a", vec![Value::Null, json!(""), json!("x")]),
            ("b", vec![json!([]), json!({"k": 1}), json!(false)]),
        ]);
        let out = enrich(t, &[], &EnrichOptions::default());
        for column in out.columns() {
            for value in &column.values {
                assert!(is_present(value) || value == &json!(NOT_FOUND), "{value:?}");
            }
        }
        assert_eq!(out.cell(1, "b"), Some(&json!(r#"{"k":1}"#)));
        assert_eq!(out.cell(0, "a"), Some(&json!(NOT_FOUND)));
    }
}
