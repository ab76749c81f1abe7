use serde_json::{Map, Value};

use crate::model::{ReshapeMode, Row};
use crate::parsing::ParsedPayload;

/// Joins a parent key and a child key when nested objects are flattened.
pub const KEY_SEPARATOR: &str = "_";

/// Column holding a list element that is not an object.
pub const VALUE_COLUMN: &str = "value";

/// The row sequences a payload resolves to.
#[derive(Debug, Clone, PartialEq)]
pub enum Shaped {
    /// The reply could not be parsed; one row describing the failure.
    ErrorRow(Row),
    /// One row per record.
    FlatRows(Vec<Row>),
    /// Flattened scalar fields per record, plus every embedded record list.
    SummaryPlusItems { summary: Vec<Row>, items: Vec<Row> },
}

enum Record<'a> {
    Object(&'a Map<String, Value>),
    Other(&'a Value),
    /// Placeholder for an empty record list, so the sheet still has a row.
    Blank,
}

/// Resolve a normalized payload into rows for the requested mode.
///
/// A `data` list is the record sequence and an empty one yields a single
/// blank record. A `data` object is the one record; any other payload is
/// itself one record.
/// Failures resolve to `ErrorRow` in both modes.
pub fn resolve(payload: &ParsedPayload, mode: ReshapeMode) -> Shaped {
    let map = match payload {
        ParsedPayload::Parsed(map) => map,
        ParsedPayload::Failed { message, raw } => {
            let mut row = Row::new();
            row.push("error", Value::String(message.clone()));
            if let Some(raw) = raw {
                row.push("raw", Value::String(raw.clone()));
            }
            return Shaped::ErrorRow(row);
        }
    };

    let records = records(map);

    match mode {
        ReshapeMode::Flat => Shaped::FlatRows(records.into_iter().map(record_row).collect()),
        ReshapeMode::SummaryItems => {
            let mut summary = Vec::new();
            let mut items = Vec::new();
            for record in records {
                match record {
                    Record::Object(fields) => split_record(fields, &mut summary, &mut items),
                    other => summary.push(record_row(other)),
                }
            }
            Shaped::SummaryPlusItems { summary, items }
        }
    }
}

fn records(map: &Map<String, Value>) -> Vec<Record<'_>> {
    match map.get("data") {
        Some(Value::Array(list)) if list.is_empty() => vec![Record::Blank],
        Some(Value::Object(inner)) => vec![Record::Object(inner)],
        Some(Value::Array(list)) => list
            .iter()
            .map(|element| match element {
                Value::Object(fields) => Record::Object(fields),
                other => Record::Other(other),
            })
            .collect(),
        _ => vec![Record::Object(map)],
    }
}

fn record_row(record: Record<'_>) -> Row {
    match record {
        Record::Object(fields) => object_row(fields),
        Record::Other(value) => {
            let mut row = Row::new();
            row.push(VALUE_COLUMN, value.clone());
            row
        }
        Record::Blank => Row::new(),
    }
}

fn object_row(fields: &Map<String, Value>) -> Row {
    Row::from(fields.clone())
}

/// Split one record into a flattened summary row and its line items.
fn split_record(fields: &Map<String, Value>, summary: &mut Vec<Row>, items: &mut Vec<Row>) {
    let mut row = Row::new();
    for (key, value) in fields {
        match value {
            Value::Array(list) if is_record_list(list) => {
                items.extend(list.iter().filter_map(Value::as_object).map(object_row));
            }
            Value::Object(nested) => flatten_into(&mut row, key, nested),
            other => row.push(key.clone(), other.clone()),
        }
    }
    summary.push(row);
}

fn flatten_into(row: &mut Row, prefix: &str, nested: &Map<String, Value>) {
    for (key, value) in nested {
        let name = format!("{prefix}{KEY_SEPARATOR}{key}");
        match value {
            Value::Object(inner) => flatten_into(row, &name, inner),
            other => row.push(name, other.clone()),
        }
    }
}

fn is_record_list(list: &[Value]) -> bool {
    !list.is_empty() && list.iter().all(Value::is_object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> ParsedPayload {
        match value {
            Value::Object(map) => ParsedPayload::Parsed(map),
            _ => panic!("expected an object"),
        }
    }

    fn names(row: &Row) -> Vec<&str> {
        row.fields().iter().map(|(k, _)| k.as_str()).collect()
    }

    #[test]
    fn test_failure_becomes_error_row() {
        let failed = ParsedPayload::Failed {
            message: "JSON parse failed: eof".into(),
            raw: Some("{".into()),
        };
        for mode in [ReshapeMode::Flat, ReshapeMode::SummaryItems] {
            let Shaped::ErrorRow(row) = resolve(&failed, mode) else {
                panic!("expected an error row");
            };
            assert_eq!(row.get("error"), Some(&json!("JSON parse failed: eof")));
            assert_eq!(row.get("raw"), Some(&json!("{")));
        }
    }

    #[test]
    fn test_single_object_is_one_row() {
        let shaped = resolve(&payload(json!({"Name": "Acme", "Amt": 10})), ReshapeMode::Flat);
        let Shaped::FlatRows(rows) = shaped else {
            panic!("expected flat rows");
        };
        assert_eq!(rows.len(), 1);
        assert_eq!(names(&rows[0]), ["Name", "Amt"]);
    }

    #[test]
    fn test_data_list_and_non_object_elements() {
        let shaped = resolve(
            &payload(json!({"data": [{"Name": "Acme"}, "stray", {"Name": "Beta"}]})),
            ReshapeMode::Flat,
        );
        let Shaped::FlatRows(rows) = shaped else {
            panic!("expected flat rows");
        };
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].get(VALUE_COLUMN), Some(&json!("stray")));
        assert_eq!(rows[2].get("Name"), Some(&json!("Beta")));
    }

    #[test]
    fn test_data_object_is_the_record() {
        let shaped = resolve(&payload(json!({"data": {"Name": "Acme"}})), ReshapeMode::Flat);
        let Shaped::FlatRows(rows) = shaped else {
            panic!("expected flat rows");
        };
        assert_eq!(rows.len(), 1);
        assert_eq!(names(&rows[0]), ["Name"]);
        assert_eq!(rows[0].get("Name"), Some(&json!("Acme")));
    }

    #[test]
    fn test_data_scalar_stays_a_field() {
        let Shaped::FlatRows(rows) = resolve(&payload(json!({"data": 7})), ReshapeMode::Flat) else {
            panic!("expected flat rows");
        };
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("data"), Some(&json!(7)));
    }

    #[test]
    fn test_empty_data_list_is_one_blank_row() {
        for mode in [ReshapeMode::Flat, ReshapeMode::SummaryItems] {
            let rows = match resolve(&payload(json!({"data": []})), mode) {
                Shaped::FlatRows(rows) => rows,
                Shaped::SummaryPlusItems { summary, items } => {
                    assert!(items.is_empty());
                    summary
                }
                Shaped::ErrorRow(_) => panic!("unexpected error row"),
            };
            assert_eq!(rows.len(), 1);
            assert!(rows[0].is_empty());
        }
    }

    #[test]
    fn test_summary_items_split() {
        let invoice = json!({
            "Inv #": "INV-7",
            "vendor": {"name": "Acme", "address": {"city": "Dallas"}},
            "line_items": [{"desc": "Pipe", "qty": 2}, {"desc": "Valve", "qty": 1}],
            "fees": [{"desc": "Freight", "qty": 1}],
            "tags": ["urgent"]
        });
        let Shaped::SummaryPlusItems { summary, items } =
            resolve(&payload(invoice), ReshapeMode::SummaryItems)
        else {
            panic!("expected summary and items");
        };

        assert_eq!(summary.len(), 1);
        assert_eq!(
            names(&summary[0]),
            ["Inv #", "vendor_name", "vendor_address_city", "tags"]
        );
        assert_eq!(summary[0].get("vendor_address_city"), Some(&json!("Dallas")));

        let descs: Vec<&Value> = items.iter().filter_map(|r| r.get("desc")).collect();
        assert_eq!(descs, [&json!("Pipe"), &json!("Valve"), &json!("Freight")]);
    }

    #[test]
    fn test_flattening_can_collide() {
        let Shaped::SummaryPlusItems { summary, .. } = resolve(
            &payload(json!({"vendor_name": "", "vendor": {"name": "Acme"}})),
            ReshapeMode::SummaryItems,
        ) else {
            panic!("expected summary and items");
        };
        assert_eq!(names(&summary[0]), ["vendor_name", "vendor_name"]);
    }

    #[test]
    fn test_split_over_data_list() {
        let Shaped::SummaryPlusItems { summary, items } = resolve(
            &payload(json!({"data": [
                {"Inv #": "1", "lines": [{"sku": "a"}]},
                {"Inv #": "2", "lines": [{"sku": "b"}, {"sku": "c"}]}
            ]})),
            ReshapeMode::SummaryItems,
        ) else {
            panic!("expected summary and items");
        };
        assert_eq!(summary.len(), 2);
        assert_eq!(items.len(), 3);
    }
}
