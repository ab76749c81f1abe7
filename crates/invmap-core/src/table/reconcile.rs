use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::model::{Column, Row, Table, NOT_FOUND};

/// Align rows against the template's required columns.
///
/// Steps:
/// 1. Pivot rows into columns; the n-th occurrence of a name in a row feeds
///    the n-th column of that name, cells a row lacks are `null`
/// 2. Add each missing required column filled with the sentinel
/// 3. Collapse same-named columns, keeping the one with more real values
/// 4. Order required columns first, then the rest as first seen
pub fn reconcile(rows: &[Row], required: &[String]) -> Table {
    let row_count = rows.len();
    let mut columns = pivot(rows);

    for name in required {
        if !columns.iter().any(|c| &c.name == name) {
            columns.push(Column::new(
                name.clone(),
                vec![Value::String(NOT_FOUND.into()); row_count],
            ));
        }
    }

    let columns = dedup_columns(columns);
    Table::from_columns(order_columns(columns, required), row_count)
}

fn pivot(rows: &[Row]) -> Vec<Column> {
    let row_count = rows.len();
    let mut columns: Vec<Column> = Vec::new();

    for (i, row) in rows.iter().enumerate() {
        let mut occurrences: HashMap<&str, usize> = HashMap::new();
        for (name, value) in row.fields() {
            let nth = occurrences.entry(name.as_str()).or_insert(0);
            let idx = match nth_column(&columns, name, *nth) {
                Some(idx) => idx,
                None => {
                    columns.push(Column::new(name.clone(), vec![Value::Null; row_count]));
                    columns.len() - 1
                }
            };
            columns[idx].values[i] = value.clone();
            *nth += 1;
        }
    }

    columns
}

fn nth_column(columns: &[Column], name: &str, nth: usize) -> Option<usize> {
    columns
        .iter()
        .enumerate()
        .filter(|(_, c)| c.name == name)
        .map(|(idx, _)| idx)
        .nth(nth)
}

/// Keep one column per name. A later duplicate replaces the kept one only
/// with strictly more real values, and takes over its position.
fn dedup_columns(columns: Vec<Column>) -> Vec<Column> {
    let mut kept: Vec<Column> = Vec::with_capacity(columns.len());
    let mut positions: HashMap<String, usize> = HashMap::new();

    for column in columns {
        match positions.get(&column.name) {
            None => {
                positions.insert(column.name.clone(), kept.len());
                kept.push(column);
            }
            Some(&pos) => {
                let existing = kept[pos].present_count();
                let candidate = column.present_count();
                debug!(
                    column = %column.name,
                    existing,
                    candidate,
                    "duplicate column"
                );
                if candidate > existing {
                    kept[pos] = column;
                }
            }
        }
    }

    kept
}

fn order_columns(mut columns: Vec<Column>, required: &[String]) -> Vec<Column> {
    let mut ordered = Vec::with_capacity(columns.len());
    for name in required {
        if let Some(idx) = columns.iter().position(|c| &c.name == name) {
            ordered.push(columns.remove(idx));
        }
    }
    ordered.extend(columns);
    ordered
}
