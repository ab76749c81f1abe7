use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::InvmapError;
use crate::parsing::ParsedPayload;

/// Placeholder stored in every cell that has no value.
pub const NOT_FOUND: &str = "Not Found";

/// True when a cell carries a real value: not null, not an empty string and
/// not the sentinel.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty() && s != NOT_FOUND,
        _ => true,
    }
}

/// How a parsed payload is turned into tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReshapeMode {
    /// One table with one row per record.
    #[default]
    Flat,
    /// A flattened summary table plus a table of line items.
    SummaryItems,
}

impl fmt::Display for ReshapeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReshapeMode::Flat => write!(f, "flat"),
            ReshapeMode::SummaryItems => write!(f, "summary-items"),
        }
    }
}

impl FromStr for ReshapeMode {
    type Err = InvmapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "flat" => Ok(ReshapeMode::Flat),
            "split" | "summary-items" | "summary_items" => Ok(ReshapeMode::SummaryItems),
            other => Err(InvmapError::InvalidInput(format!(
                "unknown reshape mode '{other}' (expected 'flat' or 'split')"
            ))),
        }
    }
}

/// An ordered list of `(column, value)` pairs.
///
/// Unlike a JSON object a row may repeat a column name; flattening nested
/// objects can produce such collisions and the reconciler resolves them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    fields: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Row::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: Value) {
        self.fields.push((name.into(), value));
    }

    /// First value stored under `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Row {
            fields: iter.into_iter().collect(),
        }
    }
}

impl From<Map<String, Value>> for Row {
    fn from(map: Map<String, Value>) -> Self {
        map.into_iter().collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Column {
            name: name.into(),
            values,
        }
    }

    /// Number of cells carrying a real value.
    pub fn present_count(&self) -> usize {
        self.values.iter().filter(|v| is_present(v)).count()
    }
}

/// Column-oriented table. Every column holds exactly `row_count` values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    pub(crate) fn from_columns(columns: Vec<Column>, row_count: usize) -> Self {
        debug_assert!(columns.iter().all(|c| c.values.len() == row_count));
        Table { columns, row_count }
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub(crate) fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&Value> {
        self.column(column).and_then(|c| c.values.get(row))
    }

    /// Row view of the table, including `null` cells.
    pub fn rows(&self) -> Vec<Row> {
        (0..self.row_count)
            .map(|i| {
                self.columns
                    .iter()
                    .map(|c| (c.name.clone(), c.values[i].clone()))
                    .collect()
            })
            .collect()
    }

    /// Rows as JSON objects. Later same-named columns overwrite earlier ones,
    /// which cannot happen after reconciliation.
    pub fn records(&self) -> Vec<Map<String, Value>> {
        (0..self.row_count)
            .map(|i| {
                self.columns
                    .iter()
                    .map(|c| (c.name.clone(), c.values[i].clone()))
                    .collect()
            })
            .collect()
    }
}

impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.records().serialize(serializer)
    }
}

/// A table with the worksheet name it is written under.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sheet {
    pub name: String,
    pub table: Table,
}

impl Sheet {
    pub fn new(name: impl Into<String>, table: Table) -> Self {
        Sheet {
            name: name.into(),
            table,
        }
    }
}

/// The outcome of one extraction: the normalized reply and the sheets built
/// from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extraction {
    pub payload: ParsedPayload,
    pub sheets: Vec<Sheet>,
}

impl Extraction {
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }
}

/// Render a cell as display text; `null` shows as the sentinel.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => NOT_FOUND.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
