use std::collections::{HashMap, HashSet};
use std::io::Cursor;

use calamine::{Data, Range, Reader, Xlsx};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::InvmapError;

/// Name of the optional worksheet that defines line-item columns.
pub const ITEMS_TEMPLATE_SHEET: &str = "Items";

/// Required columns taken from an Excel template's header rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TemplateColumns {
    /// Header of the first worksheet.
    pub columns: Vec<String>,
    /// Header of the `Items` worksheet, empty when the template has none.
    pub item_columns: Vec<String>,
}

impl TemplateColumns {
    pub fn new(columns: Vec<String>) -> Self {
        TemplateColumns {
            columns,
            item_columns: Vec::new(),
        }
    }
}

/// The first rows of a template's first worksheet, for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplatePreview {
    pub sheet: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Read required columns from an xlsx template.
pub fn read_template(bytes: &[u8]) -> Result<TemplateColumns, InvmapError> {
    let mut workbook = open(bytes)?;
    let sheet_names = workbook.sheet_names();
    let first = sheet_names
        .first()
        .cloned()
        .ok_or_else(|| InvmapError::Template("workbook has no worksheets".into()))?;

    let columns = header_row(&sheet_range(&mut workbook, &first)?);
    if columns.is_empty() {
        return Err(InvmapError::Template(format!(
            "sheet '{first}' has no header row"
        )));
    }

    // A second sheet named "Items" (any case) describes line-item columns.
    let item_columns = match sheet_names
        .iter()
        .skip(1)
        .find(|name| name.eq_ignore_ascii_case(ITEMS_TEMPLATE_SHEET))
    {
        Some(name) => header_row(&sheet_range(&mut workbook, name)?),
        None => Vec::new(),
    };

    info!(
        sheet = %first,
        columns = columns.len(),
        item_columns = item_columns.len(),
        "Template loaded"
    );

    Ok(TemplateColumns {
        columns,
        item_columns,
    })
}

/// Header plus up to `max_rows` data rows of the first worksheet.
pub fn preview_template(bytes: &[u8], max_rows: usize) -> Result<TemplatePreview, InvmapError> {
    let mut workbook = open(bytes)?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| InvmapError::Template("workbook has no worksheets".into()))?;
    let range = sheet_range(&mut workbook, &sheet)?;
    let columns = header_row(&range);

    let rows = range
        .rows()
        .skip(1)
        .take(max_rows)
        .map(|row| {
            (0..columns.len())
                .map(|i| row.get(i).and_then(cell_as_string).unwrap_or_default())
                .collect()
        })
        .collect();

    Ok(TemplatePreview {
        sheet,
        columns,
        rows,
    })
}

fn open(bytes: &[u8]) -> Result<Xlsx<Cursor<&[u8]>>, InvmapError> {
    calamine::open_workbook_from_rs(Cursor::new(bytes))
        .map_err(|e| InvmapError::Template(format!("failed to open xlsx: {e}")))
}

fn sheet_range(
    workbook: &mut Xlsx<Cursor<&[u8]>>,
    name: &str,
) -> Result<Range<Data>, InvmapError> {
    workbook
        .worksheet_range(name)
        .map_err(|e| InvmapError::Template(format!("sheet '{name}' could not be read: {e}")))
}

/// Column names from the first row. Blank cells between names become
/// `Unnamed: <index>`, repeated names get `.1`, `.2`, ... and trailing
/// blanks are dropped.
fn header_row(range: &Range<Data>) -> Vec<String> {
    let Some(first) = range.rows().next() else {
        return Vec::new();
    };

    let last_named = first.iter().rposition(|c| cell_as_string(c).is_some());
    let Some(last_named) = last_named else {
        return Vec::new();
    };

    let names: Vec<String> = first[..=last_named]
        .iter()
        .enumerate()
        .map(|(i, cell)| cell_as_string(cell).unwrap_or_else(|| format!("Unnamed: {i}")))
        .collect();
    let names = dedup_names(names);
    debug!(?names, "template header");
    names
}

/// `["Amt", "Amt", "Amt"]` becomes `["Amt", "Amt.1", "Amt.2"]`. A suffix
/// that is already taken is skipped.
fn dedup_names(names: Vec<String>) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::with_capacity(names.len());
    let mut counts: HashMap<String, usize> = HashMap::new();

    names
        .into_iter()
        .map(|name| {
            if used.insert(name.clone()) {
                return name;
            }
            let count = counts.entry(name.clone()).or_insert(0);
            loop {
                *count += 1;
                let candidate = format!("{name}.{count}");
                if used.insert(candidate.clone()) {
                    return candidate;
                }
            }
        })
        .collect()
}

fn cell_as_string(cell: &Data) -> Option<String> {
    match cell {
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        Data::DateTime(dt) => Some(dt.to_string()),
        Data::Empty => None,
        _ => Some(format!("{cell}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    fn workbook(sheets: &[(&str, &[&str])]) -> Vec<u8> {
        let mut wb = Workbook::new();
        for (name, headers) in sheets {
            let ws = wb.add_worksheet();
            ws.set_name(*name).unwrap();
            for (col, header) in headers.iter().enumerate() {
                ws.write_string(0, col as u16, *header).unwrap();
            }
            ws.write_string(1, 0, "1").unwrap();
        }
        wb.save_to_buffer().unwrap()
    }

    #[test]
    fn test_reads_first_sheet_header() {
        let bytes = workbook(&[("Template", &["S.No", "Memo #", "Vendor Name", "Amt"])]);
        let template = read_template(&bytes).unwrap();
        assert_eq!(template.columns, ["S.No", "Memo #", "Vendor Name", "Amt"]);
        assert!(template.item_columns.is_empty());
    }

    #[test]
    fn test_reads_items_sheet() {
        let bytes = workbook(&[
            ("Summary", &["Inv #", "Amt"]),
            ("items", &["Description", "Qty"]),
        ]);
        let template = read_template(&bytes).unwrap();
        assert_eq!(template.columns, ["Inv #", "Amt"]);
        assert_eq!(template.item_columns, ["Description", "Qty"]);
    }

    #[test]
    fn test_repeated_headers_numbered() {
        let bytes = workbook(&[("Sheet1", &["Amt", "Name", "Amt", "Amt.1", "Amt"])]);
        let template = read_template(&bytes).unwrap();
        assert_eq!(template.columns, ["Amt", "Name", "Amt.1", "Amt.1.1", "Amt.2"]);
    }

    #[test]
    fn test_gap_in_header_named() {
        let bytes = workbook(&[("Sheet1", &["A", "", "C"])]);
        let template = read_template(&bytes).unwrap();
        assert_eq!(template.columns, ["A", "Unnamed: 1", "C"]);
    }

    #[test]
    fn test_preview_rows() {
        let bytes = workbook(&[("Sheet1", &["S.No", "Name"])]);
        let preview = preview_template(&bytes, 5).unwrap();
        assert_eq!(preview.sheet, "Sheet1");
        assert_eq!(preview.rows, vec![vec!["1".to_string(), String::new()]]);
    }

    #[test]
    fn test_not_an_xlsx() {
        assert!(matches!(
            read_template(b"not a workbook"),
            Err(InvmapError::Template(_))
        ));
    }
}
