use rust_xlsxwriter::{Format, Workbook, Worksheet};
use serde_json::Value;

use crate::error::InvmapError;
use crate::model::{display_value, Sheet, Table};

/// Longest text Excel accepts in one cell, in characters.
pub const MAX_CELL_CHARS: usize = 32_767;

/// Write sheets into an in-memory xlsx workbook, header row in bold.
///
/// Numbers and booleans keep their cell types; everything else is text,
/// clipped to [`MAX_CELL_CHARS`].
pub fn write_workbook(sheets: &[Sheet]) -> Result<Vec<u8>, InvmapError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet.name.as_str())?;
        write_table(worksheet, &sheet.table, &header)?;
    }

    Ok(workbook.save_to_buffer()?)
}

fn write_table(worksheet: &mut Worksheet, table: &Table, header: &Format) -> Result<(), InvmapError> {
    for (col, column) in table.columns().iter().enumerate() {
        let col = col as u16;
        worksheet.write_string_with_format(0, col, clip(&column.name), header)?;
        for (row, value) in column.values.iter().enumerate() {
            let row = row as u32 + 1;
            match value {
                Value::Number(n) => match n.as_f64() {
                    Some(f) => worksheet.write_number(row, col, f)?,
                    None => worksheet.write_string(row, col, clip(&n.to_string()))?,
                },
                Value::Bool(b) => worksheet.write_boolean(row, col, *b)?,
                other => worksheet.write_string(row, col, clip(&display_value(other)))?,
            };
        }
    }
    Ok(())
}

/// Cut `text` to at most `MAX_CELL_CHARS` characters on a char boundary.
fn clip(text: &str) -> &str {
    match text.char_indices().nth(MAX_CELL_CHARS) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
