use invmap_core::model::{display_value, Sheet};

const MAX_CELL_WIDTH: usize = 40;

pub fn print(sheets: &[Sheet]) {
    for sheet in sheets {
        println!("=== {} ({} rows) ===\n", sheet.name, sheet.table.row_count());

        let header: Vec<String> = sheet
            .table
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        let rows: Vec<Vec<String>> = sheet
            .table
            .rows()
            .iter()
            .map(|row| row.fields().iter().map(|(_, v)| display_value(v)).collect())
            .collect();

        print_grid(&header, &rows);
    }
}

/// Print a header and rows as left-aligned columns.
pub fn print_grid(header: &[String], rows: &[Vec<String>]) {
    let cells: Vec<Vec<String>> = std::iter::once(header.to_vec())
        .chain(rows.iter().cloned())
        .map(|row| row.iter().map(|c| truncate(c)).collect())
        .collect();

    let widths: Vec<usize> = (0..header.len())
        .map(|i| {
            cells
                .iter()
                .filter_map(|row| row.get(i))
                .map(|c| c.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    for (n, row) in cells.iter().enumerate() {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect();
        println!("  {}", line.join("  ").trim_end());
        if n == 0 {
            let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
            println!("  {}", rule.join("  "));
        }
    }
    println!();
}

fn truncate(cell: &str) -> String {
    let cell = cell.replace('\n', " ");
    if cell.chars().count() <= MAX_CELL_WIDTH {
        return cell;
    }
    let mut short: String = cell.chars().take(MAX_CELL_WIDTH - 3).collect();
    short.push_str("...");
    short
}
