use invmap_core::error::InvmapError;
use invmap_core::template::{preview_template, read_template};
use std::path::Path;

use crate::output;

pub fn run(file: &Path, rows: usize) -> Result<(), InvmapError> {
    let bytes = std::fs::read(file)?;
    let columns = read_template(&bytes)?;
    let preview = preview_template(&bytes, rows)?;

    println!("=== {} ===\n", preview.sheet);
    output::table::print_grid(&preview.columns, &preview.rows);

    if !columns.item_columns.is_empty() {
        println!("Item columns: {}", columns.item_columns.join(", "));
    }
    Ok(())
}
