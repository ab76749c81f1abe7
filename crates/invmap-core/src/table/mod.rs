pub mod enrich;
pub mod reconcile;
pub mod shape;

use crate::model::{Row, Sheet, Table};
use crate::template::TemplateColumns;
use enrich::{enrich, EnrichOptions};
use reconcile::reconcile;
use shape::Shaped;

pub const FLAT_SHEET: &str = "Extracted_Data";
pub const SUMMARY_SHEET: &str = "Summary";
pub const ITEMS_SHEET: &str = "Items";

/// Reconcile and enrich resolved rows into named worksheets.
///
/// Flat rows and error rows produce one `Extracted_Data` sheet. A summary
/// and items split produces `Summary` (aligned to the template's main
/// columns) and `Items` (aligned to its item columns).
pub fn build_sheets(shaped: &Shaped, template: &TemplateColumns, options: &EnrichOptions) -> Vec<Sheet> {
    match shaped {
        Shaped::ErrorRow(row) => vec![Sheet::new(
            FLAT_SHEET,
            finish(std::slice::from_ref(row), &template.columns, options),
        )],
        Shaped::FlatRows(rows) => vec![Sheet::new(
            FLAT_SHEET,
            finish(rows, &template.columns, options),
        )],
        Shaped::SummaryPlusItems { summary, items } => vec![
            Sheet::new(SUMMARY_SHEET, finish(summary, &template.columns, options)),
            Sheet::new(ITEMS_SHEET, finish(items, &template.item_columns, options)),
        ],
    }
}

fn finish(rows: &[Row], required: &[String], options: &EnrichOptions) -> Table {
    enrich(reconcile(rows, required), required, options)
}
