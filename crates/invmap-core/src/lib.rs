pub mod config;
pub mod error;
pub mod llm;
pub mod model;
pub mod output;
pub mod parsing;
pub mod prompt;
pub mod render;
pub mod session;
pub mod table;
pub mod template;

use tracing::info;

use error::InvmapError;
use llm::GenerativeModel;
use model::{Extraction, ReshapeMode};
use render::PageRenderer;
use table::enrich::EnrichOptions;
use template::TemplateColumns;

/// Main API entry point: render a PDF, ask the model for JSON and turn the
/// reply into template-aligned sheets.
///
/// Rendering and model failures are returned as errors. A reply that cannot
/// be parsed is not an error; it yields a single error row instead.
pub fn extract_document(
    pdf_bytes: &[u8],
    renderer: &dyn PageRenderer,
    model: &dyn GenerativeModel,
    sub_prompt: &str,
    template: &TemplateColumns,
    mode: ReshapeMode,
    options: &EnrichOptions,
) -> Result<Extraction, InvmapError> {
    let pages = renderer.render_pages(pdf_bytes)?;
    if pages.is_empty() {
        return Err(InvmapError::Render("document has no pages".into()));
    }
    info!(
        pages = pages.len(),
        backend = renderer.backend_name(),
        model = model.model_name(),
        "Requesting extraction"
    );

    let prompt = prompt::extraction_prompt(sub_prompt);
    let reply = model.generate(&prompt, &pages)?;

    Ok(process_reply(Some(&reply), template, mode, options))
}

/// Run a raw model reply through normalization, shape resolution,
/// column reconciliation and row enrichment.
pub fn process_reply(
    raw: Option<&str>,
    template: &TemplateColumns,
    mode: ReshapeMode,
    options: &EnrichOptions,
) -> Extraction {
    let payload = parsing::normalize(raw);
    let shaped = table::shape::resolve(&payload, mode);
    let sheets = table::build_sheets(&shaped, template, options);
    for sheet in &sheets {
        info!(
            sheet = %sheet.name,
            rows = sheet.table.row_count(),
            columns = sheet.table.columns().len(),
            "Sheet built"
        );
    }

    Extraction { payload, sheets }
}
