use invmap_core::config::Config;
use invmap_core::error::InvmapError;
use invmap_core::llm::gemini::GeminiClient;
use invmap_core::model::ReshapeMode;
use invmap_core::output::Artifacts;
use invmap_core::render::pdftoppm::PdftoppmRenderer;
use invmap_core::session::Session;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::commands::load_template;
use crate::output;

pub fn run(
    config: &Config,
    pdf_files: Vec<PathBuf>,
    template_file: &Path,
    mode: ReshapeMode,
    prompt_file: Option<PathBuf>,
    out_dir: &Path,
    output_format: &str,
) -> Result<(), InvmapError> {
    let model = GeminiClient::from_config(config)?;
    if !PdftoppmRenderer::is_available() {
        return Err(InvmapError::PdftoppmNotFound);
    }
    let template = load_template(template_file)?;
    let renderer = PdftoppmRenderer::new(config.render.dpi);
    let options = config.enrich_options();

    let mut session = Session::new();
    if let Some(path) = prompt_file {
        session.set_sub_prompt(std::fs::read_to_string(path)?.trim());
    }

    for pdf_file in &pdf_files {
        let name = pdf_file.display().to_string();
        session.observe_document(&name);

        let pdf_bytes = std::fs::read(pdf_file)?;
        let extraction = invmap_core::extract_document(
            &pdf_bytes,
            &renderer,
            &model,
            session.sub_prompt(),
            &template,
            mode,
            &options,
        )?;

        let artifacts = Artifacts::build(pdf_file, &pdf_bytes, &extraction)?;
        let written = artifacts.save(out_dir)?;

        if pdf_files.len() > 1 {
            println!("--- {name} ---\n");
        }
        match output_format {
            "json" => output::json::print(&extraction)?,
            _ => output::table::print(&extraction.sheets),
        }
        for path in &written {
            eprintln!("Wrote {}", path.display());
        }

        session.record(extraction);
    }

    info!(documents = pdf_files.len(), "Extraction finished");
    Ok(())
}
