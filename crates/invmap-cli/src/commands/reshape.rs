use invmap_core::config::Config;
use invmap_core::error::InvmapError;
use invmap_core::model::ReshapeMode;
use invmap_core::output::xlsx::write_workbook;
use std::path::{Path, PathBuf};

use crate::commands::load_template;
use crate::output;

pub fn run(
    config: &Config,
    reply_file: &Path,
    template_file: &Path,
    mode: ReshapeMode,
    output_format: &str,
    xlsx_file: Option<PathBuf>,
) -> Result<(), InvmapError> {
    let template = load_template(template_file)?;
    let reply = std::fs::read_to_string(reply_file)?;

    let extraction =
        invmap_core::process_reply(Some(&reply), &template, mode, &config.enrich_options());

    match output_format {
        "json" => output::json::print(&extraction)?,
        _ => output::table::print(&extraction.sheets),
    }

    if let Some(path) = xlsx_file {
        std::fs::write(&path, write_workbook(&extraction.sheets)?)?;
        eprintln!("Workbook written to {}", path.display());
    }

    Ok(())
}
