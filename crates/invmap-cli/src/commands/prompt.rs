use invmap_core::config::Config;
use invmap_core::error::InvmapError;
use invmap_core::llm::gemini::GeminiClient;
use invmap_core::prompt::{regenerate_sub_prompt, DEFAULT_SUB_PROMPT};
use std::path::Path;

use crate::commands::load_template;

pub fn run(config: &Config, template_file: Option<&Path>, regenerate: bool) -> Result<(), InvmapError> {
    let template_file = match template_file {
        Some(path) if regenerate => path,
        _ => {
            println!("{DEFAULT_SUB_PROMPT}");
            return Ok(());
        }
    };

    let template = load_template(template_file)?;
    let model = GeminiClient::from_config(config)?;
    let sub_prompt = regenerate_sub_prompt(&model, &template.columns, DEFAULT_SUB_PROMPT)?;
    println!("{sub_prompt}");
    Ok(())
}
