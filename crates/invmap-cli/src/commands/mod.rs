pub mod extract;
pub mod prompt;
pub mod reshape;
pub mod template;

use invmap_core::error::InvmapError;
use invmap_core::template::{read_template, TemplateColumns};
use std::path::Path;

pub fn load_template(path: &Path) -> Result<TemplateColumns, InvmapError> {
    let bytes = std::fs::read(path)?;
    read_template(&bytes)
}
