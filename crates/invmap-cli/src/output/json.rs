use invmap_core::error::InvmapError;
use invmap_core::model::Extraction;

pub fn print(extraction: &Extraction) -> Result<(), InvmapError> {
    let json = serde_json::to_string_pretty(extraction)?;
    println!("{json}");
    Ok(())
}
