use std::io::Write;
use std::path::Path;
use std::process::Command;

use tracing::{debug, info};

use crate::error::InvmapError;
use crate::render::{PageImage, PageRenderer};

pub const DEFAULT_DPI: u32 = 150;

/// Page rendering backend using pdftoppm (from poppler-utils).
///
/// Writes one PNG per page into a scratch directory and reads them back.
pub struct PdftoppmRenderer {
    dpi: u32,
}

impl PdftoppmRenderer {
    pub fn new(dpi: u32) -> Self {
        PdftoppmRenderer { dpi }
    }

    /// Check if pdftoppm is available on the system.
    pub fn is_available() -> bool {
        Command::new("pdftoppm")
            .arg("-v")
            .output()
            .map(|o| o.status.success() || !o.stderr.is_empty())
            .unwrap_or(false)
    }
}

impl Default for PdftoppmRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_DPI)
    }
}

impl PageRenderer for PdftoppmRenderer {
    fn render_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageImage>, InvmapError> {
        let mut tmpfile =
            tempfile::NamedTempFile::new().map_err(|e| InvmapError::Render(e.to_string()))?;
        tmpfile
            .write_all(pdf_bytes)
            .map_err(|e| InvmapError::Render(e.to_string()))?;
        let out_dir = tempfile::tempdir().map_err(|e| InvmapError::Render(e.to_string()))?;
        let prefix = out_dir.path().join("page");

        let output = Command::new("pdftoppm")
            .arg("-png")
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg(tmpfile.path())
            .arg(&prefix)
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    InvmapError::PdftoppmNotFound
                } else {
                    InvmapError::Render(format!("pdftoppm failed: {}", e))
                }
            })?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            return Err(InvmapError::PdftoppmFailed { code, stderr });
        }

        let pages = collect_pages(out_dir.path())?;
        if pages.is_empty() {
            return Err(InvmapError::Render("pdftoppm produced no pages".into()));
        }

        info!(pages = pages.len(), dpi = self.dpi, "Rendered PDF pages");
        Ok(pages)
    }

    fn backend_name(&self) -> &str {
        "pdftoppm"
    }
}

/// Read `page-N.png` files from `dir`, ordered by page number.
fn collect_pages(dir: &Path) -> Result<Vec<PageImage>, InvmapError> {
    let mut pages = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(page_number) = page_number_from_file_name(name) else {
            debug!(file = name, "skipping unexpected pdftoppm output");
            continue;
        };
        pages.push(PageImage {
            page_number,
            png: std::fs::read(&path)?,
        });
    }
    pages.sort_by_key(|p| p.page_number);
    Ok(pages)
}

/// pdftoppm zero-pads the page number to the width of the page count:
/// `page-1.png`, `page-07.png`, `page-112.png`.
fn page_number_from_file_name(name: &str) -> Option<usize> {
    name.strip_prefix("page-")?
        .strip_suffix(".png")?
        .parse()
        .ok()
}
