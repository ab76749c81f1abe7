pub mod pdftoppm;

use crate::error::InvmapError;

pub const PNG_MIME: &str = "image/png";

/// One rendered PDF page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImage {
    pub page_number: usize,
    /// PNG-encoded bytes.
    pub png: Vec<u8>,
}

/// Trait for PDF page rendering backends.
pub trait PageRenderer: Send + Sync {
    /// Render every page of the PDF, in page order.
    fn render_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageImage>, InvmapError>;

    /// Name of this rendering backend (for diagnostics).
    fn backend_name(&self) -> &str;
}
