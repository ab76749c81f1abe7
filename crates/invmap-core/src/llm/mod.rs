pub mod gemini;

use crate::error::InvmapError;
use crate::render::PageImage;

/// Trait for hosted generative model backends.
pub trait GenerativeModel: Send + Sync {
    /// Send a prompt with page images and return the model's text reply.
    ///
    /// A reply with no text is returned as an empty string, not an error.
    fn generate(&self, prompt: &str, images: &[PageImage]) -> Result<String, InvmapError>;

    /// Model identifier (for diagnostics).
    fn model_name(&self) -> &str;
}
