use tracing::info;

use crate::model::Extraction;
use crate::prompt::DEFAULT_SUB_PROMPT;

/// State for one user's run: the current document, the sub prompt and the
/// latest extraction for that document.
///
/// Results are replaced wholesale on re-extraction and cleared when a
/// different document is observed. The sub prompt survives document
/// changes.
#[derive(Debug, Default)]
pub struct Session {
    document: Option<String>,
    sub_prompt: Option<String>,
    extraction: Option<Extraction>,
}

impl Session {
    pub fn new() -> Self {
        Session::default()
    }

    /// Record the document being worked on. Returns `true` when it differs
    /// from the previous one, in which case earlier results are dropped.
    pub fn observe_document(&mut self, name: &str) -> bool {
        if self.document.as_deref() == Some(name) {
            return false;
        }
        if let Some(previous) = self.document.replace(name.to_string()) {
            info!(previous = %previous, current = %name, "New document, clearing results");
        }
        self.extraction = None;
        true
    }

    pub fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }

    pub fn sub_prompt(&self) -> &str {
        self.sub_prompt.as_deref().unwrap_or(DEFAULT_SUB_PROMPT)
    }

    pub fn set_sub_prompt(&mut self, prompt: impl Into<String>) {
        self.sub_prompt = Some(prompt.into());
    }

    pub fn record(&mut self, extraction: Extraction) {
        self.extraction = Some(extraction);
    }

    pub fn extraction(&self) -> Option<&Extraction> {
        self.extraction.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::ParsedPayload;

    fn extraction() -> Extraction {
        Extraction {
            payload: ParsedPayload::Failed {
                message: "Empty response".into(),
                raw: None,
            },
            sheets: vec![],
        }
    }

    #[test]
    fn test_new_document_clears_results() {
        let mut session = Session::new();
        assert!(session.observe_document("a.pdf"));
        session.record(extraction());
        assert!(!session.observe_document("a.pdf"));
        assert!(session.extraction().is_some());

        assert!(session.observe_document("b.pdf"));
        assert!(session.extraction().is_none());
        assert_eq!(session.document(), Some("b.pdf"));
    }

    #[test]
    fn test_sub_prompt_survives_document_change() {
        let mut session = Session::new();
        assert_eq!(session.sub_prompt(), DEFAULT_SUB_PROMPT);
        session.set_sub_prompt("{\"Amt\": \"<total>\"}");
        session.observe_document("a.pdf");
        session.observe_document("b.pdf");
        assert_eq!(session.sub_prompt(), "{\"Amt\": \"<total>\"}");
    }
}
