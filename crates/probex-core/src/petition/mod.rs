//! Probate petition field extraction.

pub mod cases;
pub mod classifier;
pub mod forms;
mod parser;
pub mod rules;

pub use cases::split_cases;
pub use classifier::{classify, form_hint, Detection};
pub use parser::{
    ExtractionResult, PetitionExtractor, ReviewStatus, FORM_TYPE_CONFLICT, NAME_NOT_IN_PDF,
    REQUIRED_MISSING,
};

use crate::models::{FormType, RecordFields};
use rules::patterns::SIGNATURE_BLOCK;
use rules::text::{join_pages, normalize_text, split_lines};

/// Normalized text of one case: its pages and their joined form.
#[derive(Debug, Clone, Default)]
pub struct PetitionText {
    pages: Vec<String>,
    text: String,
    signature_start: usize,
}

impl PetitionText {
    /// Normalize each page and join them with page-break lines.
    pub fn from_pages<S: AsRef<str>>(pages: &[S]) -> Self {
        let pages: Vec<String> = pages.iter().map(|p| normalize_text(p.as_ref())).collect();
        let text = join_pages(&pages);
        let signature_start = signature_offset(&pages, &text);
        Self {
            pages,
            text,
            signature_start,
        }
    }

    /// Single-page document from plain text.
    pub fn from_text(text: &str) -> Self {
        Self::from_pages(&[text])
    }

    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn lines(&self) -> Vec<&str> {
        split_lines(&self.text)
    }

    /// Text before the signature block; the whole text when there is none.
    pub fn body(&self) -> &str {
        &self.text[..self.signature_start]
    }

    pub fn body_lines(&self) -> Vec<&str> {
        split_lines(self.body())
    }

    /// The attorney/signature region, or the last page when no signature label exists.
    pub fn signature(&self) -> &str {
        if self.signature_start < self.text.len() {
            &self.text[self.signature_start..]
        } else {
            self.pages.last().map(String::as_str).unwrap_or("")
        }
    }

    pub fn signature_lines(&self) -> Vec<&str> {
        split_lines(self.signature())
    }

    /// Joined text of the first `n` pages.
    pub fn leading_pages(&self, n: usize) -> String {
        join_pages(&self.pages[..n.min(self.pages.len())])
    }
}

/// Byte offset of the signature block: the first signature label on the last
/// page that carries one. `text.len()` when there is none.
fn signature_offset(pages: &[String], text: &str) -> usize {
    let mut page_start = 0;
    let mut found = None;
    for page in pages {
        let page = page.trim_matches('\n');
        if let Some(m) = SIGNATURE_BLOCK.find(page) {
            found = Some(page_start + m.start());
        }
        // Page text plus the "\n\f\n" separator.
        page_start += page.len() + 3;
    }
    match found {
        // Snap back to the start of the line holding the label.
        Some(offset) if offset <= text.len() => text[..offset].rfind('\n').map_or(0, |i| i + 1),
        _ => text.len(),
    }
}

/// Field parser for one petition layout.
pub trait FieldParser: Sync {
    /// Layout handled by this parser.
    fn form_type(&self) -> FormType;

    /// Extract whatever fields the layout's anchors yield. Never fails.
    fn parse(&self, doc: &PetitionText) -> RecordFields;
}

/// Parser for a layout; `Unknown` gets the generic fallback.
pub fn parser_for(form_type: FormType) -> &'static dyn FieldParser {
    forms::parser_for(form_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_body_and_signature_split() {
        let doc = PetitionText::from_pages(&[
            "ESTATE OF JOHN SMITH\nName: Mary Smith",
            "Signature of Attorney\nPrint Name of Attorney: Richard Roe\nTel: 718-555-0100",
        ]);
        assert_eq!(doc.body(), "ESTATE OF JOHN SMITH\nName: Mary Smith\n\u{000C}\n");
        assert!(doc.signature().starts_with("Signature of Attorney"));
        assert!(doc.signature().contains("Richard Roe"));
    }

    #[test]
    fn test_signature_falls_back_to_last_page() {
        let doc = PetitionText::from_pages(&["first page", "last page Tel 718-555-0100"]);
        assert_eq!(doc.body(), doc.text());
        assert_eq!(doc.signature(), "last page Tel 718-555-0100");
    }

    #[test]
    fn test_leading_pages() {
        let doc = PetitionText::from_pages(&["one", "two", "three"]);
        assert_eq!(doc.leading_pages(2), "one\n\u{000C}\ntwo");
        assert_eq!(doc.leading_pages(10), doc.text());
    }
}
