//! Name rearrangement and suppression-word erasure

use super::names::NameMatcher;
use crate::config::RedactionConfig;
use crate::error::Result;
use crate::geometry::Rect;
use crate::pdf::{Fill, PdfDocument, TextStyle};

/// Rewrites names on a page and erases the suppression word
///
/// Redactions here are eager: every occurrence is committed with
/// `apply_redactions` before the next one is handled, and the replacement
/// text is written into the cleared area straight away. The page text used
/// to find names is read once, before anything on the page changes.
#[derive(Debug, Clone)]
pub struct Redactor {
    matcher: NameMatcher,
    removal_word: String,
    replacement: String,
    style: TextStyle,
}

impl Redactor {
    pub fn new(config: &RedactionConfig) -> Result<Self> {
        Ok(Self {
            matcher: NameMatcher::new()?,
            removal_word: config.removal_word.clone(),
            replacement: config.replacement_for_removed.clone(),
            style: config.text_style(),
        })
    }

    /// Redact one page; returns the display names found, in match order
    pub fn redact_page(&self, doc: &mut dyn PdfDocument, page: usize) -> Result<Vec<String>> {
        let text = doc.page_text(page)?;
        let mut names = Vec::new();

        for found in self.matcher.find_all(&text) {
            let display = found.display();
            for rect in doc.search_text(page, &found.matched)? {
                self.replace(doc, page, rect, &display)?;
            }
            names.push(display);
        }

        if !self.removal_word.is_empty() {
            let hits = doc.search_text(page, &self.removal_word)?;
            for rect in &hits {
                self.replace(doc, page, *rect, &self.replacement)?;
            }
            if !hits.is_empty() {
                tracing::debug!(page, count = hits.len(), word = %self.removal_word, "Erased word");
            }
        }

        Ok(names)
    }

    fn replace(&self, doc: &mut dyn PdfDocument, page: usize, rect: Rect, text: &str) -> Result<()> {
        doc.add_redaction(page, rect, Fill::WHITE)?;
        doc.apply_redactions(page)?;
        doc.insert_text(page, rect.top_left(), text, self.style)
    }
}
