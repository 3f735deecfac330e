//! In-memory document engine
//!
//! Documents are plain serde structures persisted as JSON. Text is modelled
//! as runs laid out with a uniform advance per character, which is enough
//! geometry for search, clipping and redaction to behave like a real page.

use super::{
    check_page, CheckboxWidget, Fill, ImageRef, PageImage, PdfDocument, PdfEngine, TextStyle,
};
use crate::error::{Error, Result};
use crate::geometry::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Advance of an inserted glyph as a fraction of the font size
const INSERTED_ADVANCE: f32 = 0.5;

/// A run of text on a single line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryText {
    pub text: String,
    pub rect: Rect,
}

impl MemoryText {
    pub fn new(text: impl Into<String>, rect: Rect) -> Self {
        Self {
            text: text.into(),
            rect,
        }
    }

    /// Bounding box of every character, evenly dividing the run's width
    fn char_boxes(&self) -> Vec<(char, Rect)> {
        let count = self.text.chars().count();
        if count == 0 {
            return Vec::new();
        }
        let advance = self.rect.width() / count as f32;
        self.text
            .chars()
            .enumerate()
            .map(|(i, c)| {
                let x0 = self.rect.x0 + advance * i as f32;
                (c, Rect::new(x0, self.rect.y0, x0 + advance, self.rect.y1))
            })
            .collect()
    }
}

/// An embedded image with its encoded bytes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryImage {
    pub id: u64,
    pub bbox: Rect,
    pub data: Vec<u8>,
}

/// A painted redaction fill
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilledRect {
    pub rect: Rect,
    pub fill: Fill,
}

/// A page of a [`MemoryDocument`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryPage {
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub text: Vec<MemoryText>,
    #[serde(default)]
    pub images: Vec<MemoryImage>,
    #[serde(default)]
    pub checkboxes: Vec<CheckboxWidget>,
    #[serde(default)]
    pub fills: Vec<FilledRect>,
    #[serde(skip)]
    pending: Vec<FilledRect>,
}

impl MemoryPage {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            text: Vec::new(),
            images: Vec::new(),
            checkboxes: Vec::new(),
            fills: Vec::new(),
            pending: Vec::new(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>, rect: Rect) -> Self {
        self.text.push(MemoryText::new(text, rect));
        self
    }

    pub fn with_image(mut self, id: u64, bbox: Rect, data: Vec<u8>) -> Self {
        self.images.push(MemoryImage { id, bbox, data });
        self
    }

    pub fn with_checkbox(mut self, widget: CheckboxWidget) -> Self {
        self.checkboxes.push(widget);
        self
    }

    /// Number of redactions queued but not yet applied
    pub fn pending_redactions(&self) -> usize {
        self.pending.len()
    }

    fn redact(&mut self, area: &Rect) {
        let mut kept_runs = Vec::with_capacity(self.text.len());
        for run in self.text.drain(..) {
            let boxes = run.char_boxes();
            if !boxes.iter().any(|(_, b)| area.contains(b.center())) {
                kept_runs.push(run);
                continue;
            }
            // Split the run around the erased glyphs, keeping survivor positions
            let mut fragment: Option<MemoryText> = None;
            for (c, b) in boxes {
                if area.contains(b.center()) {
                    if let Some(done) = fragment.take() {
                        kept_runs.push(done);
                    }
                    continue;
                }
                match fragment.as_mut() {
                    Some(current) => {
                        current.text.push(c);
                        current.rect = current.rect.union(&b);
                    }
                    None => fragment = Some(MemoryText::new(c.to_string(), b)),
                }
            }
            if let Some(done) = fragment {
                kept_runs.push(done);
            }
        }
        self.text = kept_runs;
        self.images.retain(|image| !area.contains(image.bbox.center()));
    }
}

/// A whole document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryDocument {
    pub pages: Vec<MemoryPage>,
}

impl MemoryDocument {
    pub fn new(pages: Vec<MemoryPage>) -> Self {
        Self { pages }
    }

    /// Load a document previously written with [`MemoryDocument::write`]
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::PdfNotFound {
                path: path.display().to_string(),
            });
        }
        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        serde_json::from_slice(data).map_err(|e| Error::InvalidPdf {
            reason: format!("Not a valid document: {}", e),
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    /// Set the value of the named checkbox; returns false if no such field exists
    pub fn set_checkbox(&mut self, field_name: &str, checked: bool) -> bool {
        for page in &mut self.pages {
            for widget in &mut page.checkboxes {
                if widget.field_name == field_name {
                    widget.checked = checked;
                    return true;
                }
            }
        }
        false
    }

    fn page(&self, page: usize) -> Result<&MemoryPage> {
        check_page(page, self.pages.len())?;
        Ok(&self.pages[page])
    }

    fn page_mut(&mut self, page: usize) -> Result<&mut MemoryPage> {
        check_page(page, self.pages.len())?;
        Ok(&mut self.pages[page])
    }
}

impl PdfDocument for MemoryDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, page: usize) -> Result<String> {
        let page = self.page(page)?;
        let lines: Vec<&str> = page.text.iter().map(|run| run.text.as_str()).collect();
        Ok(lines.join("\n"))
    }

    fn search_text(&self, page: usize, needle: &str) -> Result<Vec<Rect>> {
        let page = self.page(page)?;
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        let needle_len = needle.chars().count();
        let mut hits = Vec::new();
        for run in &page.text {
            let boxes = run.char_boxes();
            for (byte_offset, _) in run.text.match_indices(needle) {
                let start = run.text[..byte_offset].chars().count();
                let first = boxes[start].1;
                let last = boxes[start + needle_len - 1].1;
                hits.push(first.union(&last));
            }
        }
        Ok(hits)
    }

    fn text_in_rect(&self, page: usize, rect: &Rect) -> Result<String> {
        let page = self.page(page)?;
        let lines: Vec<String> = page
            .text
            .iter()
            .map(|run| {
                run.char_boxes()
                    .into_iter()
                    .filter(|(_, b)| rect.contains(b.center()))
                    .map(|(c, _)| c)
                    .collect::<String>()
            })
            .filter(|line| !line.is_empty())
            .collect();
        Ok(lines.join("\n"))
    }

    fn images(&self, page: usize) -> Result<Vec<PageImage>> {
        let page = self.page(page)?;
        Ok(page
            .images
            .iter()
            .map(|image| PageImage {
                reference: ImageRef(image.id),
                bbox: image.bbox,
            })
            .collect())
    }

    fn extract_image(&self, page: usize, image: ImageRef) -> Result<Vec<u8>> {
        let page_data = self.page(page)?;
        page_data
            .images
            .iter()
            .find(|candidate| candidate.id == image.0)
            .map(|found| found.data.clone())
            .ok_or(Error::ImageNotFound {
                page,
                reference: image.0,
            })
    }

    fn add_redaction(&mut self, page: usize, rect: Rect, fill: Fill) -> Result<()> {
        self.page_mut(page)?.pending.push(FilledRect { rect, fill });
        Ok(())
    }

    fn apply_redactions(&mut self, page: usize) -> Result<()> {
        let page = self.page_mut(page)?;
        let pending = std::mem::take(&mut page.pending);
        for mark in &pending {
            page.redact(&mark.rect);
        }
        page.fills.extend(pending);
        Ok(())
    }

    fn insert_text(
        &mut self,
        page: usize,
        origin: Point,
        text: &str,
        style: TextStyle,
    ) -> Result<()> {
        let width = text.chars().count() as f32 * style.size * INSERTED_ADVANCE;
        let rect = Rect::new(origin.x, origin.y, origin.x + width, origin.y + style.size);
        self.page_mut(page)?.text.push(MemoryText::new(text, rect));
        Ok(())
    }

    fn add_checkbox(&mut self, page: usize, widget: CheckboxWidget) -> Result<()> {
        self.page_mut(page)?.checkboxes.push(widget);
        Ok(())
    }

    fn checkboxes(&self, page: usize) -> Result<Vec<CheckboxWidget>> {
        Ok(self.page(page)?.checkboxes.clone())
    }

    fn save(&mut self, path: &Path) -> Result<()> {
        self.write(path)
    }
}

/// Engine over JSON-serialised [`MemoryDocument`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryEngine;

impl PdfEngine for MemoryEngine {
    fn with_document<R, F>(&self, path: &Path, f: F) -> Result<R>
    where
        F: FnOnce(&mut dyn PdfDocument) -> Result<R>,
    {
        let mut document = MemoryDocument::load(path)?;
        f(&mut document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> MemoryDocument {
        MemoryDocument::new(vec![MemoryPage::new(600.0, 800.0)
            .with_text("Doe, John", Rect::new(100.0, 100.0, 190.0, 112.0))
            .with_text("Individual contributor", Rect::new(100.0, 300.0, 320.0, 312.0))
            .with_image(7, Rect::new(100.0, 140.0, 140.0, 180.0), vec![1, 2, 3])])
    }

    #[test]
    fn test_page_text_joins_runs() {
        let doc = sample();
        assert_eq!(
            doc.page_text(0).unwrap(),
            "Doe, John\nIndividual contributor"
        );
    }

    #[test]
    fn test_search_text_returns_fragment_rect() {
        let doc = sample();
        let hits = doc.search_text(0, "John").unwrap();
        assert_eq!(hits, vec![Rect::new(150.0, 100.0, 190.0, 112.0)]);
        assert!(doc.search_text(0, "Smith").unwrap().is_empty());
    }

    #[test]
    fn test_redaction_is_pending_until_applied() {
        let mut doc = sample();
        let hit = doc.search_text(0, "Individual").unwrap()[0];
        doc.add_redaction(0, hit, Fill::WHITE).unwrap();
        assert_eq!(doc.pages[0].pending_redactions(), 1);
        assert!(doc.page_text(0).unwrap().contains("Individual"));

        doc.apply_redactions(0).unwrap();
        assert_eq!(doc.pages[0].pending_redactions(), 0);
        assert_eq!(doc.page_text(0).unwrap(), "Doe, John\n contributor");
        assert_eq!(doc.pages[0].fills.len(), 1);
    }

    #[test]
    fn test_redaction_removes_covered_image() {
        let mut doc = sample();
        doc.add_redaction(0, Rect::new(100.0, 140.0, 140.0, 180.0), Fill::WHITE)
            .unwrap();
        doc.apply_redactions(0).unwrap();
        assert!(doc.images(0).unwrap().is_empty());
    }

    #[test]
    fn test_text_in_rect_clips_by_glyph_center() {
        let doc = sample();
        let text = doc
            .text_in_rect(0, &Rect::new(95.0, 95.0, 135.0, 115.0))
            .unwrap();
        assert_eq!(text, "Doe,");
    }

    #[test]
    fn test_extract_unknown_image_fails() {
        let doc = sample();
        assert!(matches!(
            doc.extract_image(0, ImageRef(99)),
            Err(Error::ImageNotFound { .. })
        ));
    }

    #[test]
    fn test_out_of_bounds_page() {
        let doc = sample();
        assert!(matches!(
            doc.page_text(3),
            Err(Error::PageOutOfBounds { page: 3, total: 1 })
        ));
    }

    #[test]
    fn test_round_trip_through_engine() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        sample().write(&path).unwrap();

        let count = MemoryEngine
            .with_document(&path, |doc| Ok(doc.page_count()))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_invalid_document_bytes() {
        assert!(matches!(
            MemoryDocument::from_bytes(b"%PDF-1.7 not json"),
            Err(Error::InvalidPdf { .. })
        ));
    }
}
