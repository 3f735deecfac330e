//! Removal of photos selected with their checkboxes

use super::RemovalOutcome;
use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::pdf::{Fill, PdfDocument, PdfEngine};
use std::path::Path;

/// Height of the caption band cleared beneath a removed photo
pub const TEXT_BAND_HEIGHT: f32 = 20.0;

/// Slack allowed between a checkbox and its image after a save/load round trip
pub const EDGE_TOLERANCE: f32 = 0.5;

/// Band directly beneath an image, as wide as the image
pub fn text_band(bbox: &Rect) -> Rect {
    Rect::new(bbox.x0, bbox.y1, bbox.x1, bbox.y1 + TEXT_BAND_HEIGHT)
}

#[derive(Debug, Default)]
struct PageMarks {
    images: Vec<Rect>,
    bands: Vec<Rect>,
}

/// Whites out every image touched by a checked checkbox, with its caption band
///
/// Redactions are batched per page: every checkbox on a page is evaluated
/// against the unmodified page, then all marks are committed with a single
/// `apply_redactions` call.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemovalPipeline;

impl RemovalPipeline {
    pub fn new() -> Self {
        Self
    }

    pub fn run<E: PdfEngine>(&self, engine: &E, input: &Path, output: &Path) -> Result<RemovalOutcome> {
        if input == output {
            return Err(Error::PathAccessDenied {
                path: output.display().to_string(),
            });
        }

        let (pages_modified, images_removed, text_bands_removed) =
            engine.with_document(input, |doc| {
                let mut totals = (0usize, 0usize, 0usize);

                for page in 0..doc.page_count() {
                    let marks = Self::collect_marks(doc, page)?;
                    if !marks.images.is_empty() {
                        totals.0 += 1;
                        totals.1 += marks.images.len();
                        totals.2 += marks.bands.len();
                    }
                    for rect in marks.images.iter().chain(&marks.bands) {
                        doc.add_redaction(page, *rect, Fill::WHITE)?;
                    }
                    doc.apply_redactions(page)?;
                }

                doc.save(output)?;
                Ok(totals)
            })?;

        tracing::info!(
            input = %input.display(),
            output = %output.display(),
            pages_modified,
            images_removed,
            text_bands_removed,
            "Removed selected images"
        );

        Ok(RemovalOutcome {
            output_path: output.to_path_buf(),
            pages_modified,
            images_removed,
            text_bands_removed,
        })
    }

    fn collect_marks(doc: &dyn PdfDocument, page: usize) -> Result<PageMarks> {
        let mut marks = PageMarks::default();
        let checked: Vec<Rect> = doc
            .checkboxes(page)?
            .into_iter()
            .filter(|widget| widget.checked)
            .map(|widget| widget.rect)
            .collect();
        if checked.is_empty() {
            return Ok(marks);
        }

        let images = doc.images(page)?;
        for checkbox in &checked {
            let reach = checkbox.expand(EDGE_TOLERANCE);
            for image in images.iter().filter(|image| image.bbox.intersects(&reach)) {
                let band = text_band(&image.bbox);
                if !doc.text_in_rect(page, &band)?.trim().is_empty() {
                    marks.bands.push(band);
                }
                marks.images.push(image.bbox);
            }
        }

        tracing::debug!(
            page,
            checked = checked.len(),
            images = marks.images.len(),
            bands = marks.bands.len(),
            "Collected removal marks"
        );
        Ok(marks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::{CheckboxWidget, MemoryDocument, MemoryEngine, MemoryPage};
    use pretty_assertions::assert_eq;

    fn checkbox(rect: Rect, checked: bool) -> CheckboxWidget {
        CheckboxWidget {
            rect,
            field_name: "checkbox_0_0".to_string(),
            checked,
        }
    }

    fn page(checked: bool) -> MemoryPage {
        MemoryPage::new(600.0, 800.0)
            .with_image(1, Rect::new(100.0, 140.0, 140.0, 180.0), vec![])
            .with_image(2, Rect::new(300.0, 140.0, 340.0, 180.0), vec![])
            .with_text("Engineer", Rect::new(100.0, 185.0, 140.0, 197.0))
            .with_text("Designer", Rect::new(300.0, 185.0, 340.0, 197.0))
            .with_checkbox(checkbox(Rect::new(100.0, 120.0, 115.0, 140.0), checked))
    }

    fn run(doc: MemoryDocument) -> (RemovalOutcome, MemoryDocument) {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.json");
        let output = dir.path().join("out.json");
        doc.write(&input).unwrap();
        let outcome = RemovalPipeline::new()
            .run(&MemoryEngine, &input, &output)
            .unwrap();
        (outcome, MemoryDocument::load(&output).unwrap())
    }

    #[test]
    fn test_text_band() {
        assert_eq!(
            text_band(&Rect::new(10.0, 20.0, 50.0, 60.0)),
            Rect::new(10.0, 60.0, 50.0, 80.0)
        );
    }

    #[test]
    fn test_checked_box_removes_image_and_caption() {
        let (outcome, saved) = run(MemoryDocument::new(vec![page(true)]));
        assert_eq!(outcome.pages_modified, 1);
        assert_eq!(outcome.images_removed, 1);
        assert_eq!(outcome.text_bands_removed, 1);

        let remaining: Vec<Rect> = saved.images(0).unwrap().iter().map(|i| i.bbox).collect();
        assert_eq!(remaining, vec![Rect::new(300.0, 140.0, 340.0, 180.0)]);
        assert_eq!(saved.page_text(0).unwrap(), "Designer");
        assert_eq!(saved.pages[0].fills.len(), 2);
    }

    #[test]
    fn test_unchecked_boxes_change_nothing() {
        let original = MemoryDocument::new(vec![page(false)]);
        let (outcome, saved) = run(original.clone());
        assert_eq!(outcome.pages_modified, 0);
        assert_eq!(outcome.images_removed, 0);
        assert_eq!(saved, original);
    }

    #[test]
    fn test_band_without_text_is_not_marked() {
        let doc = MemoryDocument::new(vec![MemoryPage::new(600.0, 800.0)
            .with_image(1, Rect::new(100.0, 140.0, 140.0, 180.0), vec![])
            .with_checkbox(checkbox(Rect::new(100.0, 120.0, 115.0, 140.0), true))]);
        let (outcome, saved) = run(doc);
        assert_eq!(outcome.images_removed, 1);
        assert_eq!(outcome.text_bands_removed, 0);
        assert!(saved.images(0).unwrap().is_empty());
        assert_eq!(saved.pages[0].fills.len(), 1);
    }

    #[test]
    fn test_checkbox_slightly_above_image_still_selects_it() {
        let doc = MemoryDocument::new(vec![MemoryPage::new(600.0, 792.0)
            .with_image(1, Rect::new(100.0, 141.87299, 140.0, 181.87299), vec![])
            .with_image(2, Rect::new(100.0, 300.0, 140.0, 340.0), vec![])
            .with_checkbox(checkbox(Rect::new(100.0, 121.87, 115.0, 141.87), true))]);
        let (outcome, saved) = run(doc);
        assert_eq!(outcome.images_removed, 1);
        let remaining: Vec<Rect> = saved.images(0).unwrap().iter().map(|i| i.bbox).collect();
        assert_eq!(remaining, vec![Rect::new(100.0, 300.0, 140.0, 340.0)]);
    }

    #[test]
    fn test_checkbox_widgets_survive() {
        let (_, saved) = run(MemoryDocument::new(vec![page(true)]));
        assert_eq!(saved.checkboxes(0).unwrap().len(), 1);
    }
}
