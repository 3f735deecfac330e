//! PDF engine backed by PDFium
//!
//! PDFium handles reading, text search, image extraction and page-object
//! editing. Form widgets it cannot create are queued and written with
//! qpdf when the document is saved.

use super::qpdf::{CheckboxPlacement, QpdfWrapper};
use super::{
    check_page, CheckboxWidget, Fill, Font, ImageRef, PageImage, PdfDocument, PdfEngine,
    TextStyle,
};
use crate::error::{Error, Result};
use crate::geometry::{Point, Rect};
use pdfium_render::prelude::PdfDocument as RawDocument;
use pdfium_render::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Fraction of the font size between the top of a line and its baseline
const ASCENT: f32 = 0.8;

/// Glyph height assumed when a page reports none
const DEFAULT_EM: f32 = 10.0;

/// Slack used when deciding whether a mark encloses a Form XObject
const ENCLOSE_TOLERANCE: f32 = 0.5;

/// One character as PDFium placed it
#[derive(Debug, Clone, Copy, PartialEq)]
struct Glyph {
    ch: char,
    /// Loose bounds in page space
    rect: Rect,
    /// Pen position in PDF user space
    origin: (f32, f32),
    size: f32,
}

impl Glyph {
    fn from_char(c: &PdfPageTextChar, page_height: f32) -> Option<Self> {
        let ch = c.unicode_char().filter(|ch| *ch != '\r' && *ch != '\n')?;
        let bounds = c.loose_bounds().ok()?;
        let origin = c
            .origin()
            .map(|(x, y)| (x.value, y.value))
            .unwrap_or((bounds.left().value, bounds.bottom().value));
        Some(Self {
            ch,
            rect: to_page_rect(&bounds, page_height),
            origin,
            size: c.scaled_font_size().value,
        })
    }

    fn is_under(&self, marks: &[Rect]) -> bool {
        let center = self.rect.center();
        marks.iter().any(|mark| mark.contains(center))
    }
}

/// A line of text read left to right
#[derive(Debug, Clone, Default)]
struct TextLine {
    glyphs: Vec<(char, Rect)>,
}

impl TextLine {
    /// Lay out one line's glyphs, adding a space wherever the gap between
    /// two visible glyphs exceeds `word_gap`
    fn from_glyphs(mut glyphs: Vec<Glyph>, word_gap: f32) -> Self {
        glyphs.sort_by(|a, b| a.rect.x0.total_cmp(&b.rect.x0));

        let mut line = Self::default();
        for glyph in glyphs {
            if let Some(&(prev, prev_rect)) = line.glyphs.last() {
                let visible = !prev.is_whitespace() && !glyph.ch.is_whitespace();
                if visible && glyph.rect.x0 - prev_rect.x1 > word_gap {
                    let gap = Rect::new(prev_rect.x1, prev_rect.y0, glyph.rect.x0, prev_rect.y1);
                    line.glyphs.push((' ', gap));
                }
            }
            line.glyphs.push((glyph.ch, glyph.rect));
        }
        line
    }

    fn text(&self) -> String {
        self.glyphs.iter().map(|(c, _)| *c).collect()
    }

    /// Rectangles covering every occurrence of `needle` in this line
    fn find(&self, needle: &str) -> Vec<Rect> {
        let needle_len = needle.chars().count();
        if needle_len == 0 {
            return Vec::new();
        }
        let text = self.text();
        text.match_indices(needle)
            .map(|(byte_offset, _)| {
                let start = text[..byte_offset].chars().count();
                self.glyphs[start..start + needle_len]
                    .iter()
                    .map(|(_, b)| *b)
                    .reduce(|acc, b| acc.union(&b))
                    .unwrap_or(self.glyphs[start].1)
            })
            .collect()
    }
}

/// Median height of the glyphs that have one
fn median_height(glyphs: &[Glyph]) -> Option<f32> {
    let mut heights: Vec<f32> = glyphs
        .iter()
        .map(|g| g.rect.height())
        .filter(|h| *h > 0.0)
        .collect();
    heights.sort_by(f32::total_cmp);
    heights.get(heights.len() / 2).copied()
}

/// Arrange glyphs into lines, top of the page first
///
/// Glyphs whose tops are within 40% of the median glyph height share a line.
/// Words are split at gaps wider than 30% of it.
fn layout_lines(mut glyphs: Vec<Glyph>) -> Vec<TextLine> {
    let em = median_height(&glyphs).unwrap_or(DEFAULT_EM);
    let same_line = (em * 0.4).max(2.0);
    let word_gap = (em * 0.3).max(3.0);

    glyphs.sort_by(|a, b| {
        a.rect
            .y0
            .total_cmp(&b.rect.y0)
            .then(a.rect.x0.total_cmp(&b.rect.x0))
    });

    let mut rows: Vec<Vec<Glyph>> = Vec::new();
    for glyph in glyphs {
        match rows.last_mut() {
            Some(row) if (glyph.rect.y0 - row[0].rect.y0).abs() <= same_line => row.push(glyph),
            _ => rows.push(vec![glyph]),
        }
    }

    rows.into_iter()
        .map(|row| TextLine::from_glyphs(row, word_gap))
        .collect()
}

/// Text to write back in place of a partially redacted text object
#[derive(Debug, Clone, PartialEq)]
struct TextRun {
    text: String,
    origin: (f32, f32),
    size: f32,
}

/// Stretches of glyphs, in content order, that no mark covers
fn surviving_runs(glyphs: &[Glyph], marks: &[Rect]) -> Vec<TextRun> {
    let mut runs = Vec::new();
    let mut current: Option<TextRun> = None;

    for glyph in glyphs {
        if glyph.is_under(marks) {
            runs.extend(current.take());
            continue;
        }
        match current.as_mut() {
            Some(run) => run.text.push(glyph.ch),
            None if glyph.ch.is_whitespace() => {}
            None => {
                current = Some(TextRun {
                    text: glyph.ch.to_string(),
                    origin: glyph.origin,
                    size: glyph.size,
                })
            }
        }
    }
    runs.extend(current);

    for run in &mut runs {
        run.text.truncate(run.text.trim_end().len());
    }
    runs.retain(|run| !run.text.is_empty());
    runs
}

/// What redaction does to one top-level page object
#[derive(Debug)]
enum Cut {
    Remove,
    Split(Vec<TextRun>),
}

/// Glyphs belonging to a text object, in content order
fn object_glyphs(object: &PdfPageObject, text: &PdfPageText, page_height: f32) -> Vec<Glyph> {
    let Some(text_object) = object.as_text_object() else {
        return Vec::new();
    };
    let Ok(chars) = text_object.chars(text) else {
        return Vec::new();
    };
    let glyphs = chars
        .iter()
        .filter_map(|c| Glyph::from_char(&c, page_height))
        .collect();
    glyphs
}

/// Decide how `object` is affected by `marks`, or `None` when it is untouched
fn plan_cut(
    object: &PdfPageObject,
    text: Option<&PdfPageText>,
    marks: &[Rect],
    page_height: f32,
) -> Option<Cut> {
    let bounds = to_page_rect(&object.bounds().ok()?.to_rect(), page_height);
    let centre_marked = marks.iter().any(|mark| mark.contains(bounds.center()));

    match object.object_type() {
        PdfPageObjectType::Image => centre_marked.then_some(Cut::Remove),
        PdfPageObjectType::XObjectForm => marks
            .iter()
            .any(|mark| mark.expand(ENCLOSE_TOLERANCE).encloses(&bounds))
            .then_some(Cut::Remove),
        PdfPageObjectType::Text => {
            let glyphs = text
                .map(|text| object_glyphs(object, text, page_height))
                .unwrap_or_default();
            if glyphs.is_empty() {
                return centre_marked.then_some(Cut::Remove);
            }
            let covered = glyphs.iter().filter(|g| g.is_under(marks)).count();
            if covered == 0 {
                None
            } else if covered == glyphs.len() {
                Some(Cut::Remove)
            } else {
                Some(Cut::Split(surviving_runs(&glyphs, marks)))
            }
        }
        _ => None,
    }
}

/// Get PDFium instance (creates new instance each time - PDFium is not thread-safe)
fn create_pdfium(library_dir: Option<&Path>) -> Result<Pdfium> {
    let configured = library_dir.and_then(|dir| {
        Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir)).ok()
    });

    let bindings = match configured {
        Some(bindings) => bindings,
        None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| {
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(
                    "/opt/pdfium/lib",
                ))
            })
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|e| Error::Pdfium {
                reason: format!("Failed to initialize PDFium: {}", e),
            })?,
    };

    Ok(Pdfium::new(bindings))
}

/// Map PDFium errors to our error type
fn map_pdfium_error(err: PdfiumError) -> Error {
    match err {
        PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::PasswordError) => {
            Error::InvalidPdf {
                reason: "PDF is password protected".to_string(),
            }
        }
        _ => Error::Pdfium {
            reason: format!("{}", err),
        },
    }
}

/// Convert a PDFium rectangle (origin bottom-left) to page space
fn to_page_rect(rect: &PdfRect, page_height: f32) -> Rect {
    Rect::new(
        rect.left().value,
        page_height - rect.top().value,
        rect.right().value,
        page_height - rect.bottom().value,
    )
}

/// Convert a page-space rectangle to a PDFium rectangle
fn to_pdf_rect(rect: &Rect, page_height: f32) -> PdfRect {
    PdfRect::new_from_values(page_height - rect.y1, rect.x0, page_height - rect.y0, rect.x1)
}

/// Bounding box of `rect` after applying `matrices`, innermost last
fn transform_rect(rect: PdfRect, matrices: &[PdfMatrix]) -> PdfRect {
    matrices.iter().rev().fold(rect, |rect, matrix| {
        let corners = [
            matrix.apply_to_points(rect.left(), rect.bottom()),
            matrix.apply_to_points(rect.left(), rect.top()),
            matrix.apply_to_points(rect.right(), rect.bottom()),
            matrix.apply_to_points(rect.right(), rect.top()),
        ];
        let (xs, ys): (Vec<f32>, Vec<f32>) = corners.iter().map(|(x, y)| (x.value, y.value)).unzip();
        let min = |v: &[f32]| v.iter().copied().fold(f32::INFINITY, f32::min);
        let max = |v: &[f32]| v.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        PdfRect::new_from_values(min(&ys), min(&xs), max(&ys), max(&xs))
    })
}

/// Depth-first walk over the image objects under `object`, entering Form XObjects
fn walk_images(
    object: &PdfPageObject,
    matrices: &mut Vec<PdfMatrix>,
    visit: &mut dyn FnMut(&PdfPageImageObject, PdfRect),
) {
    if let Some(image) = object.as_image_object() {
        if let Ok(bounds) = object.bounds() {
            visit(image, transform_rect(bounds.to_rect(), matrices));
        }
    } else if let Some(form) = object.as_x_object_form_object() {
        let Ok(matrix) = form.matrix() else {
            return;
        };
        matrices.push(matrix);
        for index in form.as_range() {
            if let Ok(child) = form.get(index) {
                walk_images(&child, matrices, visit);
            }
        }
        matrices.pop();
    }
}

/// Visit every image on a page in a fixed order; the visit count is the image's reference
fn for_each_image(page: &PdfPage, visit: &mut dyn FnMut(&PdfPageImageObject, PdfRect)) {
    let mut matrices = Vec::new();
    for object in page.objects().iter() {
        walk_images(&object, &mut matrices, visit);
    }
}

/// A document opened through PDFium
pub struct PdfiumDocument<'a> {
    document: RawDocument<'a>,
    pending: HashMap<usize, Vec<(Rect, Fill)>>,
    placements: Vec<CheckboxPlacement>,
}

impl<'a> PdfiumDocument<'a> {
    fn new(document: RawDocument<'a>) -> Self {
        Self {
            document,
            pending: HashMap::new(),
            placements: Vec::new(),
        }
    }

    fn page(&self, index: usize) -> Result<PdfPage<'a>> {
        check_page(index, self.page_count())?;
        self.document
            .pages()
            .get(index as PdfPageIndex)
            .map_err(|e| Error::Pdfium {
                reason: format!("Failed to get page {}: {}", index + 1, e),
            })
    }

    fn lines(&self, index: usize) -> Result<Vec<TextLine>> {
        let page = self.page(index)?;
        let page_height = page.height().value;
        let Ok(text) = page.text() else {
            return Ok(Vec::new());
        };
        let glyphs = text
            .chars()
            .iter()
            .filter_map(|c| Glyph::from_char(&c, page_height))
            .collect();
        Ok(layout_lines(glyphs))
    }
}

impl PdfDocument for PdfiumDocument<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn page_text(&self, page: usize) -> Result<String> {
        let lines: Vec<String> = self.lines(page)?.iter().map(TextLine::text).collect();
        Ok(lines.join("\n"))
    }

    fn search_text(&self, page: usize, needle: &str) -> Result<Vec<Rect>> {
        Ok(self
            .lines(page)?
            .iter()
            .flat_map(|line| line.find(needle))
            .collect())
    }

    fn text_in_rect(&self, page: usize, rect: &Rect) -> Result<String> {
        let pdf_page = self.page(page)?;
        let page_height = pdf_page.height().value;
        let text_obj = pdf_page.text().map_err(map_pdfium_error)?;
        Ok(text_obj.inside_rect(to_pdf_rect(rect, page_height)))
    }

    fn images(&self, page: usize) -> Result<Vec<PageImage>> {
        let pdf_page = self.page(page)?;
        let page_height = pdf_page.height().value;

        let mut images = Vec::new();
        for_each_image(&pdf_page, &mut |_, bounds| {
            images.push(PageImage {
                reference: ImageRef(images.len() as u64),
                bbox: to_page_rect(&bounds, page_height),
            });
        });

        tracing::trace!(page, image_count = images.len(), "Enumerated page images");
        Ok(images)
    }

    fn extract_image(&self, page: usize, image: ImageRef) -> Result<Vec<u8>> {
        let pdf_page = self.page(page)?;

        let mut seen = 0u64;
        let mut raw = None;
        for_each_image(&pdf_page, &mut |object, _| {
            if seen == image.0 {
                raw = Some(object.get_raw_image());
            }
            seen += 1;
        });
        let raw = raw
            .ok_or(Error::ImageNotFound {
                page,
                reference: image.0,
            })?
            .map_err(map_pdfium_error)?;

        let mut png_bytes = Vec::new();
        raw.write_to(
            &mut std::io::Cursor::new(&mut png_bytes),
            image::ImageFormat::Png,
        )
        .map_err(|e| Error::Pdfium {
            reason: format!("Failed to encode image {} on page {}: {}", image.0, page, e),
        })?;
        Ok(png_bytes)
    }

    fn add_redaction(&mut self, page: usize, rect: Rect, fill: Fill) -> Result<()> {
        check_page(page, self.page_count())?;
        self.pending.entry(page).or_default().push((rect, fill));
        Ok(())
    }

    fn apply_redactions(&mut self, page: usize) -> Result<()> {
        let marks = self.pending.remove(&page).unwrap_or_default();
        if marks.is_empty() {
            return Ok(());
        }
        let areas: Vec<Rect> = marks.iter().map(|(rect, _)| *rect).collect();

        let (cuts, page_height) = {
            let pdf_page = self.page(page)?;
            let page_height = pdf_page.height().value;
            let text = pdf_page.text().ok();
            let cuts: Vec<(usize, Cut)> = pdf_page
                .objects()
                .iter()
                .enumerate()
                .filter_map(|(index, object)| {
                    plan_cut(&object, text.as_ref(), &areas, page_height).map(|cut| (index, cut))
                })
                .collect();
            (cuts, page_height)
        };

        let runs: Vec<TextRun> = cuts
            .iter()
            .flat_map(|(_, cut)| match cut {
                Cut::Split(runs) => runs.clone(),
                Cut::Remove => Vec::new(),
            })
            .collect();
        let font = self.document.fonts_mut().helvetica();

        let mut pdf_page = self.page(page)?;
        let objects = pdf_page.objects_mut();
        for (index, _) in cuts.iter().rev() {
            objects
                .remove_object_at_index(*index)
                .map_err(map_pdfium_error)?;
        }

        for run in &runs {
            objects
                .create_text_object(
                    PdfPoints::new(run.origin.0),
                    PdfPoints::new(run.origin.1),
                    &run.text,
                    font,
                    PdfPoints::new(run.size),
                )
                .map_err(map_pdfium_error)?;
        }

        for (rect, fill) in &marks {
            objects
                .create_path_object_rect(
                    to_pdf_rect(rect, page_height),
                    None,
                    None,
                    Some(PdfColor::new(fill.r, fill.g, fill.b, 255)),
                )
                .map_err(map_pdfium_error)?;
        }

        tracing::debug!(
            page,
            marks = marks.len(),
            removed_objects = cuts.len(),
            rewritten_runs = runs.len(),
            "Applied redactions"
        );
        Ok(())
    }

    fn insert_text(
        &mut self,
        page: usize,
        origin: Point,
        text: &str,
        style: TextStyle,
    ) -> Result<()> {
        check_page(page, self.page_count())?;
        let font = match style.font {
            Font::Helvetica => self.document.fonts_mut().helvetica(),
            Font::TimesRoman => self.document.fonts_mut().times_roman(),
            Font::Courier => self.document.fonts_mut().courier(),
        };

        let mut pdf_page = self.page(page)?;
        let page_height = pdf_page.height().value;
        let baseline = page_height - (origin.y + style.size * ASCENT);

        pdf_page
            .objects_mut()
            .create_text_object(
                PdfPoints::new(origin.x),
                PdfPoints::new(baseline),
                text,
                font,
                PdfPoints::new(style.size),
            )
            .map_err(map_pdfium_error)?;
        Ok(())
    }

    fn add_checkbox(&mut self, page: usize, widget: CheckboxWidget) -> Result<()> {
        let page_height = self.page(page)?.height().value;
        let rect = &widget.rect;
        self.placements.push(CheckboxPlacement {
            page,
            rect: [rect.x0, page_height - rect.y1, rect.x1, page_height - rect.y0],
            field_name: widget.field_name,
            checked: widget.checked,
        });
        Ok(())
    }

    fn checkboxes(&self, page: usize) -> Result<Vec<CheckboxWidget>> {
        let pdf_page = self.page(page)?;
        let page_height = pdf_page.height().value;

        let mut widgets = Vec::new();
        for annotation in pdf_page.annotations().iter() {
            let Some(field) = annotation.as_form_field() else {
                continue;
            };
            let Some(checkbox) = field.as_checkbox_field() else {
                continue;
            };
            let Ok(bounds) = annotation.bounds() else {
                continue;
            };
            widgets.push(CheckboxWidget {
                rect: to_page_rect(&bounds, page_height),
                field_name: field.name().unwrap_or_default(),
                checked: checkbox.is_checked().unwrap_or(false),
            });
        }

        // Widgets queued in this session are not visible to PDFium until saved
        widgets.extend(
            self.placements
                .iter()
                .filter(|placement| placement.page == page)
                .map(|placement| CheckboxWidget {
                    rect: Rect::new(
                        placement.rect[0],
                        page_height - placement.rect[3],
                        placement.rect[2],
                        page_height - placement.rect[1],
                    ),
                    field_name: placement.field_name.clone(),
                    checked: placement.checked,
                }),
        );

        Ok(widgets)
    }

    fn save(&mut self, path: &Path) -> Result<()> {
        let saved = self.document.save_to_bytes().map_err(|e| Error::Pdfium {
            reason: format!("Failed to save modified PDF: {}", e),
        })?;
        let output = QpdfWrapper::add_checkboxes(&saved, &self.placements)?;
        std::fs::write(path, output)?;
        tracing::debug!(
            path = %path.display(),
            checkboxes = self.placements.len(),
            "Saved document"
        );
        Ok(())
    }
}

/// Engine that binds PDFium for every opened document
#[derive(Debug, Clone, Default)]
pub struct PdfiumEngine {
    library_dir: Option<PathBuf>,
}

impl PdfiumEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look for the PDFium shared library in `dir` before the default locations
    pub fn with_library_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            library_dir: Some(dir.into()),
        }
    }

    /// Bind the PDFium library; each binding owns the library until dropped
    pub fn bind(&self) -> Result<Pdfium> {
        create_pdfium(self.library_dir.as_deref())
    }
}

impl PdfEngine for PdfiumEngine {
    fn with_document<R, F>(&self, path: &Path, f: F) -> Result<R>
    where
        F: FnOnce(&mut dyn PdfDocument) -> Result<R>,
    {
        if !path.exists() {
            return Err(Error::PdfNotFound {
                path: path.display().to_string(),
            });
        }

        let data = std::fs::read(path)?;
        if data.len() < 4 || &data[0..4] != b"%PDF" {
            return Err(Error::InvalidPdf {
                reason: "Not a valid PDF file".to_string(),
            });
        }

        let pdfium = self.bind()?;
        let document = pdfium
            .load_pdf_from_byte_slice(&data, None)
            .map_err(map_pdfium_error)?;

        let mut document = PdfiumDocument::new(document);
        f(&mut document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Glyph with its top edge at `top` in page space, on a 10pt baseline grid
    fn glyph(ch: char, x: f32, top: f32) -> Glyph {
        Glyph {
            ch,
            rect: Rect::new(x, top, x + 6.0, top + 10.0),
            origin: (x, 800.0 - top - 8.0),
            size: 10.0,
        }
    }

    fn word(text: &str, x: f32, top: f32) -> Vec<Glyph> {
        text.chars()
            .enumerate()
            .map(|(i, c)| glyph(c, x + 6.0 * i as f32, top))
            .collect()
    }

    #[test]
    fn test_layout_orders_lines_top_to_bottom() {
        let mut glyphs = word("second", 50.0, 200.0);
        glyphs.extend(word("first", 50.0, 100.0));
        let texts: Vec<String> = layout_lines(glyphs).iter().map(TextLine::text).collect();
        assert_eq!(texts, vec!["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn test_layout_tolerates_baseline_jitter() {
        let mut glyphs = word("Doe,", 50.0, 100.0);
        glyphs.extend(word("John", 90.0, 102.5));
        let lines = layout_lines(glyphs);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text(), "Doe, John");
    }

    #[test]
    fn test_line_find_unions_glyphs() {
        let lines = layout_lines(word("Individual", 100.0, 100.0));
        let hits = lines[0].find("Individual");
        assert_eq!(hits, vec![Rect::new(100.0, 100.0, 160.0, 110.0)]);
        assert!(lines[0].find("Nobody").is_empty());
        assert!(lines[0].find("").is_empty());
    }

    #[test]
    fn test_line_find_multiple_occurrences() {
        let lines = layout_lines(word("abab", 0.0, 100.0));
        assert_eq!(lines[0].find("ab").len(), 2);
    }

    #[test]
    fn test_median_height() {
        assert_eq!(median_height(&[]), None);
        let mut glyphs = word("ab", 0.0, 0.0);
        glyphs.push(Glyph {
            rect: Rect::new(20.0, 0.0, 26.0, 30.0),
            ..glyph('c', 20.0, 0.0)
        });
        assert_eq!(median_height(&glyphs), Some(10.0));
    }

    #[test]
    fn test_surviving_runs_keep_uncovered_text() {
        // "Team Doe, John Lead" with the name covered
        let glyphs = word("Team Doe, John Lead", 100.0, 100.0);
        let name = Rect::new(130.0, 100.0, 184.0, 110.0);
        let runs = surviving_runs(&glyphs, &[name]);

        let texts: Vec<&str> = runs.iter().map(|run| run.text.as_str()).collect();
        assert_eq!(texts, vec!["Team", "Lead"]);
        assert_eq!(runs[0].origin, (100.0, 692.0));
        assert_eq!(runs[1].origin.0, 190.0);
        assert_eq!(runs[1].size, 10.0);
    }

    #[test]
    fn test_surviving_runs_empty_when_fully_covered() {
        let glyphs = word("Doe, John", 100.0, 100.0);
        let all = Rect::new(90.0, 90.0, 200.0, 120.0);
        assert!(surviving_runs(&glyphs, &[all]).is_empty());
        assert_eq!(surviving_runs(&glyphs, &[]).len(), 1);
    }

    #[test]
    fn test_transform_rect_applies_form_matrix() {
        let inner = PdfRect::new_from_values(0.0, 0.0, 10.0, 20.0);
        let moved = transform_rect(
            inner,
            &[PdfMatrix::new(2.0, 0.0, 0.0, 2.0, 100.0, 50.0)],
        );
        assert_eq!(moved, PdfRect::new_from_values(50.0, 100.0, 70.0, 140.0));
        assert_eq!(transform_rect(inner, &[]), inner);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let engine = PdfiumEngine::new();
        let result = engine.with_document(Path::new("/nonexistent/file.pdf"), |doc| {
            Ok(doc.page_count())
        });
        assert!(matches!(result, Err(Error::PdfNotFound { .. })));
    }

    #[test]
    fn test_invalid_pdf_detection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.pdf");
        std::fs::write(&path, b"not a pdf").unwrap();
        let result = PdfiumEngine::new().with_document(&path, |doc| Ok(doc.page_count()));
        assert!(matches!(result, Err(Error::InvalidPdf { .. })));
    }
}
