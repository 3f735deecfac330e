//! PDF engine layer
//!
//! The redaction pipeline talks to documents only through the
//! [`PdfEngine`] and [`PdfDocument`] traits. Two engines are provided:
//! [`PdfiumEngine`] (PDFium for reading and editing, qpdf for writing
//! checkbox widgets) and [`MemoryEngine`], a serde-backed document model
//! used by tests and benchmarks.

mod memory;
mod pdfium;
mod qpdf;

pub use memory::{
    FilledRect, MemoryDocument, MemoryEngine, MemoryImage, MemoryPage, MemoryText,
};
pub use pdfium::{PdfiumDocument, PdfiumEngine};
pub use qpdf::{CheckboxPlacement, QpdfWrapper};

use crate::error::Result;
use crate::geometry::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Opaque engine reference to an embedded image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageRef(pub u64);

/// An image placed on a page
#[derive(Debug, Clone, PartialEq)]
pub struct PageImage {
    pub reference: ImageRef,
    pub bbox: Rect,
}

/// Fill colour for redaction marks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fill {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Fill {
    pub const WHITE: Fill = Fill {
        r: 255,
        g: 255,
        b: 255,
    };
}

/// Standard font faces available for inserted text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Font {
    #[default]
    Helvetica,
    TimesRoman,
    Courier,
}

/// Font face and size for inserted text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font: Font,
    pub size: f32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font: Font::Helvetica,
            size: 11.0,
        }
    }
}

/// An interactive checkbox form field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckboxWidget {
    pub rect: Rect,
    pub field_name: String,
    pub checked: bool,
}

/// An open, mutable document
///
/// Page indices are 0-based. Rectangles use the top-left origin
/// convention of [`crate::geometry`].
pub trait PdfDocument {
    /// Number of pages
    fn page_count(&self) -> usize;

    /// Plain text of a page, one text line per `\n`-separated line
    fn page_text(&self, page: usize) -> Result<String>;

    /// Every occurrence of `needle` on the page, one rectangle per line fragment
    fn search_text(&self, page: usize, needle: &str) -> Result<Vec<Rect>>;

    /// Text whose glyphs fall inside `rect`
    fn text_in_rect(&self, page: usize, rect: &Rect) -> Result<String>;

    /// Images placed on the page, in the page's native order
    fn images(&self, page: usize) -> Result<Vec<PageImage>>;

    /// Encoded bytes of an embedded image
    fn extract_image(&self, page: usize, image: ImageRef) -> Result<Vec<u8>>;

    /// Queue a filled redaction over `rect`
    fn add_redaction(&mut self, page: usize, rect: Rect, fill: Fill) -> Result<()>;

    /// Remove content under every queued redaction on the page and paint the fills
    fn apply_redactions(&mut self, page: usize) -> Result<()>;

    /// Write `text` with its top-left corner at `origin`
    fn insert_text(&mut self, page: usize, origin: Point, text: &str, style: TextStyle)
        -> Result<()>;

    /// Attach a checkbox form field to the page
    fn add_checkbox(&mut self, page: usize, widget: CheckboxWidget) -> Result<()>;

    /// Checkbox form fields present on the page
    fn checkboxes(&self, page: usize) -> Result<Vec<CheckboxWidget>>;

    /// Write the document to `path`
    fn save(&mut self, path: &Path) -> Result<()>;
}

/// Opens documents from disk
///
/// A document handle only lives for the duration of `f`; engines that
/// bind native libraries per call release them when `f` returns.
pub trait PdfEngine: Send + Sync + 'static {
    fn with_document<R, F>(&self, path: &Path, f: F) -> Result<R>
    where
        F: FnOnce(&mut dyn PdfDocument) -> Result<R>;
}

/// Return an error unless `page` is a valid index for a document of `total` pages
pub(crate) fn check_page(page: usize, total: usize) -> Result<()> {
    if page >= total {
        return Err(crate::error::Error::PageOutOfBounds { page, total });
    }
    Ok(())
}
