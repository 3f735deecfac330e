//! qpdf FFI wrapper for writing form widgets
//!
//! PDFium can read and toggle form fields but cannot create them, so
//! checkbox widgets are appended to the saved bytes with the qpdf crate
//! (vendored FFI).

use crate::error::{Error, Result};
use qpdf::{QPdf, QPdfArray, QPdfDictionary, QPdfObjectLike, QPdfStream};

/// Name of the "on" appearance state written for new checkboxes
const ON_STATE: &str = "Yes";

/// A checkbox to attach to a page, in PDF user space (origin bottom-left)
#[derive(Debug, Clone, PartialEq)]
pub struct CheckboxPlacement {
    /// Page index (0-based)
    pub page: usize,
    /// Lower-left x, lower-left y, upper-right x, upper-right y
    pub rect: [f32; 4],
    /// Fully qualified field name
    pub field_name: String,
    /// Initial state
    pub checked: bool,
}

impl CheckboxPlacement {
    fn width(&self) -> f32 {
        self.rect[2] - self.rect[0]
    }

    fn height(&self) -> f32 {
        self.rect[3] - self.rect[1]
    }
}

/// Wrapper for qpdf operations via FFI
pub struct QpdfWrapper;

fn open_qpdf(data: &[u8]) -> Result<QPdf> {
    QPdf::read_from_memory(data).map_err(map_qpdf_error)
}

/// Map qpdf crate errors to our error types
fn map_qpdf_error(e: qpdf::QPdfError) -> Error {
    Error::QpdfError {
        reason: e.to_string(),
    }
}

/// Escape a string for use inside a PDF literal string
fn escape_pdf_string(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '(' | ')' | '\\' => {
                escaped.push('\\');
                escaped.push(c);
            }
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Content stream drawing a checkbox frame, with a cross when checked
fn appearance_content(width: f32, height: f32, checked: bool) -> String {
    let mut content = format!(
        "q 0 G 1 w 0.5 0.5 {:.2} {:.2} re S",
        width - 1.0,
        height - 1.0
    );
    if checked {
        content.push_str(&format!(
            " 2 2 m {:.2} {:.2} l 2 {:.2} m {:.2} 2 l S",
            width - 2.0,
            height - 2.0,
            height - 2.0,
            width - 2.0
        ));
    }
    content.push_str(" Q");
    content
}

/// Widget annotation dictionary in PDF syntax
///
/// `/Rect` is written unrounded: its bottom edge must land exactly on the
/// top edge of the image the checkbox selects.
fn widget_source(placement: &CheckboxPlacement) -> String {
    let state = if placement.checked { ON_STATE } else { "Off" };
    format!(
        "<< /Type /Annot /Subtype /Widget /FT /Btn /F 4 /T ({name}) /V /{state} /AS /{state} \
         /Rect [{} {} {} {}] /MK << /BC [0 0 0] >> >>",
        placement.rect[0],
        placement.rect[1],
        placement.rect[2],
        placement.rect[3],
        name = escape_pdf_string(&placement.field_name),
        state = state,
    )
}

fn appearance_stream(qpdf: &QPdf, placement: &CheckboxPlacement, checked: bool) -> Result<QPdfStream> {
    let bbox = qpdf
        .parse_object(&format!(
            "[0 0 {:.2} {:.2}]",
            placement.width(),
            placement.height()
        ))
        .map_err(map_qpdf_error)?;
    let content = appearance_content(placement.width(), placement.height(), checked);
    let stream = qpdf.new_stream_with_dictionary(
        [
            ("/Type", qpdf.new_name("/XObject")),
            ("/Subtype", qpdf.new_name("/Form")),
            ("/BBox", bbox),
        ],
        content.as_bytes(),
    );
    Ok(stream.into_indirect().into())
}

impl QpdfWrapper {
    /// Attach checkbox widgets to a PDF
    ///
    /// # Arguments
    /// * `input_data` - Raw PDF bytes
    /// * `placements` - Checkboxes to add, each naming its target page
    ///
    /// # Returns
    /// The PDF with the widgets registered on their pages and in the AcroForm
    pub fn add_checkboxes(input_data: &[u8], placements: &[CheckboxPlacement]) -> Result<Vec<u8>> {
        if placements.is_empty() {
            return Ok(input_data.to_vec());
        }

        let qpdf = open_qpdf(input_data)?;
        let num_pages = qpdf.get_num_pages().map_err(map_qpdf_error)?;

        let root = qpdf.get_root().ok_or_else(|| Error::QpdfError {
            reason: "Document has no catalog".to_string(),
        })?;

        let acroform: QPdfDictionary = match root.get("/AcroForm") {
            Some(existing) => existing.into(),
            None => {
                let created: QPdfDictionary = qpdf
                    .parse_object("<< /Fields [ ] >>")
                    .map_err(map_qpdf_error)?
                    .into();
                created.into_indirect().into()
            }
        };
        let fields: QPdfArray = match acroform.get("/Fields") {
            Some(existing) => existing.into(),
            None => qpdf.new_array(),
        };

        for placement in placements {
            let page_index = placement.page as u32;
            let page: QPdfDictionary = qpdf
                .get_page(page_index)
                .ok_or(Error::PageOutOfBounds {
                    page: placement.page,
                    total: num_pages as usize,
                })?
                .into();

            let widget: QPdfDictionary = qpdf
                .parse_object(&widget_source(placement))
                .map_err(map_qpdf_error)?
                .into();

            let normal = qpdf.new_dictionary();
            normal.set(&format!("/{}", ON_STATE), &appearance_stream(&qpdf, placement, true)?);
            normal.set("/Off", &appearance_stream(&qpdf, placement, false)?);
            let appearance = qpdf.new_dictionary();
            appearance.set("/N", &normal);
            widget.set("/AP", &appearance);
            widget.set("/P", &page);

            let widget = widget.into_indirect();

            let annots: QPdfArray = match page.get("/Annots") {
                Some(existing) => existing.into(),
                None => qpdf.new_array(),
            };
            annots.push(&widget);
            page.set("/Annots", &annots);
            fields.push(&widget);

            tracing::debug!(
                page = placement.page,
                field = %placement.field_name,
                "Attached checkbox widget"
            );
        }

        acroform.set("/Fields", &fields);
        acroform.set("/NeedAppearances", &qpdf.new_bool(true));
        root.set("/AcroForm", &acroform);

        let mut writer = qpdf.writer();
        writer.preserve_encryption(false);
        writer.write_to_memory().map_err(map_qpdf_error)
    }
}
