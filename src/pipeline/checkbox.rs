//! Checkbox placement above extracted images

use crate::error::Result;
use crate::geometry::Rect;
use crate::pdf::{CheckboxWidget, PdfDocument};

const CHECKBOX_WIDTH: f32 = 15.0;
const CHECKBOX_HEIGHT: f32 = 20.0;

/// Box sitting on the image's top edge, aligned with its left edge
pub fn checkbox_rect(bbox: &Rect) -> Rect {
    Rect::new(
        bbox.x0,
        bbox.y0 - CHECKBOX_HEIGHT,
        bbox.x0 + CHECKBOX_WIDTH,
        bbox.y0,
    )
}

pub fn field_name(page: usize, index: usize) -> String {
    format!("checkbox_{}_{}", page, index)
}

/// Add an unchecked checkbox above the `index`-th extracted image of `page`
pub fn annotate(doc: &mut dyn PdfDocument, page: usize, index: usize, bbox: &Rect) -> Result<()> {
    doc.add_checkbox(
        page,
        CheckboxWidget {
            rect: checkbox_rect(bbox),
            field_name: field_name(page, index),
            checked: false,
        },
    )
}
