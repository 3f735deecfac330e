//! Document processing pipelines
//!
//! [`PagePipeline`] rewrites names, extracts profile photos and adds a
//! checkbox above each one. [`RemovalPipeline`] takes a document whose
//! checkboxes have been ticked and whites out the selected photos and the
//! caption text beneath them.

pub mod checkbox;
pub mod classify;
pub mod images;
pub mod names;
pub mod pairing;
pub mod process;
pub mod redact;
pub mod removal;

pub use classify::{is_circular, ClassifierThresholds};
pub use images::ExtractedImage;
pub use names::{NameMatch, NameMatcher};
pub use process::PagePipeline;
pub use redact::Redactor;
pub use removal::RemovalPipeline;

use crate::geometry::Rect;
use serde::Serialize;
use std::path::PathBuf;

/// One extracted profile photo
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageRecord {
    /// Page index (0-based)
    pub page: usize,
    #[serde(flatten)]
    pub bbox: Rect,
    pub image_path: PathBuf,
    pub image_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_below: Option<String>,
}

impl ImageRecord {
    fn from_extracted(page: usize, image: ExtractedImage) -> Self {
        Self {
            page,
            bbox: image.bbox,
            image_path: image.image_path,
            image_name: image.image_name,
            text_below: image.text_below,
        }
    }
}

/// Result of [`PagePipeline::run`]
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessOutcome {
    pub output_path: PathBuf,
    /// Records in page order, then image order within a page
    pub records: Vec<ImageRecord>,
}

/// Result of [`RemovalPipeline::run`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemovalOutcome {
    pub output_path: PathBuf,
    pub pages_modified: usize,
    pub images_removed: usize,
    pub text_bands_removed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_record_serializes_flat_bbox() {
        let record = ImageRecord {
            page: 0,
            bbox: Rect::new(1.0, 2.0, 3.0, 4.0),
            image_path: PathBuf::from("uploads/John Doe.png"),
            image_name: "John Doe".to_string(),
            text_below: None,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "page": 0,
                "x0": 1.0,
                "y0": 2.0,
                "x1": 3.0,
                "y1": 4.0,
                "image_path": "uploads/John Doe.png",
                "image_name": "John Doe",
            })
        );
    }
}
