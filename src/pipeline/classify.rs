//! Profile-photo classification by bounding box shape

use crate::geometry::Rect;

/// Size and squareness limits for a profile photo
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierThresholds {
    /// Both sides must be strictly larger than this
    pub min_side: f32,
    /// Width and height must differ by strictly less than this
    pub max_aspect_delta: f32,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            min_side: 30.0,
            max_aspect_delta: 5.0,
        }
    }
}

impl ClassifierThresholds {
    pub fn matches(&self, bbox: &Rect) -> bool {
        let (width, height) = (bbox.width(), bbox.height());
        width > self.min_side
            && height > self.min_side
            && (width - height).abs() < self.max_aspect_delta
    }
}

/// True for large, nearly square images
pub fn is_circular(bbox: &Rect) -> bool {
    ClassifierThresholds::default().matches(bbox)
}
