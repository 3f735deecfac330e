//! Ordinal pairing of page text lines with extracted images

use super::images::ExtractedImage;

/// Trimmed, non-empty lines of page text, in order
pub fn non_empty_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Attach line `i` to image `i`; images past the last line get nothing
pub fn pair_lines(images: &mut [ExtractedImage], lines: &[String]) {
    for (image, line) in images.iter_mut().zip(lines) {
        image.text_below = Some(line.clone());
    }
}
