//! Extraction of profile photos into fixed-size PNG thumbnails

use super::classify::ClassifierThresholds;
use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::pdf::PdfDocument;
use crate::storage::thumbnail_file_name;
use image::imageops::FilterType;
use std::path::{Path, PathBuf};

/// Thumbnail edge length in pixels
pub const THUMBNAIL_SIZE: u32 = 100;

/// A thumbnail written for one qualifying image on a page
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedImage {
    pub bbox: Rect,
    pub image_path: PathBuf,
    pub image_name: String,
    pub text_below: Option<String>,
}

/// Name for the `index`-th (0-based) qualifying image on a page
pub fn image_name(names: &[String], index: usize) -> String {
    names
        .get(index)
        .cloned()
        .unwrap_or_else(|| format!("Unnamed_{}", index + 1))
}

/// Decode `data`, stretch it to a square thumbnail and write it as PNG
pub fn save_thumbnail(data: &[u8], page: usize, path: &Path) -> Result<()> {
    let decoded =
        image::load_from_memory(data).map_err(|source| Error::ImageDecode { page, source })?;
    decoded
        .resize_exact(THUMBNAIL_SIZE, THUMBNAIL_SIZE, FilterType::CatmullRom)
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(|source| Error::ImageEncode {
            path: path.display().to_string(),
            source,
        })
}

/// Write a thumbnail for every qualifying image on `page`, naming them after `names` in order
pub fn extract_images(
    doc: &dyn PdfDocument,
    page: usize,
    names: &[String],
    thumbnails: &Path,
    thresholds: &ClassifierThresholds,
) -> Result<Vec<ExtractedImage>> {
    let mut extracted = Vec::new();

    for image in doc.images(page)? {
        if !thresholds.matches(&image.bbox) {
            continue;
        }
        let data = doc.extract_image(page, image.reference)?;
        let name = image_name(names, extracted.len());
        let path = thumbnails.join(thumbnail_file_name(&name));
        save_thumbnail(&data, page, &path)?;

        tracing::debug!(page, name = %name, path = %path.display(), "Saved thumbnail");
        extracted.push(ExtractedImage {
            bbox: image.bbox,
            image_path: path,
            image_name: name,
            text_below: None,
        });
    }

    Ok(extracted)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::pdf::{MemoryDocument, MemoryPage};
    use pretty_assertions::assert_eq;

    /// Encoded PNG of the given size, for use as embedded image data
    pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 40, 40]));
        let mut out = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
            .unwrap();
        out
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_image_name_falls_back_to_unnamed() {
        let names = names(&["John Doe"]);
        assert_eq!(image_name(&names, 0), "John Doe");
        assert_eq!(image_name(&names, 1), "Unnamed_2");
        assert_eq!(image_name(&names, 2), "Unnamed_3");
    }

    #[test]
    fn test_extract_skips_non_square_and_resizes() {
        let dir = tempfile::tempdir().unwrap();
        let doc = MemoryDocument::new(vec![MemoryPage::new(600.0, 800.0)
            .with_image(1, Rect::new(10.0, 10.0, 210.0, 40.0), png_bytes(20, 3))
            .with_image(2, Rect::new(100.0, 100.0, 140.0, 142.0), png_bytes(64, 48))
            .with_image(3, Rect::new(300.0, 100.0, 350.0, 150.0), png_bytes(8, 8))]);

        let extracted = extract_images(
            &doc,
            0,
            &names(&["John Doe"]),
            dir.path(),
            &ClassifierThresholds::default(),
        )
        .unwrap();

        let got: Vec<&str> = extracted.iter().map(|e| e.image_name.as_str()).collect();
        assert_eq!(got, vec!["John Doe", "Unnamed_2"]);
        assert_eq!(extracted[0].bbox, Rect::new(100.0, 100.0, 140.0, 142.0));

        for image in &extracted {
            let thumb = image::open(&image.image_path).unwrap();
            assert_eq!((thumb.width(), thumb.height()), (100, 100));
        }
        assert_eq!(extracted[1].image_path, dir.path().join("Unnamed_2.png"));
    }

    #[test]
    fn test_undecodable_image_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let doc = MemoryDocument::new(vec![MemoryPage::new(600.0, 800.0).with_image(
            1,
            Rect::new(100.0, 100.0, 140.0, 140.0),
            vec![0, 1, 2, 3],
        )]);
        let result = extract_images(&doc, 0, &[], dir.path(), &ClassifierThresholds::default());
        assert!(matches!(result, Err(Error::ImageDecode { page: 0, .. })));
    }
}
