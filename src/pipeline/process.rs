//! Name redaction, photo extraction and checkbox annotation for a whole document

use super::checkbox::annotate;
use super::classify::ClassifierThresholds;
use super::images::extract_images;
use super::pairing::{non_empty_lines, pair_lines};
use super::redact::Redactor;
use super::{ImageRecord, ProcessOutcome};
use crate::config::RedactionConfig;
use crate::error::{Error, Result};
use crate::pdf::PdfEngine;
use std::path::Path;

/// Runs every page of an uploaded document through redaction, extraction and annotation
#[derive(Debug, Clone)]
pub struct PagePipeline {
    redactor: Redactor,
    thresholds: ClassifierThresholds,
}

impl PagePipeline {
    pub fn new(config: &RedactionConfig) -> Result<Self> {
        Ok(Self {
            redactor: Redactor::new(config)?,
            thresholds: config.thresholds(),
        })
    }

    /// Process `input` into `output`, writing thumbnails into `thumbnails`
    pub fn run<E: PdfEngine>(
        &self,
        engine: &E,
        input: &Path,
        output: &Path,
        thumbnails: &Path,
    ) -> Result<ProcessOutcome> {
        if input == output {
            return Err(Error::PathAccessDenied {
                path: output.display().to_string(),
            });
        }

        let records = engine.with_document(input, |doc| {
            let mut records = Vec::new();

            for page in 0..doc.page_count() {
                let names = self.redactor.redact_page(doc, page)?;
                let mut images = extract_images(doc, page, &names, thumbnails, &self.thresholds)?;
                let lines = non_empty_lines(&doc.page_text(page)?);
                pair_lines(&mut images, &lines);

                for (index, image) in images.iter().enumerate() {
                    annotate(doc, page, index, &image.bbox)?;
                }

                tracing::debug!(
                    page,
                    names = names.len(),
                    images = images.len(),
                    lines = lines.len(),
                    "Processed page"
                );
                records.extend(
                    images
                        .into_iter()
                        .map(|image| ImageRecord::from_extracted(page, image)),
                );
            }

            doc.save(output)?;
            Ok(records)
        })?;

        tracing::info!(
            input = %input.display(),
            output = %output.display(),
            images = records.len(),
            "Processed document"
        );

        Ok(ProcessOutcome {
            output_path: output.to_path_buf(),
            records,
        })
    }
}
