//! Error types for the PDF redaction server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Result type alias for the PDF redaction server
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the PDF redaction server
#[derive(Error, Debug)]
pub enum Error {
    /// PDF file not found
    #[error("PDF not found: {path}")]
    PdfNotFound { path: String },

    /// Stored file (thumbnail or output document) not found
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    /// Invalid PDF file
    #[error("Invalid PDF file: {reason}")]
    InvalidPdf { reason: String },

    /// Upload request carried no usable file
    #[error("No selected file")]
    MissingUpload,

    /// Malformed multipart request
    #[error("Invalid upload: {reason}")]
    InvalidUpload { reason: String },

    /// Page out of bounds
    #[error("Page {page} out of bounds (total: {total})")]
    PageOutOfBounds { page: usize, total: usize },

    /// Image reference does not exist on the page
    #[error("Image {reference} not found on page {page}")]
    ImageNotFound { page: usize, reference: u64 },

    /// Embedded image bytes could not be decoded
    #[error("Failed to decode image on page {page}: {source}")]
    ImageDecode {
        page: usize,
        #[source]
        source: image::ImageError,
    },

    /// Thumbnail could not be encoded or written
    #[error("Failed to write thumbnail {path}: {source}")]
    ImageEncode {
        path: String,
        #[source]
        source: image::ImageError,
    },

    /// Name pattern failed to compile
    #[error("Invalid name pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// PDFium error
    #[error("PDFium error: {reason}")]
    Pdfium { reason: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// qpdf error
    #[error("qpdf error: {reason}")]
    QpdfError { reason: String },

    /// Path access denied (outside the storage root)
    #[error("Path access denied: {path}")]
    PathAccessDenied { path: String },

    /// Configuration could not be loaded
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Blocking task failed to complete
    #[error("Task join error: {reason}")]
    TaskJoin { reason: String },
}

impl Error {
    /// Return a sanitized error message safe to send to clients.
    /// Internal details (paths, library errors) are omitted.
    /// Full details should be logged via tracing before calling this.
    pub fn client_message(&self) -> String {
        match self {
            Error::PdfNotFound { .. } => "PDF not found".to_string(),
            Error::FileNotFound { .. } => "File not found".to_string(),
            Error::InvalidPdf { .. } => "Invalid PDF file".to_string(),
            Error::MissingUpload => "No selected file".to_string(),
            Error::InvalidUpload { reason } => format!("Invalid upload: {}", reason),
            Error::PageOutOfBounds { page, total } => {
                format!("Page {} out of bounds (total: {})", page, total)
            }
            Error::ImageNotFound { .. } => "PDF processing error".to_string(),
            Error::ImageDecode { page, .. } => {
                format!("Failed to decode image on page {}", page)
            }
            Error::ImageEncode { .. } => "Failed to write thumbnail".to_string(),
            Error::Pattern(_) => "Internal error".to_string(),
            Error::Io(_) => "I/O error".to_string(),
            Error::Pdfium { .. } => "PDF processing error".to_string(),
            Error::Serialization(_) => "Serialization error".to_string(),
            Error::QpdfError { .. } => "PDF processing error".to_string(),
            Error::PathAccessDenied { .. } => "Access denied".to_string(),
            Error::Config { .. } => "Internal error".to_string(),
            Error::TaskJoin { .. } => "Internal error".to_string(),
        }
    }

    /// HTTP status used when this error terminates a request
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingUpload | Error::InvalidUpload { .. } => StatusCode::BAD_REQUEST,
            Error::PdfNotFound { .. } | Error::FileNotFound { .. } => StatusCode::NOT_FOUND,
            Error::PathAccessDenied { .. } => StatusCode::FORBIDDEN,
            Error::InvalidPdf { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
        }
        (status, self.client_message()).into_response()
    }
}
