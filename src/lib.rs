//! PDF Redaction Server Library
//!
//! This crate provides a web service for preparing staff directories:
//! - `POST /upload`: rewrite `Last, First` names, erase a suppression word,
//!   extract profile photos as thumbnails and put a checkbox above each one
//! - `POST /remove_upload`: white out every photo whose checkbox is ticked,
//!   together with the caption beneath it
//!
//! Documents are handled through the [`pdf::PdfEngine`] trait; the PDFium
//! engine is used in production and an in-memory engine in tests.

pub mod config;
pub mod error;
pub mod geometry;
pub mod pdf;
pub mod pipeline;
pub mod server;
pub mod storage;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use pipeline::{ImageRecord, PagePipeline, ProcessOutcome, RemovalOutcome, RemovalPipeline};
pub use server::{router, run_server, AppState};
