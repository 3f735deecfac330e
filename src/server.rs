//! HTTP surface
//!
//! Routes:
//! - `GET /`, `GET /remove`: upload forms
//! - `POST /upload`: redact names, extract photos, add checkboxes
//! - `POST /remove_upload`: remove photos whose checkbox is ticked
//! - `GET /uploads/{filename}`, `/download/{filename}`, `/final/{filename}`: stored documents
//! - `GET /image/{image_name}`, `/image/{session}/{image_name}`: thumbnails
//! - `GET /health`

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::pdf::PdfEngine;
use crate::pipeline::{ImageRecord, PagePipeline, RemovalPipeline};
use crate::storage::{thumbnail_file_name, Storage};
use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

const UPLOAD_FORM: &str = r#"<!DOCTYPE html>
<html>
<head><title>Upload PDF</title></head>
<body>
<h1>Upload a PDF</h1>
<form action="/upload" method="post" enctype="multipart/form-data">
  <input type="file" name="file" accept="application/pdf">
  <input type="submit" value="Process">
</form>
<p><a href="/remove">Remove selected photos from a processed PDF</a></p>
</body>
</html>
"#;

const REMOVE_FORM: &str = r#"<!DOCTYPE html>
<html>
<head><title>Remove selected photos</title></head>
<body>
<h1>Upload a PDF with ticked checkboxes</h1>
<form action="/remove_upload" method="post" enctype="multipart/form-data">
  <input type="file" name="file" accept="application/pdf">
  <input type="submit" value="Remove">
</form>
</body>
</html>
"#;

/// Shared request state
pub struct AppState<E> {
    pub engine: E,
    pub storage: Storage,
    pub config: AppConfig,
    pipeline: PagePipeline,
}

impl<E: PdfEngine> AppState<E> {
    pub fn new(engine: E, config: AppConfig) -> Result<Self> {
        Ok(Self {
            engine,
            storage: Storage::new(&config.storage)?,
            pipeline: PagePipeline::new(&config.redaction)?,
            config,
        })
    }
}

/// Build the router
pub fn router<E: PdfEngine>(state: Arc<AppState<E>>) -> Router {
    let max_body_size = state.config.server.max_upload_bytes;

    Router::new()
        .route("/", get(index_handler))
        .route(
            "/upload",
            post(upload_handler::<E>).layer(DefaultBodyLimit::max(max_body_size)),
        )
        .route("/uploads/{filename}", get(serve_pdf_handler::<E>))
        .route("/download/{filename}", get(download_handler::<E>))
        .route("/image/{image_name}", get(shared_image_handler::<E>))
        .route("/image/{session}/{image_name}", get(session_image_handler::<E>))
        .route("/remove", get(remove_form_handler))
        .route(
            "/remove_upload",
            post(remove_upload_handler::<E>).layer(DefaultBodyLimit::max(max_body_size)),
        )
        .route("/final/{filename}", get(download_handler::<E>))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the configured address and serve until the process is stopped
pub async fn run_server<E: PdfEngine>(engine: E, config: AppConfig) -> anyhow::Result<()> {
    let addr = config.server.bind_addr()?;
    let state = Arc::new(AppState::new(engine, config)?);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        root = %state.storage.root().display(),
        "PDF redaction server listening"
    );

    axum::serve(listener, router(state)).await?;
    Ok(())
}

// === Forms & health ===

async fn index_handler() -> Html<&'static str> {
    Html(UPLOAD_FORM)
}

async fn remove_form_handler() -> Html<&'static str> {
    Html(REMOVE_FORM)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// === Uploads ===

/// Read the `file` field of an upload form; returns its client filename and bytes
async fn read_upload(mut multipart: Multipart) -> Result<(String, Vec<u8>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::InvalidUpload {
            reason: e.body_text(),
        })?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        if filename.is_empty() {
            return Err(Error::MissingUpload);
        }
        let data = field.bytes().await.map_err(|e| Error::InvalidUpload {
            reason: e.body_text(),
        })?;
        return Ok((filename, data.to_vec()));
    }
    Err(Error::MissingUpload)
}

/// Run blocking document work off the async runtime
async fn run_blocking<T, F>(job: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| Error::TaskJoin {
            reason: e.to_string(),
        })?
}

/// Absolute URL path from raw segments, each percent-encoded
fn url_path(segments: &[&str]) -> String {
    segments
        .iter()
        .map(|segment| format!("/{}", urlencoding::encode(segment)))
        .collect()
}

fn image_url(session: Option<&str>, image_name: &str) -> String {
    let file = thumbnail_file_name(image_name);
    match session {
        Some(session) => url_path(&["image", session, &file]),
        None => url_path(&["image", &file]),
    }
}

#[derive(Debug, Serialize)]
struct ImageView {
    #[serde(flatten)]
    record: ImageRecord,
    image_url: String,
}

#[derive(Debug, Serialize)]
struct UploadResponse {
    pdf_url: String,
    download_url: String,
    filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    session: Option<String>,
    images: Vec<ImageView>,
}

async fn upload_handler<E: PdfEngine>(
    State(state): State<Arc<AppState<E>>>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let (client_name, data) = read_upload(multipart).await?;
    let filename = Storage::sanitize_filename(&client_name)?;
    let output_name = Storage::modified_name(&filename);
    tracing::info!(filename = %filename, bytes = data.len(), "Received upload");

    let job_state = state.clone();
    let job_output = output_name.clone();
    let (outcome, thumbnails) = run_blocking(move || {
        let storage = &job_state.storage;
        let input = storage.save_upload(&filename, &data)?;
        let output = storage.path_for(&job_output)?;
        let thumbnails = storage.new_thumbnail_dir()?;
        let outcome = job_state
            .pipeline
            .run(&job_state.engine, &input, &output, &thumbnails.path)?;
        Ok((outcome, thumbnails))
    })
    .await?;

    let session = thumbnails.session;
    let images = outcome
        .records
        .into_iter()
        .map(|record| ImageView {
            image_url: image_url(session.as_deref(), &record.image_name),
            record,
        })
        .collect();

    Ok(Json(UploadResponse {
        pdf_url: url_path(&["uploads", &output_name]),
        download_url: url_path(&["download", &output_name]),
        filename: output_name,
        session,
        images,
    }))
}

#[derive(Debug, Serialize)]
struct RemovalResponse {
    pdf_url: String,
    download_url: String,
    filename: String,
    pages_modified: usize,
    images_removed: usize,
    text_bands_removed: usize,
}

async fn remove_upload_handler<E: PdfEngine>(
    State(state): State<Arc<AppState<E>>>,
    multipart: Multipart,
) -> Result<Json<RemovalResponse>> {
    let (client_name, data) = read_upload(multipart).await?;
    let filename = Storage::sanitize_filename(&client_name)?;
    let output_name = Storage::final_name(&filename);
    tracing::info!(filename = %filename, bytes = data.len(), "Received removal upload");

    let job_state = state.clone();
    let job_output = output_name.clone();
    let outcome = run_blocking(move || {
        let storage = &job_state.storage;
        let input = storage.save_upload(&filename, &data)?;
        let output = storage.path_for(&job_output)?;
        RemovalPipeline::new().run(&job_state.engine, &input, &output)
    })
    .await?;

    Ok(Json(RemovalResponse {
        pdf_url: url_path(&["uploads", &output_name]),
        download_url: url_path(&["final", &output_name]),
        filename: output_name,
        pages_modified: outcome.pages_modified,
        images_removed: outcome.images_removed,
        text_bands_removed: outcome.text_bands_removed,
    }))
}

// === Stored files ===

fn content_type(path: &std::path::Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("json") => "application/json",
        _ => "application/octet-stream",
    }
}

async fn file_response(path: std::path::PathBuf, attachment: bool) -> Result<Response> {
    let data = tokio::fs::read(&path).await?;
    let mut headers = vec![(header::CONTENT_TYPE, content_type(&path).to_string())];
    if attachment {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().replace('"', ""))
            .unwrap_or_default();
        headers.push((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", name),
        ));
    }

    let mut response = (StatusCode::OK, data).into_response();
    for (name, value) in headers {
        let value = value.parse().map_err(|_| Error::InvalidUpload {
            reason: "file name is not a valid header value".to_string(),
        })?;
        response.headers_mut().insert(name, value);
    }
    Ok(response)
}

async fn serve_pdf_handler<E: PdfEngine>(
    State(state): State<Arc<AppState<E>>>,
    Path(filename): Path<String>,
) -> Result<Response> {
    file_response(state.storage.existing(&filename)?, false).await
}

async fn download_handler<E: PdfEngine>(
    State(state): State<Arc<AppState<E>>>,
    Path(filename): Path<String>,
) -> Result<Response> {
    file_response(state.storage.existing(&filename)?, true).await
}

async fn shared_image_handler<E: PdfEngine>(
    State(state): State<Arc<AppState<E>>>,
    Path(image_name): Path<String>,
) -> Result<Response> {
    file_response(state.storage.thumbnail(None, &image_name)?, false).await
}

async fn session_image_handler<E: PdfEngine>(
    State(state): State<Arc<AppState<E>>>,
    Path((session, image_name)): Path<(String, String)>,
) -> Result<Response> {
    file_response(state.storage.thumbnail(Some(&session), &image_name)?, false).await
}
