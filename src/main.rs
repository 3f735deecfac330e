//! PDF Redaction Server - Entry point

use pdf_redact_server::pdf::PdfiumEngine;
use pdf_redact_server::{run_server, AppConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdf_redact_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = AppConfig::load()?;
    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        root = %config.storage.root.display(),
        "Starting PDF redaction server"
    );

    let engine = match std::env::var_os("PDFIUM_LIB_DIR") {
        Some(dir) => PdfiumEngine::with_library_dir(dir),
        None => PdfiumEngine::new(),
    };

    run_server(engine, config).await
}
