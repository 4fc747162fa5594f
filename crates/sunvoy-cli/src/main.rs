//! sunvoy - log in to the Sunvoy challenge site and dump its users to JSON.
//!
//! Reuses the session cookie saved by a previous run when the site still
//! accepts it, otherwise logs in with `EMAIL` / `PASSWORD` and saves the new
//! session. Any login failure exits non-zero without writing output.

use std::io;
use std::path::Path;

use anyhow::{anyhow, Result};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sunvoy_core::api::build_http_client;
use sunvoy_core::render::{ChromiumRenderer, HttpRenderer};
use sunvoy_core::{pipeline, Config, Renderer, RendererKind};

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr and, when `log_file` is set, to that file as well. The
/// returned guard flushes the file writer on drop.
fn init_tracing(log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| anyhow!("SUNVOY_LOG_FILE has no file name: {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    Ok(guard)
}

fn build_renderer(config: &Config, client: &reqwest::Client) -> Box<dyn Renderer> {
    match config.renderer {
        RendererKind::Chromium => Box::new(ChromiumRenderer::new(config.chrome_path.clone())),
        RendererKind::Http => Box::new(HttpRenderer::new(client.clone())),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;

    // Held until exit so buffered file logs are flushed
    let _log_guard = init_tracing(config.log_file.as_deref())?;
    info!("sunvoy starting");

    let client = build_http_client()?;
    let renderer = build_renderer(&config, &client);
    pipeline::run(&config, client, renderer.as_ref()).await?;

    info!("sunvoy finished");
    Ok(())
}
