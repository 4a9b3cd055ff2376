/*
 * preview.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Preview command implementation
 */

//! Preview command implementation.
//!
//! Serves a live preview of one document. The controller runs on its own
//! task; the HTTP server is its output surface and the filesystem watcher
//! its source of change events.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use tokio::net::TcpListener;
use tracing::{info, warn};

use dbmd_core::{
    DocumentTransformer, PreviewController, PreviewError, PreviewEvent, is_markdown_path,
};

use crate::server::{HttpSurfaceProvider, SharedOutput, build_router, run_server};
use crate::watch::DocumentWatcher;

/// Arguments for the preview command
#[derive(Debug)]
pub struct PreviewArgs {
    pub file: PathBuf,
    pub host: String,
    pub port: u16,
    pub debounce_ms: Option<u64>,
    pub db_type: Option<String>,
    pub config: Option<PathBuf>,
}

/// Execute the preview command
pub async fn execute(args: PreviewArgs) -> Result<()> {
    if !is_markdown_path(&args.file) {
        bail!(PreviewError::NotMarkdown(args.file));
    }
    let file = std::path::absolute(&args.file)
        .with_context(|| format!("Failed to resolve {}", args.file.display()))?;

    let settings = super::load_settings(args.config.as_deref(), &file, args.db_type)?
        .with_debounce_ms(args.debounce_ms)
        .context("Invalid debounce window")?;

    let addr = format!("{}:{}", args.host, args.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    let url = format!("http://{addr}/");

    let shared = SharedOutput::new();
    let mut controller = PreviewController::new(
        DocumentTransformer::new(settings),
        Box::new(HttpSurfaceProvider::new(shared.clone(), url)),
    );
    let watch_root = file
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    controller.add_source(Box::new(DocumentWatcher::new(&watch_root)));

    let sink = controller.sink();
    let controller_task = tokio::spawn(controller.run());
    sink.send(PreviewEvent::PreviewRequested(file.clone()));
    info!(file = %file.display(), "Previewing");

    let router = build_router(shared, sink.clone());
    let served = run_server(listener, router, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
        info!("Shutting down");
    })
    .await;

    sink.send(PreviewEvent::SurfaceClosed);
    sink.send(PreviewEvent::Shutdown);
    controller_task
        .await
        .context("Preview controller task failed")?;

    served.context("Preview server failed")
}
