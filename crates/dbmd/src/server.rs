//! HTTP output surface
//!
//! The browser plays the part of the preview panel: the controller writes
//! into a shared slot, and the page polls for new revisions and posts
//! refresh requests back.

use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
};
use dbmd_core::page::{REFRESH_PATH, REVISION_PATH};
use dbmd_core::{
    EventSink, OutputSurface, PageMode, PreviewError, PreviewEvent, PreviewOutput,
    SurfaceMessage, SurfaceProvider, render_page,
};
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

const WAITING: &str = "<p class=\"sql-preview-empty\">Waiting for the first render...</p>\n";

#[derive(Debug, Default)]
struct SurfaceState {
    output: Option<PreviewOutput>,
    revision: u64,
}

/// The latest output, shared between the surface and the HTTP handlers.
#[derive(Debug, Clone, Default)]
pub struct SharedOutput {
    state: Arc<RwLock<SurfaceState>>,
}

impl SharedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Incremented on every content update.
    pub fn revision(&self) -> u64 {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .revision
    }

    fn page(&self) -> String {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let mode = PageMode::Live {
            revision: state.revision,
        };
        match &state.output {
            Some(output) => render_page(output, mode),
            None => render_page(
                &PreviewOutput {
                    error: None,
                    content: WAITING.to_string(),
                },
                mode,
            ),
        }
    }

    fn replace(&self, output: &PreviewOutput) -> u64 {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.output = Some(output.clone());
        state.revision += 1;
        state.revision
    }
}

/// Output surface served over HTTP.
#[derive(Debug)]
pub struct HttpSurface {
    shared: SharedOutput,
    url: String,
}

impl OutputSurface for HttpSurface {
    fn set_content(&mut self, output: &PreviewOutput) {
        let revision = self.shared.replace(output);
        debug!(revision, error = output.is_error(), "Preview content updated");
    }

    fn reveal(&mut self) {
        info!(url = %self.url, "Preview available");
    }
}

/// Hands out surfaces backed by one [`SharedOutput`].
///
/// A reopened session keeps serving at the same address, so browsers that
/// are already open pick up its content.
#[derive(Debug, Clone)]
pub struct HttpSurfaceProvider {
    shared: SharedOutput,
    url: String,
}

impl HttpSurfaceProvider {
    pub fn new(shared: SharedOutput, url: impl Into<String>) -> Self {
        Self {
            shared,
            url: url.into(),
        }
    }
}

impl SurfaceProvider for HttpSurfaceProvider {
    fn create(&mut self, _sink: EventSink) -> Result<Box<dyn OutputSurface>, PreviewError> {
        let mut surface = HttpSurface {
            shared: self.shared.clone(),
            url: self.url.clone(),
        };
        surface.reveal();
        Ok(Box::new(surface))
    }
}

#[derive(Clone)]
struct AppState {
    shared: SharedOutput,
    sink: EventSink,
}

/// Focus change reported by an editor integration
#[derive(Deserialize)]
struct FocusRequest {
    path: PathBuf,
}

async fn page(State(state): State<AppState>) -> impl IntoResponse {
    Html(state.shared.page())
}

async fn revision(State(state): State<AppState>) -> impl IntoResponse {
    state.shared.revision().to_string()
}

async fn refresh(State(state): State<AppState>) -> impl IntoResponse {
    if state.sink.send(PreviewEvent::Surface(SurfaceMessage::Refresh)) {
        StatusCode::ACCEPTED
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn focus(
    State(state): State<AppState>,
    Json(request): Json<FocusRequest>,
) -> impl IntoResponse {
    if state
        .sink
        .send(PreviewEvent::ActiveDocumentChanged(request.path))
    {
        StatusCode::ACCEPTED
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// 404 handler
async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not found")
}

/// Build the axum router
pub fn build_router(shared: SharedOutput, sink: EventSink) -> Router {
    Router::new()
        .route("/", get(page))
        .route(REVISION_PATH, get(revision))
        .route(REFRESH_PATH, post(refresh))
        .route("/focus", post(focus))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { shared, sink })
}

/// Serve the preview until `shutdown` resolves.
pub async fn run_server(
    listener: TcpListener,
    router: Router,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "Preview server listening");
    }
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}
