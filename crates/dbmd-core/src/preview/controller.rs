/*
 * preview/controller.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * The preview controller: session lifecycle and event loop.
 */

//! The preview controller.
//!
//! The controller owns at most one [`PreviewSession`]. All events arrive on
//! a single queue and are handled one at a time, so transformations never
//! overlap and a slower, older cycle can never overwrite a newer result.
//!
//! Document and editor changes are debounced: each one pushes the deadline
//! out by the quiet window, and only the last change in a burst triggers a
//! transformation. Explicit requests (the preview action, the surface's
//! refresh control) run immediately.

use std::ops::ControlFlow;
use std::path::Path;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::events::{EventSink, EventSource, PreviewEvent, SurfaceMessage};
use super::session::PreviewSession;
use super::surface::SurfaceProvider;
use super::tracker::DocumentTracker;
use crate::document::{Document, is_markdown_path};
use crate::error::{DocumentError, PreviewError};
use crate::transform::{DocumentTransformer, PreviewOutput};

pub struct PreviewController {
    transformer: DocumentTransformer,
    provider: Box<dyn SurfaceProvider>,
    sources: Vec<Box<dyn EventSource>>,
    tracker: DocumentTracker,
    session: Option<PreviewSession>,
    debounce: Duration,
    /// Deadline of the pending debounced transformation, if any.
    pending: Option<Instant>,
    sink: EventSink,
    events: mpsc::UnboundedReceiver<PreviewEvent>,
}

impl PreviewController {
    /// Create a controller. The debounce window comes from the
    /// transformer's settings.
    pub fn new(transformer: DocumentTransformer, provider: Box<dyn SurfaceProvider>) -> Self {
        let (tx, events) = mpsc::unbounded_channel();
        let debounce = Duration::from_millis(transformer.settings().debounce_ms);
        Self {
            transformer,
            provider,
            sources: Vec::new(),
            tracker: DocumentTracker::new(),
            session: None,
            debounce,
            pending: None,
            sink: EventSink::new(tx),
            events,
        }
    }

    /// Share an existing tracker (e.g. with an inline render hook).
    pub fn with_tracker(mut self, tracker: DocumentTracker) -> Self {
        self.tracker = tracker;
        self
    }

    /// Add a source to subscribe to whenever a session opens.
    pub fn add_source(&mut self, source: Box<dyn EventSource>) {
        self.sources.push(source);
    }

    /// Handle for queueing events from outside the controller.
    pub fn sink(&self) -> EventSink {
        self.sink.clone()
    }

    pub fn tracker(&self) -> DocumentTracker {
        self.tracker.clone()
    }

    pub fn session(&self) -> Option<&PreviewSession> {
        self.session.as_ref()
    }

    /// Show a preview of `path`.
    ///
    /// Opens a surface on first use; afterwards the existing surface is
    /// revealed and retargeted rather than duplicated.
    pub async fn request_preview(&mut self, path: &Path) -> Result<(), PreviewError> {
        if !is_markdown_path(path) {
            return Err(PreviewError::NotMarkdown(path.to_path_buf()));
        }
        self.tracker.record_active(path);

        match self.session.as_mut() {
            Some(session) => {
                debug!(path = %path.display(), "Reusing preview surface");
                session.surface().reveal();
                session.set_active_document(path.to_path_buf());
            }
            None => {
                let session = self.open_session(path)?;
                self.session = Some(session);
            }
        }

        self.pending = None;
        self.update().await;
        Ok(())
    }

    /// Process events until shutdown or until every sink is dropped.
    pub async fn run(mut self) {
        info!(debounce_ms = self.debounce.as_millis() as u64, "Preview controller started");
        loop {
            let deadline = self.pending;
            tokio::select! {
                event = self.events.recv() => {
                    let Some(event) = event else { break };
                    if self.handle(event).await.is_break() {
                        break;
                    }
                }
                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.pending = None;
                    self.update().await;
                }
            }
        }
        self.close_session();
        info!("Preview controller stopped");
    }

    async fn handle(&mut self, event: PreviewEvent) -> ControlFlow<()> {
        debug!(?event, "Preview event");
        match event {
            PreviewEvent::PreviewRequested(path) => {
                if let Err(e) = self.request_preview(&path).await {
                    warn!(path = %path.display(), error = %e, "Preview request rejected");
                }
            }
            PreviewEvent::DocumentChanged(path) => {
                let relevant = self
                    .session
                    .as_ref()
                    .is_some_and(|s| same_document(s.active_document(), &path));
                if relevant {
                    self.schedule();
                }
            }
            PreviewEvent::ActiveDocumentChanged(path) => {
                self.tracker.record_active(&path);
                if !is_markdown_path(&path) {
                    debug!(path = %path.display(), "Ignoring non-markdown document");
                    return ControlFlow::Continue(());
                }
                if let Some(session) = self.session.as_mut() {
                    if !same_document(session.active_document(), &path) {
                        session.set_active_document(path);
                        self.schedule();
                    }
                }
            }
            PreviewEvent::Surface(SurfaceMessage::Refresh) => {
                self.pending = None;
                self.update().await;
            }
            PreviewEvent::SurfaceClosed => self.close_session(),
            PreviewEvent::Shutdown => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    fn open_session(&mut self, path: &Path) -> Result<PreviewSession, PreviewError> {
        info!(path = %path.display(), "Opening preview session");
        let surface = self.provider.create(self.sink.clone())?;

        // Dropping already-made subscriptions on failure releases them
        let mut subscriptions = Vec::with_capacity(self.sources.len());
        for source in &mut self.sources {
            debug!(source = source.name(), "Subscribing to event source");
            let subscription = source.subscribe(self.sink.clone()).inspect_err(|e| {
                warn!(source = source.name(), error = %e, "Event source refused subscription");
            })?;
            subscriptions.push(subscription);
        }

        Ok(PreviewSession::new(path.to_path_buf(), surface, subscriptions))
    }

    fn close_session(&mut self) {
        self.pending = None;
        if let Some(session) = self.session.take() {
            session.dispose();
        }
    }

    /// Restart the quiet window; earlier pending triggers are discarded.
    fn schedule(&mut self) {
        self.pending = Some(Instant::now() + self.debounce);
    }

    /// Transform the active document and push the result to the surface.
    async fn update(&mut self) {
        let Some(path) = self
            .session
            .as_ref()
            .map(|s| s.active_document().to_path_buf())
        else {
            return;
        };

        let output = match Document::load(&path) {
            Ok(document) => self.transformer.transform(&document).await,
            Err(e) => PreviewOutput::from_error(DocumentError::render(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        };

        if let Some(session) = self.session.as_mut() {
            session.surface().set_content(&output);
        }
    }
}

impl std::fmt::Debug for PreviewController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewController")
            .field("session", &self.session)
            .field("sources", &self.sources.len())
            .field("debounce", &self.debounce)
            .finish_non_exhaustive()
    }
}

fn same_document(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
