/*
 * preview/events.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Events driving the preview controller, and subscriptions to their sources.
 */

use std::fmt;
use std::path::PathBuf;

use tokio::sync::mpsc;
use tracing::debug;

use crate::error::PreviewError;

/// Messages an output surface sends back to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceMessage {
    /// The user asked for a fresh transformation.
    Refresh,
}

/// Everything the controller reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewEvent {
    /// The "preview this document" action.
    PreviewRequested(PathBuf),
    /// A document's contents changed.
    DocumentChanged(PathBuf),
    /// The user switched to another document.
    ActiveDocumentChanged(PathBuf),
    /// A message from the output surface.
    Surface(SurfaceMessage),
    /// The output surface was closed.
    SurfaceClosed,
    /// Stop the controller.
    Shutdown,
}

/// Sending side of the controller's event queue.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<PreviewEvent>,
}

impl EventSink {
    /// Wrap the sending half of an event queue.
    pub fn new(tx: mpsc::UnboundedSender<PreviewEvent>) -> Self {
        Self { tx }
    }

    /// Queue an event. Returns `false` if the controller has stopped.
    pub fn send(&self, event: PreviewEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

/// A live subscription. Disposing it (or dropping it) stops delivery.
pub struct Subscription {
    name: String,
    disposer: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(name: impl Into<String>, disposer: impl FnOnce() + Send + 'static) -> Self {
        Self {
            name: name.into(),
            disposer: Some(Box::new(disposer)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Release the subscription now.
    pub fn dispose(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(disposer) = self.disposer.take() {
            debug!(subscription = %self.name, "Releasing subscription");
            disposer();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("name", &self.name)
            .field("active", &self.disposer.is_some())
            .finish()
    }
}

/// Something that produces document or editor events.
///
/// The controller subscribes every source when a preview session starts and
/// disposes the subscriptions when the session ends.
pub trait EventSource: Send {
    fn name(&self) -> &str;

    fn subscribe(&mut self, sink: EventSink) -> Result<Subscription, PreviewError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_dispose_runs_once() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let subscription = Subscription::new("test", move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        subscription.dispose();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_disposes() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        {
            let _subscription = Subscription::new("test", move || {
                c.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_sink_reports_closed_controller() {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = EventSink::new(tx);
        assert!(sink.send(PreviewEvent::SurfaceClosed));
        drop(rx);
        assert!(!sink.send(PreviewEvent::Shutdown));
    }
}
