/*
 * preview/session.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * State of one open preview.
 */

use std::path::{Path, PathBuf};

use tracing::info;

use super::events::Subscription;
use super::surface::OutputSurface;

/// One open preview: the document it shows, the surface showing it, and
/// the subscriptions feeding it events.
///
/// Owned by the controller. Created on the first preview request and
/// disposed when the surface closes, releasing every subscription.
pub struct PreviewSession {
    active_document: PathBuf,
    surface: Box<dyn OutputSurface>,
    subscriptions: Vec<Subscription>,
}

impl PreviewSession {
    pub fn new(
        active_document: PathBuf,
        surface: Box<dyn OutputSurface>,
        subscriptions: Vec<Subscription>,
    ) -> Self {
        Self {
            active_document,
            surface,
            subscriptions,
        }
    }

    pub fn active_document(&self) -> &Path {
        &self.active_document
    }

    pub fn set_active_document(&mut self, path: PathBuf) {
        self.active_document = path;
    }

    pub fn surface(&mut self) -> &mut dyn OutputSurface {
        self.surface.as_mut()
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Tear the session down.
    pub fn dispose(self) {
        info!(
            document = %self.active_document.display(),
            subscriptions = self.subscriptions.len(),
            "Closing preview session"
        );
        for subscription in self.subscriptions {
            subscription.dispose();
        }
    }
}

impl std::fmt::Debug for PreviewSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewSession")
            .field("active_document", &self.active_document)
            .field("subscriptions", &self.subscriptions)
            .finish_non_exhaustive()
    }
}
