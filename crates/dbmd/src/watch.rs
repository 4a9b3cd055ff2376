//! Filesystem watching for document changes
//!
//! Provides the preview controller's document-change events: a debounced
//! watcher on the previewed document's directory reports modified markdown
//! files. The watcher only runs while a preview session holds its
//! subscription.

use std::path::{Path, PathBuf};
use std::time::Duration;

use dbmd_core::{
    EventSink, EventSource, PreviewError, PreviewEvent, Subscription, is_markdown_path,
};
use notify::RecursiveMode;
use notify_debouncer_mini::{DebouncedEvent, new_debouncer};
use tracing::{debug, info, warn};

/// Debounce for raw filesystem events (in milliseconds).
///
/// Editors often write a file in several steps; this merges them into one
/// event. The controller applies its own, longer quiet window on top.
const WATCH_DEBOUNCE_MS: u64 = 100;

/// Watches a directory for changes to markdown files.
#[derive(Debug, Clone)]
pub struct DocumentWatcher {
    root: PathBuf,
    debounce: Duration,
}

impl DocumentWatcher {
    /// Create a watcher for the markdown files in `root`.
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            debounce: Duration::from_millis(WATCH_DEBOUNCE_MS),
        }
    }

    #[cfg(test)]
    fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

impl EventSource for DocumentWatcher {
    fn name(&self) -> &str {
        "filesystem"
    }

    fn subscribe(&mut self, sink: EventSink) -> Result<Subscription, PreviewError> {
        let subscribe_error = |message: String| PreviewError::Subscribe {
            source_name: "filesystem".to_string(),
            message,
        };

        let mut debouncer = new_debouncer(
            self.debounce,
            move |res: Result<Vec<DebouncedEvent>, notify::Error>| match res {
                Ok(events) => {
                    for event in events {
                        if is_markdown_path(&event.path) {
                            debug!(path = %event.path.display(), "Document change detected");
                            if !sink.send(PreviewEvent::DocumentChanged(event.path)) {
                                debug!("Preview controller stopped, dropping watch events");
                                break;
                            }
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Filesystem watch error");
                }
            },
        )
        .map_err(|e| subscribe_error(format!("failed to create filesystem watcher: {e}")))?;

        debouncer
            .watcher()
            .watch(&self.root, RecursiveMode::NonRecursive)
            .map_err(|e| subscribe_error(format!("failed to watch {}: {e}", self.root.display())))?;

        info!(
            path = %self.root.display(),
            debounce_ms = self.debounce.as_millis() as u64,
            "Started filesystem watcher"
        );

        let root = self.root.clone();
        Ok(Subscription::new("filesystem", move || {
            drop(debouncer);
            info!(path = %root.display(), "Stopped filesystem watcher");
        }))
    }
}
