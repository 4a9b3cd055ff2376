/*
 * preview/surface.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Output surface abstraction.
 */

use super::events::EventSink;
use crate::error::PreviewError;
use crate::transform::PreviewOutput;

/// Where preview output is displayed.
///
/// Only the controller writes to a surface, and every write replaces the
/// previous content entirely.
pub trait OutputSurface: Send {
    /// Replace the displayed content.
    fn set_content(&mut self, output: &PreviewOutput);

    /// Bring the surface to the front.
    fn reveal(&mut self);
}

/// Creates output surfaces on demand.
pub trait SurfaceProvider: Send {
    /// Create a surface. The surface reports user messages and its own
    /// closing through `sink`.
    fn create(&mut self, sink: EventSink) -> Result<Box<dyn OutputSurface>, PreviewError>;
}
