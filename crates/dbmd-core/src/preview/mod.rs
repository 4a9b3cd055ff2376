/*
 * preview/mod.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Live preview: controller, session, events and surfaces.
 */

//! Live preview.
//!
//! The [`PreviewController`] keeps one output surface up to date with the
//! active markdown document. Its collaborators are abstract so hosts can
//! plug in their own:
//!
//! - [`SurfaceProvider`] / [`OutputSurface`]: where output is shown
//! - [`EventSource`]: document and editor change notifications, held as
//!   [`Subscription`] disposer tokens for the lifetime of a session
//! - [`EventSink`]: the queue every event goes through
//!
//! The transformation itself stays a plain function of the document and
//! the settings; see [`crate::transform`].

mod controller;
mod events;
mod session;
mod surface;
mod tracker;

pub use controller::PreviewController;
pub use events::{EventSink, EventSource, PreviewEvent, Subscription, SurfaceMessage};
pub use session::PreviewSession;
pub use surface::{OutputSurface, SurfaceProvider};
pub use tracker::DocumentTracker;
