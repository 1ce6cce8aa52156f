//! lazyimg - Viewport-driven lazy image loading
//!
//! This library decides when an image element becomes visible inside a
//! scrolling viewport (or a scrollable container), shows a placeholder until
//! then, and loads the real resource exactly once when it first comes into
//! view. Scroll and resize bursts are coalesced into at most one visibility
//! check per rendering frame.
//!
//! The engine is host-agnostic: the UI runtime is reached through the traits
//! in [`host`], and [`host::SimulatedPage`] provides a deterministic in-memory
//! implementation for tests and the command-line simulator.

pub mod config;
pub mod frame;
pub mod geometry;
pub mod host;
pub mod lifecycle;
pub mod loader;
pub mod logging;
pub mod visibility;

pub use lifecycle::{Diagnostic, LazyImage, LazyImageConfig, LifecycleState, Presentation};
pub use loader::{ImageLoader, LoadError, LoadOutcome};
