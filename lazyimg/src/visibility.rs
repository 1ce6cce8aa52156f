//! In-view detection for tracked elements.
//!
//! The test is an overlap between the visible window
//! `[scroll_offset, scroll_offset + viewport_height]` (closed) and the element
//! span `[top, top + height)` (bottom edge open):
//!
//! ```text
//!   scroll_offset ─────────┬───────────  top + height > scroll_offset
//!                          │  window
//!   scroll_offset + vh ────┴───────────  top <= scroll_offset + vh
//! ```
//!
//! # Degenerate geometry
//!
//! A document-relative `top` of exactly `0.0` is always in view. This covers
//! elements at the very top of the page and elements that have not been laid
//! out yet (zero rect, no scroll). The rule fails open: the two cases cannot
//! be told apart from geometry alone, so an unlaid element at scroll offset
//! zero is loaded immediately. This is a known imprecision kept for
//! compatibility.

use crate::geometry::GeometrySnapshot;

/// Whether the element described by `snapshot` intersects the visible window.
pub fn is_in_view(snapshot: &GeometrySnapshot) -> bool {
    is_in_view_at(
        snapshot.top,
        snapshot.height,
        snapshot.scroll_offset,
        snapshot.viewport_height,
    )
}

/// Raw form of [`is_in_view`].
///
/// # Arguments
///
/// * `top` - Document-relative top of the element
/// * `height` - Element height (may be zero)
/// * `scroll_offset` - Current vertical scroll offset
/// * `viewport_height` - Height of the visible window
pub fn is_in_view_at(top: f64, height: f64, scroll_offset: f64, viewport_height: f64) -> bool {
    if top == 0.0 {
        return true;
    }

    top <= scroll_offset + viewport_height && top + height > scroll_offset
}
