//! Geometry primitives read from the host at each visibility check.
//!
//! All values are CSS pixels as `f64`. A [`ClientRect`] is viewport-relative
//! (what a layout engine reports for an element's bounding box); a
//! [`GeometrySnapshot`] lifts it into document space using the current
//! scroll offset.
//!
//! Snapshots are never cached: layout can change between frames, so every
//! check builds a fresh one.

/// Viewport-relative vertical extent of an element's bounding box.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClientRect {
    /// Distance from the top of the viewport to the element's top edge.
    pub top: f64,
    /// Distance from the top of the viewport to the element's bottom edge.
    pub bottom: f64,
}

impl ClientRect {
    /// Create a rect from its top and bottom edges.
    pub fn new(top: f64, bottom: f64) -> Self {
        Self { top, bottom }
    }

    /// Create a rect from its top edge and height.
    pub fn with_height(top: f64, height: f64) -> Self {
        Self {
            top,
            bottom: top + height,
        }
    }

    /// Height of the rect (`bottom - top`).
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

/// Scroll position and size of the global viewport.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewportMetrics {
    /// Vertical scroll offset of the document.
    pub scroll_offset: f64,
    /// Height of the visible window.
    pub height: f64,
}

impl ViewportMetrics {
    /// Create viewport metrics.
    pub fn new(scroll_offset: f64, height: f64) -> Self {
        Self {
            scroll_offset,
            height,
        }
    }

    /// Document-space y coordinate of the bottom edge of the visible window.
    pub fn bottom(&self) -> f64 {
        self.scroll_offset + self.height
    }
}

/// Element geometry in document space plus the viewport it is tested against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometrySnapshot {
    /// Document-relative top of the element (`rect.top + scroll_offset`).
    pub top: f64,
    /// Height of the element.
    pub height: f64,
    /// Current vertical scroll offset.
    pub scroll_offset: f64,
    /// Height of the visible window.
    pub viewport_height: f64,
}

impl GeometrySnapshot {
    /// Build a snapshot from a viewport-relative rect and current metrics.
    ///
    /// An element without a rect (not laid out, detached) is measured as a
    /// zero-sized box at the top of the viewport, the same thing a DOM reports
    /// for a detached node.
    pub fn capture(rect: Option<ClientRect>, metrics: ViewportMetrics) -> Self {
        let rect = rect.unwrap_or_default();
        Self {
            top: rect.top + metrics.scroll_offset,
            height: rect.height(),
            scroll_offset: metrics.scroll_offset,
            viewport_height: metrics.height,
        }
    }

    /// Document-relative bottom edge of the element.
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}
