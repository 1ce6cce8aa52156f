//! Lifecycle states, render output and diagnostics.

use std::fmt;

/// Per-element lifecycle state.
///
/// ```text
///            bind                 in view                 loaded
///  Unbound ───────► Placeholder ───────────► VisibleLoading ───────► VisibleLoaded
///                    ▲  │  ▲ scroll/resize         │
///                    │  └──┘ (not in view)         │ errored
///                    │                             └──────────────► VisibleErrored
///                    └── element identity change (new binding)
///
///  any state ── dispose ──► Disposed
/// ```
///
/// Within one binding the state never returns to `Placeholder` once it has
/// left it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// Created but not yet bound to an observation context.
    Unbound,
    /// Bound and observing; the placeholder is shown.
    Placeholder,
    /// Became visible; the load is in flight.
    VisibleLoading,
    /// The real resource loaded.
    VisibleLoaded,
    /// The real resource failed to load.
    VisibleErrored,
    /// Unmounted. Late callbacks are discarded.
    Disposed,
}

impl LifecycleState {
    /// Get a short description for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Unbound => "unbound",
            LifecycleState::Placeholder => "placeholder",
            LifecycleState::VisibleLoading => "loading",
            LifecycleState::VisibleLoaded => "loaded",
            LifecycleState::VisibleErrored => "errored",
            LifecycleState::Disposed => "disposed",
        }
    }

    /// Whether the element has been revealed (in view at least once).
    pub fn is_visible(&self) -> bool {
        matches!(
            self,
            LifecycleState::VisibleLoading
                | LifecycleState::VisibleLoaded
                | LifecycleState::VisibleErrored
        )
    }

    /// Whether no further transition can happen without a rebind.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LifecycleState::VisibleLoaded
                | LifecycleState::VisibleErrored
                | LifecycleState::Disposed
        )
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What the host should render for the tracked element.
#[derive(Debug, Clone, PartialEq)]
pub struct Presentation {
    /// Image source to display, or `None` for nothing.
    pub source: Option<String>,
    /// Opacity in `0.0..=1.0`.
    pub opacity: f32,
}

impl Presentation {
    /// Output while waiting to become visible: the placeholder at full
    /// opacity, or nothing at all (transparent) if there is no placeholder.
    pub fn placeholder(placeholder: Option<&str>) -> Self {
        Self {
            source: placeholder.map(str::to_string),
            opacity: if placeholder.is_some() { 1.0 } else { 0.0 },
        }
    }

    /// Output once revealed: `source` at full opacity.
    pub fn revealed(source: Option<&str>) -> Self {
        Self {
            source: source.map(str::to_string),
            opacity: 1.0,
        }
    }

    /// Whether anything is visible.
    pub fn is_opaque(&self) -> bool {
        self.opacity > 0.0
    }
}

impl fmt::Display for Presentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} @ {:.1}",
            self.source.as_deref().unwrap_or("(none)"),
            self.opacity
        )
    }
}

/// Non-fatal problems recorded by a controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The tracked child is not an image-bearing element.
    UnsupportedElement { kind: String },
    /// The real resource failed to load.
    LoadFailed { source: String, reason: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnsupportedElement { kind } => {
                write!(f, "Lazy image only accepts one img child, got <{}>", kind)
            }
            Diagnostic::LoadFailed { source, reason } => {
                write!(f, "Can't load image: {} ({})", source, reason)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_classification() {
        assert!(!LifecycleState::Placeholder.is_visible());
        assert!(LifecycleState::VisibleLoading.is_visible());
        assert!(!LifecycleState::VisibleLoading.is_terminal());
        assert!(LifecycleState::VisibleErrored.is_terminal());
        assert!(LifecycleState::Disposed.is_terminal());
        assert!(!LifecycleState::Disposed.is_visible());
    }

    #[test]
    fn test_state_display() {
        assert_eq!(LifecycleState::VisibleLoaded.to_string(), "loaded");
        assert_eq!(LifecycleState::Unbound.to_string(), "unbound");
    }

    #[test]
    fn test_placeholder_presentation() {
        let with = Presentation::placeholder(Some("blur.jpg"));
        assert_eq!(with.source.as_deref(), Some("blur.jpg"));
        assert_eq!(with.opacity, 1.0);

        let without = Presentation::placeholder(None);
        assert_eq!(without.source, None);
        assert_eq!(without.opacity, 0.0);
        assert!(!without.is_opaque());
    }

    #[test]
    fn test_revealed_presentation() {
        let revealed = Presentation::revealed(Some("photo.jpg"));
        assert_eq!(revealed.source.as_deref(), Some("photo.jpg"));
        assert_eq!(revealed.opacity, 1.0);
        assert_eq!(revealed.to_string(), "photo.jpg @ 1.0");
    }

    #[test]
    fn test_diagnostic_display_names_url() {
        let diagnostic = Diagnostic::LoadFailed {
            source: "https://cdn.example.com/a.png".to_string(),
            reason: "HTTP 404".to_string(),
        };
        assert!(diagnostic
            .to_string()
            .contains("https://cdn.example.com/a.png"));
    }
}
