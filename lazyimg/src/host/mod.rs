//! Host UI runtime abstraction.
//!
//! The lifecycle engine never touches a real DOM. Everything it needs from the
//! surrounding UI framework is expressed by the traits in this module, so any
//! runtime (a browser binding, a native toolkit, the in-memory
//! [`SimulatedPage`]) can drive it.
//!
//! # Threading
//!
//! The model is single-threaded and cooperative: listeners, frame callbacks
//! and post-layout tasks are plain `Rc`/`Box` closures invoked from the host's
//! event loop, and load futures are spawned onto a local executor via
//! [`Host::spawn_local`]. Nothing here is `Send`.

pub mod sim;

use std::fmt;
use std::rc::Rc;

use futures::future::LocalBoxFuture;

use crate::geometry::{ClientRect, ViewportMetrics};
use crate::lifecycle::Presentation;

pub use sim::{SimulatedContext, SimulatedElement, SimulatedPage};

/// Callback registered for scroll/resize notifications.
pub type Listener = Rc<dyn Fn()>;

/// Callback run on the next rendering frame.
pub type FrameCallback = Box<dyn FnOnce()>;

/// One-shot task run after the initial layout pass.
pub type LayoutTask = Box<dyn FnOnce()>;

/// Event kinds the engine listens for on an observation context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    Scroll,
    Resize,
}

impl ListenerKind {
    /// Get the DOM event name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ListenerKind::Scroll => "scroll",
            ListenerKind::Resize => "resize",
        }
    }
}

impl fmt::Display for ListenerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Token identifying one listener registration on a context.
///
/// Returned by [`ObservationContext::add_listener`] and handed back to
/// [`ObservationContext::remove_listener`], so removal always targets the exact
/// registration that was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(u64);

impl ListenerHandle {
    /// Wrap a context-assigned registration id.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw registration id.
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// A scrollable container (or the global viewport) that emits scroll and
/// resize notifications.
pub trait ObservationContext {
    /// Register `listener` for `kind` events.
    fn add_listener(&self, kind: ListenerKind, listener: Listener) -> ListenerHandle;

    /// Remove a registration. Unknown handles are ignored.
    fn remove_listener(&self, handle: ListenerHandle);
}

/// Lazily resolved observation context.
pub type ContextProvider = Rc<dyn Fn() -> Option<Rc<dyn ObservationContext>>>;

/// Where scroll/resize listeners are registered.
#[derive(Clone, Default)]
pub enum ContextSource {
    /// The host's global viewport.
    #[default]
    Viewport,

    /// A specific scrollable container.
    Container(Rc<dyn ObservationContext>),

    /// A function returning the container, called once per bind. `None`
    /// falls back to the viewport.
    Provider(ContextProvider),
}

impl ContextSource {
    /// Resolve to a concrete context.
    pub fn resolve(&self, host: &dyn Host) -> Rc<dyn ObservationContext> {
        match self {
            ContextSource::Viewport => host.viewport(),
            ContextSource::Container(context) => Rc::clone(context),
            ContextSource::Provider(provider) => match provider() {
                Some(context) => context,
                None => {
                    tracing::debug!("Context provider returned nothing, using viewport");
                    host.viewport()
                }
            },
        }
    }
}

impl fmt::Debug for ContextSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextSource::Viewport => write!(f, "Viewport"),
            ContextSource::Container(_) => write!(f, "Container(..)"),
            ContextSource::Provider(_) => write!(f, "Provider(..)"),
        }
    }
}

/// Kind of the tracked child element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementKind {
    /// An image-bearing element (`img`).
    Image,
    /// Anything else, by tag name.
    Other(String),
}

impl ElementKind {
    /// Whether this is the expected image-bearing kind.
    pub fn is_image(&self) -> bool {
        matches!(self, ElementKind::Image)
    }

    /// Tag name of the element.
    pub fn name(&self) -> &str {
        match self {
            ElementKind::Image => "img",
            ElementKind::Other(name) => name,
        }
    }

    /// Parse a tag name; `img` (any case) is [`ElementKind::Image`].
    pub fn from_tag(tag: &str) -> Self {
        if tag.eq_ignore_ascii_case("img") {
            ElementKind::Image
        } else {
            ElementKind::Other(tag.to_string())
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The host element whose visibility is being tracked.
pub trait TrackedElement {
    /// What kind of element this is.
    fn kind(&self) -> ElementKind;

    /// URL of the real resource, if the element carries one.
    fn source(&self) -> Option<String>;

    /// Current viewport-relative bounding box, or `None` if not laid out.
    ///
    /// Read fresh on every visibility check.
    fn bounding_rect(&self) -> Option<ClientRect>;

    /// Render the given source/opacity pair.
    fn present(&self, presentation: &Presentation);
}

/// The UI runtime hosting tracked elements.
pub trait Host {
    /// The global viewport, used when no container is configured.
    fn viewport(&self) -> Rc<dyn ObservationContext>;

    /// Current scroll offset and height of the global viewport.
    fn metrics(&self) -> ViewportMetrics;

    /// Run `callback` on the next rendering frame.
    ///
    /// Frame callbacks are not assumed to be cancellable; owners guard them.
    fn request_frame(&self, callback: FrameCallback);

    /// Run `task` once after the initial layout pass completes.
    fn after_layout(&self, task: LayoutTask);

    /// Drive `future` to completion on the host's local executor.
    fn spawn_local(&self, future: LocalBoxFuture<'static, ()>);
}
