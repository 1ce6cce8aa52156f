//! Lazy image lifecycle controller.
//!
//! [`LazyImage`] owns one tracked element and drives it through
//! [`LifecycleState`]: observe scroll/resize activity on the observation
//! context, check visibility at most once per frame, and on the first in-view
//! check stop observing and load the real resource exactly once.
//!
//! # Event flow
//!
//! ```text
//! scroll/resize ──► FrameScheduler ──► check_in_view ──► reveal
//!                   (1 per frame)      (fresh geometry)   │ unbind listeners
//!                                                         │ on_visible()
//!                                                         └ ImageLoader::load ──► finish
//! ```
//!
//! # Late callbacks
//!
//! Frame callbacks and load completions are never cancelled. Each one checks
//! the controller state when it runs and does nothing if the controller was
//! disposed, or (for loads) rebound to a different element since the load
//! started. Dropped callbacks are expected and not logged.
//!
//! # Re-entrancy
//!
//! Host callbacks (`on_visible`, `present`, listener registration) are always
//! invoked with no internal borrow held, so they may call back into the
//! controller.
//!
//! # Example
//!
//! ```ignore
//! use std::rc::Rc;
//! use lazyimg::host::SimulatedPage;
//! use lazyimg::lifecycle::{LazyImage, LazyImageConfig};
//! use lazyimg::loader::StaticLoader;
//!
//! let page = SimulatedPage::new(800.0);
//! let element = page.image("https://cdn.example.com/photo.jpg", 900.0, 100.0);
//! let image = LazyImage::new(
//!     page.clone(),
//!     Rc::new(StaticLoader::new()),
//!     element,
//!     LazyImageConfig::new().with_placeholder("blur.jpg"),
//! );
//!
//! image.mount();
//! page.run_after_layout();
//! page.scroll_to(200.0);
//! page.run_frame();
//! page.settle().await;
//! ```

mod binding;
mod state;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::frame::FrameScheduler;
use crate::geometry::GeometrySnapshot;
use crate::host::{ContextSource, Host, Listener, ObservationContext, TrackedElement};
use crate::loader::{ImageLoader, LoadError, LoadOutcome};
use crate::visibility::is_in_view;

use binding::Binding;

pub use state::{Diagnostic, LifecycleState, Presentation};

static NEXT_IMAGE_ID: AtomicU64 = AtomicU64::new(1);

/// Callback invoked when the element first becomes visible.
pub type VisibleCallback = Rc<dyn Fn()>;

/// Construction-time settings for a [`LazyImage`].
#[derive(Clone, Default)]
pub struct LazyImageConfig {
    /// Source shown until the element becomes visible.
    pub placeholder: Option<String>,

    /// Notified once per binding, when the element becomes visible.
    pub on_visible: Option<VisibleCallback>,

    /// Where scroll/resize listeners are registered.
    pub context: ContextSource,
}

impl LazyImageConfig {
    /// Settings with no placeholder, no callback and the global viewport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `placeholder` until the element becomes visible.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Call `callback` when the element becomes visible.
    pub fn on_visible(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_visible = Some(Rc::new(callback));
        self
    }

    /// Observe a specific context.
    pub fn with_context(mut self, context: ContextSource) -> Self {
        self.context = context;
        self
    }

    /// Observe a scrollable container.
    pub fn with_container(self, container: Rc<dyn ObservationContext>) -> Self {
        self.with_context(ContextSource::Container(container))
    }
}

impl fmt::Debug for LazyImageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyImageConfig")
            .field("placeholder", &self.placeholder)
            .field("on_visible", &self.on_visible.is_some())
            .field("context", &self.context)
            .finish()
    }
}

/// Controller for one lazily loaded element.
///
/// Dropping the controller disposes it.
pub struct LazyImage {
    shared: Rc<Shared>,
}

struct Shared {
    id: u64,
    host: Rc<dyn Host>,
    loader: Rc<dyn ImageLoader>,
    config: LazyImageConfig,
    frames: Cell<u64>,
    checks: Cell<u64>,
    loads: Cell<u64>,
    core: RefCell<Core>,
}

struct Core {
    element: Rc<dyn TrackedElement>,
    state: LifecycleState,
    binding: Option<Binding>,
    generation: u64,
    presentation: Presentation,
    diagnostics: Vec<Diagnostic>,
}

impl LazyImage {
    /// Create an unbound controller and present the placeholder.
    ///
    /// # Arguments
    ///
    /// * `host` - UI runtime providing viewport, frames and the executor
    /// * `loader` - Performs the single load of the real resource
    /// * `element` - The tracked element
    /// * `config` - Placeholder, visibility callback and observation context
    pub fn new(
        host: Rc<dyn Host>,
        loader: Rc<dyn ImageLoader>,
        element: Rc<dyn TrackedElement>,
        config: LazyImageConfig,
    ) -> Self {
        let presentation = Presentation::placeholder(config.placeholder.as_deref());
        element.present(&presentation);

        Self {
            shared: Rc::new(Shared {
                id: NEXT_IMAGE_ID.fetch_add(1, Ordering::Relaxed),
                host,
                loader,
                config,
                frames: Cell::new(0),
                checks: Cell::new(0),
                loads: Cell::new(0),
                core: RefCell::new(Core {
                    element,
                    state: LifecycleState::Unbound,
                    binding: None,
                    generation: 0,
                    presentation,
                    diagnostics: Vec::new(),
                }),
            }),
        }
    }

    /// Bind after the host's initial layout pass.
    ///
    /// Binding is deferred so the first geometry read sees real layout. If the
    /// controller was bound in the meantime (by [`update`](Self::update)) or
    /// disposed, the deferred bind does nothing.
    pub fn mount(&self) {
        let weak = Rc::downgrade(&self.shared);
        self.shared.host.after_layout(Box::new(move || {
            if let Some(shared) = weak.upgrade() {
                let unbound = shared.state() == LifecycleState::Unbound;
                if unbound {
                    shared.bind();
                }
            }
        }));
    }

    /// Replace the tracked element.
    ///
    /// If `element` is a different element than the current one, the
    /// controller resets: listeners are removed, the placeholder is shown
    /// again, and a fresh binding is made immediately. A load still in flight
    /// for the old element is discarded when it completes. Passing the same
    /// element is a no-op.
    pub fn update(&self, element: Rc<dyn TrackedElement>) {
        let previous = {
            let mut core = self.shared.core.borrow_mut();
            if core.state == LifecycleState::Disposed || Rc::ptr_eq(&core.element, &element) {
                return;
            }
            core.element = Rc::clone(&element);
            core.binding.take()
        };
        drop(previous);

        tracing::debug!(image = self.shared.id, "Tracked element changed, rebinding");
        self.shared
            .present(&element, self.shared.placeholder_presentation());
        self.shared.bind();
    }

    /// Stop observing and ignore any late frame or load callbacks.
    ///
    /// Idempotent.
    pub fn dispose(&self) {
        let binding = {
            let mut core = self.shared.core.borrow_mut();
            if core.state == LifecycleState::Disposed {
                return;
            }
            core.state = LifecycleState::Disposed;
            core.binding.take()
        };
        drop(binding);
        tracing::debug!(image = self.shared.id, "Disposed");
    }

    /// Process-unique id used in log fields.
    pub fn id(&self) -> u64 {
        self.shared.id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.shared.state()
    }

    /// What the host was last asked to render.
    pub fn presentation(&self) -> Presentation {
        self.shared.core.borrow().presentation.clone()
    }

    /// Diagnostics recorded so far, oldest first.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.shared.core.borrow().diagnostics.clone()
    }

    /// Whether scroll/resize listeners are currently registered.
    pub fn is_bound(&self) -> bool {
        self.shared.core.borrow().binding.is_some()
    }

    /// Whether [`dispose`](Self::dispose) was called.
    pub fn is_disposed(&self) -> bool {
        self.state() == LifecycleState::Disposed
    }

    /// Whether the controller reached a state it cannot leave without a rebind.
    pub fn is_settled(&self) -> bool {
        self.state().is_terminal()
    }

    /// Number of geometry checks performed.
    pub fn check_count(&self) -> u64 {
        self.shared.checks.get()
    }

    /// Number of load attempts started.
    pub fn load_count(&self) -> u64 {
        self.shared.loads.get()
    }

    /// Number of frames requested by scroll/resize activity, across bindings.
    pub fn frames_requested(&self) -> u64 {
        self.shared.frames.get()
    }

    /// Whether the current binding has a visibility check waiting for a frame.
    pub fn has_pending_check(&self) -> bool {
        self.shared
            .core
            .borrow()
            .binding
            .as_ref()
            .is_some_and(|binding| binding.scheduler().is_pending())
    }
}

impl Drop for LazyImage {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for LazyImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyImage")
            .field("id", &self.shared.id)
            .field("state", &self.state())
            .field("bound", &self.is_bound())
            .finish()
    }
}

impl Shared {
    fn state(&self) -> LifecycleState {
        self.core.borrow().state
    }

    fn placeholder_presentation(&self) -> Presentation {
        Presentation::placeholder(self.config.placeholder.as_deref())
    }

    fn present(&self, element: &Rc<dyn TrackedElement>, presentation: Presentation) {
        self.core.borrow_mut().presentation = presentation.clone();
        element.present(&presentation);
    }

    fn listener(self: &Rc<Self>, generation: u64, scheduler: Rc<FrameScheduler>) -> Listener {
        let weak = Rc::downgrade(self);
        Rc::new(move || {
            if let Some(shared) = weak.upgrade() {
                shared.on_scroll(generation, &scheduler);
            }
        })
    }

    /// Enter `Placeholder` with fresh listeners and check once immediately.
    ///
    /// The immediate check covers elements already in view, which would
    /// otherwise never see a scroll or resize event.
    fn bind(self: &Rc<Self>) {
        let (element, generation) = {
            let mut core = self.core.borrow_mut();
            if core.state == LifecycleState::Disposed {
                return;
            }
            core.generation += 1;
            core.state = LifecycleState::Placeholder;
            (Rc::clone(&core.element), core.generation)
        };

        let kind = element.kind();
        if !kind.is_image() {
            let diagnostic = Diagnostic::UnsupportedElement {
                kind: kind.name().to_string(),
            };
            tracing::error!(image = self.id, kind = %kind, "{}", diagnostic);
            self.core.borrow_mut().diagnostics.push(diagnostic);
        }

        let context = self.config.context.resolve(self.host.as_ref());
        let scheduler = FrameScheduler::new();
        let listener = self.listener(generation, Rc::clone(&scheduler));
        let binding = Binding::attach(context, scheduler, listener);
        let stale = self.core.borrow_mut().binding.replace(binding);
        drop(stale);

        tracing::debug!(image = self.id, generation, "Bound to observation context");
        self.check_in_view(generation);
    }

    /// Request a frame check on the binding's own token.
    fn on_scroll(self: &Rc<Self>, generation: u64, scheduler: &Rc<FrameScheduler>) {
        let weak = Rc::downgrade(self);
        let requested = scheduler.request_check(self.host.as_ref(), move || {
            if let Some(shared) = weak.upgrade() {
                shared.check_in_view(generation);
            }
        });
        if requested {
            self.frames.set(self.frames.get() + 1);
        }
    }

    /// Check visibility for the binding issued under `generation`.
    fn check_in_view(self: &Rc<Self>, generation: u64) {
        let element = {
            let core = self.core.borrow();
            if core.state != LifecycleState::Placeholder
                || core.binding.is_none()
                || core.generation != generation
            {
                tracing::trace!(image = self.id, generation, "Dropping stale frame check");
                return;
            }
            Rc::clone(&core.element)
        };

        self.checks.set(self.checks.get() + 1);
        let snapshot = GeometrySnapshot::capture(element.bounding_rect(), self.host.metrics());
        if is_in_view(&snapshot) {
            self.reveal(element, snapshot);
        }
    }

    /// Transition to `VisibleLoading` and start the one load for this binding.
    fn reveal(self: &Rc<Self>, element: Rc<dyn TrackedElement>, snapshot: GeometrySnapshot) {
        let (binding, generation) = {
            let mut core = self.core.borrow_mut();
            core.state = LifecycleState::VisibleLoading;
            (core.binding.take(), core.generation)
        };
        drop(binding);

        tracing::debug!(
            image = self.id,
            top = snapshot.top,
            scroll_offset = snapshot.scroll_offset,
            "Element became visible"
        );

        if let Some(on_visible) = &self.config.on_visible {
            on_visible();
        }

        // The callback may have disposed or rebound this controller
        if !self.is_loading(generation) {
            return;
        }

        let Some(source) = element.source() else {
            self.finish(generation, None, LoadOutcome::Errored(LoadError::MissingSource));
            return;
        };

        self.loads.set(self.loads.get() + 1);
        let load = self.loader.load(&source);
        let weak = Rc::downgrade(self);
        self.host.spawn_local(Box::pin(async move {
            let outcome = load.await;
            if let Some(shared) = weak.upgrade() {
                shared.finish(generation, Some(source), outcome);
            }
        }));
    }

    fn is_loading(&self, generation: u64) -> bool {
        let core = self.core.borrow();
        core.state == LifecycleState::VisibleLoading && core.generation == generation
    }

    fn finish(&self, generation: u64, source: Option<String>, outcome: LoadOutcome) {
        if !self.is_loading(generation) {
            return;
        }

        let shown = match outcome {
            LoadOutcome::Loaded(info) => {
                tracing::debug!(
                    image = self.id,
                    source = source.as_deref().unwrap_or_default(),
                    info = %info,
                    "Image loaded"
                );
                self.core.borrow_mut().state = LifecycleState::VisibleLoaded;
                source
            }
            LoadOutcome::Errored(err) => {
                let failed = source.clone().unwrap_or_default();
                tracing::warn!(
                    image = self.id,
                    source = %failed,
                    error = %err,
                    "Can't load image: {}",
                    failed
                );
                let mut core = self.core.borrow_mut();
                core.state = LifecycleState::VisibleErrored;
                core.diagnostics.push(Diagnostic::LoadFailed {
                    source: failed,
                    reason: err.to_string(),
                });
                self.config.placeholder.clone().or(source)
            }
        };

        let element = Rc::clone(&self.core.borrow().element);
        self.present(&element, Presentation::revealed(shown.as_deref()));
    }
}
