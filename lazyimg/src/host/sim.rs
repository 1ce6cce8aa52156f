//! Deterministic in-memory host.
//!
//! `SimulatedPage` stands in for a browser page: a global viewport with a
//! scroll offset and height, optional scrollable containers, and elements
//! positioned in document space. Nothing happens on its own; the caller steps
//! the page explicitly:
//!
//! - [`SimulatedPage::scroll_to`] / [`SimulatedPage::resize`] /
//!   [`SimulatedPage::scroll_container`] update geometry and dispatch events
//! - [`SimulatedPage::run_after_layout`] runs deferred mount tasks
//! - [`SimulatedPage::run_frame`] runs one rendering frame
//! - [`SimulatedPage::settle`] drives spawned load futures to completion
//!
//! This makes frame coalescing and late completions observable in tests and in
//! the CLI's `simulate` command.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use futures::future::{join_all, LocalBoxFuture};

use super::{
    ElementKind, FrameCallback, Host, LayoutTask, Listener, ListenerHandle, ListenerKind,
    ObservationContext, TrackedElement,
};
use crate::geometry::{ClientRect, ViewportMetrics};
use crate::lifecycle::Presentation;

/// A scrollable region that dispatches events to registered listeners.
pub struct SimulatedContext {
    name: String,
    scroll_offset: Cell<f64>,
    next_id: Cell<u64>,
    listeners: RefCell<Vec<(ListenerHandle, ListenerKind, Listener)>>,
}

impl SimulatedContext {
    /// Create an empty context.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scroll_offset: Cell::new(0.0),
            next_id: Cell::new(1),
            listeners: RefCell::new(Vec::new()),
        }
    }

    /// Name given at creation.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Own scroll offset (always zero for the viewport context, whose offset
    /// lives in the page metrics).
    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset.get()
    }

    /// Number of live registrations.
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Number of live registrations of `kind`.
    pub fn listener_count_of(&self, kind: ListenerKind) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .count()
    }

    /// Invoke every listener registered for `kind`.
    ///
    /// Listeners are snapshotted first so they may add or remove
    /// registrations while being dispatched.
    pub fn dispatch(&self, kind: ListenerKind) -> usize {
        let targets: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .map(|(_, _, listener)| Rc::clone(listener))
            .collect();

        for listener in &targets {
            listener();
        }
        targets.len()
    }
}

impl ObservationContext for SimulatedContext {
    fn add_listener(&self, kind: ListenerKind, listener: Listener) -> ListenerHandle {
        let handle = ListenerHandle::new(self.next_id.get());
        self.next_id.set(handle.id() + 1);
        self.listeners.borrow_mut().push((handle, kind, listener));
        handle
    }

    fn remove_listener(&self, handle: ListenerHandle) {
        self.listeners.borrow_mut().retain(|(h, _, _)| *h != handle);
    }
}

/// An in-memory page implementing [`Host`].
pub struct SimulatedPage {
    viewport: Rc<SimulatedContext>,
    metrics: Rc<Cell<ViewportMetrics>>,
    frames: RefCell<Vec<FrameCallback>>,
    layout_tasks: RefCell<Vec<LayoutTask>>,
    spawned: RefCell<Vec<LocalBoxFuture<'static, ()>>>,
    frames_run: Cell<u64>,
}

impl SimulatedPage {
    /// Create a page scrolled to the top with the given viewport height.
    pub fn new(viewport_height: f64) -> Rc<Self> {
        Rc::new(Self {
            viewport: Rc::new(SimulatedContext::new("viewport")),
            metrics: Rc::new(Cell::new(ViewportMetrics::new(0.0, viewport_height))),
            frames: RefCell::new(Vec::new()),
            layout_tasks: RefCell::new(Vec::new()),
            spawned: RefCell::new(Vec::new()),
            frames_run: Cell::new(0),
        })
    }

    /// The global viewport as its concrete type.
    pub fn viewport_context(&self) -> Rc<SimulatedContext> {
        Rc::clone(&self.viewport)
    }

    /// Create a scrollable container.
    pub fn container(&self, name: impl Into<String>) -> Rc<SimulatedContext> {
        Rc::new(SimulatedContext::new(name))
    }

    /// Create an `img` element at a document position.
    pub fn image(&self, source: &str, top: f64, height: f64) -> Rc<SimulatedElement> {
        self.element(ElementKind::Image, Some(source), top, height, None)
    }

    /// Create an element of any kind, optionally inside a container.
    ///
    /// Elements inside a container move up as the container scrolls.
    pub fn element(
        &self,
        kind: ElementKind,
        source: Option<&str>,
        top: f64,
        height: f64,
        container: Option<Rc<SimulatedContext>>,
    ) -> Rc<SimulatedElement> {
        Rc::new(SimulatedElement {
            kind,
            source: source.map(str::to_string),
            document_top: Cell::new(top),
            height: Cell::new(height),
            laid_out: Cell::new(true),
            container,
            metrics: Rc::clone(&self.metrics),
            presented: RefCell::new(Vec::new()),
        })
    }

    /// Scroll the document and dispatch `scroll` on the viewport.
    pub fn scroll_to(&self, offset: f64) -> usize {
        let metrics = self.metrics.get();
        self.metrics.set(ViewportMetrics::new(offset, metrics.height));
        self.viewport.dispatch(ListenerKind::Scroll)
    }

    /// Change the viewport height and dispatch `resize` on the viewport.
    pub fn resize(&self, height: f64) -> usize {
        let metrics = self.metrics.get();
        self.metrics.set(ViewportMetrics::new(metrics.scroll_offset, height));
        self.viewport.dispatch(ListenerKind::Resize)
    }

    /// Scroll a container and dispatch `scroll` on it.
    pub fn scroll_container(&self, container: &SimulatedContext, offset: f64) -> usize {
        container.scroll_offset.set(offset);
        container.dispatch(ListenerKind::Scroll)
    }

    /// Run all post-layout tasks queued so far.
    pub fn run_after_layout(&self) -> usize {
        let tasks = std::mem::take(&mut *self.layout_tasks.borrow_mut());
        let count = tasks.len();
        for task in tasks {
            task();
        }
        count
    }

    /// Run one rendering frame.
    ///
    /// Only callbacks requested before the frame started run; anything they
    /// request is deferred to the following frame.
    pub fn run_frame(&self) -> usize {
        let callbacks = std::mem::take(&mut *self.frames.borrow_mut());
        let count = callbacks.len();
        for callback in callbacks {
            callback();
        }
        self.frames_run.set(self.frames_run.get() + 1);
        count
    }

    /// Number of frame callbacks waiting for the next frame.
    pub fn pending_frames(&self) -> usize {
        self.frames.borrow().len()
    }

    /// Number of frames run so far.
    pub fn frames_run(&self) -> u64 {
        self.frames_run.get()
    }

    /// Number of spawned futures not yet driven by [`settle`](Self::settle).
    pub fn pending_tasks(&self) -> usize {
        self.spawned.borrow().len()
    }

    /// Drive every spawned future to completion, including futures spawned
    /// while settling.
    pub async fn settle(&self) {
        loop {
            let batch = std::mem::take(&mut *self.spawned.borrow_mut());
            if batch.is_empty() {
                break;
            }
            join_all(batch).await;
        }
    }

    /// Current viewport metrics.
    pub fn viewport_metrics(&self) -> ViewportMetrics {
        self.metrics.get()
    }
}

impl Host for SimulatedPage {
    fn viewport(&self) -> Rc<dyn ObservationContext> {
        self.viewport.clone()
    }

    fn metrics(&self) -> ViewportMetrics {
        self.metrics.get()
    }

    fn request_frame(&self, callback: FrameCallback) {
        self.frames.borrow_mut().push(callback);
    }

    fn after_layout(&self, task: LayoutTask) {
        self.layout_tasks.borrow_mut().push(task);
    }

    fn spawn_local(&self, future: LocalBoxFuture<'static, ()>) {
        self.spawned.borrow_mut().push(future);
    }
}

/// An element positioned in document space.
pub struct SimulatedElement {
    kind: ElementKind,
    source: Option<String>,
    document_top: Cell<f64>,
    height: Cell<f64>,
    laid_out: Cell<bool>,
    container: Option<Rc<SimulatedContext>>,
    metrics: Rc<Cell<ViewportMetrics>>,
    presented: RefCell<Vec<Presentation>>,
}

impl SimulatedElement {
    /// Move the element to a new document position.
    pub fn move_to(&self, top: f64) {
        self.document_top.set(top);
    }

    /// Change the element height.
    pub fn set_height(&self, height: f64) {
        self.height.set(height);
    }

    /// Toggle whether the element has been laid out. Unlaid elements report
    /// no bounding rect.
    pub fn set_laid_out(&self, laid_out: bool) {
        self.laid_out.set(laid_out);
    }

    /// Most recent presentation, if any was rendered.
    pub fn last_presentation(&self) -> Option<Presentation> {
        self.presented.borrow().last().cloned()
    }

    /// Every presentation rendered, oldest first.
    pub fn presentations(&self) -> Vec<Presentation> {
        self.presented.borrow().clone()
    }
}

impl TrackedElement for SimulatedElement {
    fn kind(&self) -> ElementKind {
        self.kind.clone()
    }

    fn source(&self) -> Option<String> {
        self.source.clone()
    }

    fn bounding_rect(&self) -> Option<ClientRect> {
        if !self.laid_out.get() {
            return None;
        }
        let container_offset = self
            .container
            .as_ref()
            .map_or(0.0, |container| container.scroll_offset());
        let top = self.document_top.get() - self.metrics.get().scroll_offset - container_offset;
        Some(ClientRect::with_height(top, self.height.get()))
    }

    fn present(&self, presentation: &Presentation) {
        self.presented.borrow_mut().push(presentation.clone());
    }
}
