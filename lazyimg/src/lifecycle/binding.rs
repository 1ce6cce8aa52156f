//! Listener registration for one bind.

use std::fmt;
use std::rc::Rc;

use crate::frame::FrameScheduler;
use crate::host::{Listener, ListenerHandle, ListenerKind, ObservationContext};

/// Scroll and resize registrations on a resolved observation context.
///
/// The context the listeners were added to is kept alongside the handles, so
/// removal always targets the same object even if a context provider would
/// resolve differently later. Dropping the binding removes both listeners.
///
/// Each binding owns its frame token, so a check left pending by a previous
/// binding never absorbs requests made under this one.
pub(crate) struct Binding {
    context: Rc<dyn ObservationContext>,
    scheduler: Rc<FrameScheduler>,
    scroll: ListenerHandle,
    resize: ListenerHandle,
}

impl Binding {
    /// Register `listener` for scroll and resize events on `context`.
    pub(crate) fn attach(
        context: Rc<dyn ObservationContext>,
        scheduler: Rc<FrameScheduler>,
        listener: Listener,
    ) -> Self {
        let scroll = context.add_listener(ListenerKind::Scroll, Rc::clone(&listener));
        let resize = context.add_listener(ListenerKind::Resize, listener);
        Self {
            context,
            scheduler,
            scroll,
            resize,
        }
    }

    /// Frame token for this binding's visibility checks.
    pub(crate) fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }
}

impl Drop for Binding {
    fn drop(&mut self) {
        self.context.remove_listener(self.scroll);
        self.context.remove_listener(self.resize);
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("pending", &self.scheduler.is_pending())
            .field("scroll", &self.scroll)
            .field("resize", &self.resize)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::SimulatedContext;

    #[test]
    fn test_attach_registers_scroll_and_resize() {
        let context = Rc::new(SimulatedContext::new("feed"));
        let binding = Binding::attach(context.clone(), FrameScheduler::new(), Rc::new(|| {}));

        assert_eq!(context.listener_count_of(ListenerKind::Scroll), 1);
        assert_eq!(context.listener_count_of(ListenerKind::Resize), 1);

        drop(binding);
        assert_eq!(context.listener_count(), 0);
    }

    #[test]
    fn test_drop_only_removes_own_registrations() {
        let context = Rc::new(SimulatedContext::new("feed"));
        let first = Binding::attach(context.clone(), FrameScheduler::new(), Rc::new(|| {}));
        let _second = Binding::attach(context.clone(), FrameScheduler::new(), Rc::new(|| {}));

        drop(first);
        assert_eq!(context.listener_count(), 2);
    }
}
