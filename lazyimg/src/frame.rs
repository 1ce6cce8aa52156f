//! Frame-aligned coalescing of scroll/resize activity.
//!
//! Scroll and resize events can fire many times per rendering frame. The
//! [`FrameScheduler`] turns any burst of them into at most one visibility
//! check per frame using a single in-flight token:
//!
//! ```text
//!            request_check()              frame fires
//!    Idle ───────────────────► Pending ─────────────────► check() ──► Idle
//!                               │  ▲
//!                               └──┘ request_check() is a no-op
//! ```
//!
//! The token is cleared *after* the check runs, so a check that moves layout
//! (and triggers more scroll/resize events synchronously) cannot schedule
//! another check for the same frame.
//!
//! There is no cancellation. A callback that fires after its owner was
//! disposed must be guarded by the owner's own flag.

use std::cell::Cell;
use std::rc::Rc;

use crate::host::Host;

/// At-most-one-pending frame request token.
#[derive(Debug, Default)]
pub struct FrameScheduler {
    in_flight: Cell<bool>,
    requested: Cell<u64>,
}

impl FrameScheduler {
    /// Create an idle scheduler.
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Schedule `check` for the next frame unless a check is already pending.
    ///
    /// # Returns
    ///
    /// `true` if a frame was requested, `false` if the call was coalesced
    /// into an already pending check.
    pub fn request_check<F>(self: &Rc<Self>, host: &dyn Host, check: F) -> bool
    where
        F: FnOnce() + 'static,
    {
        if self.in_flight.get() {
            return false;
        }

        self.in_flight.set(true);
        self.requested.set(self.requested.get() + 1);

        let scheduler = Rc::clone(self);
        host.request_frame(Box::new(move || {
            check();
            scheduler.in_flight.set(false);
        }));
        true
    }

    /// Whether a check is waiting for the next frame.
    pub fn is_pending(&self) -> bool {
        self.in_flight.get()
    }

    /// Total number of frames requested over the scheduler's lifetime.
    pub fn frames_requested(&self) -> u64 {
        self.requested.get()
    }
}
