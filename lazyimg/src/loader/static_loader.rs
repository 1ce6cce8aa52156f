//! Loader with outcomes fixed up front.
//!
//! Used by the simulator's offline mode and by tests that need a loader
//! without network or disk access. Every source loads successfully unless it
//! was registered with [`StaticLoader::with_failure`].

use std::cell::RefCell;
use std::collections::HashSet;

use futures::future::LocalBoxFuture;

use super::error::LoadError;
use super::{ImageInfo, ImageLoader, LoadOutcome};

/// Reason reported for sources registered as failing.
pub const SIMULATED_FAILURE: &str = "simulated decode error";

/// Deterministic loader that records every request.
#[derive(Debug, Default)]
pub struct StaticLoader {
    failing: HashSet<String>,
    requests: RefCell<Vec<String>>,
}

impl StaticLoader {
    /// Create a loader for which every source succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `source` fail with a decode error.
    pub fn with_failure(mut self, source: impl Into<String>) -> Self {
        self.failing.insert(source.into());
        self
    }

    /// Sources requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    /// Number of times `source` was requested.
    pub fn request_count(&self, source: &str) -> usize {
        self.requests
            .borrow()
            .iter()
            .filter(|requested| requested.as_str() == source)
            .count()
    }

    fn outcome_for(&self, source: &str) -> LoadOutcome {
        if self.failing.contains(source) {
            LoadOutcome::Errored(LoadError::Decode {
                url: source.to_string(),
                reason: SIMULATED_FAILURE.to_string(),
            })
        } else {
            LoadOutcome::Loaded(ImageInfo::default())
        }
    }
}

impl ImageLoader for StaticLoader {
    fn load(&self, source: &str) -> LocalBoxFuture<'static, LoadOutcome> {
        self.requests.borrow_mut().push(source.to_string());
        let outcome = self.outcome_for(source);
        Box::pin(async move { outcome })
    }
}
