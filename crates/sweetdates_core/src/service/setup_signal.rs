//! Observable "setup complete" state.
//!
//! # Invariants
//! - Only the settings facade publishes new values.
//! - `version` increases exactly when `complete` changes.

use std::sync::{Arc, PoisonError, RwLock};

/// Point-in-time view of the setup state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetupSnapshot {
    pub complete: bool,
    pub version: u64,
}

/// Shared, observable setup flag owned by application state.
#[derive(Debug, Clone, Default)]
pub struct SetupSignal {
    state: Arc<RwLock<SetupSnapshot>>,
}

impl SetupSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> SetupSnapshot {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_complete(&self) -> bool {
        self.snapshot().complete
    }

    /// Starts observing from the current snapshot.
    pub fn subscribe(&self) -> SetupSubscriber {
        SetupSubscriber {
            state: Arc::clone(&self.state),
            seen: self.snapshot().version,
        }
    }

    pub(crate) fn publish(&self, complete: bool) -> SetupSnapshot {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.complete != complete {
            state.complete = complete;
            state.version += 1;
        }
        *state
    }
}

/// Reader that can tell whether the setup state changed since it last looked.
#[derive(Debug)]
pub struct SetupSubscriber {
    state: Arc<RwLock<SetupSnapshot>>,
    seen: u64,
}

impl SetupSubscriber {
    pub fn snapshot(&self) -> SetupSnapshot {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the new snapshot once per change.
    pub fn changed(&mut self) -> Option<SetupSnapshot> {
        let snapshot = self.snapshot();
        if snapshot.version == self.seen {
            return None;
        }
        self.seen = snapshot.version;
        Some(snapshot)
    }
}
