//! Optional UI view attachment.
//!
//! The bridge never owns the view: it holds a weak back-reference set when a
//! view attaches and cleared when it detaches. An absent or dropped view is
//! "no UI attached", never an error.

use std::sync::{Arc, Mutex, Weak};

use serde_json::Value;

use crate::script::ScriptLogLevel;

/// Receiver side of the detached UI. All receivers default to no-ops so a
/// view only implements the messages it cares about.
pub trait UiView {
    /// Full canonical state payload.
    fn receive_state(&self, _state: &Value) {}

    /// Error record `{name, message}`.
    fn receive_error(&self, _error: &Value) {}

    /// Log call forwarded from the script environment.
    fn receive_log(&self, _level: ScriptLogLevel, _args: &[Value]) {}
}

/// Weak slot for the currently attached view.
pub struct ViewSlot {
    inner: Mutex<Option<Weak<dyn UiView + Send + Sync>>>,
}

impl ViewSlot {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(None),
        }
    }

    pub fn attach(&self, view: &Arc<dyn UiView + Send + Sync>) {
        if let Ok(mut slot) = self.inner.lock() {
            *slot = Some(Arc::downgrade(view));
        }
    }

    pub fn detach(&self) {
        if let Ok(mut slot) = self.inner.lock() {
            *slot = None;
        }
    }

    /// Upgrade the back-reference, treating a dropped view as detached.
    pub fn active(&self) -> Option<Arc<dyn UiView + Send + Sync>> {
        self.inner
            .lock()
            .ok()
            .and_then(|slot| slot.as_ref().and_then(|weak| weak.upgrade()))
    }
}

impl Default for ViewSlot {
    fn default() -> Self {
        Self::new()
    }
}
