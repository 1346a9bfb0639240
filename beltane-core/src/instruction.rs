//! Inbound instruction channel: batches posted by the script engine or the
//! UI, applied to the published runtime in strict arrival order on the main
//! thread.
//!
//! Failures never propagate to the caller; they are converted into error
//! records for dispatch. Script-originated posts arrive while the script
//! context is mid-evaluation, so their errors are queued and dispatched right
//! after the active evaluation returns instead of re-entering the context.

use std::sync::Mutex;

use serde_json::Value;

use beltane_types::{ErrorKind, InstructionBatch};

use crate::runtime::RuntimeSlot;
use crate::script::ScriptLogLevel;
use crate::view::ViewSlot;

/// What happened to a batch that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Applied atomically to the published runtime.
    Applied,
    /// No runtime is published (not ready, or mid-reinit): dropped.
    Dropped,
}

/// Parse and apply one batch. A parse failure or runtime rejection leaves the
/// prior graph unchanged and is returned as a `(kind, message)` pair for the
/// caller to dispatch.
pub fn apply_batch(
    slot: &RuntimeSlot,
    batch_json: &str,
) -> Result<BatchOutcome, (ErrorKind, String)> {
    let batch = match InstructionBatch::from_json_str(batch_json) {
        Ok(batch) => batch,
        Err(e) => {
            return Err((
                ErrorKind::Unknown,
                format!("malformed instruction batch: {}", e),
            ))
        }
    };

    let cell = match slot.current() {
        Some(cell) => cell,
        None => {
            log::debug!(target: "bridge", "dropping instruction batch: no active runtime");
            return Ok(BatchOutcome::Dropped);
        }
    };

    match cell.runtime().apply_instructions(&batch) {
        Ok(()) => Ok(BatchOutcome::Applied),
        Err(e) => Err((e.kind(), e.message().to_string())),
    }
}

/// Errors raised while the script context is executing, held until the
/// active evaluation returns.
#[derive(Default)]
pub struct PendingErrors {
    inner: Mutex<Vec<(ErrorKind, String)>>,
}

impl PendingErrors {
    pub fn push(&self, kind: ErrorKind, message: String) {
        if let Ok(mut queue) = self.inner.lock() {
            queue.push((kind, message));
        }
    }

    /// Take all queued errors, in arrival order.
    pub fn drain(&self) -> Vec<(ErrorKind, String)> {
        match self.inner.lock() {
            Ok(mut queue) => std::mem::take(&mut *queue),
            Err(_) => Vec::new(),
        }
    }
}

/// Route a script log call: to the attached view when one is present,
/// otherwise to the log facade under the `script` target. The routing choice
/// never affects parameter or state semantics.
pub fn route_script_log(view: &ViewSlot, level: ScriptLogLevel, args: &[Value]) {
    if let Some(view) = view.active() {
        view.receive_log(level, args);
        return;
    }

    let rendered = args
        .iter()
        .map(|arg| arg.to_string())
        .collect::<Vec<_>>()
        .join(" ");

    match level {
        ScriptLogLevel::Log => log::info!(target: "script", "{} {}", level.tag(), rendered),
        ScriptLogLevel::Warn => log::warn!(target: "script", "{} {}", level.tag(), rendered),
        ScriptLogLevel::Error => log::error!(target: "script", "{} {}", level.tag(), rendered),
    }
}
