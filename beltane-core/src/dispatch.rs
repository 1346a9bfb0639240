//! Outbound message dispatch: canonical state and error records, delivered
//! UI-first and script-second, synchronously on the calling (main) thread.
//!
//! A target that does not define the receiving entry point is skipped
//! silently; a target that fails while handling a message is logged and never
//! interrupts the other target or the caller.

use serde_json::{json, Value};

use beltane_types::ErrorKind;

use crate::script::{self, ScriptContext};
use crate::view::ViewSlot;

/// Deliver a full state payload to the attached view (if any) and then to the
/// script context's state receiver.
pub fn dispatch_state_change(
    payload: &Value,
    view: &ViewSlot,
    script: Option<&mut (dyn ScriptContext + 'static)>,
) {
    if let Some(view) = view.active() {
        view.receive_state(payload);
    }

    if let Some(ctx) = script {
        match ctx.invoke_entry_point(script::STATE_RECEIVER, payload) {
            Ok(_) => {}
            Err(e) => log::warn!(target: "script", "state receiver failed: {}", e),
        }
    }
}

/// Build the error record delivered to error receivers.
pub fn error_record(kind: ErrorKind, message: &str) -> Value {
    json!({ "name": kind.as_str(), "message": message })
}

/// Deliver an error record, same targets and ordering as state dispatch.
pub fn dispatch_error(
    kind: ErrorKind,
    message: &str,
    view: &ViewSlot,
    script: Option<&mut (dyn ScriptContext + 'static)>,
) {
    let record = error_record(kind, message);

    if let Some(view) = view.active() {
        view.receive_error(&record);
    }

    if let Some(ctx) = script {
        match ctx.invoke_entry_point(script::ERROR_RECEIVER, &record) {
            Ok(_) => {}
            Err(e) => log::warn!(target: "script", "error receiver failed: {}", e),
        }
    }
}
