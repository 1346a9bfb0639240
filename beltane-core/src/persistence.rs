//! Persisted-state blob: a flat parameter-id → value JSON object.
//!
//! The host owns storage; the bridge only serializes and restores. Loading
//! overwrites keys present in both the blob and the declared set, ignores
//! unknown keys, and ignores a malformed blob entirely, so
//! `load(store(state))` reproduces `state` restricted to the declared ids.

use serde_json::Value;

use crate::state::CanonicalState;

/// Serialize the canonical state, restricted to declared parameter ids, into
/// a single blob.
pub fn store(state: &CanonicalState) -> Vec<u8> {
    serde_json::to_vec(state.values()).unwrap_or_else(|_| b"{}".to_vec())
}

/// Restore canonical values from a blob previously produced by [`store`].
pub fn load(state: &mut CanonicalState, blob: &[u8]) {
    let parsed: Value = match serde_json::from_slice(blob) {
        Ok(v) => v,
        Err(e) => {
            log::debug!(target: "bridge", "ignoring malformed state blob: {}", e);
            return;
        }
    };

    let obj = match parsed.as_object() {
        Some(o) => o,
        None => {
            log::debug!(target: "bridge", "ignoring non-object state blob");
            return;
        }
    };

    for (key, value) in obj {
        if let Some(number) = value.as_f64() {
            // set() ignores keys outside the declared parameter set
            state.set(key, number);
        }
    }
}
