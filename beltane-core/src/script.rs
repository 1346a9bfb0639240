//! Script-engine collaborator boundary.
//!
//! The bridge owns one script context at a time, rebuilt on every
//! (re)initialization. Native→script functions are handed to the engine
//! factory as [`HostBindings`]; script→native entry points are looked up by
//! their well-known global names and silently skipped when absent.

use std::sync::Arc;

use serde_json::Value;

/// Global entry point invoked with the full canonical state payload.
pub const STATE_RECEIVER: &str = "__receiveStateChange__";
/// Global entry point invoked with an error record `{name, message}`.
pub const ERROR_RECEIVER: &str = "__receiveError__";
/// Global entry point invoked once per initialization with the runtime
/// snapshot, before any instruction batch is accepted.
pub const HYDRATION_RECEIVER: &str = "__receiveHydrationData__";

/// Severity tag attached by the script environment's console shim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptLogLevel {
    Log,
    Warn,
    Error,
}

impl ScriptLogLevel {
    /// The tag prefix used on the fallback sink, matching the console shim.
    pub fn tag(self) -> &'static str {
        match self {
            ScriptLogLevel::Log => "[log]",
            ScriptLogLevel::Warn => "[warn]",
            ScriptLogLevel::Error => "[error]",
        }
    }
}

/// Native functions registered into every fresh script context.
///
/// The engine factory maps these onto whatever global names its language
/// exposes; the bridge only cares that calls route back here.
#[derive(Clone)]
pub struct HostBindings {
    /// Current render sample rate.
    pub sample_rate: Arc<dyn Fn() -> f64 + Send + Sync>,
    /// Post an instruction batch (JSON text) into the instruction channel.
    pub post_instructions: Arc<dyn Fn(&str) + Send + Sync>,
    /// Route a script log call to the active sink.
    pub log: Arc<dyn Fn(ScriptLogLevel, &[Value]) + Send + Sync>,
}

/// One live script context. Contexts are single-owner, main-thread objects;
/// the bridge discards and rebuilds them wholesale on format changes.
pub trait ScriptContext {
    /// Evaluate a chunk of script source (the entry file).
    fn evaluate(&mut self, source: &str) -> Result<(), String>;

    /// Invoke a well-known global entry point with a JSON payload.
    ///
    /// Returns `Ok(false)` when the entry point is not defined: a silent
    /// no-op, not an error.
    fn invoke_entry_point(&mut self, name: &str, payload: &Value) -> Result<bool, String>;
}

/// Constructs script contexts. Called on the main thread during
/// (re)initialization, once per context.
pub trait ScriptEngineFactory {
    fn create_context(&self, bindings: HostBindings) -> Result<Box<dyn ScriptContext>, String>;
}
