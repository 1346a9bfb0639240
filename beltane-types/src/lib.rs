//! # beltane-types
//!
//! Shared type definitions for the Beltane effect bridge.
//! This crate contains the plain data structures passed between the bridge
//! core, the host shell, and the script/UI collaborators.

mod error;
mod format;
mod manifest;
mod message;
mod param;

pub use error::{DspError, ErrorKind};
pub use format::RenderFormat;
pub use manifest::Manifest;
pub use message::ViewMessage;
pub use param::ParameterDescriptor;

/// An opaque, ordered sequence of graph-mutation records produced by the
/// script engine or the UI and consumed exactly once by the instruction
/// channel. The bridge never inspects the contents; shape validation belongs
/// to the DSP runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct InstructionBatch(serde_json::Value);

impl InstructionBatch {
    /// Parse a batch from its JSON text form.
    pub fn from_json_str(text: &str) -> Result<Self, String> {
        serde_json::from_str(text)
            .map(InstructionBatch)
            .map_err(|e| e.to_string())
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn into_value(self) -> serde_json::Value {
        self.0
    }
}

/// An opaque serializable capture of DSP-runtime internal state, produced by
/// the runtime and consumed once by the hydration dispatch after
/// re-initialization.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot(serde_json::Value);

impl Snapshot {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn into_value(self) -> serde_json::Value {
        self.0
    }
}
