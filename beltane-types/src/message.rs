use serde::{Deserialize, Serialize};

/// Messages posted by an attached UI view into the bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ViewMessage {
    /// The view has installed its message hooks and wants a state dispatch.
    Ready,
    /// Development-only: force a full bridge re-initialization.
    Reload,
    /// Forward a parameter edit from the view to the host parameter API.
    #[serde(rename_all = "camelCase")]
    SetParameterValue { param_id: String, value: f64 },
}
