use serde::{Deserialize, Serialize};

/// Declaration of a single host-visible parameter.
///
/// Descriptors are loaded once from the manifest at construction and never
/// change afterwards; the parameter id is unique and stable for the lifetime
/// of the bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    pub id: String,
    pub name: String,
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

impl ParameterDescriptor {
    pub fn new(id: &str, name: &str, min: f64, max: f64, default: f64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            min,
            max,
            default,
        }
    }

    /// Clamp a value to the declared range. Tolerates inverted ranges from a
    /// hand-written manifest instead of panicking.
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }
}
