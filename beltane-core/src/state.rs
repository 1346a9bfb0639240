//! Canonical parameter state: the single authoritative id → value mapping,
//! owned and mutated by the main thread only.

use std::collections::BTreeMap;

use serde_json::Value;

use beltane_types::ParameterDescriptor;

/// Ordered mapping of parameter id to current value.
///
/// The key set is fixed at construction to exactly the declared parameters,
/// never more, never fewer. Derived fields (sample rate) are added to the
/// dispatch payload only and are not part of the map.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalState {
    values: BTreeMap<String, f64>,
}

impl CanonicalState {
    pub fn from_descriptors(descriptors: &[ParameterDescriptor]) -> Self {
        let values = descriptors
            .iter()
            .map(|d| (d.id.clone(), d.default))
            .collect();
        Self { values }
    }

    /// Overwrite the value for a declared parameter. Unknown ids are ignored
    /// so the key set invariant holds no matter what the caller feeds in.
    pub fn set(&mut self, id: &str, value: f64) {
        if let Some(slot) = self.values.get_mut(id) {
            *slot = value;
        }
    }

    pub fn get(&self, id: &str) -> Option<f64> {
        self.values.get(id).copied()
    }

    pub fn values(&self) -> &BTreeMap<String, f64> {
        &self.values
    }

    /// Build the full dispatch payload: every declared parameter plus the
    /// derived `sampleRate` field.
    pub fn dispatch_payload(&self, sample_rate: f64) -> Value {
        let mut map = serde_json::Map::new();
        for (id, value) in &self.values {
            map.insert(id.clone(), Value::from(*value));
        }
        map.insert("sampleRate".to_string(), Value::from(sample_rate));
        Value::Object(map)
    }
}
