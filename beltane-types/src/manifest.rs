use serde_json::Value;

use crate::param::ParameterDescriptor;

/// The parameter manifest loaded once at bridge construction.
///
/// Parsing is deliberately tolerant, matching the host contract: entries that
/// are not objects are skipped, missing fields fall back to defaults, and a
/// document that fails to parse at all yields an empty parameter list rather
/// than an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manifest {
    pub parameters: Vec<ParameterDescriptor>,
}

impl Manifest {
    pub fn from_json_str(text: &str) -> Self {
        let root: Value = match serde_json::from_str(text) {
            Ok(v) => v,
            Err(_) => return Self::default(),
        };

        let entries = match root.get("parameters").and_then(Value::as_array) {
            Some(entries) => entries,
            None => return Self::default(),
        };

        let mut parameters: Vec<ParameterDescriptor> = Vec::new();

        for entry in entries {
            let obj = match entry.as_object() {
                Some(o) => o,
                None => continue,
            };

            let id = obj
                .get("paramId")
                .and_then(Value::as_str)
                .unwrap_or("unknown");

            // Duplicate ids keep the first declaration.
            if parameters.iter().any(|p| p.id == id) {
                continue;
            }

            parameters.push(ParameterDescriptor {
                id: id.to_string(),
                name: obj
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or("Unknown")
                    .to_string(),
                min: obj.get("min").and_then(Value::as_f64).unwrap_or(0.0),
                max: obj.get("max").and_then(Value::as_f64).unwrap_or(1.0),
                default: obj
                    .get("defaultValue")
                    .and_then(Value::as_f64)
                    .unwrap_or(0.0),
            });
        }

        Manifest { parameters }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_manifest() {
        let manifest = Manifest::from_json_str(
            r#"{
                "parameters": [
                    { "paramId": "gain", "name": "Gain", "min": 0.0, "max": 1.0, "defaultValue": 0.5 },
                    { "paramId": "mix", "name": "Mix", "min": 0.0, "max": 1.0, "defaultValue": 1.0 }
                ]
            }"#,
        );
        assert_eq!(manifest.parameters.len(), 2);
        assert_eq!(manifest.parameters[0].id, "gain");
        assert_eq!(manifest.parameters[0].default, 0.5);
        assert_eq!(manifest.parameters[1].id, "mix");
        assert_eq!(manifest.parameters[1].default, 1.0);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let manifest = Manifest::from_json_str(r#"{ "parameters": [ {} ] }"#);
        assert_eq!(manifest.parameters.len(), 1);
        let p = &manifest.parameters[0];
        assert_eq!(p.id, "unknown");
        assert_eq!(p.name, "Unknown");
        assert_eq!(p.min, 0.0);
        assert_eq!(p.max, 1.0);
        assert_eq!(p.default, 0.0);
    }

    #[test]
    fn skips_non_object_entries() {
        let manifest = Manifest::from_json_str(
            r#"{ "parameters": [ 42, "nope", { "paramId": "gain" } ] }"#,
        );
        assert_eq!(manifest.parameters.len(), 1);
        assert_eq!(manifest.parameters[0].id, "gain");
    }

    #[test]
    fn duplicate_ids_keep_first() {
        let manifest = Manifest::from_json_str(
            r#"{ "parameters": [
                { "paramId": "gain", "defaultValue": 0.5 },
                { "paramId": "gain", "defaultValue": 0.9 }
            ] }"#,
        );
        assert_eq!(manifest.parameters.len(), 1);
        assert_eq!(manifest.parameters[0].default, 0.5);
    }

    #[test]
    fn malformed_document_yields_empty_list() {
        assert!(Manifest::from_json_str("not json").parameters.is_empty());
        assert!(Manifest::from_json_str("[1, 2]").parameters.is_empty());
        assert!(Manifest::from_json_str("{}").parameters.is_empty());
    }
}
