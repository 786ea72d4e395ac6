use crate::Result;
use crate::validate::ValidateOptions;
use serde_json::{Map, Value, json};

pub const SUPPORTED_VERSIONS: &str = "validation.supportedVersions";
pub const REQUIRE_METADATA: &str = "validation.requireMetaData";
pub const REQUIRE_STATUS: &str = "validation.requireStatus";

/// JSON-backed configuration addressed by dotted paths (`validation.requireStatus`).
#[derive(Debug, Clone, PartialEq)]
pub struct Config(Value);

impl Default for Config {
    fn default() -> Self {
        Self(json!({
            "validation": {
                "supportedVersions": [crate::cx2::CX_VERSION],
                "requireMetaData": false,
                "requireStatus": false,
            }
        }))
    }
}

impl Config {
    pub fn empty_object() -> Self {
        Self(Value::Object(Map::new()))
    }

    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(Self(serde_json::from_str(text)?))
    }

    /// Defaults with `overrides` deep-merged on top.
    pub fn with_overrides(overrides: &Value) -> Self {
        let mut config = Self::default();
        config.deep_merge(overrides);
        config
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    fn lookup(&self, dotted_path: &str) -> Option<&Value> {
        let mut cur = &self.0;
        for segment in dotted_path.split('.') {
            cur = cur.as_object()?.get(segment)?;
        }
        Some(cur)
    }

    pub fn get_bool(&self, dotted_path: &str) -> Option<bool> {
        self.lookup(dotted_path)?.as_bool()
    }

    /// String elements of an array; non-string elements are skipped.
    pub fn get_str_array(&self, dotted_path: &str) -> Option<Vec<String>> {
        let items = self.lookup(dotted_path)?.as_array()?;
        Some(
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn set_value(&mut self, dotted_path: &str, value: Value) {
        if !self.0.is_object() {
            self.0 = Value::Object(Map::new());
        }

        let Value::Object(ref mut root) = self.0 else {
            return;
        };
        let mut cur: &mut Map<String, Value> = root;
        let mut segments = dotted_path.split('.').peekable();
        while let Some(seg) = segments.next() {
            if segments.peek().is_none() {
                cur.insert(seg.to_string(), value);
                return;
            }
            let slot = cur.entry(seg).or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            let Some(next) = slot.as_object_mut() else {
                return;
            };
            cur = next;
        }
    }

    pub fn deep_merge(&mut self, other: &Value) {
        deep_merge_value(&mut self.0, other);
    }

    /// Validation policy read from the `validation.*` keys; missing keys keep their defaults.
    pub fn validate_options(&self) -> ValidateOptions {
        let defaults = ValidateOptions::default();
        ValidateOptions {
            supported_versions: self
                .get_str_array(SUPPORTED_VERSIONS)
                .unwrap_or(defaults.supported_versions),
            require_metadata: self
                .get_bool(REQUIRE_METADATA)
                .unwrap_or(defaults.require_metadata),
            require_status: self
                .get_bool(REQUIRE_STATUS)
                .unwrap_or(defaults.require_status),
        }
    }
}

fn deep_merge_value(base: &mut Value, incoming: &Value) {
    match (base, incoming) {
        (Value::Object(base_map), Value::Object(in_map)) => {
            for (key, in_value) in in_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge_value(base_value, in_value),
                    None => {
                        base_map.insert(key.clone(), in_value.clone());
                    }
                }
            }
        }
        (base_slot, in_value) => {
            *base_slot = in_value.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_lenient_validation() {
        assert_eq!(Config::default().validate_options(), ValidateOptions::default());
    }

    #[test]
    fn overrides_merge_deeply() {
        let config = Config::with_overrides(&json!({"validation": {"requireMetaData": true}}));
        assert_eq!(config.get_bool(REQUIRE_METADATA), Some(true));
        assert_eq!(config.get_bool(REQUIRE_STATUS), Some(false));
        assert_eq!(config.get_str_array(SUPPORTED_VERSIONS), Some(vec!["2.0".to_string()]));
    }

    #[test]
    fn set_value_creates_intermediate_objects() {
        let mut config = Config::from_value(json!(3));
        config.set_value("a.b.c", json!("x"));
        assert_eq!(config.as_value()["a"]["b"]["c"], json!("x"));
        config.set_value(REQUIRE_STATUS, json!(true));
        assert!(config.validate_options().require_status);
    }

    #[test]
    fn parses_json_text() {
        assert!(Config::from_json_str("{\"validation\": {}}").is_ok());
        assert!(Config::from_json_str("{").is_err());
    }
}
