use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::errors::{Error, Result};

/// Merged output of every analyzer for one run.
///
/// Top-level keys hold complexity, duplication, security counts and the
/// repository root; analyzer sections (`coverage_analysis`, `testing_quality`,
/// ...) are nested objects. Missing keys mean "unknown" and are never read
/// as zero by the scoring core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricsBundle {
    entries: Map<String, Value>,
}

impl MetricsBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a bundle from a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(entries) => Ok(Self { entries }),
            other => Err(Error::Analysis(format!(
                "metrics bundle must be a JSON object, got {}",
                json_type_name(&other)
            ))),
        }
    }

    pub fn from_map(entries: Map<String, Value>) -> Self {
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Nested analyzer section, if present and an object.
    pub fn section(&self, name: &str) -> Option<&Map<String, Value>> {
        self.entries.get(name).and_then(Value::as_object)
    }

    /// Top-level string value, if present.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(Value::as_str)
    }

    pub fn entries(&self) -> &Map<String, Value> {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return a bundle with `key` added. An existing key is kept.
    pub fn with_top_level(self, key: impl Into<String>, value: Value) -> Self {
        let mut single = Map::new();
        single.insert(key.into(), value);
        self.merge_top_level(single)
    }

    /// Return a bundle with `name` bound to an analyzer section. An existing
    /// section is kept; its own keys are unioned with the new ones.
    pub fn with_section(mut self, name: &str, section: Map<String, Value>) -> Self {
        match self.entries.get_mut(name) {
            Some(Value::Object(existing)) => {
                for (key, value) in section {
                    if existing.contains_key(&key) {
                        debug!("Keeping existing {}.{} during merge", name, key);
                        continue;
                    }
                    existing.insert(key, value);
                }
            }
            Some(_) => {
                debug!("Keeping existing non-object value for section {}", name);
            }
            None => {
                self.entries.insert(name.to_string(), Value::Object(section));
            }
        }
        self
    }

    /// Return a bundle with every key of `other` added by key union.
    pub fn merge_top_level(mut self, other: Map<String, Value>) -> Self {
        for (key, value) in other {
            if self.entries.contains_key(&key) {
                debug!("Keeping existing metric {} during merge", key);
                continue;
            }
            self.entries.insert(key, value);
        }
        self
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.entries)
    }
}

impl From<Map<String, Value>> for MetricsBundle {
    fn from(entries: Map<String, Value>) -> Self {
        Self { entries }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
