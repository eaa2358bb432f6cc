//! Preset registry
//!
//! The registry is built once from a definitions source and never mutated
//! afterwards. It is shared by reference between the resolver, the
//! applicator and the watcher.

use serde_json::Value;

use crate::config::ParserConfig;
use crate::error::ResolveError;
use crate::parser;
use crate::preset::{storage_key, Preset, PresetMap, ResolvedPreset, PARENT_KEY};
use crate::resolver;
use crate::source::SourceError;

/// Immutable collection of named presets
#[derive(Debug, Clone, Default)]
pub struct PresetRegistry {
    presets: PresetMap,
}

impl PresetRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry from already parsed presets
    pub fn from_presets(presets: PresetMap) -> Self {
        Self { presets }
    }

    /// Build a registry from structured-text definitions
    pub fn from_definitions(raw: &str, config: &ParserConfig) -> Self {
        Self::from_presets(parser::parse_with_config(raw, config))
    }

    /// Build a registry from pre-flattened JSON definitions
    ///
    /// The presets live under the `section` field as an object of records.
    /// A missing or `null` section yields an empty registry.
    pub fn from_json(raw: &str, section: &str) -> Result<Self, SourceError> {
        let document: Value = serde_json::from_str(raw)?;

        let records = match document.get(section) {
            None | Some(Value::Null) => return Ok(Self::new()),
            Some(Value::Object(records)) => records,
            Some(other) => {
                return Err(SourceError::InvalidShape {
                    section: section.to_string(),
                    found: json_kind(other).to_string(),
                })
            }
        };

        let mut presets = PresetMap::new();
        for (name, record) in records {
            let Value::Object(fields) = record else {
                log::debug!("skipping preset '{}': record is not an object", name);
                continue;
            };

            let mut preset = Preset::new(name.as_str());
            for (key, value) in fields {
                let Some(value) = json_scalar(value) else {
                    continue;
                };
                if key == PARENT_KEY {
                    preset.parent = (!value.is_empty()).then_some(value);
                } else {
                    preset.attributes.insert(storage_key(key).to_string(), value);
                }
            }
            presets.insert(name.clone(), preset);
        }

        Ok(Self::from_presets(presets))
    }

    /// Get a preset by name
    pub fn get(&self, name: &str) -> Option<&Preset> {
        self.presets.get(name)
    }

    /// Check if a preset exists
    pub fn contains(&self, name: &str) -> bool {
        self.presets.contains_key(name)
    }

    /// All preset names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(|s| s.as_str())
    }

    /// All presets, sorted by name
    pub fn iter(&self) -> impl Iterator<Item = &Preset> {
        self.presets.values()
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    /// Resolve a preset against this registry
    pub fn resolve(&self, name: &str) -> Result<Option<ResolvedPreset>, ResolveError> {
        resolver::resolve(self, name)
    }
}

/// String form of a scalar JSON value; nested values have none
fn json_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
