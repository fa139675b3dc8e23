//! Per-extension settings from `s3-satis.plugins.<key>` or `--extension` options.

use mirror_meta::path::{PathSegment, get_at_path, parse_path};
use serde_json::{Map, Value};

/// Immutable settings scoped to one extension for one run.
///
/// Values are nested and queried by dotted path, so `cache.path` reads
/// `{"cache": {"path": ...}}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PluginConfig {
    values: Map<String, Value>,
}

impl PluginConfig {
    /// Wrap a settings object. The `enabled` switch is not a setting and is
    /// dropped.
    pub fn new(mut values: Map<String, Value>) -> Self {
        values.shift_remove("enabled");
        Self { values }
    }

    /// Build settings from any JSON value. Non-objects yield empty settings.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(map) => Self::new(map.clone()),
            _ => Self::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Look up a value by dotted path.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let segments = parse_path(path);
        let (first, rest) = segments.split_first()?;
        let PathSegment::Key(first) = first else {
            return None;
        };
        get_at_path(self.values.get(first)?, rest)
    }

    /// Whether a value (including `null`) is set at `path`.
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    pub fn get_bool(&self, path: &str, default: bool) -> bool {
        self.get(path).and_then(Value::as_bool).unwrap_or(default)
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    /// Read a list of strings. A single scalar counts as a one-element list.
    pub fn get_strings(&self, path: &str) -> Vec<String> {
        match self.get(path) {
            Some(Value::Array(items)) => items.iter().filter_map(scalar_to_string).collect(),
            Some(value) => scalar_to_string(value).into_iter().collect(),
            None => Vec::new(),
        }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
