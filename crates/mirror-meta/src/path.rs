//! Dotted path traversal for JSON documents
//!
//! Configuration and metadata documents are queried and edited with
//! dot-separated paths, with optional array indexing.
//!
//! # Path Syntax
//!
//! - Dot-separated keys: `archive.prefix-url`
//! - Array indexing: `repositories[0].url`
//!
//! # Examples
//!
//! ```
//! use mirror_meta::path::{get_at_path, parse_path, PathSegment};
//! use serde_json::json;
//!
//! let path = parse_path("repositories[0].url");
//! assert_eq!(path, vec![
//!     PathSegment::Key("repositories".to_string()),
//!     PathSegment::Index(0),
//!     PathSegment::Key("url".to_string()),
//! ]);
//!
//! let value = json!({"repositories": [{"url": "https://example.com"}]});
//! assert_eq!(get_at_path(&value, &path), Some(&json!("https://example.com")));
//! ```

use serde_json::{Map, Value};

/// A segment of a path - either a key or an array index
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// A key in an object (e.g., "archive" in "archive.directory")
    Key(String),
    /// An index in an array (e.g., 0 in `repositories[0]`)
    Index(usize),
}

/// Parse a path string into segments.
pub fn parse_path(path: &str) -> Vec<PathSegment> {
    let mut segments = Vec::new();
    let mut current_key = String::new();
    let mut chars = path.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '.' => {
                if !current_key.is_empty() {
                    segments.push(PathSegment::Key(std::mem::take(&mut current_key)));
                }
            }
            '[' => {
                if !current_key.is_empty() {
                    segments.push(PathSegment::Key(std::mem::take(&mut current_key)));
                }
                let mut index_str = String::new();
                for ch in chars.by_ref() {
                    if ch == ']' {
                        break;
                    }
                    index_str.push(ch);
                }
                if let Ok(index) = index_str.parse::<usize>() {
                    segments.push(PathSegment::Index(index));
                }
            }
            _ => current_key.push(ch),
        }
    }

    if !current_key.is_empty() {
        segments.push(PathSegment::Key(current_key));
    }

    segments
}

/// Get a reference to the value at the given path.
///
/// Returns `None` if the path doesn't exist.
pub fn get_at_path<'a>(value: &'a Value, segments: &[PathSegment]) -> Option<&'a Value> {
    segments.iter().try_fold(value, |current, segment| match segment {
        PathSegment::Key(key) => current.get(key),
        PathSegment::Index(idx) => current.get(*idx),
    })
}

/// Get a mutable reference to the value at the given path.
pub fn get_at_path_mut<'a>(
    value: &'a mut Value,
    segments: &[PathSegment],
) -> Option<&'a mut Value> {
    segments.iter().try_fold(value, |current, segment| match segment {
        PathSegment::Key(key) => current.get_mut(key),
        PathSegment::Index(idx) => current.get_mut(*idx),
    })
}

/// Set a value at the given path.
///
/// Missing intermediate object keys are created, and a `null` met on the
/// way is replaced by an object. Returns `false` when the path runs through
/// a scalar or an out-of-range array index.
///
/// # Examples
///
/// ```
/// use mirror_meta::path::{parse_path, set_at_path};
/// use serde_json::json;
///
/// let mut value = json!({});
/// assert!(set_at_path(&mut value, &parse_path("archive.directory"), json!("dist")));
/// assert_eq!(value, json!({"archive": {"directory": "dist"}}));
/// ```
pub fn set_at_path(value: &mut Value, segments: &[PathSegment], new_value: Value) -> bool {
    let Some((first, rest)) = segments.split_first() else {
        *value = new_value;
        return true;
    };

    if value.is_null() && matches!(first, PathSegment::Key(_)) {
        *value = Value::Object(Map::new());
    }

    let next = match (first, value) {
        (PathSegment::Key(key), Value::Object(map)) => {
            if rest.is_empty() {
                map.insert(key.clone(), new_value);
                return true;
            }
            map.entry(key.clone())
                .or_insert_with(|| Value::Object(Map::new()))
        }
        (PathSegment::Index(idx), Value::Array(arr)) => match arr.get_mut(*idx) {
            Some(item) => item,
            None => return false,
        },
        _ => return false,
    };

    set_at_path(next, rest, new_value)
}

/// Remove a value at the given path.
///
/// Returns the removed value if the path existed. Object key order of the
/// remaining entries is preserved.
pub fn remove_at_path(value: &mut Value, segments: &[PathSegment]) -> Option<Value> {
    let (last, parents) = segments.split_last()?;
    let parent = get_at_path_mut(value, parents)?;

    match (last, parent) {
        (PathSegment::Key(key), Value::Object(map)) => map.shift_remove(key),
        (PathSegment::Index(idx), Value::Array(arr)) if *idx < arr.len() => {
            Some(arr.remove(*idx))
        }
        _ => None,
    }
}

/// Expand dotted keys into nested objects.
///
/// `{"a.b": 1, "c": 2}` becomes `{"a": {"b": 1}, "c": 2}`. Later keys win
/// when two entries address the same path.
pub fn undot(flat: Map<String, Value>) -> Value {
    let mut nested = Value::Object(Map::new());
    for (key, value) in flat {
        let segments: Vec<PathSegment> = key
            .split('.')
            .filter(|part| !part.is_empty())
            .map(|part| PathSegment::Key(part.to_string()))
            .collect();
        if segments.is_empty() {
            continue;
        }
        if !set_at_path(&mut nested, &segments, value.clone()) {
            // A scalar sits where an object is needed; the later key wins
            if let (Value::Object(map), Some(PathSegment::Key(head))) =
                (&mut nested, segments.first())
            {
                map.insert(head.clone(), Value::Object(Map::new()));
            }
            set_at_path(&mut nested, &segments, value);
        }
    }
    nested
}
