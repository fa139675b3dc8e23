//! Package metadata documents
//!
//! The root `packages.json` points at two kinds of per-package files:
//! `metadata-url` files (one per package and `~dev` variant) and
//! hash-addressed `includes` files. [`RootDocument`] exposes both sets of
//! paths and keeps the includes table editable in place.

use mirror_fs::{Storage, path};
use serde_json::{Map, Value};

use crate::{Error, Result, json};

/// File name of the root metadata document.
pub const ROOT_FILE: &str = "packages.json";

/// Placeholder substituted with the package name in `metadata-url`.
pub const PACKAGE_PLACEHOLDER: &str = "%package%";

/// Suffix of the development-versions variant of a package file.
pub const DEV_SUFFIX: &str = "~dev";

/// Load and parse a JSON object document from `storage`.
pub fn load(storage: &dyn Storage, file: &str) -> Result<Value> {
    let content = storage.get(file)?;
    let value = json::parse(file, &content)?;
    if !value.is_object() {
        return Err(Error::invalid_document(file, "root is not an object"));
    }
    Ok(value)
}

/// Serialize `value` canonically and write it to `storage`.
pub fn save(storage: &dyn Storage, file: &str, value: &Value) -> Result<Vec<u8>> {
    let content = json::to_canonical_vec(value)?;
    storage.put(file, &content)?;
    Ok(content)
}

/// An entry of the root `includes` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Include {
    /// Path relative to the repository root
    pub path: String,
    /// Declared SHA-1 of the file content, if any
    pub sha1: Option<String>,
}

/// The root `packages.json` of a generated repository.
#[derive(Debug, Clone)]
pub struct RootDocument {
    value: Value,
}

impl RootDocument {
    /// Load the root document below `prefix`.
    pub fn load(storage: &dyn Storage, prefix: &str) -> Result<Self> {
        let value = load(storage, &path::join(prefix, ROOT_FILE))?;
        Ok(Self { value })
    }

    /// Wrap an already parsed root document.
    pub fn from_value(value: Value) -> Self {
        Self { value }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Write the document back below `prefix`.
    pub fn save(&self, storage: &dyn Storage, prefix: &str) -> Result<()> {
        save(storage, &path::join(prefix, ROOT_FILE), &self.value)?;
        Ok(())
    }

    pub fn available_packages(&self) -> Vec<&str> {
        self.value
            .get("available-packages")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    pub fn metadata_url(&self) -> Option<&str> {
        self.value.get("metadata-url").and_then(Value::as_str)
    }

    /// Relative paths of the metadata files for `package`: the stable file
    /// and its `~dev` variant. Empty when no `metadata-url` is declared.
    pub fn package_file_paths(&self, package: &str) -> Vec<String> {
        let Some(template) = self.metadata_url() else {
            return Vec::new();
        };
        [package.to_string(), format!("{package}{DEV_SUFFIX}")]
            .iter()
            .map(|name| path::normalize(&template.replace(PACKAGE_PLACEHOLDER, name)))
            .collect()
    }

    /// Entries of the `includes` table, in document order.
    pub fn includes(&self) -> Vec<Include> {
        let Some(includes) = self.value.get("includes").and_then(Value::as_object) else {
            return Vec::new();
        };
        includes
            .iter()
            .map(|(path, params)| Include {
                path: path.clone(),
                sha1: params
                    .get("sha1")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            })
            .collect()
    }

    /// Rename an include entry and update its declared hash.
    ///
    /// The entry keeps its position in the table and any other parameters.
    pub fn update_include(&mut self, old_path: &str, new_path: &str, sha1: &str) -> Result<()> {
        let Some(includes) = self.value.get_mut("includes").and_then(Value::as_object_mut) else {
            return Err(Error::transform(format!(
                "root document has no includes table for '{old_path}'"
            )));
        };
        if old_path != new_path && includes.contains_key(new_path) {
            return Err(Error::transform(format!(
                "include '{new_path}' is already declared"
            )));
        }

        let entries = std::mem::take(includes);
        let mut renamed = Map::with_capacity(entries.len());
        let mut found = false;
        for (path, mut params) in entries {
            if path == old_path {
                found = true;
                if let Value::Object(params) = &mut params {
                    params.insert("sha1".to_string(), Value::String(sha1.to_string()));
                }
                renamed.insert(new_path.to_string(), params);
            } else {
                renamed.insert(path, params);
            }
        }
        *includes = renamed;

        if found {
            Ok(())
        } else {
            Err(Error::transform(format!("include '{old_path}' is not declared")))
        }
    }
}
