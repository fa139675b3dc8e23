//! Package metadata transformer
//!
//! Applies a rewrite callback to every package version group (or version
//! record) reachable from a generated repository's root document, writing
//! back only the files whose content changed.
//!
//! Include files are content addressed: their path embeds the SHA-1 of the
//! file, and the root document declares the same hash. When a callback
//! changes an include file, the new bytes are hashed and the root entry is
//! renamed in place. Every rename is checked before anything is written;
//! then the new include files and the root document are written, and the
//! old include files are removed last.

use mirror_fs::{Storage, checksum, path};
use serde_json::{Map, Value};

use crate::document::{self, RootDocument};
use crate::{Error, Result};

/// What to do with a value handed to a transform callback.
#[derive(Debug, Clone, PartialEq)]
pub enum Rewrite {
    /// Keep the value, including any in-place changes made to it
    Keep,
    /// Remove the value from its container
    Drop,
    /// Replace the value
    Replace(Value),
}

/// A changed include file waiting to be written
struct IncludeRewrite {
    old_file: String,
    new_file: String,
    content: Vec<u8>,
}

/// Rewrites the metadata documents of one staged repository.
pub struct MetadataTransformer<'a> {
    storage: &'a dyn Storage,
    prefix: String,
}

impl<'a> MetadataTransformer<'a> {
    /// Create a transformer for the repository staged below `prefix`.
    pub fn new(storage: &'a dyn Storage, prefix: impl Into<String>) -> Self {
        Self {
            storage,
            prefix: prefix.into(),
        }
    }

    /// Call `callback` with every version record of every package.
    ///
    /// The callback receives the record, the package name and the metadata
    /// file path relative to the repository root.
    pub fn for_each_version<F>(&self, mut callback: F) -> Result<()>
    where
        F: FnMut(&mut Value, &str, &str) -> Rewrite,
    {
        self.for_each_package_version_group(|group, package, file| {
            rewrite_versions(group, package, file, &mut callback);
            Rewrite::Keep
        })
    }

    /// Call `callback` with the version group of every package.
    ///
    /// A version group is a list of version records in `metadata-url` files
    /// and a version-keyed mapping in include files.
    pub fn for_each_package_version_group<F>(&self, mut callback: F) -> Result<()>
    where
        F: FnMut(&mut Value, &str, &str) -> Rewrite,
    {
        let mut root = RootDocument::load(self.storage, &self.prefix)?;

        let package_files: Vec<String> = root
            .available_packages()
            .into_iter()
            .flat_map(|package| root.package_file_paths(package))
            .collect();

        for relative in package_files {
            let file = path::join(&self.prefix, &relative);
            if !self.storage.exists(&file) {
                tracing::debug!(file = %relative, "Package metadata file not staged, skipping");
                continue;
            }
            if let Some(content) = self.rewrite_file(&file, &relative, &mut callback)? {
                self.storage.put(&file, &content)?;
                tracing::debug!(file = %relative, "Rewrote package metadata file");
            }
        }

        // Plan every include rewrite before touching disk so that a failure
        // leaves the root document and the include files in agreement.
        let mut planned: Vec<IncludeRewrite> = Vec::new();
        for include in root.includes() {
            let file = path::join(&self.prefix, &include.path);
            if !self.storage.exists(&file) {
                return Err(Error::transform(format!(
                    "include file '{}' declared in the root document is missing",
                    include.path
                )));
            }
            let Some(content) = self.rewrite_file(&file, &include.path, &mut callback)? else {
                continue;
            };

            let new_sha1 = checksum::sha1_hex(&content);
            let new_path = match &include.sha1 {
                Some(old_sha1) if !old_sha1.is_empty() => include.path.replace(old_sha1, &new_sha1),
                _ => include.path.clone(),
            };
            let new_file = path::join(&self.prefix, &new_path);
            if new_path != include.path
                && (self.storage.exists(&new_file) || planned.iter().any(|p| p.new_file == new_file))
            {
                return Err(Error::transform(format!(
                    "cannot rename include '{}': '{new_path}' already exists",
                    include.path
                )));
            }

            root.update_include(&include.path, &new_path, &new_sha1)?;
            tracing::debug!(from = %include.path, to = %new_path, "Rewrote include file");
            planned.push(IncludeRewrite {
                old_file: file,
                new_file,
                content,
            });
        }

        if planned.is_empty() {
            return Ok(());
        }

        for rewrite in &planned {
            self.storage.put(&rewrite.new_file, &rewrite.content)?;
        }
        root.save(self.storage, &self.prefix)?;

        for rewrite in planned.iter().filter(|r| r.old_file != r.new_file) {
            self.storage.delete(&rewrite.old_file)?;
        }
        Ok(())
    }

    /// Apply `callback` to every package in `file`. Returns the new canonical
    /// content when anything changed.
    fn rewrite_file<F>(&self, file: &str, relative: &str, callback: &mut F) -> Result<Option<Vec<u8>>>
    where
        F: FnMut(&mut Value, &str, &str) -> Rewrite,
    {
        let mut value = document::load(self.storage, file)?;
        let original = value.clone();

        if let Some(Value::Object(packages)) = value.get_mut("packages") {
            let entries = std::mem::take(packages);
            let mut kept = Map::with_capacity(entries.len());
            for (package, mut group) in entries {
                match callback(&mut group, &package, relative) {
                    Rewrite::Keep => {
                        kept.insert(package, group);
                    }
                    Rewrite::Replace(replacement) => {
                        kept.insert(package, replacement);
                    }
                    Rewrite::Drop => {}
                }
            }
            *packages = kept;
        }

        if value == original {
            return Ok(None);
        }
        crate::json::to_canonical_vec(&value).map(Some)
    }
}

/// Apply a per-version callback to one version group.
fn rewrite_versions<F>(group: &mut Value, package: &str, file: &str, callback: &mut F)
where
    F: FnMut(&mut Value, &str, &str) -> Rewrite,
{
    match group {
        Value::Array(versions) => {
            let mut kept = Vec::with_capacity(versions.len());
            for mut version in std::mem::take(versions) {
                match callback(&mut version, package, file) {
                    Rewrite::Keep => kept.push(version),
                    Rewrite::Replace(replacement) => kept.push(replacement),
                    Rewrite::Drop => {}
                }
            }
            *versions = kept;
        }
        Value::Object(versions) => {
            let mut kept = Map::with_capacity(versions.len());
            for (key, mut version) in std::mem::take(versions) {
                match callback(&mut version, package, file) {
                    Rewrite::Keep => {
                        kept.insert(key, version);
                    }
                    Rewrite::Replace(replacement) => {
                        kept.insert(key, replacement);
                    }
                    Rewrite::Drop => {}
                }
            }
            *versions = kept;
        }
        _ => {}
    }
}
