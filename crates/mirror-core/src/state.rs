//! Per-run build state
//!
//! One [`BuildState`] threads through every stage and hook of a run. The
//! staging prefix is derived from the configuration path once, at
//! construction, and never changes afterwards, even when an extension
//! points the generator at a rewritten configuration file.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use mirror_fs::{checksum, path};
use mirror_meta::path::{get_at_path, parse_path};
use serde_json::Value;

use crate::{Error, Result};

/// Mutable state of one pipeline run
#[derive(Debug, Clone)]
pub struct BuildState {
    temp_prefix: String,
    config_file_path: PathBuf,
    repository_urls: Vec<String>,
    force_fresh_downloads: bool,
    placeholders: BTreeSet<String>,
    checksum_index: BTreeMap<String, u32>,
    config: Value,
    last_step_executed: bool,
}

impl BuildState {
    /// Load the configuration at `config_file_path` and start a run.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigNotFound`] if the file does not exist and
    /// [`Error::ConfigParse`] if it is not a JSON object.
    pub fn new(
        config_file_path: impl Into<PathBuf>,
        repository_urls: Vec<String>,
        force_fresh_downloads: bool,
    ) -> Result<Self> {
        let config_file_path = config_file_path.into();
        let config = load_config(&config_file_path)?;
        let temp_prefix = temp_prefix_for(&config_file_path);

        tracing::debug!(
            config = %config_file_path.display(),
            prefix = %temp_prefix,
            "Initialized build state"
        );

        Ok(Self {
            temp_prefix,
            config_file_path,
            repository_urls,
            force_fresh_downloads,
            placeholders: BTreeSet::new(),
            checksum_index: BTreeMap::new(),
            config,
            last_step_executed: false,
        })
    }

    /// Staging subtree of this run
    pub fn temp_prefix(&self) -> &str {
        &self.temp_prefix
    }

    /// Staging path of a repository-relative path (`<prefix>/<relative>`)
    pub fn staging_path(&self, relative: &str) -> String {
        path::join(&self.temp_prefix, relative)
    }

    /// Repository-relative path of a staging path
    pub fn relative_path(&self, staging_path: &str) -> String {
        path::strip_prefix(staging_path, &self.temp_prefix)
    }

    pub fn config_file_path(&self) -> &Path {
        &self.config_file_path
    }

    pub fn set_config_file_path(&mut self, path: impl Into<PathBuf>) {
        self.config_file_path = path.into();
    }

    pub fn repository_urls(&self) -> &[String] {
        &self.repository_urls
    }

    pub fn set_repository_urls(&mut self, urls: Vec<String>) {
        self.repository_urls = urls;
    }

    pub fn add_repository_url(&mut self, url: impl Into<String>) {
        self.repository_urls.push(url.into());
    }

    pub fn is_force_fresh_downloads(&self) -> bool {
        self.force_fresh_downloads
    }

    /// Staging paths that hold zero-byte stand-ins for archives
    pub fn placeholders(&self) -> &BTreeSet<String> {
        &self.placeholders
    }

    pub fn add_placeholder(&mut self, staging_path: impl Into<String>) {
        self.placeholders.insert(staging_path.into());
    }

    pub fn is_placeholder(&self, staging_path: &str) -> bool {
        self.placeholders.contains(staging_path)
    }

    /// CRC32 of each staging path's content as last known in the remote store
    pub fn checksum_index(&self) -> &BTreeMap<String, u32> {
        &self.checksum_index
    }

    pub fn record_checksum(&mut self, staging_path: impl Into<String>, crc: u32) {
        self.checksum_index.insert(staging_path.into(), crc);
    }

    pub fn known_checksum(&self, staging_path: &str) -> Option<u32> {
        self.checksum_index.get(staging_path).copied()
    }

    /// The parsed configuration document
    pub fn config(&self) -> &Value {
        &self.config
    }

    /// Look up a configuration value by dotted path (`archive.prefix-url`)
    pub fn config_value(&self, dotted: &str) -> Option<&Value> {
        get_at_path(&self.config, &parse_path(dotted))
    }

    pub fn last_step_executed(&self) -> bool {
        self.last_step_executed
    }

    pub fn set_last_step_executed(&mut self, executed: bool) {
        self.last_step_executed = executed;
    }

    pub fn is_last_step_skipped(&self) -> bool {
        !self.last_step_executed
    }
}

/// Staging prefix for a configuration path: decimal CRC32 of the path text
pub fn temp_prefix_for(config_file_path: &Path) -> String {
    checksum::crc32(config_file_path.to_string_lossy().as_bytes()).to_string()
}

fn load_config(path: &Path) -> Result<Value> {
    let content = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::ConfigNotFound {
            path: path.to_path_buf(),
        },
        _ => Error::io(path, e),
    })?;
    let config: Value = serde_json::from_slice(&content).map_err(|e| Error::ConfigParse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    if !config.is_object() {
        return Err(Error::ConfigParse {
            path: path.to_path_buf(),
            reason: "the root value is not an object".to_string(),
        });
    }
    Ok(config)
}
