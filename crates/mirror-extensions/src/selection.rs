//! Ordered extension enablement
//!
//! A run starts from a fixed set of always-enabled extensions, then applies
//! the configuration document's `s3-satis.plugins` section in document order,
//! then the `--extension` run options. Later layers override earlier ones.

use std::collections::{BTreeSet, HashMap};

use mirror_meta::path::{get_at_path, parse_path};
use serde_json::Value;

use crate::options::ExtensionOption;
use crate::{Error, PLUGINS_PATH, PluginConfig, Result};

/// The enabled extensions of one run and their settings.
#[derive(Debug, Clone, Default)]
pub struct ExtensionSelection {
    known: BTreeSet<String>,
    enabled: Vec<String>,
    configs: HashMap<String, PluginConfig>,
}

impl ExtensionSelection {
    /// Create a selection over the `known` extension keys, starting with
    /// `defaults` enabled.
    pub fn new<I, S>(known: I, defaults: &[&str]) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            known: known.into_iter().map(Into::into).collect(),
            enabled: defaults.iter().map(|key| key.to_string()).collect(),
            configs: HashMap::new(),
        }
    }

    /// Enable `key`, appending it to the enablement order if needed.
    ///
    /// Settings replace any previously attached ones; `None` keeps them.
    pub fn enable(&mut self, key: &str, config: Option<PluginConfig>) -> Result<()> {
        if !self.known.contains(key) {
            return Err(Error::UnknownExtension(key.to_string()));
        }
        if !self.is_enabled(key) {
            self.enabled.push(key.to_string());
        }
        if let Some(config) = config {
            self.configs.insert(key.to_string(), config);
        }
        Ok(())
    }

    /// Disable `key`. Disabling an extension that is not enabled is a no-op.
    pub fn disable(&mut self, key: &str) {
        self.enabled.retain(|enabled| enabled != key);
    }

    pub fn is_enabled(&self, key: &str) -> bool {
        self.enabled.iter().any(|enabled| enabled == key)
    }

    /// Enabled extension keys, in enablement order.
    pub fn enabled(&self) -> &[String] {
        &self.enabled
    }

    /// Settings attached to `key`, or empty settings.
    pub fn config_for(&self, key: &str) -> PluginConfig {
        self.configs.get(key).cloned().unwrap_or_default()
    }

    /// Apply the `s3-satis.plugins` section of a configuration document.
    ///
    /// Each entry is `true`, `false` or an object whose `enabled` member
    /// decides; an object without `enabled: true` disables. Objects always
    /// attach their other members as settings. Bad entries are returned and
    /// skipped.
    pub fn apply_document(&mut self, document: &Value) -> Vec<Error> {
        let mut errors = Vec::new();
        let Some(plugins) = get_at_path(document, &parse_path(PLUGINS_PATH)).and_then(Value::as_object)
        else {
            return errors;
        };

        for (key, setting) in plugins {
            let enabled = match setting {
                Value::Bool(enabled) => Some(*enabled),
                Value::Object(members) => match members.get("enabled") {
                    None => Some(false),
                    Some(Value::Bool(enabled)) => Some(*enabled),
                    Some(other) => {
                        errors.push(Error::InvalidSetting {
                            path: format!("{PLUGINS_PATH}.{key}.enabled"),
                            value: other.to_string(),
                        });
                        None
                    }
                },
                other => {
                    errors.push(Error::InvalidSetting {
                        path: format!("{PLUGINS_PATH}.{key}"),
                        value: other.to_string(),
                    });
                    None
                }
            };

            match enabled {
                Some(true) => match self.enable(key, None) {
                    Ok(()) => tracing::debug!(extension = %key, "Enabled extension"),
                    Err(e) => errors.push(e),
                },
                Some(false) => {
                    self.disable(key);
                    tracing::debug!(extension = %key, "Disabled extension");
                }
                None => {}
            }

            if setting.is_object() && self.known.contains(key) {
                self.configs
                    .insert(key.clone(), PluginConfig::from_value(setting));
            }
        }
        errors
    }

    /// Apply `--extension` run options in order.
    pub fn apply_run_options<S: AsRef<str>>(&mut self, options: &[S]) -> Vec<Error> {
        let mut errors = Vec::new();
        for option in options {
            let option = match ExtensionOption::parse(option.as_ref()) {
                Ok(option) => option,
                Err(e) => {
                    errors.push(e);
                    continue;
                }
            };

            if option.disable {
                self.disable(&option.key);
                tracing::debug!(extension = %option.key, "Disabled extension (from options)");
                continue;
            }

            match self.enable(&option.key, option.config) {
                Ok(()) => tracing::debug!(extension = %option.key, "Enabled extension (from options)"),
                Err(e) => errors.push(e),
            }
        }
        errors
    }
}
