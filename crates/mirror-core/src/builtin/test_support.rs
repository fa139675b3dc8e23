//! Harness for calling built-in extension handlers directly

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use mirror_extensions::PluginConfig;
use mirror_fs::{LocalStorage, Storage};
use serde_json::Value;
use tempfile::TempDir;

use crate::extensions::{HookContext, RunEnvironment};
use crate::generator::RepositoryGenerator;
use crate::hooks::HookPoint;
use crate::prompt::Prompter;
use crate::state::BuildState;
use crate::Result;

/// Shared log of generator and prompter calls
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub struct RecordingGenerator {
    pub calls: CallLog,
}

impl RepositoryGenerator for RecordingGenerator {
    fn build(&self, config: &Path, output_dir: &Path, _urls: &[String]) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("build {} {}", config.display(), output_dir.display()));
        Ok(())
    }

    fn purge(&self, config: &Path, output_dir: &Path) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("purge {} {}", config.display(), output_dir.display()));
        Ok(())
    }
}

pub struct RecordingPrompter {
    pub calls: CallLog,
}

impl Prompter for RecordingPrompter {
    fn wait_for_confirmation(&self, message: &str) -> Result<()> {
        self.calls.lock().unwrap().push(format!("prompt {message}"));
        Ok(())
    }
}

/// A build state over a temp directory with staging and remote storages
pub struct Harness {
    pub dir: TempDir,
    pub state: BuildState,
    pub env: RunEnvironment,
    pub calls: CallLog,
}

impl Harness {
    pub fn new(config: &Value) -> Self {
        Self::with_fresh(config, false)
    }

    pub fn with_fresh(config: &Value, fresh: bool) -> Self {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("satis.json");
        std::fs::write(&config_path, serde_json::to_vec(config).unwrap()).unwrap();
        let calls = CallLog::default();
        let env = RunEnvironment {
            staging: LocalStorage::new(dir.path().join("staging")),
            remote: Box::new(LocalStorage::new(dir.path().join("remote"))),
            generator: Box::new(RecordingGenerator {
                calls: Arc::clone(&calls),
            }),
            prompter: Box::new(RecordingPrompter {
                calls: Arc::clone(&calls),
            }),
        };
        let state = BuildState::new(&config_path, vec![], fresh).unwrap();
        Self {
            dir,
            state,
            env,
            calls,
        }
    }

    pub fn context<'a>(&'a mut self, hook: HookPoint, config: &'a PluginConfig) -> HookContext<'a> {
        let Self { state, env, .. } = self;
        HookContext {
            hook,
            state,
            config,
            env,
        }
    }

    pub fn staging(&self) -> &LocalStorage {
        &self.env.staging
    }

    /// Native directory of this run's staging prefix
    pub fn prefix_dir(&self) -> PathBuf {
        self.env.staging.absolute(self.state.temp_prefix()).unwrap()
    }

    pub fn put_staged(&self, relative: &str, content: &[u8]) {
        self.env
            .staging
            .put(&self.state.staging_path(relative), content)
            .unwrap();
    }

    pub fn read_staged(&self, relative: &str) -> Vec<u8> {
        self.env.staging.get(&self.state.staging_path(relative)).unwrap()
    }

    pub fn read_staged_json(&self, relative: &str) -> Value {
        serde_json::from_slice(&self.read_staged(relative)).unwrap()
    }

    pub fn staged_exists(&self, relative: &str) -> bool {
        self.env.staging.exists(&self.state.staging_path(relative))
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

/// Every version record in a package metadata file
pub fn versions(document: &Value) -> Vec<Value> {
    let Some(packages) = document["packages"].as_object() else {
        return Vec::new();
    };
    packages
        .values()
        .flat_map(|group| match group {
            Value::Array(list) => list.clone(),
            Value::Object(map) => map.values().cloned().collect(),
            _ => Vec::new(),
        })
        .collect()
}
