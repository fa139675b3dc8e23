//! Handler context

use mirror_extensions::PluginConfig;
use mirror_fs::{LocalStorage, Storage};
use mirror_meta::MetadataTransformer;

use crate::generator::RepositoryGenerator;
use crate::hooks::HookPoint;
use crate::prompt::Prompter;
use crate::state::BuildState;

/// What a handler returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookOutcome {
    /// Let the bracketed stage run
    Continue,
    /// Veto the bracketed stage (only meaningful for `BEFORE_*` hooks)
    Skip,
}

/// Collaborators of one run
pub struct RunEnvironment {
    /// Local staging area; each run works below its own prefix
    pub staging: LocalStorage,
    /// Store holding the published mirror
    pub remote: Box<dyn Storage>,
    pub generator: Box<dyn RepositoryGenerator>,
    pub prompter: Box<dyn Prompter>,
}

/// Everything a handler can see and change for one invocation
pub struct HookContext<'a> {
    /// The hook point being dispatched
    pub hook: HookPoint,
    pub state: &'a mut BuildState,
    /// Settings of the extension owning the handler
    pub config: &'a PluginConfig,
    pub env: &'a RunEnvironment,
}

impl<'a> HookContext<'a> {
    pub fn staging(&self) -> &'a LocalStorage {
        &self.env.staging
    }

    /// Transformer over this run's staged repository metadata
    pub fn transformer(&self) -> MetadataTransformer<'a> {
        MetadataTransformer::new(&self.env.staging, self.state.temp_prefix())
    }

    /// Host that serves locally mirrored archives: `archive.prefix-url`,
    /// falling back to `homepage`
    pub fn archive_host(&self) -> Option<String> {
        self.state
            .config_value("archive.prefix-url")
            .or_else(|| self.state.config_value("homepage"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
    }
}
