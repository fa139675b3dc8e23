//! Hook dispatch
//!
//! [`ExtensionRunner`] owns one run's extension selection and instances. For
//! each hook it runs every enabled extension's handlers in enablement order,
//! then declaration order. Any handler may veto the stage; all matching
//! handlers still run.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use mirror_extensions::ExtensionSelection;

use super::context::{HookContext, HookOutcome, RunEnvironment};
use super::registry::ExtensionRegistry;
use crate::builtin::ALWAYS_ENABLED;
use crate::hooks::HookPoint;
use crate::state::BuildState;
use crate::{Error, Result};

/// Dispatches hook points to the enabled extensions of one run
pub struct ExtensionRunner {
    registry: Arc<ExtensionRegistry>,
    selection: ExtensionSelection,
    instances: HashMap<&'static str, Box<dyn Any>>,
}

impl ExtensionRunner {
    pub fn new(registry: Arc<ExtensionRegistry>, selection: ExtensionSelection) -> Self {
        Self {
            registry,
            selection,
            instances: HashMap::new(),
        }
    }

    /// Runner over `registry` with the always-enabled extensions it knows
    pub fn with_defaults(registry: Arc<ExtensionRegistry>) -> Self {
        let defaults: Vec<&str> = ALWAYS_ENABLED
            .iter()
            .copied()
            .filter(|key| registry.contains(key))
            .collect();
        let selection = ExtensionSelection::new(registry.keys(), &defaults);
        Self::new(registry, selection)
    }

    pub fn registry(&self) -> &ExtensionRegistry {
        &self.registry
    }

    pub fn selection(&self) -> &ExtensionSelection {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut ExtensionSelection {
        &mut self.selection
    }

    /// Whether extension `key` has been instantiated in this run
    pub fn is_instantiated(&self, key: &str) -> bool {
        self.instances.contains_key(key)
    }

    /// Run every handler bound to `hook`.
    ///
    /// Returns `false` if any handler vetoed the stage. Handler errors
    /// propagate at once.
    pub fn dispatch(
        &mut self,
        hook: HookPoint,
        state: &mut BuildState,
        env: &RunEnvironment,
    ) -> Result<bool> {
        let registry = Arc::clone(&self.registry);
        let descriptors: Vec<_> = self
            .selection
            .enabled()
            .iter()
            .filter_map(|key| registry.get(key))
            .filter(|descriptor| descriptor.handles(hook))
            .collect();

        tracing::trace!(%hook, extensions = descriptors.len(), "Running plugin hook");

        for descriptor in &descriptors {
            self.instances.entry(descriptor.key()).or_insert_with(|| {
                tracing::trace!(extension = descriptor.key(), "Instantiating extension");
                descriptor.instantiate()
            });
        }

        let mut proceed = true;
        for descriptor in descriptors {
            let key = descriptor.key();
            let config = self.selection.config_for(key);
            let instance = self
                .instances
                .get_mut(key)
                .ok_or_else(|| Error::extension(key, "extension was not instantiated"))?;

            for handler in descriptor.handlers(hook) {
                tracing::trace!("Running {key}::{}() plugin hook", handler.method());
                let mut ctx = HookContext {
                    hook,
                    state: &mut *state,
                    config: &config,
                    env,
                };
                if handler.invoke(instance.as_mut(), &mut ctx)? == HookOutcome::Skip {
                    tracing::debug!("{key}::{}() plugin hook set a skip flag", handler.method());
                    proceed = false;
                }
            }
        }

        tracing::trace!(%hook, proceed, "Finished running plugin hook");
        Ok(proceed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extensions::ExtensionDescriptor;
    use crate::generator::RepositoryGenerator;
    use crate::prompt::AutoContinue;
    use mirror_extensions::PluginConfig;
    use mirror_fs::LocalStorage;
    use serde_json::json;
    use std::path::Path;
    use tempfile::TempDir;

    struct NoGenerator;

    impl RepositoryGenerator for NoGenerator {
        fn build(&self, _: &Path, _: &Path, _: &[String]) -> Result<()> {
            Ok(())
        }
        fn purge(&self, _: &Path, _: &Path) -> Result<()> {
            Ok(())
        }
    }

    fn fixture() -> (TempDir, BuildState, RunEnvironment) {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("satis.json");
        std::fs::write(&config, "{}").unwrap();
        let state = BuildState::new(&config, vec![], false).unwrap();
        let env = RunEnvironment {
            staging: LocalStorage::new(dir.path().join("staging")),
            remote: Box::new(LocalStorage::new(dir.path().join("remote"))),
            generator: Box::new(NoGenerator),
            prompter: Box::new(AutoContinue),
        };
        (dir, state, env)
    }

    #[derive(Default)]
    struct Recorder {
        seen: Vec<String>,
    }

    impl Recorder {
        fn record(&mut self, ctx: &mut HookContext<'_>) -> Result<HookOutcome> {
            self.seen.push(ctx.hook.to_string());
            let calls = self.seen.len();
            ctx.state.add_repository_url(format!("{}:{calls}", ctx.config.get_str("tag").unwrap_or("none")));
            Ok(HookOutcome::Continue)
        }

        fn veto(&mut self, ctx: &mut HookContext<'_>) -> Result<HookOutcome> {
            ctx.state.add_repository_url("veto");
            Ok(HookOutcome::Skip)
        }

        fn fail(&mut self, _ctx: &mut HookContext<'_>) -> Result<HookOutcome> {
            Err(Error::extension("recorder", "boom"))
        }
    }

    fn registry() -> Arc<ExtensionRegistry> {
        let mut registry = ExtensionRegistry::new();
        registry.register(
            ExtensionDescriptor::builder::<Recorder>("Recorder", "recorder")
                .hooks(HookPoint::ALL, "record", Recorder::record)
                .build(),
        );
        registry.register(
            ExtensionDescriptor::builder::<Recorder>("Veto", "veto")
                .hook(HookPoint::BeforeUploadToS3, "veto", Recorder::veto)
                .build(),
        );
        registry.register(
            ExtensionDescriptor::builder::<Recorder>("Failing", "failing")
                .hook(HookPoint::AfterUploadToS3, "fail", Recorder::fail)
                .build(),
        );
        Arc::new(registry)
    }

    #[test]
    fn test_no_enabled_extensions_never_vetoes() {
        let (_dir, mut state, env) = fixture();
        let mut runner = ExtensionRunner::with_defaults(registry());

        for hook in HookPoint::ALL {
            assert!(runner.dispatch(hook, &mut state, &env).unwrap());
        }
        assert!(state.repository_urls().is_empty());
    }

    #[test]
    fn test_veto_does_not_short_circuit() {
        let (_dir, mut state, env) = fixture();
        let mut runner = ExtensionRunner::with_defaults(registry());
        runner.selection_mut().enable("veto", None).unwrap();
        runner.selection_mut().enable("recorder", None).unwrap();

        let proceed = runner.dispatch(HookPoint::BeforeUploadToS3, &mut state, &env).unwrap();

        assert!(!proceed);
        assert_eq!(state.repository_urls(), &["veto", "none:1"]);
    }

    #[test]
    fn test_single_instance_with_latest_config() {
        let (_dir, mut state, env) = fixture();
        let mut runner = ExtensionRunner::with_defaults(registry());
        runner.selection_mut().enable("recorder", None).unwrap();
        runner
            .selection_mut()
            .enable("recorder", Some(PluginConfig::from_value(&json!({"tag": "latest"}))))
            .unwrap();

        runner.dispatch(HookPoint::BeforeDownloadFromS3, &mut state, &env).unwrap();
        runner.dispatch(HookPoint::AfterDownloadFromS3, &mut state, &env).unwrap();

        assert!(runner.is_instantiated("recorder"));
        assert!(!runner.is_instantiated("veto"));
        // The counter keeps growing because the same instance handles both hooks
        assert_eq!(state.repository_urls(), &["latest:1", "latest:2"]);
    }

    #[test]
    fn test_handler_errors_propagate() {
        let (_dir, mut state, env) = fixture();
        let mut runner = ExtensionRunner::with_defaults(registry());
        runner.selection_mut().enable("failing", None).unwrap();

        let result = runner.dispatch(HookPoint::AfterUploadToS3, &mut state, &env);
        assert!(matches!(result, Err(Error::Extension { .. })));
    }
}
