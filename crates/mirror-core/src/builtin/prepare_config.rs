//! Generator configuration preparation
//!
//! The generator must not see the reserved `s3-satis` section, so before the
//! build the configuration is rewritten without it into the staging prefix
//! and the build state points at that file. Before upload the file is
//! removed again and the original path restored.

use std::path::PathBuf;

use mirror_extensions::CONFIG_SECTION;
use mirror_fs::Storage;
use mirror_meta::json;
use mirror_meta::path::{parse_path, remove_at_path};

use crate::extensions::{ExtensionDescriptor, HookContext, HookOutcome};
use crate::hooks::HookPoint;
use crate::Result;

pub const KEY: &str = "prepare-config-for-satis";

/// File name of the rewritten configuration inside the staging prefix
pub const GENERATOR_CONFIG_FILE: &str = "satis.json";

pub fn descriptor() -> ExtensionDescriptor {
    ExtensionDescriptor::builder::<PrepareConfig>("Prepare Config For Satis", KEY)
        .hook(HookPoint::BeforeBuildSatisRepository, "prepare", PrepareConfig::prepare)
        .hook(HookPoint::BeforeUploadToS3, "cleanup", PrepareConfig::cleanup)
        .build()
}

#[derive(Debug, Default)]
pub struct PrepareConfig {
    original_path: Option<PathBuf>,
}

impl PrepareConfig {
    fn prepare(&mut self, ctx: &mut HookContext<'_>) -> Result<HookOutcome> {
        let mut config = ctx.state.config().clone();
        remove_at_path(&mut config, &parse_path(CONFIG_SECTION));

        let staged = ctx.state.staging_path(GENERATOR_CONFIG_FILE);
        ctx.staging().put(&staged, &json::to_canonical_vec(&config)?)?;
        let path = ctx.staging().absolute(&staged)?;

        tracing::debug!(path = %path.display(), "Wrote generator configuration");

        if self.original_path.is_none() {
            self.original_path = Some(ctx.state.config_file_path().to_path_buf());
        }
        ctx.state.set_config_file_path(path);
        Ok(HookOutcome::Continue)
    }

    fn cleanup(&mut self, ctx: &mut HookContext<'_>) -> Result<HookOutcome> {
        let staged = ctx.state.staging_path(GENERATOR_CONFIG_FILE);
        ctx.staging().delete(&staged)?;

        if let Some(original) = self.original_path.take() {
            ctx.state.set_config_file_path(original);
        }
        Ok(HookOutcome::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::test_support::Harness;
    use mirror_extensions::PluginConfig;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_prepare_strips_reserved_section_and_repoints_config() {
        let config = json!({
            "name": "acme/mirror",
            "s3-satis": {"plugins": {"cache": true}},
            "archive": {"directory": "dist"}
        });
        let mut harness = Harness::new(&config);
        let original = harness.state.config_file_path().to_path_buf();
        let settings = PluginConfig::default();
        let mut extension = PrepareConfig::default();

        extension
            .prepare(&mut harness.context(HookPoint::BeforeBuildSatisRepository, &settings))
            .unwrap();

        assert_eq!(
            harness.read_staged_json(GENERATOR_CONFIG_FILE),
            json!({"name": "acme/mirror", "archive": {"directory": "dist"}})
        );
        assert_eq!(
            harness.state.config_file_path(),
            harness.prefix_dir().join(GENERATOR_CONFIG_FILE)
        );
        // The in-memory configuration keeps its reserved section
        assert!(harness.state.config_value("s3-satis.plugins").is_some());

        extension
            .cleanup(&mut harness.context(HookPoint::BeforeUploadToS3, &settings))
            .unwrap();

        assert!(!harness.staged_exists(GENERATOR_CONFIG_FILE));
        assert_eq!(harness.state.config_file_path(), original);
    }

    #[test]
    fn test_cleanup_without_prepare_keeps_path() {
        let mut harness = Harness::new(&json!({}));
        let original = harness.state.config_file_path().to_path_buf();
        let settings = PluginConfig::default();

        PrepareConfig::default()
            .cleanup(&mut harness.context(HookPoint::BeforeUploadToS3, &settings))
            .unwrap();

        assert_eq!(harness.state.config_file_path(), original);
    }
}
