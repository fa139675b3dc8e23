//! Purge of unreferenced archives after a build

use crate::extensions::{ExtensionDescriptor, HookContext, HookOutcome};
use crate::hooks::HookPoint;
use crate::Result;

pub const KEY: &str = "satis-purge";

pub fn descriptor() -> ExtensionDescriptor {
    ExtensionDescriptor::builder::<SatisPurge>("Satis Purge after Build", KEY)
        .hook(HookPoint::AfterBuildSatisRepository, "purge", SatisPurge::purge)
        .build()
}

/// Runs the generator's purge when the configuration archives packages
#[derive(Debug, Default)]
pub struct SatisPurge;

impl SatisPurge {
    fn purge(&mut self, ctx: &mut HookContext<'_>) -> Result<HookOutcome> {
        if ctx.state.config().get("archive").is_none() {
            tracing::debug!("No archive section configured, skipping purge");
            return Ok(HookOutcome::Continue);
        }

        let output_dir = ctx.staging().absolute(ctx.state.temp_prefix())?;
        ctx.env
            .generator
            .purge(ctx.state.config_file_path(), &output_dir)?;
        Ok(HookOutcome::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::test_support::Harness;
    use mirror_extensions::PluginConfig;
    use serde_json::json;

    #[test]
    fn test_purges_when_archive_is_configured() {
        let mut harness = Harness::new(&json!({"archive": {"directory": "dist"}}));
        let settings = PluginConfig::default();

        SatisPurge
            .purge(&mut harness.context(HookPoint::AfterBuildSatisRepository, &settings))
            .unwrap();

        let expected = format!(
            "purge {} {}",
            harness.state.config_file_path().display(),
            harness.prefix_dir().display()
        );
        assert_eq!(harness.calls(), vec![expected]);
    }

    #[test]
    fn test_no_archive_section_means_no_purge() {
        let mut harness = Harness::new(&json!({"name": "acme/mirror"}));
        let settings = PluginConfig::default();

        SatisPurge
            .purge(&mut harness.context(HookPoint::AfterBuildSatisRepository, &settings))
            .unwrap();

        assert!(harness.calls().is_empty());
    }
}
