//! Removal of selected fields from every version record

use mirror_meta::Rewrite;

use crate::extensions::{ExtensionDescriptor, HookContext, HookOutcome};
use crate::hooks::HookPoint;
use crate::Result;

pub const KEY: &str = "remove-fields-from-json";

pub fn descriptor() -> ExtensionDescriptor {
    ExtensionDescriptor::builder::<RemoveFields>("Remove Fields From JSON", KEY)
        .hook(HookPoint::AfterBuildSatisRepository, "remove", RemoveFields::remove)
        .build()
}

/// Drops the fields listed in the `remove` setting, for example
/// `remove=[authors,homepage]`
#[derive(Debug, Default)]
pub struct RemoveFields;

impl RemoveFields {
    fn remove(&mut self, ctx: &mut HookContext<'_>) -> Result<HookOutcome> {
        let fields = ctx.config.get_strings("remove");
        if fields.is_empty() {
            tracing::debug!("No fields configured for removal");
            return Ok(HookOutcome::Continue);
        }

        ctx.transformer().for_each_version(|version, _package, _file| {
            if let Some(record) = version.as_object_mut() {
                for field in &fields {
                    record.shift_remove(field.as_str());
                }
            }
            Rewrite::Keep
        })?;
        Ok(HookOutcome::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::test_support::{Harness, versions};
    use mirror_extensions::PluginConfig;
    use mirror_test_utils::metadata::assert_includes_consistent;
    use mirror_test_utils::{MetadataFixture, version};
    use serde_json::json;

    fn fixture() -> MetadataFixture {
        MetadataFixture::new()
            .package("acme/foo", vec![version("acme/foo", "1.0.0", None)])
            .include("all", vec![("acme/bar", vec![version("acme/bar", "2.0.0", None)])])
    }

    #[test]
    fn test_removes_exactly_the_listed_fields() {
        let mut harness = Harness::new(&json!({}));
        let root = fixture().write(&harness.prefix_dir());
        let settings = PluginConfig::from_value(&json!({"remove": ["authors", "homepage"]}));

        RemoveFields
            .remove(&mut harness.context(HookPoint::AfterBuildSatisRepository, &settings))
            .unwrap();

        let document = harness.read_staged_json("p2/acme/foo.json");
        for record in versions(&document) {
            assert!(record.get("authors").is_none());
            assert!(record.get("homepage").is_none());
            assert!(record.get("source").is_some());
            assert!(record.get("support").is_some());
        }

        let include = harness
            .read_staged_json("packages.json")["includes"]
            .as_object()
            .unwrap()
            .keys()
            .next()
            .unwrap()
            .clone();
        assert_ne!(Some(&include), root["includes"].as_object().unwrap().keys().next());
        for record in versions(&harness.read_staged_json(&include)) {
            assert!(record.get("authors").is_none());
        }
        assert_includes_consistent(&harness.prefix_dir());
    }

    #[test]
    fn test_nothing_listed_leaves_files_untouched() {
        let mut harness = Harness::new(&json!({}));
        fixture().write(&harness.prefix_dir());
        let before = harness.read_staged("p2/acme/foo.json");
        let settings = PluginConfig::default();

        RemoveFields
            .remove(&mut harness.context(HookPoint::AfterBuildSatisRepository, &settings))
            .unwrap();

        assert_eq!(harness.read_staged("p2/acme/foo.json"), before);
    }
}
