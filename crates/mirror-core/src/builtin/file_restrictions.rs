//! File restrictions map generator
//!
//! Writes `.tags/<archive path>.json` for every locally hosted archive,
//! listing the version tags that may download it:
//!
//! ```text
//! acme/foo:1.2.3.0, acme/foo:1.2.3.x, acme/foo:1.2.x, acme/foo:1.x
//! ```
//!
//! With `extra-json` enabled the tags are also stored in the `extra`
//! section of each version record in `p2/` files.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use mirror_fs::Storage;
use mirror_meta::{Rewrite, json};
use regex::Regex;
use serde_json::Value;

use super::{local_archive_path, version_label};
use crate::extensions::{ExtensionDescriptor, HookContext, HookOutcome};
use crate::hooks::HookPoint;
use crate::Result;

pub const KEY: &str = "file-restrictions-map-generator";

/// Directory of the tag files
pub const TAGS_DIRECTORY: &str = ".tags";

/// Key of the tag list inside a version record's `extra` section
pub const EXTRA_KEY: &str = "s3-satis-file-restrictions";

static NORMALIZED_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\.(\d+)\.(\d+)\.(\d+)$").expect("Invalid normalized version regex")
});

pub fn descriptor() -> ExtensionDescriptor {
    ExtensionDescriptor::builder::<FileRestrictions>("File Restrictions Map File Generator", KEY)
        .hook(
            HookPoint::AfterBuildSatisRepository,
            "generate",
            FileRestrictions::generate,
        )
        .build()
}

/// Tags granting access to `package` at `version_normalized`
pub fn tags_for_version(package: &str, version_normalized: &str) -> Vec<String> {
    let mut tags = vec![format!("{package}:{version_normalized}")];
    if let Some(caps) = NORMALIZED_VERSION.captures(version_normalized) {
        let (major, minor, patch) = (&caps[1], &caps[2], &caps[3]);
        tags.push(format!("{package}:{major}.{minor}.{patch}.x"));
        tags.push(format!("{package}:{major}.{minor}.x"));
        tags.push(format!("{package}:{major}.x"));
    }
    tags
}

#[derive(Debug, Default)]
pub struct FileRestrictions;

impl FileRestrictions {
    fn generate(&mut self, ctx: &mut HookContext<'_>) -> Result<HookOutcome> {
        let host = ctx.archive_host();
        let extra_json = ctx.config.get_bool("extra-json", false);
        let mut tagged: BTreeMap<String, Vec<String>> = BTreeMap::new();

        ctx.transformer().for_each_version(|version, package, file| {
            let label = version_label(package, version);
            let Some(url) = version.pointer("/dist/url").and_then(Value::as_str) else {
                tracing::debug!("Version {label} does not have a dist url, skipping");
                return Rewrite::Keep;
            };

            let normalized = version
                .get("version_normalized")
                .and_then(Value::as_str)
                .unwrap_or_default();
            let tags = tags_for_version(package, normalized);

            match local_archive_path(url, host.as_deref()) {
                Some(path) => {
                    let entry = tagged.entry(path).or_default();
                    for tag in &tags {
                        if !entry.contains(tag) {
                            entry.push(tag.clone());
                        }
                    }
                }
                None => tracing::debug!("Version {label} has a remote url, skipping"),
            }
            tracing::debug!("Version {label} has been tagged with: {}", tags.join(", "));

            if !extra_json {
                return Rewrite::Keep;
            }
            if !file.trim_start_matches('/').starts_with("p2/") {
                tracing::debug!("Version {label} is not in a p2 package file, leaving record unchanged");
                return Rewrite::Keep;
            }
            if let Some(record) = version.as_object_mut() {
                let extra = record
                    .entry("extra")
                    .or_insert_with(|| Value::Object(Default::default()));
                if let Some(extra) = extra.as_object_mut() {
                    extra.insert(EXTRA_KEY.to_string(), Value::from(tags));
                }
            }
            Rewrite::Keep
        })?;

        let staging = ctx.staging();
        staging.delete_directory(&ctx.state.staging_path(TAGS_DIRECTORY))?;
        for (url, tags) in tagged {
            let file = ctx.state.staging_path(&format!("{TAGS_DIRECTORY}/{url}.json"));
            staging.put(&file, &json::to_canonical_vec(&Value::from(tags))?)?;
        }
        Ok(HookOutcome::Continue)
    }
}
