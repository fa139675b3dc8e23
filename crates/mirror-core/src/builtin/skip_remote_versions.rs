//! Removal of versions not served by this mirror

use mirror_meta::Rewrite;
use serde_json::Value;

use super::{local_archive_path, version_label};
use crate::extensions::{ExtensionDescriptor, HookContext, HookOutcome};
use crate::hooks::HookPoint;
use crate::Result;

pub const KEY: &str = "skip-remote-versions";

pub fn descriptor() -> ExtensionDescriptor {
    ExtensionDescriptor::builder::<SkipRemoteVersions>("Skip Remote Versions", KEY)
        .hook(
            HookPoint::AfterBuildSatisRepository,
            "drop_remote_versions",
            SkipRemoteVersions::drop_remote_versions,
        )
        .build()
}

/// Drops every version without a `dist.url` on the archive host
#[derive(Debug, Default)]
pub struct SkipRemoteVersions;

impl SkipRemoteVersions {
    fn drop_remote_versions(&mut self, ctx: &mut HookContext<'_>) -> Result<HookOutcome> {
        let host = ctx.archive_host();

        ctx.transformer().for_each_version(|version, package, _file| {
            let label = version_label(package, version);
            let Some(dist) = version.get("dist") else {
                tracing::debug!("Version {label} does not have a dist, removing");
                return Rewrite::Drop;
            };
            let Some(url) = dist.get("url").and_then(Value::as_str) else {
                tracing::debug!("Version {label} does not have a url, removing");
                return Rewrite::Drop;
            };
            if local_archive_path(url, host.as_deref()).is_none() {
                tracing::debug!("Version {label} has a remote url, removing");
                return Rewrite::Drop;
            }
            Rewrite::Keep
        })?;
        Ok(HookOutcome::Continue)
    }
}
