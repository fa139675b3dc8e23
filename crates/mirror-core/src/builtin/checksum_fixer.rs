//! Archive checksum maintenance
//!
//! Archives built in this run get a `.checksums/<path>.sha1` file next to
//! the mirror, and locally hosted versions get their `dist.shasum` set to
//! the recorded checksum. Placeholders keep whatever checksum the metadata
//! already declares.

use mirror_fs::{Storage, checksum, is_archive, path};
use mirror_meta::Rewrite;
use serde_json::Value;

use super::{local_archive_path, version_label};
use crate::extensions::{ExtensionDescriptor, HookContext, HookOutcome};
use crate::hooks::HookPoint;
use crate::{Error, Result};

pub const KEY: &str = "checksum-fixer";

/// Directory of the per-archive checksum files
pub const CHECKSUM_DIRECTORY: &str = ".checksums";

pub fn descriptor() -> ExtensionDescriptor {
    ExtensionDescriptor::builder::<ChecksumFixer>("CheckSum Fixer", KEY)
        .hook(HookPoint::BeforeUploadToS3, "save_checksums", ChecksumFixer::save_checksums)
        .hook(
            HookPoint::BeforeUploadToS3,
            "fix_packages_files",
            ChecksumFixer::fix_packages_files,
        )
        .build()
}

/// Repository-relative path of the checksum file for an archive
pub fn checksum_path(archive: &str) -> String {
    format!("{CHECKSUM_DIRECTORY}/{}.sha1", path::normalize(archive))
}

#[derive(Debug, Default)]
pub struct ChecksumFixer;

impl ChecksumFixer {
    fn save_checksums(&mut self, ctx: &mut HookContext<'_>) -> Result<HookOutcome> {
        let staging = ctx.staging();
        for staged in staging.list(ctx.state.temp_prefix())? {
            if !is_archive(&staged) {
                continue;
            }
            let relative = ctx.state.relative_path(&staged);

            if staging.size(&staged)? == 0 {
                tracing::debug!("File {relative} is a placeholder, skipping checksum");
                continue;
            }

            tracing::debug!("Generating checksum for {relative}");
            let sha1 = checksum::sha1_file(&staging.absolute(&staged)?)?;
            staging.put(&ctx.state.staging_path(&checksum_path(&relative)), sha1.as_bytes())?;
        }
        Ok(HookOutcome::Continue)
    }

    fn fix_packages_files(&mut self, ctx: &mut HookContext<'_>) -> Result<HookOutcome> {
        let host = ctx.archive_host();
        let staging = ctx.staging();
        let prefix = ctx.state.temp_prefix().to_string();
        let mut failure: Option<mirror_fs::Error> = None;

        ctx.transformer().for_each_version(|version, package, _file| {
            let label = version_label(package, version);
            let Some(dist) = version.get_mut("dist").and_then(Value::as_object_mut) else {
                tracing::debug!("Version {label} does not have a dist, skipping");
                return Rewrite::Keep;
            };
            let url = match (dist.get("url").and_then(Value::as_str), dist.get("shasum")) {
                (Some(url), Some(_)) => url.to_string(),
                _ => {
                    tracing::debug!("Version {label} does not have a shasum or url, skipping");
                    return Rewrite::Keep;
                }
            };
            let Some(local) = local_archive_path(&url, host.as_deref()) else {
                tracing::debug!("Version {label} has a remote url, skipping");
                return Rewrite::Keep;
            };

            let checksum_file = path::join(&prefix, &checksum_path(&local));
            if !staging.exists(&checksum_file) {
                tracing::debug!("Checksum file {checksum_file} does not exist, skipping");
                return Rewrite::Keep;
            }
            let checksum = match staging.get(&checksum_file) {
                Ok(content) => String::from_utf8_lossy(&content).trim().to_string(),
                Err(e) => {
                    failure.get_or_insert(e);
                    return Rewrite::Keep;
                }
            };

            if dist.get("shasum").and_then(Value::as_str) == Some(checksum.as_str()) {
                tracing::debug!("Version {label} has a local url and the checksum is correct");
                return Rewrite::Keep;
            }

            tracing::debug!("Version {label} has a local url, fixing checksum");
            dist.insert("shasum".to_string(), Value::String(checksum));
            Rewrite::Keep
        })?;

        match failure {
            Some(e) => Err(Error::from(e)),
            None => Ok(HookOutcome::Continue),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::test_support::{Harness, versions};
    use mirror_extensions::PluginConfig;
    use mirror_test_utils::{MetadataFixture, version};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const HOST: &str = "https://mirror.test";

    #[test]
    fn test_checksums_are_written_for_real_archives_only() {
        let mut harness = Harness::new(&json!({}));
        harness.put_staged("dist/acme/foo-1.0.0.zip", b"PK-real");
        harness.put_staged("dist/acme/foo-0.9.0.zip", b"");
        harness.put_staged("packages.json", b"{}");
        let settings = PluginConfig::default();

        ChecksumFixer
            .save_checksums(&mut harness.context(HookPoint::BeforeUploadToS3, &settings))
            .unwrap();

        assert_eq!(
            harness.read_staged(".checksums/dist/acme/foo-1.0.0.zip.sha1"),
            checksum::sha1_hex(b"PK-real").as_bytes()
        );
        assert!(!harness.staged_exists(".checksums/dist/acme/foo-0.9.0.zip.sha1"));
        assert!(!harness.staged_exists(".checksums/packages.json.sha1"));
    }

    #[test]
    fn test_local_versions_get_recorded_shasum() {
        let mut harness = Harness::new(&json!({"archive": {"prefix-url": HOST}}));
        MetadataFixture::new()
            .package(
                "acme/foo",
                vec![
                    version("acme/foo", "1.0.0", Some("https://mirror.test/dist/acme/foo-1.0.0.zip")),
                    version("acme/foo", "1.1.0", Some("https://github.com/acme/foo/1.1.0.zip")),
                    version("acme/foo", "1.2.0", Some("https://mirror.test/dist/acme/foo-1.2.0.zip")),
                ],
            )
            .write(&harness.prefix_dir());
        harness.put_staged("dist/acme/foo-1.0.0.zip", b"PK-real");
        let settings = PluginConfig::default();

        let mut extension = ChecksumFixer;
        extension
            .save_checksums(&mut harness.context(HookPoint::BeforeUploadToS3, &settings))
            .unwrap();
        extension
            .fix_packages_files(&mut harness.context(HookPoint::BeforeUploadToS3, &settings))
            .unwrap();

        let records = versions(&harness.read_staged_json("p2/acme/foo.json"));
        let shasums: Vec<_> = records.iter().map(|v| v["dist"]["shasum"].clone()).collect();
        assert_eq!(
            shasums,
            vec![json!(checksum::sha1_hex(b"PK-real")), json!(""), json!("")]
        );
    }

    #[test]
    fn test_homepage_is_the_fallback_host() {
        let mut harness = Harness::new(&json!({"homepage": HOST}));
        assert_eq!(
            harness
                .context(HookPoint::BeforeUploadToS3, &PluginConfig::default())
                .archive_host()
                .as_deref(),
            Some(HOST)
        );
    }
}
