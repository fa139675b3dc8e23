//! Built-in extension registrations
//!
//! [`register_all`] is the single table of built-in extensions; the shared
//! registry in [`ExtensionRegistry::builtin`] is built from it.
//!
//! | Key | Hooks |
//! |---|---|
//! | `prepare-config-for-satis` | `BEFORE_BUILD_SATIS_REPOSITORY`, `BEFORE_UPLOAD_TO_S3` |
//! | `satis-purge` | `AFTER_BUILD_SATIS_REPOSITORY` |
//! | `cache` | `BEFORE_DOWNLOAD_FROM_S3`, `BEFORE_FINAL_CLEAR_TEMP_DIRECTORY` |
//! | `checksum-fixer` | `BEFORE_UPLOAD_TO_S3` |
//! | `remove-fields-from-json` | `AFTER_BUILD_SATIS_REPOSITORY` |
//! | `skip-remote-versions` | `AFTER_BUILD_SATIS_REPOSITORY` |
//! | `strip-sources-links` | `AFTER_BUILD_SATIS_REPOSITORY` |
//! | `file-restrictions-map-generator` | `AFTER_BUILD_SATIS_REPOSITORY` |
//! | `skip-step-after-hook` | every `BEFORE_*` hook |
//! | `skip-final-cleanup` | `BEFORE_FINAL_CLEAR_TEMP_DIRECTORY` |
//! | `pause-at-hook` | every hook |

pub mod cache;
pub mod checksum_fixer;
pub mod file_restrictions;
pub mod pause;
pub mod prepare_config;
pub mod remove_fields;
pub mod satis_purge;
pub mod skip_final_cleanup;
pub mod skip_remote_versions;
pub mod skip_step;
pub mod strip_sources_links;

#[cfg(test)]
pub(crate) mod test_support;

use serde_json::Value;

use crate::extensions::ExtensionRegistry;

/// Extensions enabled in every run unless explicitly disabled
pub const ALWAYS_ENABLED: [&str; 2] = [prepare_config::KEY, satis_purge::KEY];

/// Register every built-in extension.
pub fn register_all(registry: &mut ExtensionRegistry) {
    registry.register(prepare_config::descriptor());
    registry.register(satis_purge::descriptor());
    registry.register(cache::descriptor());
    registry.register(checksum_fixer::descriptor());
    registry.register(remove_fields::descriptor());
    registry.register(skip_remote_versions::descriptor());
    registry.register(strip_sources_links::descriptor());
    registry.register(file_restrictions::descriptor());
    registry.register(skip_step::descriptor());
    registry.register(skip_final_cleanup::descriptor());
    registry.register(pause::descriptor());
}

/// Repository-relative path of an archive served by this mirror.
///
/// The archive host is removed from `url`; a result that is still an
/// absolute `http(s)` URL points somewhere else and yields `None`.
pub(crate) fn local_archive_path(url: &str, host: Option<&str>) -> Option<String> {
    let stripped = match host {
        Some(host) if !host.is_empty() => url.replace(host, ""),
        _ => url.to_string(),
    };
    let path = stripped.trim_start_matches('/');
    if path.starts_with("http://") || path.starts_with("https://") {
        None
    } else {
        Some(path.to_string())
    }
}

/// `package:version` label of a version record for log lines
pub(crate) fn version_label(package: &str, version: &Value) -> String {
    let version = version.get("version").and_then(Value::as_str).unwrap_or("?");
    format!("{package}:{version}")
}
