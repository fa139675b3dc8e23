//! Local cache of the published mirror
//!
//! Before the download stage the cache is moved into staging and the
//! download is vetoed: empty cached files become placeholders and every
//! other file gets a CRC32 entry so unchanged files are not uploaded again.
//! Before the final clear the staging tree is moved back into the cache,
//! with archives stored as empty files.
//!
//! Setting `path` selects the cache directory. The default is `cache` under
//! the staging root; an empty string disables the cache.

use std::fs;
use std::path::PathBuf;

use mirror_fs::{LocalStorage, Storage, checksum, is_archive};
use mirror_meta::document::ROOT_FILE;
use serde_json::Value;

use crate::extensions::{ExtensionDescriptor, HookContext, HookOutcome};
use crate::hooks::HookPoint;
use crate::Result;

pub const KEY: &str = "cache";

/// Cache directory name below the staging root when `path` is not set
pub const DEFAULT_DIRECTORY: &str = "cache";

pub fn descriptor() -> ExtensionDescriptor {
    ExtensionDescriptor::builder::<Cache>("Cache", KEY)
        .hook(HookPoint::BeforeDownloadFromS3, "load_from_cache", Cache::load_from_cache)
        .hook(
            HookPoint::BeforeFinalClearTempDirectory,
            "save_to_cache",
            Cache::save_to_cache,
        )
        .build()
}

#[derive(Debug, Default)]
pub struct Cache;

impl Cache {
    fn load_from_cache(&mut self, ctx: &mut HookContext<'_>) -> Result<HookOutcome> {
        if ctx.state.is_force_fresh_downloads() {
            return Ok(HookOutcome::Continue);
        }
        let Some(root) = cache_root(ctx) else {
            return Ok(HookOutcome::Continue);
        };

        let cache = LocalStorage::new(&root);
        if !cache.exists(ROOT_FILE) {
            tracing::debug!(cache = %root.display(), "Cache is empty, downloading");
            return Ok(HookOutcome::Continue);
        }

        let staging = ctx.staging();
        for file in cache.list("")? {
            let cached = cache.absolute(&file)?;
            let staged = ctx.state.staging_path(&file);

            if cache.size(&file)? == 0 {
                ctx.state.add_placeholder(staged.clone());
            } else {
                ctx.state.record_checksum(staged.clone(), checksum::crc32_file(&cached)?);
            }

            tracing::debug!("Moving {file} from cache");
            transfer(&cache, &file, staging, &staged)?;
        }

        Ok(HookOutcome::Skip)
    }

    fn save_to_cache(&mut self, ctx: &mut HookContext<'_>) -> Result<HookOutcome> {
        let Some(root) = cache_root(ctx) else {
            return Ok(HookOutcome::Continue);
        };

        let cache = LocalStorage::new(&root);
        let staging = ctx.staging();
        for staged in staging.list(ctx.state.temp_prefix())? {
            let relative = ctx.state.relative_path(&staged);

            if is_archive(&relative) {
                tracing::debug!("Skipping caching {relative}, placeholder was created instead");
                cache.put(&relative, b"")?;
                continue;
            }

            tracing::debug!("Moving {relative} to cache");
            transfer(staging, &staged, &cache, &relative)?;
        }

        Ok(HookOutcome::Continue)
    }
}

/// Resolve and create the cache directory, or `None` when caching is off
fn cache_root(ctx: &HookContext<'_>) -> Option<PathBuf> {
    let root = match ctx.config.get("path") {
        None => ctx.staging().root().join(DEFAULT_DIRECTORY),
        Some(Value::Null) => return None,
        Some(Value::String(path)) if path.is_empty() => return None,
        Some(Value::String(path)) => PathBuf::from(path),
        Some(other) => {
            tracing::warn!("Cache path {other} is not a string, cache disabled");
            return None;
        }
    };

    if root.exists() && !root.is_dir() {
        tracing::warn!("Cache path {} is not a directory, cache disabled", root.display());
        return None;
    }
    if let Err(e) = fs::create_dir_all(&root) {
        tracing::warn!("Unable to create cache directory {}: {e}", root.display());
        return None;
    }
    Some(root)
}

/// Move a file from one storage into another, replacing the target.
fn transfer(from: &dyn Storage, from_path: &str, to: &dyn Storage, to_path: &str) -> Result<()> {
    let mut reader = from.read_stream(from_path)?;
    to.write_stream(to_path, &mut reader)?;
    drop(reader);
    from.delete(from_path)?;
    Ok(())
}
