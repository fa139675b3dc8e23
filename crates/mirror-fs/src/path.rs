//! Storage path handling
//!
//! Storage paths are relative, forward-slash separated strings. A run's
//! staging files live below a prefix (`<prefix>/<relative>`), and most of
//! the pipeline moves between the two forms.

use crate::{Error, Result};

/// Normalize a storage path: forward slashes, no leading or trailing slash,
/// no empty or `.` segments.
pub fn normalize(path: &str) -> String {
    path.replace('\\', "/")
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Validate that a storage path stays inside its root.
pub fn validate(path: &str) -> Result<()> {
    let normalized = path.replace('\\', "/");
    if normalized.split('/').any(|segment| segment == "..") {
        return Err(Error::invalid_path(path, "parent directory segments are not allowed"));
    }
    if normalized.contains('\0') {
        return Err(Error::invalid_path(path, "contains a NUL byte"));
    }
    Ok(())
}

/// Join a prefix and a relative path (`prefix/relative`).
///
/// # Examples
///
/// ```
/// use mirror_fs::path::join;
///
/// assert_eq!(join("1234", "/p2/acme/foo.json"), "1234/p2/acme/foo.json");
/// assert_eq!(join("", "packages.json"), "packages.json");
/// ```
pub fn join(prefix: &str, relative: &str) -> String {
    let prefix = normalize(prefix);
    let relative = normalize(relative);
    match (prefix.is_empty(), relative.is_empty()) {
        (true, _) => relative,
        (_, true) => prefix,
        _ => format!("{prefix}/{relative}"),
    }
}

/// Strip `prefix` from a storage path, returning the relative remainder.
///
/// Paths outside the prefix are returned normalized but otherwise unchanged.
///
/// # Examples
///
/// ```
/// use mirror_fs::path::strip_prefix;
///
/// assert_eq!(strip_prefix("1234/dist/a.zip", "1234"), "dist/a.zip");
/// assert_eq!(strip_prefix("other/a.zip", "1234"), "other/a.zip");
/// ```
pub fn strip_prefix(path: &str, prefix: &str) -> String {
    let path = normalize(path);
    let prefix = normalize(prefix);
    if prefix.is_empty() {
        return path;
    }
    match path.strip_prefix(&prefix) {
        Some("") => String::new(),
        Some(rest) if rest.starts_with('/') => rest.trim_start_matches('/').to_string(),
        _ => path,
    }
}

/// Get the extension of the last path segment, if any.
pub fn extension(path: &str) -> Option<&str> {
    let name = path.rsplit(['/', '\\']).next()?;
    let idx = name.rfind('.')?;
    if idx == 0 { None } else { Some(&name[idx + 1..]) }
}

/// Get the parent of a storage path, if it has one.
pub fn parent(path: &str) -> Option<&str> {
    let trimmed = path.trim_end_matches('/');
    trimmed.rfind('/').map(|idx| &trimmed[..idx])
}
