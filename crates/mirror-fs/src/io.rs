//! Atomic I/O operations with file locking

use fs2::FileExt;
use std::fs;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use crate::{Error, Result};

/// Stream `reader` into `path` atomically.
///
/// The content goes to a locked temporary file in the target's directory
/// which is renamed over `path` once complete, so readers never observe a
/// partial file. Parent directories are created as needed. On failure the
/// temporary file is removed and `path` is left as it was.
pub fn write_atomic_from(path: &Path, reader: &mut dyn Read) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;

    // Same directory keeps the rename on one filesystem
    let mut temp_file = tempfile::Builder::new()
        .prefix(".")
        .suffix(".tmp")
        .tempfile_in(parent)
        .map_err(|e| Error::io(parent, e))?;

    temp_file
        .as_file()
        .lock_exclusive()
        .map_err(|_| Error::LockFailed {
            path: path.to_path_buf(),
        })?;

    write_locked(&mut temp_file, reader)?;

    FileExt::unlock(temp_file.as_file()).map_err(|_| Error::LockFailed {
        path: path.to_path_buf(),
    })?;

    temp_file
        .persist(path)
        .map_err(|e| Error::io(path, e.error))?;

    Ok(())
}

fn write_locked(temp_file: &mut NamedTempFile, reader: &mut dyn Read) -> Result<()> {
    let temp_path = temp_file.path().to_path_buf();
    std::io::copy(reader, temp_file).map_err(|e| Error::io(&temp_path, e))?;
    temp_file.flush().map_err(|e| Error::io(&temp_path, e))?;
    temp_file
        .as_file()
        .sync_all()
        .map_err(|e| Error::io(&temp_path, e))
}
