//! Capability-typed file storage
//!
//! The pipeline talks to two storages through the same interface: the remote
//! object store holding the published mirror, and the local staging area the
//! generator writes into. [`LocalStorage`] backs either with a directory.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::{Error, Result, io, path};

/// File storage capabilities used by the pipeline.
///
/// All paths are relative storage paths (see [`crate::path`]).
pub trait Storage {
    /// List every file below `prefix`, recursively, sorted.
    ///
    /// An empty prefix lists the whole storage. A missing prefix lists nothing.
    fn list(&self, prefix: &str) -> Result<Vec<String>>;

    /// Whether a file exists at `path`.
    fn exists(&self, path: &str) -> bool;

    /// Size of the file at `path` in bytes.
    fn size(&self, path: &str) -> Result<u64>;

    /// Open the file at `path` for streaming reads.
    fn read_stream(&self, path: &str) -> Result<Box<dyn Read + '_>>;

    /// Write the contents of `reader` to `path`, replacing any existing file.
    fn write_stream(&self, path: &str, reader: &mut dyn Read) -> Result<()>;

    /// Write `content` to `path`, replacing any existing file.
    fn put(&self, path: &str, content: &[u8]) -> Result<()> {
        self.write_stream(path, &mut &content[..])
    }

    /// Read the whole file at `path`.
    fn get(&self, path: &str) -> Result<Vec<u8>> {
        let mut content = Vec::new();
        self.read_stream(path)?
            .read_to_end(&mut content)
            .map_err(|e| Error::io(path, e))?;
        Ok(content)
    }

    /// Delete the file at `path`. Deleting a missing file is not an error.
    fn delete(&self, path: &str) -> Result<()>;

    /// Delete the directory at `path` and everything below it. Deleting a
    /// missing directory is not an error.
    fn delete_directory(&self, path: &str) -> Result<()>;

    /// Create the directory at `path`, including parents.
    fn make_directory(&self, path: &str) -> Result<()>;

    /// Move a file. Fails with [`Error::TargetExists`] if `to` already exists.
    fn move_file(&self, from: &str, to: &str) -> Result<()>;
}

/// Directory-backed [`Storage`].
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    /// Create a storage rooted at `root`. The directory is created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory of this storage.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a storage path to a native path below the root.
    pub fn absolute(&self, path: &str) -> Result<PathBuf> {
        path::validate(path)?;
        let normalized = path::normalize(path);
        if normalized.is_empty() {
            return Ok(self.root.clone());
        }
        Ok(self.root.join(normalized))
    }

    fn relative(&self, native: &Path) -> Option<String> {
        let relative = native.strip_prefix(&self.root).ok()?;
        Some(path::normalize(&relative.to_string_lossy()))
    }
}

impl Storage for LocalStorage {
    fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let base = self.absolute(prefix)?;
        if !base.is_dir() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&base) {
            let entry = entry.map_err(|e| {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| base.clone());
                Error::io(path, e.into())
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(relative) = self.relative(entry.path()) {
                files.push(relative);
            }
        }
        files.sort();
        Ok(files)
    }

    fn exists(&self, path: &str) -> bool {
        self.absolute(path).map(|p| p.is_file()).unwrap_or(false)
    }

    fn size(&self, path: &str) -> Result<u64> {
        let native = self.absolute(path)?;
        let metadata = fs::metadata(&native).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::NotFound {
                path: path.to_string(),
            },
            _ => Error::io(&native, e),
        })?;
        Ok(metadata.len())
    }

    fn read_stream(&self, path: &str) -> Result<Box<dyn Read + '_>> {
        let native = self.absolute(path)?;
        let file = fs::File::open(&native).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::NotFound {
                path: path.to_string(),
            },
            _ => Error::io(&native, e),
        })?;
        Ok(Box::new(std::io::BufReader::new(file)))
    }

    fn write_stream(&self, path: &str, reader: &mut dyn Read) -> Result<()> {
        let native = self.absolute(path)?;
        io::write_atomic_from(&native, reader)
    }

    fn delete(&self, path: &str) -> Result<()> {
        let native = self.absolute(path)?;
        match fs::remove_file(&native) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::io(&native, e)),
        }
    }

    fn delete_directory(&self, path: &str) -> Result<()> {
        let native = self.absolute(path)?;
        match fs::remove_dir_all(&native) {
            Ok(()) => {
                tracing::trace!(path = %native.display(), "Removed directory");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::io(&native, e)),
        }
    }

    fn make_directory(&self, path: &str) -> Result<()> {
        let native = self.absolute(path)?;
        fs::create_dir_all(&native).map_err(|e| Error::io(&native, e))
    }

    fn move_file(&self, from: &str, to: &str) -> Result<()> {
        let source = self.absolute(from)?;
        let target = self.absolute(to)?;
        if !source.is_file() {
            return Err(Error::NotFound {
                path: from.to_string(),
            });
        }
        if target.exists() {
            return Err(Error::TargetExists {
                path: to.to_string(),
            });
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        fs::rename(&source, &target).map_err(|e| Error::io(&target, e))
    }
}
