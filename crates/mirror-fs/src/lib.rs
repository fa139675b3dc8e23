//! Storage abstraction for the package mirror
//!
//! Provides the capability-typed [`Storage`] interface used for both the
//! remote object store and the local staging area, a directory-backed
//! implementation, checksum helpers and atomic writes.

pub mod checksum;
pub mod error;
pub mod io;
pub mod path;
pub mod storage;

pub use error::{Error, Result};
pub use storage::{LocalStorage, Storage};

/// File extensions treated as package archives.
///
/// Archives are never re-downloaded from the remote store; a zero-byte
/// placeholder stands in for them in staging.
pub const ARCHIVE_EXTENSIONS: &[&str] = &["tar", "zip"];

/// Whether `path` names a package archive.
pub fn is_archive(path: &str) -> bool {
    path::extension(path).is_some_and(|ext| ARCHIVE_EXTENSIONS.contains(&ext))
}
