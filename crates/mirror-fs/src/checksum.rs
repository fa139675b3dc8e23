//! Checksum utilities
//!
//! Two digests are in play: SHA-1, which the package metadata format embeds
//! in include file names and `dist.shasum`, and CRC32, which the mirror uses
//! to detect files that are unchanged since the last upload.

use sha1::{Digest, Sha1};
use std::path::Path;

use crate::{Error, Result};

/// Compute the lowercase hex SHA-1 of `content`.
pub fn sha1_hex(content: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

/// Compute the lowercase hex SHA-1 of a file's contents.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn sha1_file(path: &Path) -> Result<String> {
    let content = std::fs::read(path).map_err(|e| Error::io(path, e))?;
    Ok(sha1_hex(&content))
}

/// Compute the CRC32 of `content`.
pub fn crc32(content: &[u8]) -> u32 {
    crc32fast::hash(content)
}

/// Compute the CRC32 of a file's contents.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn crc32_file(path: &Path) -> Result<u32> {
    let content = std::fs::read(path).map_err(|e| Error::io(path, e))?;
    Ok(crc32(&content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha1_known_value() {
        assert_eq!(
            sha1_hex(b"hello world"),
            "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed"
        );
    }

    #[test]
    fn sha1_is_deterministic() {
        assert_eq!(sha1_hex(b"test"), sha1_hex(b"test"));
        assert_ne!(sha1_hex(b"aaa"), sha1_hex(b"bbb"));
    }

    #[test]
    fn crc32_known_value() {
        assert_eq!(crc32(b"hello world"), 0x0d4a_1185);
    }

    #[test]
    fn file_checksums_match_content_checksums() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.txt");
        std::fs::write(&path, "hello world").unwrap();

        assert_eq!(sha1_file(&path).unwrap(), sha1_hex(b"hello world"));
        assert_eq!(crc32_file(&path).unwrap(), crc32(b"hello world"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = sha1_file(&dir.path().join("missing"));
        assert!(matches!(result, Err(Error::Io { .. })));
    }
}
