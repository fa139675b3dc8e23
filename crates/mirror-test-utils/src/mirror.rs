//! [`TestMirror`] layout for pipeline test scenarios.
//!
//! A temporary directory holding a remote store (`remote/`), a staging root
//! (`staging/`) and a configuration document (`satis.json`).

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::TempDir;

/// A temporary mirror layout with helper methods for setup and assertion.
///
/// # Example
///
/// ```rust,no_run
/// use mirror_test_utils::mirror::TestMirror;
/// use serde_json::json;
///
/// let mirror = TestMirror::new();
/// mirror.write_config(&json!({"name": "acme/mirror", "homepage": "https://mirror.test"}));
/// mirror.put_remote("packages.json", b"{}");
/// mirror.assert_remote_exists("packages.json");
/// ```
pub struct TestMirror {
    temp_dir: TempDir,
}

impl Default for TestMirror {
    fn default() -> Self {
        Self::new()
    }
}

impl TestMirror {
    /// Create an empty layout with `remote/` and `staging/` directories.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("remote")).unwrap();
        fs::create_dir_all(temp_dir.path().join("staging")).unwrap();
        Self { temp_dir }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Root directory of the remote store.
    pub fn remote_root(&self) -> PathBuf {
        self.root().join("remote")
    }

    /// Root directory of the staging area.
    pub fn staging_root(&self) -> PathBuf {
        self.root().join("staging")
    }

    /// Path of the configuration document.
    pub fn config_path(&self) -> PathBuf {
        self.root().join("satis.json")
    }

    /// Write the configuration document.
    pub fn write_config(&self, config: &Value) -> PathBuf {
        let path = self.config_path();
        fs::write(&path, serde_json::to_vec_pretty(config).unwrap()).unwrap();
        path
    }

    /// Write a file into the remote store.
    pub fn put_remote(&self, path: &str, content: &[u8]) {
        let full_path = self.remote_root().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full_path, content).unwrap();
    }

    /// Read a file from the remote store.
    pub fn read_remote(&self, path: &str) -> Vec<u8> {
        let full_path = self.remote_root().join(path);
        fs::read(&full_path)
            .unwrap_or_else(|_| panic!("Could not read remote file: {}", full_path.display()))
    }

    /// Assert that `path` exists in the remote store.
    ///
    /// # Panics
    /// Panics with a descriptive message if the file does not exist.
    pub fn assert_remote_exists(&self, path: &str) {
        let full_path = self.remote_root().join(path);
        assert!(
            full_path.is_file(),
            "Expected remote file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that `path` does **not** exist in the remote store.
    ///
    /// # Panics
    /// Panics with a descriptive message if the file exists.
    pub fn assert_remote_not_exists(&self, path: &str) {
        let full_path = self.remote_root().join(path);
        assert!(
            !full_path.exists(),
            "Expected remote file NOT to exist: {}",
            full_path.display()
        );
    }

    /// Assert that the remote file at `path` holds exactly `content`.
    ///
    /// # Panics
    /// Panics if the file cannot be read or differs.
    pub fn assert_remote_content(&self, path: &str, content: &[u8]) {
        let actual = self.read_remote(path);
        assert!(
            actual == content,
            "Remote file {} differs.\nExpected: {}\nActual: {}",
            path,
            String::from_utf8_lossy(content),
            String::from_utf8_lossy(&actual)
        );
    }
}
