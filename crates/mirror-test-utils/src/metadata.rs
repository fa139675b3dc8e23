//! Generated-repository metadata fixtures.
//!
//! [`MetadataFixture`] writes the layout a repository generator produces:
//! a root `packages.json`, per-package `p2/` files with their `~dev`
//! variants, and hash-addressed `include/` files whose names and declared
//! hashes match their content.

use std::fs;
use std::path::Path;

use mirror_fs::checksum::sha1_hex;
use serde_json::{Map, Value, json};

/// Build a realistic version record for `package` at `version`.
///
/// `dist_url` of `None` produces a record without a `dist` section.
pub fn version(package: &str, version: &str, dist_url: Option<&str>) -> Value {
    let mut record = json!({
        "name": package,
        "version": version,
        "version_normalized": normalize_version(version),
        "source": {
            "type": "git",
            "url": format!("https://github.com/{package}.git"),
            "reference": "0123456789abcdef0123456789abcdef01234567"
        },
        "authors": [{"name": "Jane Doe", "email": "jane@example.com"}],
        "homepage": format!("https://example.com/{package}"),
        "support": {"issues": format!("https://github.com/{package}/issues")},
        "type": "library"
    });
    if let Some(url) = dist_url {
        record["dist"] = json!({
            "type": "zip",
            "url": url,
            "reference": "0123456789abcdef0123456789abcdef01234567",
            "shasum": ""
        });
    }
    record
}

fn normalize_version(version: &str) -> String {
    let parts = version.split('.').count();
    if parts < 4 && version.split('.').all(|p| p.chars().all(|c| c.is_ascii_digit())) {
        let mut normalized = version.to_string();
        for _ in parts..4 {
            normalized.push_str(".0");
        }
        normalized
    } else {
        version.to_string()
    }
}

/// Builder for a generated repository's metadata files.
///
/// # Example
///
/// ```rust,no_run
/// use mirror_test_utils::metadata::{MetadataFixture, version};
///
/// let dir = tempfile::tempdir().unwrap();
/// MetadataFixture::new()
///     .package("acme/foo", vec![version("acme/foo", "1.0.0", None)])
///     .write(dir.path());
/// ```
#[derive(Debug, Default, Clone)]
pub struct MetadataFixture {
    packages: Vec<(String, Vec<Value>)>,
    dev_packages: Vec<(String, Vec<Value>)>,
    includes: Vec<(String, Vec<(String, Vec<Value>)>)>,
}

impl MetadataFixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a package with stable versions, written to `p2/<package>.json`.
    pub fn package(mut self, name: &str, versions: Vec<Value>) -> Self {
        self.packages.push((name.to_string(), versions));
        self
    }

    /// Add development versions, written to `p2/<package>~dev.json`.
    pub fn dev_package(mut self, name: &str, versions: Vec<Value>) -> Self {
        self.dev_packages.push((name.to_string(), versions));
        self
    }

    /// Add an include file `include/<name>$<sha1>.json` holding `packages`,
    /// each as a version-keyed mapping.
    pub fn include(mut self, name: &str, packages: Vec<(&str, Vec<Value>)>) -> Self {
        let packages = packages
            .into_iter()
            .map(|(package, versions)| (package.to_string(), versions))
            .collect();
        self.includes.push((name.to_string(), packages));
        self
    }

    /// Write every file below `root` and return the root document.
    ///
    /// # Panics
    /// Panics if any file cannot be written.
    pub fn write(&self, root: &Path) -> Value {
        let mut available: Vec<&str> = self
            .packages
            .iter()
            .chain(self.dev_packages.iter())
            .map(|(name, _)| name.as_str())
            .collect();
        available.sort_unstable();
        available.dedup();

        for (name, versions) in &self.packages {
            write_json(&root.join(format!("p2/{name}.json")), &package_file(name, versions));
        }
        for (name, versions) in &self.dev_packages {
            write_json(&root.join(format!("p2/{name}~dev.json")), &package_file(name, versions));
        }

        let mut includes = Map::new();
        for (name, packages) in &self.includes {
            let mut by_package = Map::new();
            for (package, versions) in packages {
                let keyed: Map<String, Value> = versions
                    .iter()
                    .map(|v| {
                        let key = v["version"].as_str().unwrap_or_default().to_string();
                        (key, v.clone())
                    })
                    .collect();
                by_package.insert(package.clone(), Value::Object(keyed));
            }
            let content = to_bytes(&json!({ "packages": by_package }));
            let sha1 = sha1_hex(&content);
            let path = format!("include/{name}${sha1}.json");
            write_bytes(&root.join(&path), &content);
            includes.insert(path, json!({ "sha1": sha1 }));
        }

        let mut document = json!({
            "packages": [],
            "metadata-url": "/p2/%package%.json",
            "available-packages": available,
        });
        if !includes.is_empty() {
            document["includes"] = Value::Object(includes);
        }
        write_json(&root.join("packages.json"), &document);
        document
    }
}

fn package_file(name: &str, versions: &[Value]) -> Value {
    json!({
        "packages": { name: versions },
        "minified": "composer/2.0"
    })
}

fn to_bytes(value: &Value) -> Vec<u8> {
    serde_json::to_vec_pretty(value).expect("fixture JSON serializes")
}

fn write_json(path: &Path, value: &Value) {
    write_bytes(path, &to_bytes(value));
}

fn write_bytes(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content)
        .unwrap_or_else(|e| panic!("Could not write fixture {}: {e}", path.display()));
}

/// Assert that every include declared by the root document at `root`
/// exists and that its file name and declared hash match its content.
///
/// # Panics
/// Panics with a descriptive message on the first mismatch.
pub fn assert_includes_consistent(root: &Path) {
    let document: Value =
        serde_json::from_slice(&fs::read(root.join("packages.json")).unwrap()).unwrap();
    let Some(includes) = document.get("includes").and_then(Value::as_object) else {
        return;
    };
    for (path, params) in includes {
        let content = fs::read(root.join(path))
            .unwrap_or_else(|_| panic!("Declared include file is missing: {path}"));
        let actual = sha1_hex(&content);
        let declared = params["sha1"].as_str().unwrap_or_default();
        assert_eq!(declared, actual, "Declared hash of {path} does not match its content");
        assert!(
            path.contains(&actual),
            "Include path {path} does not embed its content hash {actual}"
        );
    }
}
