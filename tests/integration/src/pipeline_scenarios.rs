//! End-to-end pipeline scenarios
//!
//! Each scenario runs the real pipeline with the built-in extensions over a
//! [`TestMirror`] layout. The repository generator is replaced by one that
//! writes a fixed set of files, so no external tool is needed.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use mirror_core::{
    BuildState, ExtensionRegistry, ExtensionRunner, Pipeline, Prompter, RepositoryGenerator,
    Result, RunEnvironment, Stage,
};
use mirror_fs::{LocalStorage, Storage};
use mirror_test_utils::metadata::assert_includes_consistent;
use mirror_test_utils::{MetadataFixture, TestMirror, version};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

/// Generator that writes fixed files and records the configuration it saw
#[derive(Default)]
struct StaticGenerator {
    files: Vec<(String, Vec<u8>)>,
    metadata: Option<MetadataFixture>,
    seen_configs: Arc<Mutex<Vec<Value>>>,
}

impl StaticGenerator {
    fn file(mut self, path: &str, content: &[u8]) -> Self {
        self.files.push((path.to_string(), content.to_vec()));
        self
    }

    fn metadata(mut self, fixture: MetadataFixture) -> Self {
        self.metadata = Some(fixture);
        self
    }
}

impl RepositoryGenerator for StaticGenerator {
    fn build(&self, config: &Path, output_dir: &Path, _urls: &[String]) -> Result<()> {
        let seen: Value = serde_json::from_slice(&std::fs::read(config).unwrap()).unwrap();
        self.seen_configs.lock().unwrap().push(seen);

        let output = LocalStorage::new(output_dir);
        for (path, content) in &self.files {
            output.put(path, content)?;
        }
        if let Some(fixture) = &self.metadata {
            fixture.write(output_dir);
        }
        Ok(())
    }

    fn purge(&self, _config: &Path, _output_dir: &Path) -> Result<()> {
        Ok(())
    }
}

/// Prompter recording whether the remote already held `packages.json`
/// each time it was asked to wait
struct RecordingPrompter {
    remote_root: PathBuf,
    calls: Arc<Mutex<Vec<bool>>>,
}

impl Prompter for RecordingPrompter {
    fn wait_for_confirmation(&self, _message: &str) -> Result<()> {
        let published = self.remote_root.join("packages.json").exists();
        self.calls.lock().unwrap().push(published);
        Ok(())
    }
}

struct Scenario<'a> {
    mirror: &'a TestMirror,
    state: BuildState,
    pipeline: Pipeline,
}

impl<'a> Scenario<'a> {
    fn new(
        mirror: &'a TestMirror,
        config: &Value,
        options: &[&str],
        fresh: bool,
        generator: StaticGenerator,
        prompter: Box<dyn Prompter>,
    ) -> Self {
        let path = mirror.write_config(config);
        let state = BuildState::new(path, vec![], fresh).unwrap();

        let mut runner = ExtensionRunner::with_defaults(ExtensionRegistry::builtin());
        assert!(runner.selection_mut().apply_document(state.config()).is_empty());
        assert!(runner.selection_mut().apply_run_options(options).is_empty());

        let env = RunEnvironment {
            staging: LocalStorage::new(mirror.staging_root()),
            remote: Box::new(LocalStorage::new(mirror.remote_root())),
            generator: Box::new(generator),
            prompter,
        };
        Self {
            mirror,
            state,
            pipeline: Pipeline::new(runner, env),
        }
    }

    fn run_stages(&mut self, stages: &[Stage]) {
        for stage in stages {
            self.pipeline.run_stage(*stage, &mut self.state).unwrap();
        }
    }

    fn run(&mut self) {
        self.pipeline.run(&mut self.state).unwrap();
    }

    fn staging(&self) -> LocalStorage {
        LocalStorage::new(self.mirror.staging_root())
    }

    fn staged(&self, relative: &str) -> String {
        self.state.staging_path(relative)
    }
}

fn no_prompt() -> Box<dyn Prompter> {
    Box::new(mirror_core::AutoContinue)
}

fn read_remote_json(mirror: &TestMirror, path: &str) -> Value {
    serde_json::from_slice(&mirror.read_remote(path)).unwrap()
}

const UP_TO_DOWNLOAD: [Stage; 3] = [
    Stage::InitialClearTempDirectory,
    Stage::CreateTempDirectory,
    Stage::DownloadFromS3,
];

const AFTER_DOWNLOAD: [Stage; 4] = [
    Stage::BuildSatisRepository,
    Stage::UploadToS3,
    Stage::RemoveMissingFilesFromS3,
    Stage::FinalClearTempDirectory,
];

#[test]
fn scenario_a_plain_files_are_downloaded_verbatim() {
    let mirror = TestMirror::new();
    mirror.put_remote("packages.json", b"{\"packages\":[]}");
    mirror.put_remote("p2/acme/foo.json", b"{\"packages\":{}}");

    let mut scenario = Scenario::new(
        &mirror,
        &json!({"name": "acme/mirror"}),
        &["cache"],
        false,
        StaticGenerator::default(),
        no_prompt(),
    );
    scenario.run_stages(&UP_TO_DOWNLOAD);

    let staging = scenario.staging();
    assert_eq!(staging.get(&scenario.staged("packages.json")).unwrap(), b"{\"packages\":[]}");
    assert_eq!(staging.get(&scenario.staged("p2/acme/foo.json")).unwrap(), b"{\"packages\":{}}");
    assert!(scenario.state.placeholders().is_empty());
    assert!(scenario.state.checksum_index().is_empty());
    assert!(scenario.state.last_step_executed());
}

#[test]
fn scenario_b_placeholders_and_checksums_decide_uploads() {
    let mirror = TestMirror::new();
    let cache_dir = mirror.root().join("cache");
    let cache_option = format!("cache:path={}", cache_dir.display());
    mirror.put_remote("packages.json", b"{\"v\":1}");
    mirror.put_remote("dist/acme/foo-1.0.0.zip", b"PK-old");

    // First run: nothing cached yet
    let generator = StaticGenerator::default()
        .file("packages.json", b"{\"v\":1}")
        .file("dist/acme/foo-1.1.0.zip", b"PK-new");
    let mut first = Scenario::new(&mirror, &json!({}), &[cache_option.as_str()], false, generator, no_prompt());
    first.run_stages(&UP_TO_DOWNLOAD);

    let placeholder = first.staged("dist/acme/foo-1.0.0.zip");
    assert!(first.state.is_placeholder(&placeholder));
    assert_eq!(first.staging().size(&placeholder).unwrap(), 0);

    first.run_stages(&AFTER_DOWNLOAD);
    mirror.assert_remote_content("dist/acme/foo-1.0.0.zip", b"PK-old");
    mirror.assert_remote_content("dist/acme/foo-1.1.0.zip", b"PK-new");
    mirror.assert_remote_content("packages.json", b"{\"v\":1}");
    assert_eq!(std::fs::read(cache_dir.join("packages.json")).unwrap(), b"{\"v\":1}");
    assert_eq!(std::fs::read(cache_dir.join("dist/acme/foo-1.1.0.zip")).unwrap(), b"");

    // Anything uploaded again would overwrite this marker
    mirror.put_remote("packages.json", b"marker");

    // Second run: staging comes from the cache
    let generator = StaticGenerator::default()
        .file("packages.json", b"{\"v\":1}")
        .file("dist/acme/foo-1.0.0.zip", b"PK-rebuilt");
    let mut second = Scenario::new(&mirror, &json!({}), &[cache_option.as_str()], false, generator, no_prompt());
    second.run();

    let packages = second.staged("packages.json");
    assert!(second.state.known_checksum(&packages).is_some());
    mirror.assert_remote_content("packages.json", b"marker");
    mirror.assert_remote_content("dist/acme/foo-1.0.0.zip", b"PK-rebuilt");
    mirror.assert_remote_content("dist/acme/foo-1.1.0.zip", b"PK-new");
}

#[test]
fn scenario_c_pause_blocks_only_before_upload() {
    let mirror = TestMirror::new();
    let calls = Arc::new(Mutex::new(Vec::new()));
    let prompter = RecordingPrompter {
        remote_root: mirror.remote_root(),
        calls: Arc::clone(&calls),
    };

    let mut scenario = Scenario::new(
        &mirror,
        &json!({}),
        &["pause-at-hook:pause=BEFORE_UPLOAD_TO_S3"],
        true,
        StaticGenerator::default().file("packages.json", b"{}"),
        Box::new(prompter),
    );
    scenario.run();

    // One pause, taken while the new repository was not yet published
    assert_eq!(*calls.lock().unwrap(), vec![false]);
    mirror.assert_remote_exists("packages.json");
}

#[test]
fn scenario_d_remove_fields_strips_exactly_the_listed_fields() {
    let mirror = TestMirror::new();
    let fixture = MetadataFixture::new()
        .package(
            "acme/foo",
            vec![
                version("acme/foo", "1.0.0", Some("https://mirror.test/dist/acme/foo-1.0.0.zip")),
                version("acme/foo", "1.1.0", None),
            ],
        )
        .dev_package("acme/foo", vec![version("acme/foo", "dev-main", None)])
        .include("all", vec![("acme/bar", vec![version("acme/bar", "2.0.0", None)])]);

    let mut scenario = Scenario::new(
        &mirror,
        &json!({"homepage": "https://mirror.test"}),
        &["remove-fields-from-json:remove=[authors,homepage]", "skip-final-cleanup"],
        true,
        StaticGenerator::default().metadata(fixture),
        no_prompt(),
    );
    scenario.run();

    let root = read_remote_json(&mirror, "packages.json");
    let include = root["includes"].as_object().unwrap().keys().next().unwrap().clone();
    for file in ["p2/acme/foo.json", "p2/acme/foo~dev.json", include.as_str()] {
        let document = read_remote_json(&mirror, file);
        for group in document["packages"].as_object().unwrap().values() {
            let records: Vec<&Value> = match group {
                Value::Array(list) => list.iter().collect(),
                Value::Object(map) => map.values().collect(),
                other => panic!("unexpected version group {other}"),
            };
            for record in records {
                let keys: Vec<&str> = record.as_object().unwrap().keys().map(String::as_str).collect();
                assert!(!keys.contains(&"authors"), "{file} kept authors");
                assert!(!keys.contains(&"homepage"), "{file} kept homepage");
                assert!(keys.contains(&"source"));
                assert!(keys.contains(&"support"));
                assert!(keys.contains(&"version_normalized"));
            }
        }
    }

    // The kept staging area holds the same consistent repository
    let prefix_dir = mirror.staging_root().join(scenario.state.temp_prefix());
    assert_includes_consistent(&prefix_dir);
    mirror.assert_remote_exists(&include);
}

#[test]
fn generator_never_sees_the_reserved_section() {
    let mirror = TestMirror::new();
    let generator = StaticGenerator::default().file("packages.json", b"{}");
    let seen = Arc::clone(&generator.seen_configs);

    let mut scenario = Scenario::new(
        &mirror,
        &json!({
            "name": "acme/mirror",
            "repositories": [{"type": "vcs", "url": "https://github.com/acme/foo"}],
            "s3-satis": {"plugins": {"strip-sources-links": true}}
        }),
        &[],
        true,
        generator,
        no_prompt(),
    );
    let original = scenario.state.config_file_path().to_path_buf();
    scenario.run();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![json!({
            "name": "acme/mirror",
            "repositories": [{"type": "vcs", "url": "https://github.com/acme/foo"}]
        })]
    );
    assert_eq!(scenario.state.config_file_path(), original);
    mirror.assert_remote_not_exists("satis.json");
}
