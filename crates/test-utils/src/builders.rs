#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sitegen::compile::Compiler;
use sitegen::config::{validate_settings, ProjectConfig, RawSettings};
use sitegen::fs::mock::MockFileSystem;
use sitegen::fs::FileSystem;
use serde_json::Value;
use tempfile::TempDir;

/// A throwaway project on the real filesystem:
///
/// ```text
/// <tmp>/templates/   source directory
/// <tmp>/build/       output directory
/// ```
///
/// The temp dir is removed when the fixture is dropped.
pub struct ProjectFixture {
    dir: TempDir,
    exclude: Vec<String>,
    context: BTreeMap<String, Value>,
    watch_created: bool,
}

impl ProjectFixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        fs::create_dir(dir.path().join("templates")).expect("create templates dir");
        fs::create_dir(dir.path().join("build")).expect("create build dir");
        Self {
            dir,
            exclude: Vec::new(),
            context: BTreeMap::new(),
            watch_created: false,
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.root().join("templates")
    }

    pub fn build_dir(&self) -> PathBuf {
        self.root().join("build")
    }

    pub fn with_template(self, name: &str, body: &str) -> Self {
        self.write_template(name, body);
        self
    }

    pub fn with_exclude(mut self, name: &str) -> Self {
        self.exclude.push(name.to_string());
        self
    }

    pub fn with_context(mut self, key: &str, value: Value) -> Self {
        self.context.insert(key.to_string(), value);
        self
    }

    pub fn with_watch_created(mut self, enabled: bool) -> Self {
        self.watch_created = enabled;
        self
    }

    pub fn write_template(&self, name: &str, body: &str) {
        fs::write(self.templates_dir().join(name), body).expect("write template");
    }

    /// Contents of `build/<name>`, or `None` if it was never written.
    pub fn output(&self, name: &str) -> Option<String> {
        fs::read_to_string(self.build_dir().join(name)).ok()
    }

    pub fn output_names(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.build_dir())
            .expect("list build dir")
            .filter_map(|e| e.ok())
            .filter_map(|e| e.file_name().to_str().map(str::to_string))
            .collect();
        names.sort();
        names
    }

    pub fn raw_settings(&self) -> RawSettings {
        RawSettings {
            input_dir: self.templates_dir().to_string_lossy().into_owned(),
            output_dir: self.build_dir().to_string_lossy().into_owned(),
            exclude: self.exclude.clone(),
            context: self.context.clone(),
            watch_created: self.watch_created,
        }
    }

    pub fn config(&self) -> ProjectConfig {
        ProjectConfig::try_from(self.raw_settings()).expect("fixture settings are valid")
    }

    pub fn compiler(&self) -> Compiler {
        Compiler::new(Arc::new(self.config()))
    }

    /// Write `raw` as `settings.json` in the project root and return its path.
    pub fn write_settings(&self, raw: &RawSettings) -> PathBuf {
        let path = self.root().join("settings.json");
        let text = serde_json::to_string_pretty(raw).expect("serialise settings");
        fs::write(&path, text).expect("write settings");
        path
    }
}

impl Default for ProjectFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// The same layout held in a [`MockFileSystem`], rooted at `/site`.
///
/// Useful when a test needs to see the exact sequence of writes.
pub struct MockProject {
    pub fs: MockFileSystem,
    exclude: Vec<String>,
}

impl MockProject {
    pub const SOURCE: &'static str = "/site/templates";
    pub const OUTPUT: &'static str = "/site/build";

    pub fn new() -> Self {
        let fs = MockFileSystem::new();
        fs.add_dir(Self::SOURCE);
        fs.add_dir(Self::OUTPUT);
        Self {
            fs,
            exclude: Vec::new(),
        }
    }

    pub fn with_template(self, name: &str, body: &str) -> Self {
        self.fs.add_file(Path::new(Self::SOURCE).join(name), body);
        self
    }

    pub fn with_exclude(mut self, name: &str) -> Self {
        self.exclude.push(name.to_string());
        self
    }

    pub fn config(&self) -> ProjectConfig {
        let raw = RawSettings {
            input_dir: Self::SOURCE.into(),
            output_dir: Self::OUTPUT.into(),
            exclude: self.exclude.clone(),
            context: BTreeMap::new(),
            watch_created: false,
        };
        validate_settings(&self.fs, raw).expect("mock settings are valid")
    }

    /// A compiler writing through `fs`, which may wrap this project's mock.
    pub fn compiler_with(&self, fs: Arc<dyn FileSystem>) -> Compiler {
        Compiler::with_fs(Arc::new(self.config()), fs)
    }

    pub fn compiler(&self) -> Compiler {
        self.compiler_with(Arc::new(self.fs.clone()))
    }

    pub fn output_path(&self, name: &str) -> PathBuf {
        Path::new(Self::OUTPUT).join(name)
    }
}

impl Default for MockProject {
    fn default() -> Self {
        Self::new()
    }
}
