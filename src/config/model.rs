// src/config/model.rs

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Settings artifact exactly as persisted on disk.
///
/// ```json
/// {
///   "input_dir": "/home/me/site/templates",
///   "output_dir": "/home/me/site/build",
///   "exclude": ["base.html"],
///   "context": { "title": "Home" }
/// }
/// ```
///
/// `input_dir`, `output_dir` and `exclude` are required; unknown keys are
/// ignored so newer settings files still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSettings {
    pub input_dir: String,

    pub output_dir: String,

    /// Basenames inside `input_dir` that batch and watch compiles skip.
    pub exclude: Vec<String>,

    /// Render variables passed to every template.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, Value>,

    /// Also re-render on file creation while watching (not only on
    /// modification).
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub watch_created: bool,
}

impl RawSettings {
    /// Resolve relative directories against `base` (normally the directory
    /// holding the settings file). Absolute paths are left untouched.
    pub fn resolve_relative_to(mut self, base: &Path) -> Self {
        self.input_dir = resolve(base, &self.input_dir);
        self.output_dir = resolve(base, &self.output_dir);
        self
    }
}

fn resolve(base: &Path, dir: &str) -> String {
    let p = Path::new(dir);
    if p.is_absolute() {
        dir.to_string()
    } else {
        base.join(p).to_string_lossy().into_owned()
    }
}

/// A validated project.
///
/// Construct through [`ProjectConfig::new`], `TryFrom<RawSettings>` or the
/// loader; all of them check the directory invariants. The value is
/// read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectConfig {
    source_dir: PathBuf,
    output_dir: PathBuf,
    excluded: BTreeSet<String>,
    context: BTreeMap<String, Value>,
    watch_created: bool,
}

impl ProjectConfig {
    /// Build without validation. Only for callers that already ran the
    /// checks in `validate`.
    pub(crate) fn new_unchecked(
        source_dir: PathBuf,
        output_dir: PathBuf,
        excluded: BTreeSet<String>,
        context: BTreeMap<String, Value>,
        watch_created: bool,
    ) -> Self {
        Self {
            source_dir,
            output_dir,
            excluded,
            context,
            watch_created,
        }
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn excluded(&self) -> &BTreeSet<String> {
        &self.excluded
    }

    pub fn context(&self) -> &BTreeMap<String, Value> {
        &self.context
    }

    pub fn watch_created(&self) -> bool {
        self.watch_created
    }

    pub fn is_excluded(&self, file_name: &str) -> bool {
        self.excluded.contains(file_name)
    }

    /// Target path for a template: same basename under `output_dir`.
    pub fn output_path_for(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }

    /// Convert back into the persisted shape.
    pub fn to_raw(&self) -> RawSettings {
        RawSettings {
            input_dir: self.source_dir.to_string_lossy().into_owned(),
            output_dir: self.output_dir.to_string_lossy().into_owned(),
            exclude: self.excluded.iter().cloned().collect(),
            context: self.context.clone(),
            watch_created: self.watch_created,
        }
    }
}
