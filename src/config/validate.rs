// src/config/validate.rs

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::config::model::{ProjectConfig, RawSettings};
use crate::errors::{Result, SiteError};
use crate::fs::{FileSystem, RealFileSystem};

impl TryFrom<RawSettings> for ProjectConfig {
    type Error = SiteError;

    fn try_from(raw: RawSettings) -> std::result::Result<Self, Self::Error> {
        validate_settings(&RealFileSystem, raw)
    }
}

impl ProjectConfig {
    /// Validating constructor.
    ///
    /// Fails with `ConfigError` if either directory is missing, is not a
    /// directory, or both resolve to the same location.
    pub fn new(
        source_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        excluded: impl IntoIterator<Item = String>,
        context: BTreeMap<String, Value>,
    ) -> Result<Self> {
        let raw = RawSettings {
            input_dir: source_dir.into().to_string_lossy().into_owned(),
            output_dir: output_dir.into().to_string_lossy().into_owned(),
            exclude: excluded.into_iter().collect(),
            context,
            watch_created: false,
        };
        validate_settings(&RealFileSystem, raw)
    }
}

/// Check the directory invariants against `fs` and build a `ProjectConfig`.
///
/// Paths are stored canonicalized so later comparisons against event paths
/// and the `source != output` check are not fooled by `.`/`..` or symlinks.
/// The exclusion list is taken as-is; it is only checked against the source
/// listing at init time.
pub fn validate_settings(fs: &dyn FileSystem, raw: RawSettings) -> Result<ProjectConfig> {
    let source_dir = existing_dir(fs, "input_dir", &raw.input_dir)?;
    let output_dir = existing_dir(fs, "output_dir", &raw.output_dir)?;

    if source_dir == output_dir {
        return Err(SiteError::ConfigError(format!(
            "input_dir and output_dir must be different directories (both are {:?})",
            source_dir
        )));
    }

    let excluded: BTreeSet<String> = raw.exclude.into_iter().collect();

    Ok(ProjectConfig::new_unchecked(
        source_dir,
        output_dir,
        excluded,
        raw.context,
        raw.watch_created,
    ))
}

fn existing_dir(fs: &dyn FileSystem, key: &str, dir: &str) -> Result<PathBuf> {
    let path = Path::new(dir);
    if dir.trim().is_empty() {
        return Err(SiteError::ConfigError(format!("{key} must not be empty")));
    }
    if !fs.exists(path) {
        return Err(SiteError::ConfigError(format!(
            "{key} {:?} does not exist",
            path
        )));
    }
    if !fs.is_dir(path) {
        return Err(SiteError::ConfigError(format!(
            "{key} {:?} is not a directory",
            path
        )));
    }
    fs.canonicalize(path)
        .map_err(|e| SiteError::ConfigError(format!("{key} {:?}: {e}", path)))
}
