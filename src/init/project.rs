// src/init/project.rs

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::{validate_settings, ProjectConfig, RawSettings};
use crate::errors::{Result, SiteError};
use crate::fs::FileSystem;

/// Context variable names must be usable as template identifiers.
static CONTEXT_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("context key pattern is valid")
});

/// Everything the user answered during `init`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InitAnswers {
    /// Templates directory as typed (may be relative to the working dir).
    pub source_dir: String,
    /// Output directory as typed.
    pub output_dir: String,
    /// Basenames in the templates directory to leave out of compiles.
    pub exclude: Vec<String>,
    /// `name=value` context entries.
    pub context: Vec<String>,
    pub watch_created: bool,
}

/// Turn a set of answers into a validated `ProjectConfig`.
///
/// Relative directories are resolved against `cwd`. Each directory's parent
/// must already exist; the directory itself is created if missing. Every
/// excluded name must be a file currently in the templates directory.
pub fn initialize(fs: &dyn FileSystem, cwd: &Path, answers: &InitAnswers) -> Result<ProjectConfig> {
    let source_dir = absolutize(cwd, &answers.source_dir);
    let output_dir = absolutize(cwd, &answers.output_dir);

    check_parent(fs, "templates", &source_dir)?;
    check_parent(fs, "output", &output_dir)?;

    if source_dir == output_dir {
        return Err(SiteError::ConfigError(
            "templates and output directories must not be the same".to_string(),
        ));
    }

    for dir in [&source_dir, &output_dir] {
        if !fs.is_dir(dir) {
            info!(dir = ?dir, "creating directory");
            fs.create_dir_all(dir)?;
        }
    }

    let templates = list_templates(fs, &source_dir)?;
    for name in &answers.exclude {
        if !templates.contains(name) {
            return Err(SiteError::ConfigError(format!(
                "cannot exclude {name:?}: no such file in {:?}",
                source_dir
            )));
        }
    }

    let mut context = BTreeMap::new();
    for entry in &answers.context {
        let (key, value) = parse_context_entry(entry)?;
        debug!(%key, "context variable");
        context.insert(key, value);
    }

    let raw = RawSettings {
        input_dir: source_dir.to_string_lossy().into_owned(),
        output_dir: output_dir.to_string_lossy().into_owned(),
        exclude: answers.exclude.clone(),
        context,
        watch_created: answers.watch_created,
    };
    validate_settings(fs, raw)
}

/// Sorted names of the regular files directly under `dir`.
///
/// A missing directory simply has no templates yet.
pub fn list_templates(fs: &dyn FileSystem, dir: &Path) -> Result<Vec<String>> {
    if !fs.is_dir(dir) {
        return Ok(Vec::new());
    }
    let mut names: Vec<String> = fs
        .read_dir(dir)?
        .into_iter()
        .filter(|p| fs.is_file(p))
        .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(str::to_string))
        .collect();
    names.sort();
    Ok(names)
}

/// Parse `name=value`.
///
/// The value is read as JSON when it parses (`42`, `true`, `["a"]`,
/// `"quoted"`), otherwise it is kept as a plain string.
pub fn parse_context_entry(entry: &str) -> Result<(String, Value)> {
    let Some((key, value)) = entry.split_once('=') else {
        return Err(SiteError::ConfigError(format!(
            "context entry {entry:?} must look like name=value"
        )));
    };
    let key = key.trim();
    if !CONTEXT_KEY.is_match(key) {
        return Err(SiteError::ConfigError(format!(
            "context name {key:?} is not a valid identifier"
        )));
    }

    let value = value.trim();
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

/// Make `input` absolute against `cwd` and drop `.` / `..` lexically.
pub fn absolutize(cwd: &Path, input: &str) -> PathBuf {
    let joined = cwd.join(input.trim());
    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn check_parent(fs: &dyn FileSystem, what: &str, dir: &Path) -> Result<()> {
    match dir.parent() {
        Some(parent) if fs.is_dir(parent) => Ok(()),
        _ => Err(SiteError::ConfigError(format!(
            "invalid {what} directory {:?}: parent directory does not exist",
            dir
        ))),
    }
}
