// src/config/loader.rs

use std::path::{Path, PathBuf};

use crate::config::model::{ProjectConfig, RawSettings};
use crate::config::validate::validate_settings;
use crate::errors::{Result, SiteError};
use crate::fs::{FileSystem, RealFileSystem};
use crate::types::SettingsFormat;

/// Read and deserialize a settings file (JSON, or TOML for `*.toml`)
/// without checking the directories.
///
/// Every failure, including a missing file, is reported as a
/// `ConfigError` so the command aborts before doing any work.
fn load_from_fs(fs: &dyn FileSystem, path: &Path) -> Result<RawSettings> {
    let contents = fs
        .read_to_string(path)
        .map_err(|e| SiteError::ConfigError(format!("cannot read settings file: {e:#}")))?;

    parse_settings(&contents, SettingsFormat::from_path(path))
        .map_err(|msg| SiteError::ConfigError(format!("invalid settings file {:?}: {msg}", path)))
}

fn parse_settings(contents: &str, format: SettingsFormat) -> std::result::Result<RawSettings, String> {
    match format {
        SettingsFormat::Json => serde_json::from_str(contents).map_err(|e| e.to_string()),
        SettingsFormat::Toml => toml::from_str(contents).map_err(|e| e.to_string()),
    }
}

/// Load a settings file from path and validate it into a `ProjectConfig`.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads JSON / TOML.
/// - Resolves relative directories against the settings file's directory.
/// - Checks that both directories exist and are distinct.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ProjectConfig> {
    load_and_validate_with(&RealFileSystem, path.as_ref())
}

/// Same as [`load_and_validate`] against an arbitrary filesystem.
pub fn load_and_validate_with(fs: &dyn FileSystem, path: &Path) -> Result<ProjectConfig> {
    let raw = load_from_fs(fs, path)?;
    let raw = raw.resolve_relative_to(&settings_root_dir(path));
    validate_settings(fs, raw)
}

/// Persist `config` to `path`, picking the format from the extension.
pub fn save_to_path(config: &ProjectConfig, path: impl AsRef<Path>) -> Result<()> {
    save_with(&RealFileSystem, config, path.as_ref())
}

pub(crate) fn save_with(fs: &dyn FileSystem, config: &ProjectConfig, path: &Path) -> Result<()> {
    let raw = config.to_raw();
    let contents = match SettingsFormat::from_path(path) {
        SettingsFormat::Json => serde_json::to_string_pretty(&raw)
            .map_err(|e| SiteError::ConfigError(format!("cannot serialize settings: {e}")))?,
        SettingsFormat::Toml => toml::to_string_pretty(&raw)
            .map_err(|e| SiteError::ConfigError(format!("cannot serialize settings: {e}")))?,
    };
    fs.write_atomic(path, contents.as_bytes())?;
    Ok(())
}

/// Directory that relative paths inside the settings file are resolved
/// against.
///
/// - If the settings path has a non-empty parent (e.g. "site/settings.json"),
///   we use that directory.
/// - If it's just a bare filename like "settings.json" (parent = ""),
///   we fall back to the current working directory.
pub fn settings_root_dir(settings_path: &Path) -> PathBuf {
    match settings_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Default settings filename, relative to the current directory.
pub fn default_settings_path() -> PathBuf {
    PathBuf::from("settings.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    fn site_fs() -> MockFileSystem {
        let fs = MockFileSystem::new();
        fs.add_dir("/site/templates");
        fs.add_dir("/site/build");
        fs
    }

    #[test]
    fn loads_json_with_unknown_keys_and_context() {
        let fs = site_fs();
        fs.add_file(
            "/site/settings.json",
            r#"{
                "input_dir": "/site/templates",
                "output_dir": "/site/build",
                "exclude": ["base.html"],
                "context": {"title": "Home", "year": 2024},
                "theme": "dark"
            }"#,
        );

        let cfg = load_and_validate_with(&fs, Path::new("/site/settings.json")).unwrap();
        assert!(cfg.is_excluded("base.html"));
        assert_eq!(cfg.context()["title"], "Home");
        assert_eq!(cfg.context()["year"], 2024);
        assert!(!cfg.watch_created());
    }

    #[test]
    fn loads_toml_and_resolves_relative_dirs() {
        let fs = site_fs();
        fs.add_file(
            "/site/settings.toml",
            r#"
input_dir = "templates"
output_dir = "build"
exclude = []
watch_created = true

[context]
title = "Home"
"#,
        );

        let cfg = load_and_validate_with(&fs, Path::new("/site/settings.toml")).unwrap();
        assert_eq!(cfg.source_dir(), Path::new("/site/templates"));
        assert_eq!(cfg.output_dir(), Path::new("/site/build"));
        assert!(cfg.watch_created());
    }

    #[test]
    fn missing_required_key_is_config_error() {
        let fs = site_fs();
        fs.add_file(
            "/site/settings.json",
            r#"{"input_dir": "/site/templates", "exclude": []}"#,
        );

        let err = load_and_validate_with(&fs, Path::new("/site/settings.json")).unwrap_err();
        assert!(err.is_config_error());
        assert!(err.to_string().contains("output_dir"));
    }

    #[test]
    fn wrong_type_is_config_error() {
        let fs = site_fs();
        fs.add_file(
            "/site/settings.json",
            r#"{"input_dir": "/site/templates", "output_dir": "/site/build", "exclude": "base.html"}"#,
        );

        let err = load_and_validate_with(&fs, Path::new("/site/settings.json")).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn missing_file_is_config_error() {
        let fs = site_fs();
        let err = load_and_validate_with(&fs, Path::new("/site/settings.json")).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn save_then_load_keeps_exclusions_and_context() {
        let fs = site_fs();
        let mut raw = RawSettings {
            input_dir: "/site/templates".into(),
            output_dir: "/site/build".into(),
            exclude: vec!["draft.html".into()],
            context: Default::default(),
            watch_created: false,
        };
        raw.context.insert("title".into(), "Home".into());
        let cfg = validate_settings(&fs, raw).unwrap();

        save_with(&fs, &cfg, Path::new("/site/settings.json")).unwrap();
        let loaded = load_and_validate_with(&fs, Path::new("/site/settings.json")).unwrap();
        assert_eq!(loaded, cfg);
    }
}
