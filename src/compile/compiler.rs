// src/compile/compiler.rs

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::anyhow;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::compile::report::{CompileReport, FileOutcome};
use crate::config::ProjectConfig;
use crate::errors::{Result, SiteError};
use crate::fs::{FileSystem, RealFileSystem};
use crate::render::Renderer;

/// Renders templates and writes them into the output directory.
///
/// Shared by the batch path (`compile_all`) and the watch loop, which both
/// go through [`Compiler::compile_one`] for the actual work.
#[derive(Debug, Clone)]
pub struct Compiler {
    renderer: Renderer,
    fs: Arc<dyn FileSystem>,
}

impl Compiler {
    pub fn new(config: Arc<ProjectConfig>) -> Self {
        Self::with_fs(config, Arc::new(RealFileSystem))
    }

    pub fn with_fs(config: Arc<ProjectConfig>, fs: Arc<dyn FileSystem>) -> Self {
        let renderer = Renderer::with_fs(config, Arc::clone(&fs));
        Self { renderer, fs }
    }

    pub fn config(&self) -> &ProjectConfig {
        self.renderer.config()
    }

    /// True if `file_name` currently names a regular file in the source dir.
    pub fn is_source_file(&self, file_name: &str) -> bool {
        self.fs.is_file(&self.config().source_dir().join(file_name))
    }

    /// Render one template and atomically replace its output file.
    ///
    /// The exclusion list is *not* consulted: an explicit request for a file
    /// always compiles it. The output is only touched once rendering has
    /// fully succeeded.
    pub fn compile_one(&self, file_name: &str) -> Result<PathBuf> {
        let text = self.renderer.render(file_name)?;

        let out_path = self.config().output_path_for(file_name);
        self.fs
            .write_atomic(&out_path, text.as_bytes())
            .map_err(|e| SiteError::IoError(std::io::Error::other(format!("{e:#}"))))?;

        debug!(file = %file_name, output = ?out_path, "compiled template");
        Ok(out_path)
    }

    /// Regular files directly under the source directory, minus exclusions,
    /// sorted by name so batch order is stable across runs.
    pub fn select_files(&self) -> Result<Vec<String>> {
        let cfg = self.config();
        let entries = self
            .fs
            .read_dir(cfg.source_dir())
            .map_err(|e| SiteError::IoError(std::io::Error::other(format!("{e:#}"))))?;

        let mut files: Vec<String> = entries
            .into_iter()
            .filter(|p| self.fs.is_file(p))
            .filter_map(|p| {
                let name = p.file_name().and_then(|n| n.to_str()).map(str::to_string);
                if name.is_none() {
                    warn!(path = ?p, "skipping template with non UTF-8 name");
                }
                name
            })
            .filter(|name| {
                let excluded = cfg.is_excluded(name);
                if excluded {
                    debug!(file = %name, "excluded from batch compile");
                }
                !excluded
            })
            .collect();

        files.sort();
        Ok(files)
    }

    /// Compile every selected template.
    ///
    /// Up to `jobs` files are rendered at the same time on blocking worker
    /// threads. A failure in one file never cancels the others. The report
    /// lists outcomes in `select_files` order regardless of completion order.
    ///
    /// Only a failure to list the source directory is returned as `Err`.
    pub async fn compile_all(&self, jobs: usize) -> Result<CompileReport> {
        let files = self.select_files()?;
        info!(count = files.len(), jobs, "compiling templates");

        let semaphore = Arc::new(Semaphore::new(jobs.max(1)));
        let mut handles = Vec::with_capacity(files.len());

        for file in files {
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|e| SiteError::Other(e.into()))?;
            let compiler = self.clone();
            let name = file.clone();
            let handle = tokio::task::spawn_blocking(move || {
                let _permit = permit;
                compiler.compile_one(&name)
            });
            handles.push((file, handle));
        }

        let mut report = CompileReport::default();
        for (file, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(join_err) => Err(SiteError::Other(anyhow!(
                    "compile task for {file} did not finish: {join_err}"
                ))),
            };
            if let Err(ref err) = result {
                warn!(file = %file, error = %err, "failed to compile template");
            }
            report.outcomes.push(FileOutcome { file, result });
        }

        info!(
            ok = report.succeeded().count(),
            failed = report.failed().count(),
            "batch compile finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::path::Path;

    use crate::config::{validate_settings, RawSettings};
    use crate::errors::RenderError;
    use crate::fs::mock::MockFileSystem;

    fn compiler_with(files: &[(&str, &str)], exclude: &[&str]) -> (Compiler, MockFileSystem) {
        let fs = MockFileSystem::new();
        fs.add_dir("/site/templates");
        fs.add_dir("/site/build");
        for (name, body) in files {
            fs.add_file(Path::new("/site/templates").join(name), *body);
        }

        let mut context = BTreeMap::new();
        context.insert("title".to_string(), "Home".into());
        let raw = RawSettings {
            input_dir: "/site/templates".into(),
            output_dir: "/site/build".into(),
            exclude: exclude.iter().map(|s| s.to_string()).collect(),
            context,
            watch_created: false,
        };
        let cfg = validate_settings(&fs, raw).unwrap();
        (Compiler::with_fs(Arc::new(cfg), Arc::new(fs.clone())), fs)
    }

    #[test]
    fn select_files_skips_dirs_and_exclusions_and_sorts() {
        let (compiler, fs) = compiler_with(
            &[("b.html", ""), ("a.html", ""), ("draft.html", "")],
            &["draft.html"],
        );
        fs.add_dir("/site/templates/partials");

        assert_eq!(compiler.select_files().unwrap(), vec!["a.html", "b.html"]);
    }

    #[test]
    fn compile_one_bypasses_exclusions() {
        let (compiler, fs) = compiler_with(&[("draft.html", "{{ title }}")], &["draft.html"]);

        let out = compiler.compile_one("draft.html").unwrap();
        assert_eq!(out, Path::new("/site/build/draft.html"));
        assert_eq!(fs.contents(&out).as_deref(), Some("Home"));
    }

    #[test]
    fn failed_render_does_not_touch_existing_output() {
        let (compiler, fs) = compiler_with(&[("index.html", "{{ nope }}")], &[]);
        fs.add_file("/site/build/index.html", "previous");

        let err = compiler.compile_one("index.html").unwrap_err();
        assert!(matches!(err, SiteError::Render(RenderError::Undefined { .. })));
        assert_eq!(fs.contents("/site/build/index.html").as_deref(), Some("previous"));
        assert!(fs.writes().is_empty());
    }

    #[test]
    fn write_failure_is_io_error() {
        let (compiler, fs) = compiler_with(&[("index.html", "ok")], &[]);
        fs.fail_writes_to("/site/build/index.html");

        let err = compiler.compile_one("index.html").unwrap_err();
        assert!(matches!(err, SiteError::IoError(_)));
    }

    #[test]
    fn nested_template_without_output_subdir_is_io_error() {
        let (compiler, fs) = compiler_with(&[("sub/x.html", "{{ title }}")], &[]);

        let err = compiler.compile_one("sub/x.html").unwrap_err();
        assert!(matches!(err, SiteError::IoError(_)));
        assert!(fs.writes().is_empty());

        fs.add_dir("/site/build/sub");
        let out = compiler.compile_one("sub/x.html").unwrap();
        assert_eq!(fs.contents(&out).as_deref(), Some("Home"));
    }

    #[tokio::test]
    async fn compile_all_continues_past_failures() {
        let (compiler, fs) = compiler_with(
            &[("a.html", "{% if %}"), ("b.html", "<p>{{ title }}</p>"), ("c.txt", "{{ title }}")],
            &[],
        );

        let report = compiler.compile_all(2).await.unwrap();
        assert_eq!(report.files(), vec!["a.html", "b.html", "c.txt"]);
        assert!(!report.is_success());
        assert_eq!(report.failed().count(), 1);
        assert_eq!(fs.contents("/site/build/b.html").as_deref(), Some("<p>Home</p>"));
        assert_eq!(fs.contents("/site/build/c.txt").as_deref(), Some("Home"));
        assert!(!fs.exists(Path::new("/site/build/a.html")));
    }

    #[tokio::test]
    async fn compile_all_on_empty_source_is_success() {
        let (compiler, _fs) = compiler_with(&[], &[]);
        let report = compiler.compile_all(1).await.unwrap();
        assert!(report.is_empty());
        assert!(report.is_success());
    }
}
