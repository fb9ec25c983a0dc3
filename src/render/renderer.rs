// src/render/renderer.rs

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use minijinja::{Environment, ErrorKind, UndefinedBehavior};
use tracing::trace;

use crate::config::ProjectConfig;
use crate::errors::RenderError;
use crate::fs::{FileSystem, RealFileSystem};
use crate::render::escape::escape_mode_for;

/// Renders templates from the project's source directory with its context.
///
/// Cheap to clone and safe to share across blocking worker threads.
#[derive(Debug, Clone)]
pub struct Renderer {
    config: Arc<ProjectConfig>,
    fs: Arc<dyn FileSystem>,
}

impl Renderer {
    pub fn new(config: Arc<ProjectConfig>) -> Self {
        Self::with_fs(config, Arc::new(RealFileSystem))
    }

    pub fn with_fs(config: Arc<ProjectConfig>, fs: Arc<dyn FileSystem>) -> Self {
        Self { config, fs }
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// Render `file_name` (relative to the source directory) to text.
    ///
    /// A fresh environment is built per call so that a template edited on
    /// disk is never served from a stale cache while watching.
    pub fn render(&self, file_name: &str) -> Result<String, RenderError> {
        let env = self.environment();

        let template = env
            .get_template(file_name)
            .map_err(|e| to_render_error(file_name, e))?;

        trace!(file = %file_name, "rendering template");
        template
            .render(self.config.context())
            .map_err(|e| to_render_error(file_name, e))
    }

    fn environment(&self) -> Environment<'static> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_auto_escape_callback(escape_mode_for);

        let fs = Arc::clone(&self.fs);
        let source_dir = self.config.source_dir().to_path_buf();
        env.set_loader(move |name| {
            let Some(path) = template_path(&source_dir, name) else {
                return Ok(None);
            };
            if !fs.is_file(&path) {
                return Ok(None);
            }
            fs.read_to_string(&path).map(Some).map_err(|e| {
                minijinja::Error::new(ErrorKind::InvalidOperation, "could not read template")
                    .with_source(std::io::Error::other(format!("{e:#}")))
            })
        });

        env
    }
}

/// Join a template name onto `source_dir`, refusing anything that could
/// escape it (absolute paths, `..`, drive prefixes).
fn template_path(source_dir: &Path, name: &str) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }

    let mut path = source_dir.to_path_buf();
    for component in Path::new(name).components() {
        match component {
            Component::Normal(part) => path.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(path)
}

fn to_render_error(file_name: &str, err: minijinja::Error) -> RenderError {
    let file = file_name.to_string();
    match err.kind() {
        ErrorKind::TemplateNotFound => RenderError::NotFound { file },
        ErrorKind::SyntaxError | ErrorKind::BadEscape => RenderError::Syntax {
            file,
            message: err.to_string(),
        },
        ErrorKind::UndefinedError => RenderError::Undefined {
            file,
            message: err.to_string(),
        },
        _ => RenderError::Template {
            file,
            message: format!("{err:#}"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::config::{validate_settings, RawSettings};
    use crate::fs::mock::MockFileSystem;

    fn renderer_with(files: &[(&str, &str)], context: &[(&str, &str)]) -> Renderer {
        let fs = MockFileSystem::new();
        fs.add_dir("/site/templates");
        fs.add_dir("/site/build");
        for (name, body) in files {
            fs.add_file(Path::new("/site/templates").join(name), *body);
        }

        let raw = RawSettings {
            input_dir: "/site/templates".into(),
            output_dir: "/site/build".into(),
            exclude: vec![],
            context: context
                .iter()
                .map(|(k, v)| (k.to_string(), (*v).into()))
                .collect::<BTreeMap<_, _>>(),
            watch_created: false,
        };
        let cfg = validate_settings(&fs, raw).unwrap();
        Renderer::with_fs(Arc::new(cfg), Arc::new(fs))
    }

    #[test]
    fn renders_context_variables() {
        let r = renderer_with(&[("index.html", "<h1>{{ title }}</h1>")], &[("title", "Home")]);
        assert_eq!(r.render("index.html").unwrap(), "<h1>Home</h1>");
    }

    #[test]
    fn html_output_is_escaped_and_text_is_not() {
        let r = renderer_with(
            &[("index.html", "{{ body }}"), ("notes.txt", "{{ body }}")],
            &[("body", "<b>Tom & Jerry</b>")],
        );
        assert_eq!(
            r.render("index.html").unwrap(),
            "&lt;b&gt;Tom &amp; Jerry&lt;&#x2f;b&gt;"
        );
        assert_eq!(r.render("notes.txt").unwrap(), "<b>Tom & Jerry</b>");
    }

    #[test]
    fn includes_resolve_inside_source_dir() {
        let r = renderer_with(
            &[
                ("base.html", "<title>{{ title }}</title>{% block body %}{% endblock %}"),
                ("index.html", "{% extends \"base.html\" %}{% block body %}hi{% endblock %}"),
            ],
            &[("title", "Home")],
        );
        assert_eq!(r.render("index.html").unwrap(), "<title>Home</title>hi");
    }

    #[test]
    fn missing_template_is_not_found() {
        let r = renderer_with(&[], &[]);
        assert_eq!(
            r.render("nope.html").unwrap_err(),
            RenderError::NotFound {
                file: "nope.html".into()
            }
        );
    }

    #[test]
    fn path_escape_is_not_found() {
        let r = renderer_with(&[("index.html", "x")], &[]);
        assert!(matches!(
            r.render("../build/index.html"),
            Err(RenderError::NotFound { .. })
        ));
        assert!(matches!(
            r.render("/site/templates/index.html"),
            Err(RenderError::NotFound { .. })
        ));
    }

    #[test]
    fn syntax_error_is_reported() {
        let r = renderer_with(&[("broken.html", "{% if %}")], &[]);
        assert!(matches!(r.render("broken.html"), Err(RenderError::Syntax { .. })));
    }

    #[test]
    fn undefined_variable_is_an_error() {
        let r = renderer_with(&[("index.html", "{{ missing }}")], &[]);
        let err = r.render("index.html").unwrap_err();
        assert!(matches!(err, RenderError::Undefined { .. }));
        assert_eq!(err.file(), "index.html");
    }
}
