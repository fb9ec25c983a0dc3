// tests/compile_batch.rs
mod common;
use crate::common::{init_tracing, with_timeout, ProjectFixture};

use std::error::Error;
use std::fs;

use serde_json::json;
use sitegen::errors::{RenderError, SiteError};

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn renders_index_and_skips_excluded_draft() -> TestResult {
    with_timeout(async {
        init_tracing();

        let project = ProjectFixture::new()
            .with_template("index.html", "<h1>{{ title }}</h1>")
            .with_template("draft.html", "<h1>{{ title }} (draft)</h1>")
            .with_exclude("draft.html")
            .with_context("title", json!("Home"));

        let report = project.compiler().compile_all(1).await?;

        assert!(report.is_success());
        assert_eq!(report.files(), vec!["index.html"]);
        assert_eq!(project.output("index.html").as_deref(), Some("<h1>Home</h1>"));
        assert_eq!(project.output_names(), vec!["index.html"]);

        Ok(())
    })
    .await
}

#[tokio::test]
async fn single_file_compile_ignores_the_exclusion_list() -> TestResult {
    with_timeout(async {
        init_tracing();

        let project = ProjectFixture::new()
            .with_template("draft.html", "draft of {{ title }}")
            .with_exclude("draft.html")
            .with_context("title", json!("Home"));

        let out = project.compiler().compile_one("draft.html")?;

        assert_eq!(out, project.config().output_dir().join("draft.html"));
        assert_eq!(project.output("draft.html").as_deref(), Some("draft of Home"));

        Ok(())
    })
    .await
}

#[tokio::test]
async fn compiling_twice_gives_identical_bytes() -> TestResult {
    with_timeout(async {
        init_tracing();

        let project = ProjectFixture::new()
            .with_template("a.html", "{% for i in items %}<li>{{ i }}</li>{% endfor %}")
            .with_template("b.txt", "plain {{ n }}")
            .with_context("items", json!(["x", "y", "z"]))
            .with_context("n", json!(3));
        let compiler = project.compiler();

        compiler.compile_all(1).await?;
        let first_a = fs::read(project.build_dir().join("a.html"))?;
        let first_b = fs::read(project.build_dir().join("b.txt"))?;

        compiler.compile_all(1).await?;
        assert_eq!(fs::read(project.build_dir().join("a.html"))?, first_a);
        assert_eq!(fs::read(project.build_dir().join("b.txt"))?, first_b);

        Ok(())
    })
    .await
}

#[tokio::test]
async fn one_broken_template_does_not_block_the_rest() -> TestResult {
    with_timeout(async {
        init_tracing();

        let project = ProjectFixture::new()
            .with_template("a.html", "{{ missing_variable }}")
            .with_template("b.html", "fine")
            .with_template("c.html", "{% if %}");

        let report = project.compiler().compile_all(2).await?;

        assert!(!report.is_success());
        assert_eq!(report.files(), vec!["a.html", "b.html", "c.html"]);

        let failed: Vec<&str> = report.failed().map(|o| o.file.as_str()).collect();
        assert_eq!(failed, vec!["a.html", "c.html"]);

        match &report.outcomes[0].result {
            Err(SiteError::Render(RenderError::Undefined { file, .. })) => {
                assert_eq!(file, "a.html")
            }
            other => panic!("expected undefined-variable error, got {other:?}"),
        }
        match &report.outcomes[2].result {
            Err(SiteError::Render(RenderError::Syntax { file, .. })) => assert_eq!(file, "c.html"),
            other => panic!("expected syntax error, got {other:?}"),
        }

        assert_eq!(project.output("b.html").as_deref(), Some("fine"));
        assert_eq!(project.output_names(), vec!["b.html"]);

        Ok(())
    })
    .await
}

#[tokio::test]
async fn failed_render_leaves_previous_output_untouched() -> TestResult {
    with_timeout(async {
        init_tracing();

        let project = ProjectFixture::new().with_template("page.html", "{{ nope }}");
        fs::write(project.build_dir().join("page.html"), "previous build")?;

        let err = project
            .compiler()
            .compile_one("page.html")
            .expect_err("undefined variable must fail");
        assert!(matches!(err, SiteError::Render(_)));

        assert_eq!(project.output("page.html").as_deref(), Some("previous build"));

        Ok(())
    })
    .await
}

#[tokio::test]
async fn parallel_jobs_keep_sorted_report_order() -> TestResult {
    with_timeout(async {
        init_tracing();

        let mut project = ProjectFixture::new();
        let names: Vec<String> = (0..12).rev().map(|i| format!("page{i:02}.html")).collect();
        for name in &names {
            project = project.with_template(name, name);
        }

        let report = project.compiler().compile_all(4).await?;

        let mut sorted = names.clone();
        sorted.sort();
        assert!(report.is_success());
        assert_eq!(report.files(), sorted.iter().map(String::as_str).collect::<Vec<_>>());
        assert_eq!(project.output_names(), sorted);

        Ok(())
    })
    .await
}

#[tokio::test]
async fn html_is_escaped_and_text_is_not() -> TestResult {
    with_timeout(async {
        init_tracing();

        let project = ProjectFixture::new()
            .with_template("page.html", "{{ snippet }}")
            .with_template("notes.txt", "{{ snippet }}")
            .with_template("feed.xml", "<t>{{ snippet }}</t>")
            .with_context("snippet", json!("<b>"));

        project.compiler().compile_all(1).await?;

        assert_eq!(project.output("page.html").as_deref(), Some("&lt;b&gt;"));
        assert_eq!(project.output("feed.xml").as_deref(), Some("<t>&lt;b&gt;</t>"));
        assert_eq!(project.output("notes.txt").as_deref(), Some("<b>"));

        Ok(())
    })
    .await
}

#[tokio::test]
async fn templates_can_extend_a_layout() -> TestResult {
    with_timeout(async {
        init_tracing();

        let project = ProjectFixture::new()
            .with_template(
                "base.html",
                "<title>{% block title %}{% endblock %}</title>",
            )
            .with_template(
                "about.html",
                "{% extends \"base.html\" %}{% block title %}About {{ site }}{% endblock %}",
            )
            .with_exclude("base.html")
            .with_context("site", json!("Acme"));

        let report = project.compiler().compile_all(1).await?;

        assert_eq!(report.files(), vec!["about.html"]);
        assert_eq!(
            project.output("about.html").as_deref(),
            Some("<title>About Acme</title>")
        );

        Ok(())
    })
    .await
}

#[tokio::test]
async fn subdirectories_of_the_source_are_not_templates() -> TestResult {
    with_timeout(async {
        init_tracing();

        let project = ProjectFixture::new().with_template("index.html", "hi");
        fs::create_dir(project.templates_dir().join("partials"))?;
        fs::write(project.templates_dir().join("partials").join("nav.html"), "nav")?;

        let report = project.compiler().compile_all(1).await?;

        assert_eq!(report.files(), vec!["index.html"]);
        assert_eq!(project.output_names(), vec!["index.html"]);

        Ok(())
    })
    .await
}

#[cfg(unix)]
#[tokio::test]
async fn recompiling_keeps_the_output_readable_by_others() -> TestResult {
    use std::os::unix::fs::PermissionsExt;

    with_timeout(async {
        init_tracing();

        let project = ProjectFixture::new().with_template("index.html", "v2");
        let out = project.build_dir().join("index.html");
        fs::write(&out, "v1")?;
        fs::set_permissions(&out, fs::Permissions::from_mode(0o644))?;

        let report = project.compiler().compile_all(1).await?;
        assert!(report.is_success());

        assert_eq!(fs::metadata(&out)?.permissions().mode() & 0o777, 0o644);
        assert_eq!(project.output("index.html").as_deref(), Some("v2"));

        Ok(())
    })
    .await
}
