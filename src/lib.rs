// src/lib.rs

pub mod cli;
pub mod compile;
pub mod config;
pub mod engine;
pub mod errors;
pub mod fs;
pub mod init;
pub mod logging;
pub mod output;
pub mod render;
pub mod types;
pub mod watch;

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use crate::cli::{CliArgs, Command, CompileArgs, WatchArgs};
use crate::compile::Compiler;
use crate::config::{load_and_validate, save_to_path};
use crate::engine::{WatchLoop, WatchStats};
use crate::fs::RealFileSystem;
use crate::output::Reporter;
use crate::watch::{EventSource, NotifySource};

/// High-level entry point used by `main.rs`.
///
/// Settings are loaded and validated before any command does work, so a
/// configuration error never leaves partial output behind.
pub async fn run(args: CliArgs) -> Result<()> {
    match args.command {
        Command::Init { settings } => run_init(settings),
        Command::Compile(args) => run_compile(args).await,
        Command::Watch(args) => run_watch(args).await,
    }
}

fn run_init(default_settings: PathBuf) -> Result<()> {
    let cwd = std::env::current_dir().context("reading current directory")?;
    let (answers, settings_path) = init::prompt_answers(&cwd, &default_settings)?;

    let cfg = init::initialize(&RealFileSystem, &cwd, &answers)?;
    save_to_path(&cfg, &settings_path)?;

    info!(settings = ?settings_path, "project initialised");
    println!("settings written to {}", settings_path.display());
    Ok(())
}

async fn run_compile(args: CompileArgs) -> Result<()> {
    let cfg = load_and_validate(&args.settings)?;
    let compiler = Compiler::new(Arc::new(cfg));
    let reporter = Reporter::new(args.verbose);

    if let Some(file) = args.file {
        // Single-file mode: there is nothing else to do, so any failure is
        // the command's failure.
        let output = compiler
            .compile_one(&file)
            .with_context(|| format!("compiling {file}"))?;
        reporter.generated(&output);
    } else {
        let report = compiler.compile_all(args.jobs).await?;
        for outcome in &report.outcomes {
            match &outcome.result {
                Ok(output) => reporter.generated(output),
                Err(err) => reporter.failed(&outcome.file, err),
            }
        }

        if !report.is_success() {
            bail!(
                "{} of {} template(s) failed to compile",
                report.failed().count(),
                report.len()
            );
        }
    }

    reporter.note("compilation finished");
    Ok(())
}

async fn run_watch(args: WatchArgs) -> Result<()> {
    let cfg = load_and_validate(&args.settings)?;
    let compiler = Compiler::new(Arc::new(cfg));
    let reporter = Reporter::new(args.verbose);

    let stats = watch_until(compiler, NotifySource, reporter, tokio::signal::ctrl_c()).await?;
    info!(?stats, "watch finished");
    Ok(())
}

/// Body of the `watch` command.
///
/// Runs a [`WatchLoop`] over `source` until `shutdown` resolves or the
/// event stream ends on its own, then stops it cleanly. The subscription
/// is always released before this returns.
pub async fn watch_until<S, F>(
    compiler: Compiler,
    source: S,
    reporter: Reporter,
    shutdown: F,
) -> Result<WatchStats>
where
    S: EventSource,
    F: Future<Output = std::io::Result<()>>,
{
    reporter.note("starting watcher...");
    let mut watch = WatchLoop::with_source(compiler, source, reporter);
    watch.start()?;
    println!("Press Ctrl+C to stop...");

    let signal = tokio::select! {
        res = shutdown => res,
        _ = watch.finished() => {
            warn!("file watcher ended unexpectedly");
            Ok(())
        }
    };

    reporter.note("stopping watcher");
    let stats = watch.stop().await;

    signal.context("failed to listen for Ctrl+C")?;
    Ok(stats)
}
