// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::default_settings_path;

/// Command-line arguments for `sitegen`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "sitegen",
    version,
    about = "Render Jinja-style templates into a static site, once or on every change.",
    long_about = None
)]
pub struct CliArgs {
    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SITEGEN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Create a new project interactively and write its settings file.
    Init {
        /// Default name offered for the settings file.
        #[arg(short, long, value_name = "PATH", default_value_os_t = default_settings_path())]
        settings: PathBuf,
    },

    /// Compile one template or every non-excluded template.
    Compile(CompileArgs),

    /// Re-compile templates as they change until Ctrl+C.
    Watch(WatchArgs),
}

#[derive(Debug, Clone, Args)]
pub struct CompileArgs {
    /// Compile only this template (ignores the exclusion list).
    #[arg(short, long, value_name = "NAME")]
    pub file: Option<String>,

    /// Project settings file (JSON, or TOML for `*.toml`).
    #[arg(short, long, value_name = "PATH", default_value_os_t = default_settings_path())]
    pub settings: PathBuf,

    /// Print a line for every generated file.
    #[arg(short, long)]
    pub verbose: bool,

    /// Number of templates to render at the same time.
    #[arg(short, long, value_name = "N", default_value_t = 1)]
    pub jobs: usize,
}

#[derive(Debug, Clone, Args)]
pub struct WatchArgs {
    /// Project settings file (JSON, or TOML for `*.toml`).
    #[arg(short, long, value_name = "PATH", default_value_os_t = default_settings_path())]
    pub settings: PathBuf,

    /// Print a line for every generated file.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
