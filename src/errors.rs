// src/errors.rs

//! Crate-wide error types.
//!
//! `SiteError` is what library operations return. `RenderError` is the
//! per-template failure produced by the renderer and is always recoverable
//! at the batch / watch level.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SiteError {
    /// True for errors that must abort a command before any compile work.
    pub fn is_config_error(&self) -> bool {
        matches!(self, SiteError::ConfigError(_))
    }
}

/// Failure to turn one template into text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("template not found: {file}")]
    NotFound { file: String },

    #[error("syntax error in {file}: {message}")]
    Syntax { file: String, message: String },

    #[error("undefined variable in {file}: {message}")]
    Undefined { file: String, message: String },

    #[error("failed to render {file}: {message}")]
    Template { file: String, message: String },
}

impl RenderError {
    pub fn file(&self) -> &str {
        match self {
            RenderError::NotFound { file }
            | RenderError::Syntax { file, .. }
            | RenderError::Undefined { file, .. }
            | RenderError::Template { file, .. } => file,
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, SiteError>;
