// src/config/mod.rs

//! Project configuration for sitegen.
//!
//! Responsibilities:
//! - Define the persisted settings shape and the validated `ProjectConfig`
//!   (`model.rs`).
//! - Load / save a settings file from disk (`loader.rs`).
//! - Check the directory invariants (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{
    default_settings_path, load_and_validate, load_and_validate_with, save_to_path,
};
pub use model::{ProjectConfig, RawSettings};
pub use validate::validate_settings;
