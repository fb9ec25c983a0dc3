// src/init/mod.rs

//! Project initialisation.
//!
//! [`project::initialize`] is a pure function from answers to a validated
//! `ProjectConfig`; [`prompt`] is the interactive glue that collects those
//! answers from a terminal.

pub mod project;
pub mod prompt;

pub use project::{initialize, list_templates, InitAnswers};
pub use prompt::prompt_answers;
