// src/compile/mod.rs

//! Batch compilation.
//!
//! - [`compiler`] owns the `Compiler`, which renders a template and commits
//!   the output atomically. It also selects the files a batch compile
//!   covers.
//! - [`report`] holds the per-file outcome types returned to the CLI.

pub mod compiler;
pub mod report;

pub use compiler::Compiler;
pub use report::{CompileReport, FileOutcome};
