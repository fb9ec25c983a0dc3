// src/output.rs

//! User-facing progress lines.
//!
//! Logs go to stderr through `tracing`; these lines are the tool's actual
//! output. Successes are only printed in verbose mode, failures always.

use std::path::Path;

use crate::errors::SiteError;

#[derive(Debug, Clone, Copy, Default)]
pub struct Reporter {
    verbose: bool,
}

impl Reporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub fn generated(&self, output: &Path) {
        if self.verbose {
            println!("{} generated", output.display());
        }
    }

    pub fn failed(&self, file: &str, err: &SiteError) {
        eprintln!("error: {file}: {err}");
    }

    /// Informational line shown only in verbose mode.
    pub fn note(&self, message: &str) {
        if self.verbose {
            println!("{message}");
        }
    }
}
