// src/compile/report.rs

use std::path::PathBuf;

use crate::errors::Result;

/// Result of compiling a single template.
#[derive(Debug)]
pub struct FileOutcome {
    /// Template name relative to the source directory.
    pub file: String,
    /// Output path on success.
    pub result: Result<PathBuf>,
}

impl FileOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-file outcomes of a batch compile, in compile order.
#[derive(Debug, Default)]
pub struct CompileReport {
    pub outcomes: Vec<FileOutcome>,
}

impl CompileReport {
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// True when every file compiled (vacuously true for an empty batch).
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(FileOutcome::is_ok)
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|o| o.is_ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|o| !o.is_ok())
    }

    pub fn files(&self) -> Vec<&str> {
        self.outcomes.iter().map(|o| o.file.as_str()).collect()
    }
}
