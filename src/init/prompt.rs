// src/init/prompt.rs

//! Interactive front-end for `sitegen init`.
//!
//! Only gathers answers; all checks happen in [`super::initialize`].

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use dialoguer::{Confirm, Input, MultiSelect};

use crate::fs::RealFileSystem;
use crate::init::project::{absolutize, list_templates, parse_context_entry, InitAnswers};

/// Ask for every init answer plus the settings file to write.
pub fn prompt_answers(cwd: &Path, default_settings: &Path) -> Result<(InitAnswers, PathBuf)> {
    let source_dir: String = Input::new()
        .with_prompt("Templates directory")
        .default("./templates/".to_string())
        .interact_text()?;

    let output_dir: String = Input::new()
        .with_prompt("Output directory for generated files")
        .default("./build/".to_string())
        .interact_text()?;

    let exclude = prompt_exclusions(&absolutize(cwd, &source_dir))?;
    let context = prompt_context()?;

    let watch_created = Confirm::new()
        .with_prompt("Also compile newly created files while watching?")
        .default(false)
        .interact()?;

    let settings: String = Input::new()
        .with_prompt("Settings file to write")
        .default(default_settings.to_string_lossy().into_owned())
        .interact_text()?;

    let answers = InitAnswers {
        source_dir,
        output_dir,
        exclude,
        context,
        watch_created,
    };
    Ok((answers, PathBuf::from(settings)))
}

fn prompt_exclusions(source_dir: &Path) -> Result<Vec<String>> {
    let templates = list_templates(&RealFileSystem, source_dir)?;
    if templates.is_empty() {
        return Ok(Vec::new());
    }

    let picked = MultiSelect::new()
        .with_prompt("Files that should not be compiled (space to toggle, enter to confirm)")
        .items(&templates)
        .interact()?;
    let exclude: Vec<String> = picked.into_iter().map(|i| templates[i].clone()).collect();

    if !exclude.is_empty()
        && !Confirm::new()
            .with_prompt(format!("Exclude these files? {exclude:?}"))
            .default(true)
            .interact()?
    {
        bail!("aborted");
    }

    Ok(exclude)
}

fn prompt_context() -> Result<Vec<String>> {
    let mut entries = Vec::new();
    loop {
        let entry: String = Input::new()
            .with_prompt("Context variable as name=value (empty to finish)")
            .allow_empty(true)
            .validate_with(|input: &String| -> std::result::Result<(), String> {
                if input.trim().is_empty() {
                    return Ok(());
                }
                parse_context_entry(input).map(|_| ()).map_err(|e| e.to_string())
            })
            .interact_text()?;

        if entry.trim().is_empty() {
            return Ok(entries);
        }
        entries.push(entry);
    }
}
