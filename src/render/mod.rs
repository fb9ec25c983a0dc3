// src/render/mod.rs

//! Template rendering.
//!
//! Wraps `minijinja` with the project's context and source directory. The
//! renderer turns one template name into text and nothing more: it never
//! lists directories and never writes output. Picking files and writing
//! results is the job of [`crate::compile`] and [`crate::engine`].
//!
//! Escaping rules are fixed here rather than left to engine defaults:
//! templates named `*.html`, `*.htm` or `*.xml` are rendered with HTML
//! auto-escaping, everything else is rendered raw.

pub mod escape;
pub mod renderer;

pub use escape::escape_mode_for;
pub use renderer::Renderer;
