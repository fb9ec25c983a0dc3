// src/watch/mod.rs

//! File watching.
//!
//! This module is responsible for:
//! - Defining the `EventSource` / `Subscription` seam the watch loop uses.
//! - Wiring up a cross-platform, non-recursive filesystem watcher (`notify`)
//!   behind that seam.
//! - Normalizing event paths against the source directory.
//!
//! It does **not** decide what to compile; it only turns filesystem changes
//! into `ChangeEvent`s. Filtering lives in [`crate::engine`].

pub mod path_utils;
pub mod source;
pub mod watcher;

pub use source::{EventSource, Subscription};
pub use watcher::{spawn_watcher, NotifySource, WatcherHandle};
