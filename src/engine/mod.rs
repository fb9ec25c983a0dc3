// src/engine/mod.rs

//! Watch engine for sitegen.
//!
//! This module ties together:
//! - the change-event subscription (see [`crate::watch`])
//! - exclusion / event-kind filtering
//! - the watch loop that re-renders one template per accepted event and
//!   reacts to shutdown requests
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

use crate::types::ChangeEvent;

/// Lifecycle of a watch loop.
///
/// `Idle → Running → Stopping → Stopped`. A loop that is stopped before it
/// was ever started goes straight from `Idle` to `Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Idle,
    Running,
    Stopping,
    Stopped,
}

/// Events flowing into the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// A file in the source directory changed.
    Changed(ChangeEvent),
    /// Graceful shutdown requested (e.g. Ctrl-C or `stop()`).
    ShutdownRequested,
}

/// Why an event did not lead to a compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The basename is in the project's exclusion set.
    Excluded(String),
    /// The change kind is not one the loop reacts to.
    IgnoredKind,
    /// The path is not a direct child of the source directory.
    OutsideSource,
    /// The loop is not running.
    NotRunning,
}

/// What the shell should do in response to one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchCommand {
    /// Render and write this template (name relative to the source dir).
    Compile(String),
    Skip(SkipReason),
}

/// Result of stepping the core with one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchStep {
    pub command: WatchCommand,
    pub keep_running: bool,
}

/// Counters reported when a watch loop stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchStats {
    /// Events that compiled successfully.
    pub handled: usize,
    /// Events filtered out before compiling.
    pub skipped: usize,
    /// Events whose compile failed (render or write error).
    pub failed: usize,
}

pub mod core;
pub mod runtime;

pub use self::core::CoreWatch;
pub use runtime::WatchLoop;
