// src/engine/core.rs

//! Pure core of the watch loop.
//!
//! `CoreWatch` consumes [`WatchEvent`]s and produces [`WatchStep`]s telling
//! the IO shell whether to compile a template. It owns the lifecycle state
//! and the filtering rules, and has no channels, no Tokio types, and does
//! not touch the filesystem, so it can be unit tested directly.

use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::config::ProjectConfig;
use crate::engine::{SkipReason, WatchCommand, WatchEvent, WatchState, WatchStep};
use crate::types::{ChangeEvent, ChangeKind};
use crate::watch::path_utils::direct_child_name;

#[derive(Debug, Clone)]
pub struct CoreWatch {
    source_dir: PathBuf,
    excluded: BTreeSet<String>,
    react_to_created: bool,
    state: WatchState,
}

impl CoreWatch {
    pub fn new(config: &ProjectConfig) -> Self {
        Self {
            source_dir: config.source_dir().to_path_buf(),
            excluded: config.excluded().clone(),
            react_to_created: config.watch_created(),
            state: WatchState::Idle,
        }
    }

    pub fn state(&self) -> WatchState {
        self.state
    }

    /// `Idle → Running`. Any other starting state is refused.
    pub fn start(&mut self) -> Result<(), WatchState> {
        match self.state {
            WatchState::Idle => {
                self.state = WatchState::Running;
                Ok(())
            }
            other => Err(other),
        }
    }

    /// Begin shutting down and return the state we came from.
    ///
    /// - `Running → Stopping`
    /// - `Idle → Stopped` (never started, nothing to tear down)
    /// - `Stopping` / `Stopped` are left alone.
    pub fn begin_stop(&mut self) -> WatchState {
        let previous = self.state;
        self.state = match previous {
            WatchState::Idle => WatchState::Stopped,
            WatchState::Running => WatchState::Stopping,
            other => other,
        };
        previous
    }

    /// `Stopping → Stopped`, once the shell has drained in-flight work.
    pub fn finish_stop(&mut self) {
        if self.state == WatchState::Stopping {
            self.state = WatchState::Stopped;
        }
    }

    /// Handle a single event, updating state and returning what to do next.
    pub fn step(&mut self, event: WatchEvent) -> WatchStep {
        match event {
            WatchEvent::Changed(change) => WatchStep {
                command: self.decide(&change),
                keep_running: self.state == WatchState::Running,
            },
            WatchEvent::ShutdownRequested => {
                self.begin_stop();
                WatchStep {
                    command: WatchCommand::Skip(SkipReason::NotRunning),
                    keep_running: false,
                }
            }
        }
    }

    fn decide(&self, change: &ChangeEvent) -> WatchCommand {
        if self.state != WatchState::Running {
            return WatchCommand::Skip(SkipReason::NotRunning);
        }

        let accepted_kind = match change.kind {
            ChangeKind::Modified => true,
            ChangeKind::Created => self.react_to_created,
            ChangeKind::Removed | ChangeKind::Other => false,
        };
        if !accepted_kind {
            return WatchCommand::Skip(SkipReason::IgnoredKind);
        }

        let Some(name) = direct_child_name(&self.source_dir, &change.path) else {
            return WatchCommand::Skip(SkipReason::OutsideSource);
        };

        if self.excluded.contains(&name) {
            return WatchCommand::Skip(SkipReason::Excluded(name));
        }

        WatchCommand::Compile(name)
    }
}
