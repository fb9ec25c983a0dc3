// src/engine/runtime.rs

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::anyhow;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::compile::Compiler;
use crate::errors::{Result, SiteError};
use crate::output::Reporter;
use crate::types::ChangeEvent;
use crate::watch::path_utils::normalize_event_path;
use crate::watch::{EventSource, NotifySource, Subscription};

use super::core::CoreWatch;
use super::{WatchCommand, WatchEvent, WatchState, WatchStats};

/// Re-renders templates as their files change.
///
/// This is the async IO shell around [`CoreWatch`]: it owns the event
/// subscription, pulls `ChangeEvent`s off a channel and compiles one
/// template per accepted event. Events are handled strictly one at a time
/// in delivery order.
///
/// The subscription is released on every exit path: `stop()`, drop, and
/// the event loop ending on its own.
pub struct WatchLoop<S: EventSource = NotifySource> {
    core: Arc<Mutex<CoreWatch>>,
    compiler: Compiler,
    source: S,
    reporter: Reporter,
    subscription: Option<Box<dyn Subscription>>,
    cancel: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<WatchStats>>,
    stats: Option<WatchStats>,
}

impl<S: EventSource> fmt::Debug for WatchLoop<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchLoop")
            .field("state", &self.state())
            .field("source_dir", &self.compiler.config().source_dir())
            .finish_non_exhaustive()
    }
}

impl WatchLoop<NotifySource> {
    /// Watch loop backed by the platform file watcher.
    pub fn new(compiler: Compiler, reporter: Reporter) -> Self {
        Self::with_source(compiler, NotifySource, reporter)
    }
}

impl<S: EventSource> WatchLoop<S> {
    pub fn with_source(compiler: Compiler, source: S, reporter: Reporter) -> Self {
        let core = CoreWatch::new(compiler.config());
        Self {
            core: Arc::new(Mutex::new(core)),
            compiler,
            source,
            reporter,
            subscription: None,
            cancel: None,
            task: None,
            stats: None,
        }
    }

    pub fn state(&self) -> WatchState {
        lock_core(&self.core).state()
    }

    /// Subscribe to the source directory and start handling events.
    ///
    /// Returns as soon as the subscription is open; events are processed on
    /// a spawned Tokio task. Must be called from within a Tokio runtime.
    pub fn start(&mut self) -> Result<()> {
        lock_core(&self.core).start().map_err(|state| {
            SiteError::Other(anyhow!("watch loop cannot start from state {state:?}"))
        })?;

        let source_dir = self.compiler.config().source_dir().to_path_buf();
        let (event_tx, event_rx) = mpsc::unbounded_channel::<ChangeEvent>();

        let subscription = match self.source.subscribe(&source_dir, event_tx) {
            Ok(s) => s,
            Err(err) => {
                let mut core = lock_core(&self.core);
                core.begin_stop();
                core.finish_stop();
                return Err(err);
            }
        };
        self.subscription = Some(subscription);

        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
        self.cancel = Some(cancel_tx);

        let task = tokio::spawn(run_events(
            Arc::clone(&self.core),
            self.compiler.clone(),
            self.reporter,
            event_rx,
            cancel_rx,
        ));
        self.task = Some(task);

        info!(dir = ?source_dir, "watch loop started");
        Ok(())
    }

    /// Wait until the event loop ends on its own (its event stream closed).
    ///
    /// Never returns while the loop is healthy and running, so callers race
    /// it against a shutdown signal. Cancel-safe.
    pub async fn finished(&mut self) {
        if let Some(task) = self.task.as_mut() {
            let stats = join_stats(task).await;
            self.task = None;
            self.stats = Some(stats);
        }
    }

    /// Stop watching and wait for the event being handled (if any) to be
    /// fully written.
    ///
    /// Queued events that were not yet picked up are dropped. Calling this
    /// on a loop that is already stopped (or never started) is a no-op.
    pub async fn stop(&mut self) -> WatchStats {
        let previous = lock_core(&self.core).begin_stop();
        match previous {
            WatchState::Idle => return WatchStats::default(),
            WatchState::Stopped => return self.stats.unwrap_or_default(),
            WatchState::Running | WatchState::Stopping => {}
        }

        self.release();

        if let Some(mut task) = self.task.take() {
            self.stats = Some(join_stats(&mut task).await);
        }

        lock_core(&self.core).finish_stop();
        let stats = self.stats.unwrap_or_default();
        info!(
            handled = stats.handled,
            skipped = stats.skipped,
            failed = stats.failed,
            "watch loop stopped"
        );
        stats
    }

    /// Close the subscription and signal the loop to exit.
    fn release(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.close();
        }
        if let Some(cancel) = self.cancel.take() {
            if cancel.send(()).is_err() {
                debug!("watch loop already finished while cancelling");
            }
        }
    }
}

impl<S: EventSource> Drop for WatchLoop<S> {
    fn drop(&mut self) {
        self.release();
    }
}

fn lock_core(core: &Mutex<CoreWatch>) -> MutexGuard<'_, CoreWatch> {
    core.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn join_stats(task: &mut JoinHandle<WatchStats>) -> WatchStats {
    match task.await {
        Ok(stats) => stats,
        Err(err) => {
            warn!("watch loop task did not finish cleanly: {err}");
            WatchStats::default()
        }
    }
}

/// Event loop body.
///
/// Cancellation is only checked *between* events: once an event has been
/// picked up its compile runs to completion, so a shutdown never leaves a
/// half-written output behind.
async fn run_events(
    core: Arc<Mutex<CoreWatch>>,
    compiler: Compiler,
    reporter: Reporter,
    mut event_rx: mpsc::UnboundedReceiver<ChangeEvent>,
    mut cancel_rx: oneshot::Receiver<()>,
) -> WatchStats {
    let mut stats = WatchStats::default();
    let source_dir = compiler.config().source_dir().to_path_buf();

    loop {
        let event = tokio::select! {
            biased;
            _ = &mut cancel_rx => {
                debug!("watch loop cancelled");
                break;
            }
            event = event_rx.recv() => match event {
                Some(event) => event,
                None => {
                    info!("change event stream closed; exiting watch loop");
                    break;
                }
            },
        };

        debug!(?event, "received change event");
        let event = ChangeEvent::new(normalize_event_path(&source_dir, &event.path), event.kind);

        let step = lock_core(&core).step(WatchEvent::Changed(event));
        match step.command {
            WatchCommand::Compile(name) => {
                handle_compile(&compiler, &reporter, name, &mut stats).await;
            }
            WatchCommand::Skip(reason) => {
                debug!(?reason, "change event skipped");
                stats.skipped += 1;
            }
        }

        if !step.keep_running {
            break;
        }
    }

    lock_core(&core).step(WatchEvent::ShutdownRequested);
    stats
}

async fn handle_compile(
    compiler: &Compiler,
    reporter: &Reporter,
    name: String,
    stats: &mut WatchStats,
) {
    if !compiler.is_source_file(&name) {
        debug!(file = %name, "template vanished before compile; skipping");
        stats.skipped += 1;
        return;
    }

    let worker = compiler.clone();
    let file = name.clone();
    let result = tokio::task::spawn_blocking(move || worker.compile_one(&file))
        .await
        .unwrap_or_else(|join_err| {
            Err(SiteError::Other(anyhow!(
                "compile task for {name} did not finish: {join_err}"
            )))
        });

    match result {
        Ok(output) => {
            info!(file = %name, "re-rendered after change");
            reporter.generated(&output);
            stats.handled += 1;
        }
        Err(err) => {
            warn!(file = %name, error = %err, "failed to re-render after change");
            reporter.failed(&name, &err);
            stats.failed += 1;
        }
    }
}
