// src/watch/watcher.rs

use std::path::{Path, PathBuf};

use anyhow::Context;
use notify::event::{ModifyKind, RenameMode};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::types::{ChangeEvent, ChangeKind};
use crate::watch::source::{EventSource, Subscription};

/// Handle for the filesystem watcher.
///
/// Keeps the underlying `RecommendedWatcher` alive. Closing (or dropping)
/// the handle unwatches the directory and releases the OS watch.
pub struct WatcherHandle {
    inner: Option<RecommendedWatcher>,
    root: PathBuf,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle")
            .field("root", &self.root)
            .field("active", &self.inner.is_some())
            .finish()
    }
}

impl Subscription for WatcherHandle {
    fn close(&mut self) {
        if let Some(mut watcher) = self.inner.take() {
            if let Err(err) = watcher.unwatch(&self.root) {
                debug!("unwatch {:?} failed: {err}", self.root);
            }
            info!("file watcher on {:?} closed", self.root);
        }
    }
}

impl Drop for WatcherHandle {
    fn drop(&mut self) {
        self.close();
    }
}

/// `EventSource` backed by `notify`'s recommended platform watcher.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotifySource;

impl EventSource for NotifySource {
    fn subscribe(
        &mut self,
        dir: &Path,
        tx: mpsc::UnboundedSender<ChangeEvent>,
    ) -> Result<Box<dyn Subscription>> {
        Ok(Box::new(spawn_watcher(dir, tx)?))
    }
}

/// Start a non-recursive watcher on `root` that forwards every changed path
/// as a `ChangeEvent` into `event_tx`.
///
/// Only direct children of `root` are reported; templates in
/// subdirectories are never compiled on their own.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    event_tx: mpsc::UnboundedSender<ChangeEvent>,
) -> Result<WatcherHandle> {
    let root = root.into();
    // Canonicalize once so we have a stable base path.
    let root = root.canonicalize().unwrap_or_else(|_| root.clone());

    // Closure called synchronously by notify whenever an event arrives.
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                let kind = change_kind(&event.kind);
                for path in event.paths {
                    if event_tx.send(ChangeEvent::new(path, kind)).is_err() {
                        // Receiver gone: the loop has stopped.
                        return;
                    }
                }
            }
            Err(err) => warn!("file watch error: {err}"),
        },
        Config::default(),
    )
    .context("creating file watcher")?;

    watcher
        .watch(&root, RecursiveMode::NonRecursive)
        .with_context(|| format!("watching {:?}", root))?;

    info!("file watcher started on {:?}", root);

    Ok(WatcherHandle {
        inner: Some(watcher),
        root,
    })
}

/// Collapse notify's detailed event kinds into the ones the loop cares
/// about.
///
/// A rename *onto* a path counts as a modification because editors that save
/// through a temp file replace the template that way.
pub fn change_kind(kind: &EventKind) -> ChangeKind {
    match kind {
        EventKind::Modify(ModifyKind::Data(_))
        | EventKind::Modify(ModifyKind::Any)
        | EventKind::Modify(ModifyKind::Other)
        | EventKind::Modify(ModifyKind::Name(RenameMode::To)) => ChangeKind::Modified,
        EventKind::Create(_) => ChangeKind::Created,
        EventKind::Remove(_) => ChangeKind::Removed,
        _ => ChangeKind::Other,
    }
}
