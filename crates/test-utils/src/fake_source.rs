use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use sitegen::errors::Result;
use sitegen::types::{ChangeEvent, ChangeKind};
use sitegen::watch::{EventSource, Subscription};

#[derive(Debug, Default)]
struct Inner {
    tx: Option<mpsc::UnboundedSender<ChangeEvent>>,
    dir: Option<PathBuf>,
    closed: bool,
}

/// A fake event source that:
/// - records which directory was subscribed to
/// - lets the test emit synthetic change events in a chosen order
/// - records whether the subscription was closed.
///
/// Clones share state: hand one clone to the `WatchLoop` and keep another to
/// drive it.
#[derive(Debug, Clone, Default)]
pub struct ManualEventSource {
    inner: Arc<Mutex<Inner>>,
}

impl ManualEventSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver one event. Returns false if nobody is subscribed any more.
    pub fn emit(&self, event: ChangeEvent) -> bool {
        let guard = self.inner.lock().unwrap();
        match &guard.tx {
            Some(tx) => tx.send(event).is_ok(),
            None => false,
        }
    }

    /// Deliver a `Modified` event for `name` inside the subscribed dir.
    pub fn modify(&self, name: &str) -> bool {
        self.emit_kind(name, ChangeKind::Modified)
    }

    pub fn emit_kind(&self, name: &str, kind: ChangeKind) -> bool {
        let dir = self
            .subscribed_dir()
            .expect("modify() called before the watch loop subscribed");
        self.emit(ChangeEvent::new(dir.join(name), kind))
    }

    /// Drop the sender without closing the subscription, as if the
    /// underlying watcher died.
    pub fn disconnect(&self) {
        self.inner.lock().unwrap().tx = None;
    }

    pub fn subscribed_dir(&self) -> Option<PathBuf> {
        self.inner.lock().unwrap().dir.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().unwrap().closed
    }
}

struct ManualSubscription {
    inner: Arc<Mutex<Inner>>,
}

impl Subscription for ManualSubscription {
    fn close(&mut self) {
        let mut guard = self.inner.lock().unwrap();
        guard.tx = None;
        guard.closed = true;
    }
}

impl EventSource for ManualEventSource {
    fn subscribe(
        &mut self,
        dir: &Path,
        tx: mpsc::UnboundedSender<ChangeEvent>,
    ) -> Result<Box<dyn Subscription>> {
        let mut guard = self.inner.lock().unwrap();
        guard.tx = Some(tx);
        guard.dir = Some(dir.to_path_buf());
        guard.closed = false;

        Ok(Box::new(ManualSubscription {
            inner: Arc::clone(&self.inner),
        }))
    }
}
