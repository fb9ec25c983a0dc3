// src/watch/source.rs

//! Pluggable change-event source.
//!
//! The watch loop talks to an `EventSource` instead of `notify` directly.
//! Production code uses [`crate::watch::NotifySource`]; tests can provide a
//! source that emits synthetic `ChangeEvent`s on demand.

use std::path::Path;

use tokio::sync::mpsc;

use crate::errors::Result;
use crate::types::ChangeEvent;

/// A live subscription. Closing it releases whatever OS resources back it
/// and stops further events from being delivered.
pub trait Subscription: Send {
    fn close(&mut self);
}

/// Something that can deliver change events for a directory.
pub trait EventSource: Send {
    /// Start delivering events for the direct children of `dir` into `tx`.
    ///
    /// Events must be sent in the order they were observed.
    fn subscribe(
        &mut self,
        dir: &Path,
        tx: mpsc::UnboundedSender<ChangeEvent>,
    ) -> Result<Box<dyn Subscription>>;
}
