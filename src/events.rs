//! Typed messages passed from the scene and controller to observers.
//!
//! The set is closed: render sync, the minimap throttle, and autosave all
//! match exhaustively on `SceneEvent` instead of listening on an untyped bus.

use crate::types::{ConnectionId, ItemId};
use std::sync::mpsc::{Receiver, Sender, channel};

#[derive(Clone, Debug, PartialEq)]
pub enum SceneEvent {
    ItemCreated(ItemId),
    /// Geometry, content, color, lock, or z-order changed
    ItemUpdated(ItemId),
    ItemDeleted(ItemId),
    ConnectionCreated(ConnectionId),
    ConnectionUpdated(ConnectionId),
    ConnectionDeleted(ConnectionId),
    /// The whole scene was swapped (undo/redo, load, import)
    SceneReplaced,
    ViewportChanged,
    SelectionChanged,
}

impl SceneEvent {
    /// Returns true if the event changes persisted scene data.
    pub fn is_model_mutation(&self) -> bool {
        !matches!(self, SceneEvent::SelectionChanged)
    }
}

/// Sending half handed to the scene; cloning it is cheap.
#[derive(Clone)]
pub struct EventSink {
    tx: Sender<SceneEvent>,
}

impl EventSink {
    pub fn emit(&self, event: SceneEvent) {
        // The receiver lives as long as the workspace; a closed channel
        // only happens during teardown.
        let _ = self.tx.send(event);
    }
}

/// Create a connected sink/receiver pair.
pub fn event_channel() -> (EventSink, Receiver<SceneEvent>) {
    let (tx, rx) = channel();
    (EventSink { tx }, rx)
}

/// Drain everything currently queued on a receiver.
pub fn drain(rx: &Receiver<SceneEvent>) -> Vec<SceneEvent> {
    rx.try_iter().collect()
}
