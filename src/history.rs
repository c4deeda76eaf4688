//! Snapshot-based undo/redo.
//!
//! Each entry is a deep copy of the scene's items and connections taken at a
//! mutation boundary (end of a drag, a create, a delete). The top of the
//! undo stack always mirrors the live scene; the bottom entry is the
//! baseline and is never undone past.

use crate::media::MediaStore;
use crate::profile_scope;
use crate::scene::Scene;
use crate::types::{CanvasItem, Connection};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, warn};

use crate::constants::MAX_HISTORY_STATES;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub items: Vec<CanvasItem>,
    pub connections: Vec<Connection>,
}

impl HistoryEntry {
    pub fn capture(scene: &Scene) -> Self {
        Self {
            items: scene.items().to_vec(),
            connections: scene.connections().to_vec(),
        }
    }
}

/// Replace the live scene with an entry. Media items whose resource is not
/// resident are skipped, which also drops their connections.
pub fn restore(entry: &HistoryEntry, scene: &mut Scene, media: &dyn MediaStore) {
    profile_scope!("history_restore");

    let items: Vec<CanvasItem> = entry
        .items
        .iter()
        .filter(|item| match item.content.media_id() {
            // Placeholders without a media id are always kept
            Some(media_id) if !media_id.is_empty() && !media.is_resident(media_id) => {
                warn!(id = %item.id, media_id, "Skipped item with missing media");
                false
            }
            _ => true,
        })
        .cloned()
        .collect();
    scene.replace_contents(items, entry.connections.clone());
}

pub struct HistoryManager {
    undo_stack: VecDeque<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
    capacity: usize,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(MAX_HISTORY_STATES)
    }
}

impl HistoryManager {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(2);
        Self {
            undo_stack: VecDeque::with_capacity(capacity),
            redo_stack: Vec::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Shrinking evicts the oldest entries.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(2);
        self.trim();
    }

    pub fn len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo_stack.is_empty()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn can_undo(&self) -> bool {
        self.undo_stack.len() >= 2
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Whether any undo or redo entry still holds an item backed by `media_id`.
    pub fn references_media(&self, media_id: &str) -> bool {
        self.undo_stack
            .iter()
            .chain(self.redo_stack.iter())
            .flat_map(|entry| entry.items.iter())
            .any(|item| item.content.media_id() == Some(media_id))
    }

    fn trim(&mut self) {
        while self.undo_stack.len() > self.capacity {
            self.undo_stack.pop_front();
        }
    }

    /// Push the current scene. Returns false when it equals the current top,
    /// in which case nothing changes (redo survives too).
    pub fn snapshot(&mut self, scene: &Scene) -> bool {
        profile_scope!("history_snapshot");

        let entry = HistoryEntry::capture(scene);
        if self.undo_stack.back() == Some(&entry) {
            return false;
        }
        self.undo_stack.push_back(entry);
        self.trim();
        self.redo_stack.clear();
        debug!(depth = self.undo_stack.len(), "History snapshot");
        true
    }

    pub fn undo(&mut self, scene: &mut Scene, media: &dyn MediaStore) -> bool {
        if self.undo_stack.len() < 2 {
            return false;
        }
        let Some(current) = self.undo_stack.pop_back() else {
            return false;
        };
        self.redo_stack.push(current);
        if let Some(previous) = self.undo_stack.back() {
            restore(previous, scene, media);
        }
        debug!(depth = self.undo_stack.len(), redo = self.redo_stack.len(), "Undo");
        true
    }

    pub fn redo(&mut self, scene: &mut Scene, media: &dyn MediaStore) -> bool {
        let Some(entry) = self.redo_stack.pop() else {
            return false;
        };
        restore(&entry, scene, media);
        self.undo_stack.push_back(entry);
        self.trim();
        debug!(depth = self.undo_stack.len(), redo = self.redo_stack.len(), "Redo");
        true
    }
}
