//! Selection set: any number of items, or a single connection, never both.

use crate::types::{ConnectionId, ItemId};
use std::collections::BTreeSet;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Selection {
    items: BTreeSet<ItemId>,
    connection: Option<ConnectionId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.connection.is_none()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.contains(id)
    }

    /// Selected item ids in a stable order.
    pub fn items(&self) -> Vec<ItemId> {
        self.items.iter().cloned().collect()
    }

    pub fn connection(&self) -> Option<&str> {
        self.connection.as_deref()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.connection = None;
    }

    /// Replace the selection with a single item.
    pub fn collapse_to(&mut self, id: &str) {
        self.clear();
        self.items.insert(id.to_string());
    }

    pub fn insert(&mut self, id: &str) {
        self.connection = None;
        self.items.insert(id.to_string());
    }

    /// Flip membership of an item. Returns true if it is now selected.
    pub fn toggle(&mut self, id: &str) -> bool {
        self.connection = None;
        if self.items.remove(id) {
            false
        } else {
            self.items.insert(id.to_string());
            true
        }
    }

    pub fn extend<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = ItemId>,
    {
        self.connection = None;
        self.items.extend(ids);
    }

    pub fn select_connection(&mut self, id: &str) {
        self.items.clear();
        self.connection = Some(id.to_string());
    }

    /// Drop ids that no longer exist after a scene change.
    pub fn retain_existing(
        &mut self,
        item_exists: impl Fn(&str) -> bool,
        connection_exists: impl Fn(&str) -> bool,
    ) {
        self.items.retain(|id| item_exists(id));
        if let Some(ref id) = self.connection {
            if !connection_exists(id) {
                self.connection = None;
            }
        }
    }
}
