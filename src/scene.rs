//! Scene model - the authoritative store of items and connections.
//!
//! The scene is a plain data arena addressed by id. It enforces the model
//! invariants on every mutation and never holds a reference to anything
//! visual:
//!
//! - Every connection references two distinct, existing items.
//! - At most one connection joins any unordered pair of items.
//! - Item sizes never drop below the configured minimum.
//! - The z-order counter only moves forward.
//!
//! All mutations are synchronous and total. Invalid requests are corrected or
//! ignored, never half-applied.

use crate::constants::{CHILD_SPAWN_GAP, MIN_ITEM_HEIGHT, MIN_ITEM_WIDTH};
use crate::events::{EventSink, SceneEvent};
use crate::geometry::{Point, Rect};
use crate::profile_scope;
use crate::spatial_index::SpatialIndex;
use crate::types::{
    CanvasItem, ColorTag, Connection, ConnectionDirection, ConnectionId, Handle, ItemContent,
    ItemId, ItemKind, ItemPatch, ItemSpec, clamp_size_to,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

// ============================================================================
// Id Generation
// ============================================================================

/// Monotonic counter plus an instance-unique salt.
///
/// The salt is regenerated for every scene instance, so ids minted after a
/// reload never collide with ids persisted by an earlier session even though
/// the counter itself is restored.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    salt: String,
    next: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        let salt = uuid::Uuid::new_v4().simple().to_string();
        Self {
            salt: salt[..8].to_string(),
            next: 0,
        }
    }

    pub fn next_item_id(&mut self) -> ItemId {
        self.mint("item")
    }

    pub fn next_connection_id(&mut self) -> ConnectionId {
        self.mint("conn")
    }

    pub fn counter(&self) -> u64 {
        self.next
    }

    /// Never moves the counter backwards.
    pub fn advance_to(&mut self, value: u64) {
        self.next = self.next.max(value);
    }

    fn mint(&mut self, prefix: &str) -> String {
        let id = format!("{}-{}-{}", prefix, self.salt, self.next);
        self.next += 1;
        id
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Counters persisted alongside the scene.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneCounters {
    pub next_id: u64,
    pub z_order: u64,
}

/// What `delete_item` removed, so the caller can release owned resources.
#[derive(Clone, Debug, PartialEq)]
pub struct RemovedItem {
    pub item: CanvasItem,
    pub connections: Vec<Connection>,
}

// ============================================================================
// Scene
// ============================================================================

pub struct Scene {
    items: Vec<CanvasItem>,
    connections: Vec<Connection>,
    ids: IdGenerator,
    z_counter: u64,
    spatial: SpatialIndex,
    min_size: (f32, f32),
    events: Option<EventSink>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            connections: Vec::new(),
            ids: IdGenerator::new(),
            z_counter: 0,
            spatial: SpatialIndex::new(),
            min_size: (MIN_ITEM_WIDTH, MIN_ITEM_HEIGHT),
            events: None,
        }
    }

    pub fn with_min_size(mut self, min_size: (f32, f32)) -> Self {
        self.min_size = min_size;
        self
    }

    /// Applies to later creates and resizes; existing items keep their size.
    pub fn set_min_size(&mut self, min_size: (f32, f32)) {
        self.min_size = min_size;
    }

    pub fn set_event_sink(&mut self, sink: EventSink) {
        self.events = Some(sink);
    }

    pub fn min_size(&self) -> (f32, f32) {
        self.min_size
    }

    fn emit(&self, event: SceneEvent) {
        if let Some(ref sink) = self.events {
            sink.emit(event);
        }
    }

    // ==================== Queries ====================

    pub fn items(&self) -> &[CanvasItem] {
        &self.items
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.connections.is_empty()
    }

    pub fn get_item(&self, id: &str) -> Option<&CanvasItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn contains_item(&self, id: &str) -> bool {
        self.get_item(id).is_some()
    }

    pub fn get_connection(&self, id: &str) -> Option<&Connection> {
        self.connections.iter().find(|c| c.id == id)
    }

    /// Connections whose `from` or `to` is the given item.
    pub fn connections_of<'a>(&'a self, item_id: &'a str) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections.iter().filter(move |c| c.touches(item_id))
    }

    pub fn connection_between(&self, a: &str, b: &str) -> Option<&Connection> {
        self.connections.iter().find(|c| c.joins(a, b))
    }

    pub fn counters(&self) -> SceneCounters {
        SceneCounters {
            next_id: self.ids.counter(),
            z_order: self.z_counter,
        }
    }

    pub fn restore_counters(&mut self, counters: SceneCounters) {
        self.ids.advance_to(counters.next_id);
        self.z_counter = self.z_counter.max(counters.z_order);
    }

    /// Items back to front: locked items first, then by ascending z-order.
    pub fn render_order(&self) -> Vec<&CanvasItem> {
        let mut ordered: Vec<&CanvasItem> = self.items.iter().collect();
        ordered.sort_by_key(|item| (!item.locked, item.z_order));
        ordered
    }

    /// Ids of items under a world point, topmost first.
    pub fn items_at_point(&self, point: Point) -> Vec<ItemId> {
        profile_scope!("scene_items_at_point");

        let candidates: HashSet<ItemId> =
            self.spatial.at_point(point).into_iter().collect();
        if candidates.is_empty() {
            return Vec::new();
        }
        self.render_order()
            .into_iter()
            .rev()
            .filter(|item| candidates.contains(&item.id))
            .map(|item| item.id.clone())
            .collect()
    }

    pub fn topmost_item_at(&self, point: Point) -> Option<&CanvasItem> {
        self.items_at_point(point)
            .first()
            .and_then(|id| self.get_item(id))
    }

    /// Ids of items whose bounds intersect a world rectangle (partial overlap
    /// qualifies), in creation order.
    pub fn items_in_rect(&self, rect: &Rect) -> Vec<ItemId> {
        let hits: HashSet<ItemId> = self.spatial.overlapping(rect).into_iter().collect();
        self.items
            .iter()
            .filter(|item| hits.contains(&item.id))
            .map(|item| item.id.clone())
            .collect()
    }

    /// Case-insensitive search over textual content.
    pub fn find_items(&self, query: &str) -> Vec<&CanvasItem> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.items
            .iter()
            .filter(|item| item.content.matches(&needle))
            .collect()
    }

    // ==================== Item Mutations ====================

    fn next_z(&mut self) -> u64 {
        self.z_counter += 1;
        self.z_counter
    }

    pub fn create_item(&mut self, spec: ItemSpec) -> CanvasItem {
        let kind = spec.content.kind();
        let size = clamp_size_to(spec.size.unwrap_or_else(|| kind.default_size()), self.min_size);
        let item = CanvasItem {
            id: self.ids.next_item_id(),
            position: finite_or_origin(spec.position),
            size,
            content: spec.content,
            color: spec.color,
            locked: spec.locked,
            z_order: self.next_z(),
        };
        debug!(id = %item.id, kind = kind.label(), "Created item");

        self.spatial.upsert(&item.id, Rect::of_item(&item));
        self.items.push(item.clone());
        self.emit(SceneEvent::ItemCreated(item.id.clone()));
        item
    }

    /// Remove an item and every connection that references it.
    pub fn delete_item(&mut self, id: &str) -> Option<RemovedItem> {
        let index = self.items.iter().position(|item| item.id == id)?;

        let (removed_connections, kept): (Vec<Connection>, Vec<Connection>) = self
            .connections
            .drain(..)
            .partition(|c| c.touches(id));
        self.connections = kept;

        let item = self.items.remove(index);
        self.spatial.remove(id);

        for conn in &removed_connections {
            self.emit(SceneEvent::ConnectionDeleted(conn.id.clone()));
        }
        self.emit(SceneEvent::ItemDeleted(item.id.clone()));
        debug!(
            id = %item.id,
            cascaded = removed_connections.len(),
            "Deleted item"
        );

        Some(RemovedItem {
            item,
            connections: removed_connections,
        })
    }

    /// Apply a patch atomically. Returns false (and changes nothing) if the
    /// item does not exist, the new content has a different kind, or the
    /// patch would move a locked item.
    pub fn mutate_item(&mut self, id: &str, patch: ItemPatch) -> bool {
        let min_size = self.min_size;
        let Some(item) = self.items.iter_mut().find(|item| item.id == id) else {
            return false;
        };

        if let Some(ref content) = patch.content {
            if content.kind() != item.kind() {
                warn!(id, "Rejected patch changing item kind");
                return false;
            }
        }
        let stays_locked = patch.locked.unwrap_or(item.locked);
        if item.locked && stays_locked && patch.position.is_some() {
            debug!(id, "Rejected move of locked item");
            return false;
        }

        if let Some(position) = patch.position {
            item.position = finite_or_origin(position);
        }
        if let Some(size) = patch.size {
            item.size = clamp_size_to(size, min_size);
        }
        if let Some(content) = patch.content {
            item.content = content;
        }
        if let Some(color) = patch.color {
            item.color = color;
        }
        if let Some(locked) = patch.locked {
            item.locked = locked;
        }

        let (position, size) = (item.position, item.size);
        self.spatial.upsert(id, Rect::new(position.0, position.1, size.0, size.1));
        self.emit(SceneEvent::ItemUpdated(id.to_string()));
        true
    }

    /// Advance the shared z counter and assign it to the item.
    pub fn bring_to_front(&mut self, id: &str) -> Option<u64> {
        if !self.contains_item(id) {
            return None;
        }
        let z = self.next_z();
        let item = self.items.iter_mut().find(|item| item.id == id)?;
        item.z_order = z;
        self.emit(SceneEvent::ItemUpdated(id.to_string()));
        Some(z)
    }

    pub fn set_color(&mut self, id: &str, color: Option<ColorTag>) -> bool {
        self.mutate_item(id, ItemPatch::new().color(color))
    }

    pub fn set_locked(&mut self, id: &str, locked: bool) -> bool {
        self.mutate_item(id, ItemPatch::new().locked(locked))
    }

    /// Move several items by the same world delta. Locked items stay put.
    pub fn translate_items(&mut self, ids: &[ItemId], dx: f32, dy: f32) {
        if !(dx.is_finite() && dy.is_finite()) {
            return;
        }
        for item in self.items.iter_mut() {
            if item.locked || !ids.contains(&item.id) {
                continue;
            }
            item.position.0 += dx;
            item.position.1 += dy;
            self.spatial.upsert(&item.id, Rect::of_item(item));
            if let Some(ref sink) = self.events {
                sink.emit(SceneEvent::ItemUpdated(item.id.clone()));
            }
        }
    }

    /// Create a child to the right of `parent_id`, connected parent.right ->
    /// child.left.
    pub fn spawn_child(&mut self, parent_id: &str, kind: ItemKind) -> Option<(CanvasItem, Connection)> {
        let parent = self.get_item(parent_id)?.clone();
        let size = kind.default_size();
        let x = parent.position.0 + parent.size.0 + CHILD_SPAWN_GAP;
        let y = parent.position.1 + (parent.size.1 - size.1.max(self.min_size.1)) / 2.0;

        let mut spec = ItemSpec::new(ItemContent::empty(kind)).at(x, y);
        spec.color = parent.color;
        let child = self.create_item(spec);
        let conn = self.create_connection(parent_id, Handle::Right, &child.id, Handle::Left)?;
        Some((child, conn))
    }

    // ==================== Connection Mutations ====================

    pub fn create_connection(
        &mut self,
        from: &str,
        from_handle: Handle,
        to: &str,
        to_handle: Handle,
    ) -> Option<Connection> {
        self.create_connection_with(from, from_handle, to, to_handle, ConnectionDirection::default())
    }

    /// Connect two items. Self-loops and missing endpoints are ignored; an
    /// existing connection between the same unordered pair is replaced.
    pub fn create_connection_with(
        &mut self,
        from: &str,
        from_handle: Handle,
        to: &str,
        to_handle: Handle,
        direction: ConnectionDirection,
    ) -> Option<Connection> {
        if from == to {
            debug!(item = from, "Ignored self-loop connection");
            return None;
        }
        if !self.contains_item(from) || !self.contains_item(to) {
            warn!(from, to, "Ignored connection to missing item");
            return None;
        }

        let replaced: Vec<ConnectionId> = self
            .connections
            .iter()
            .filter(|c| c.joins(from, to))
            .map(|c| c.id.clone())
            .collect();
        self.connections.retain(|c| !c.joins(from, to));
        for id in replaced {
            debug!(id = %id, "Replaced connection between same pair");
            self.emit(SceneEvent::ConnectionDeleted(id));
        }

        let conn = Connection {
            id: self.ids.next_connection_id(),
            from: from.to_string(),
            to: to.to_string(),
            from_handle,
            to_handle,
            direction,
        };
        self.connections.push(conn.clone());
        self.emit(SceneEvent::ConnectionCreated(conn.id.clone()));
        Some(conn)
    }

    pub fn delete_connection(&mut self, id: &str) -> bool {
        let before = self.connections.len();
        self.connections.retain(|c| c.id != id);
        let removed = self.connections.len() != before;
        if removed {
            self.emit(SceneEvent::ConnectionDeleted(id.to_string()));
        }
        removed
    }

    pub fn set_connection_direction(&mut self, id: &str, direction: ConnectionDirection) -> bool {
        let Some(conn) = self.connections.iter_mut().find(|c| c.id == id) else {
            return false;
        };
        conn.direction = direction;
        self.emit(SceneEvent::ConnectionUpdated(id.to_string()));
        true
    }

    // ==================== Bulk Replacement ====================

    /// Replace the entire contents. Used by history restore and
    /// deserialization; this is not a diff.
    ///
    /// Items keep their literal z-order. Connections referencing a missing
    /// item, self-loops, and duplicate pairs (later wins) are dropped.
    pub fn replace_contents(&mut self, items: Vec<CanvasItem>, connections: Vec<Connection>) {
        profile_scope!("scene_replace_contents");

        let mut seen = HashSet::new();
        self.items = items
            .into_iter()
            .filter(|item| seen.insert(item.id.clone()))
            .map(|mut item| {
                item.size = clamp_size_to(item.size, self.min_size);
                item.position = finite_or_origin(item.position);
                item
            })
            .collect();

        let mut kept: Vec<Connection> = Vec::with_capacity(connections.len());
        for conn in connections {
            if conn.from == conn.to || !seen.contains(&conn.from) || !seen.contains(&conn.to) {
                warn!(id = %conn.id, "Dropped dangling connection");
                continue;
            }
            kept.retain(|c| !c.joins(&conn.from, &conn.to));
            kept.push(conn);
        }
        self.connections = kept;

        let max_z = self.items.iter().map(|item| item.z_order).max().unwrap_or(0);
        self.z_counter = self.z_counter.max(max_z);

        self.spatial.rebuild(
            self.items
                .iter()
                .map(|item| (item.id.clone(), Rect::of_item(item))),
        );
        self.emit(SceneEvent::SceneReplaced);
    }

    pub fn clear(&mut self) {
        self.replace_contents(Vec::new(), Vec::new());
    }
}

fn finite_or_origin(position: (f32, f32)) -> (f32, f32) {
    let x = if position.0.is_finite() { position.0 } else { 0.0 };
    let y = if position.1.is_finite() { position.1 } else { 0.0 };
    (x, y)
}
