//! R-tree over item bounds for point hit-testing and marquee queries.
//!
//! The tree only narrows candidates; the scene orders the hits by z.

use crate::geometry::{Point, Rect};
use crate::types::ItemId;
use rstar::{AABB, RTree, RTreeObject};
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct Indexed {
    id: ItemId,
    bounds: Rect,
}

impl RTreeObject for Indexed {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        envelope_of(&self.bounds)
    }
}

// rstar finds the entry to remove by envelope, then compares with `==`
impl PartialEq for Indexed {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

fn envelope_of(rect: &Rect) -> AABB<[f32; 2]> {
    AABB::from_corners([rect.x, rect.y], [rect.max_x(), rect.max_y()])
}

/// Item bounds in world space, kept in step with the scene.
#[derive(Default)]
pub struct SpatialIndex {
    tree: RTree<Indexed>,
    bounds: HashMap<ItemId, Rect>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an item or move it to new bounds.
    pub fn upsert(&mut self, id: &str, bounds: Rect) {
        if let Some(previous) = self.bounds.insert(id.to_string(), bounds) {
            self.tree.remove(&Indexed {
                id: id.to_string(),
                bounds: previous,
            });
        }
        self.tree.insert(Indexed {
            id: id.to_string(),
            bounds,
        });
    }

    pub fn remove(&mut self, id: &str) -> bool {
        match self.bounds.remove(id) {
            Some(bounds) => self
                .tree
                .remove(&Indexed {
                    id: id.to_string(),
                    bounds,
                })
                .is_some(),
            None => false,
        }
    }

    /// Items whose bounds contain `point`, edges included. Unordered.
    pub fn at_point(&self, point: Point) -> Vec<ItemId> {
        self.tree
            .locate_in_envelope_intersecting(&AABB::from_point([point.x, point.y]))
            .filter(|entry| entry.bounds.contains_point(point))
            .map(|entry| entry.id.clone())
            .collect()
    }

    /// Items whose bounds overlap `rect`, partially or fully. Unordered.
    pub fn overlapping(&self, rect: &Rect) -> Vec<ItemId> {
        self.tree
            .locate_in_envelope_intersecting(&envelope_of(rect))
            .map(|entry| entry.id.clone())
            .collect()
    }

    pub fn bounds_of(&self, id: &str) -> Option<Rect> {
        self.bounds.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// Replace everything with a bulk-loaded tree.
    pub fn rebuild(&mut self, items: impl IntoIterator<Item = (ItemId, Rect)>) {
        let entries: Vec<Indexed> = items
            .into_iter()
            .map(|(id, bounds)| Indexed { id, bounds })
            .collect();
        self.bounds = entries.iter().map(|e| (e.id.clone(), e.bounds)).collect();
        self.tree = RTree::bulk_load(entries);
    }
}
