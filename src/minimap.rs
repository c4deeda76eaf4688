//! Minimap projection - a scaled-down overview of the whole scene.
//!
//! The projector maps the padded bounding box of the visible items into a
//! fixed overview region with one uniform scale. Recomputation is throttled:
//! scene changes only mark the projection dirty, and `frame` rebuilds it at
//! most once per render tick.

use crate::constants::{MINIMAP_NEUTRAL_COLOR, MINIMAP_PADDING, MINIMAP_SIZE};
use crate::geometry::{Point, Rect, bounding_box};
use crate::profile_scope;
use crate::scene::Scene;
use crate::types::{CanvasItem, Connection, ItemId, ItemKind};
use std::collections::{HashMap, HashSet};

/// Which item kinds are shown. Shared by the minimap and render sync.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemFilter {
    visible: HashSet<ItemKind>,
}

impl Default for ItemFilter {
    fn default() -> Self {
        Self::all()
    }
}

impl ItemFilter {
    pub fn all() -> Self {
        Self {
            visible: ItemKind::all().iter().copied().collect(),
        }
    }

    pub fn only(kinds: &[ItemKind]) -> Self {
        Self {
            visible: kinds.iter().copied().collect(),
        }
    }

    pub fn set_visible(&mut self, kind: ItemKind, visible: bool) {
        if visible {
            self.visible.insert(kind);
        } else {
            self.visible.remove(&kind);
        }
    }

    pub fn shows(&self, kind: ItemKind) -> bool {
        self.visible.contains(&kind)
    }

    pub fn allows(&self, item: &CanvasItem) -> bool {
        self.shows(item.kind())
    }
}

/// Uniform world -> overview mapping.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MinimapTransform {
    pub scale: f32,
    /// World point mapped to the overview origin
    pub world_origin: Point,
    /// Centering offset inside the overview region
    pub offset: Point,
}

impl MinimapTransform {
    pub fn world_to_minimap(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.world_origin.x) * self.scale + self.offset.x,
            (p.y - self.world_origin.y) * self.scale + self.offset.y,
        )
    }

    pub fn minimap_to_world(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.offset.x) / self.scale + self.world_origin.x,
            (p.y - self.offset.y) / self.scale + self.world_origin.y,
        )
    }

    pub fn rect_to_minimap(&self, r: &Rect) -> Rect {
        let origin = self.world_to_minimap(Point::new(r.x, r.y));
        Rect::new(origin.x, origin.y, r.w * self.scale, r.h * self.scale)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MinimapItem {
    pub id: ItemId,
    pub rect: Rect,
    pub color: &'static str,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MinimapLine {
    pub from: Point,
    pub to: Point,
    pub color: &'static str,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MinimapProjection {
    pub items: Vec<MinimapItem>,
    pub lines: Vec<MinimapLine>,
    /// Current viewport extent in overview coordinates
    pub viewport: Rect,
    pub transform: MinimapTransform,
}

pub struct MinimapProjector {
    size: (f32, f32),
    padding: f32,
    filter: ItemFilter,
    dirty: bool,
    last: Option<MinimapProjection>,
}

impl Default for MinimapProjector {
    fn default() -> Self {
        Self::new(MINIMAP_SIZE, MINIMAP_PADDING)
    }
}

impl MinimapProjector {
    pub fn new(size: (f32, f32), padding: f32) -> Self {
        Self {
            size: (size.0.max(1.0), size.1.max(1.0)),
            padding: padding.max(0.0),
            filter: ItemFilter::all(),
            dirty: true,
            last: None,
        }
    }

    pub fn size(&self) -> (f32, f32) {
        self.size
    }

    pub fn filter(&self) -> &ItemFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: ItemFilter) {
        self.filter = filter;
        self.dirty = true;
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn last(&self) -> Option<&MinimapProjection> {
        self.last.as_ref()
    }

    /// Rebuild the projection if anything changed since the last frame.
    /// Returns the new projection only when it was recomputed.
    pub fn frame(&mut self, scene: &Scene, viewport_bounds: Rect) -> Option<&MinimapProjection> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        let projection = self.project(scene.items(), scene.connections(), viewport_bounds);
        self.last = Some(projection);
        self.last.as_ref()
    }

    /// Pure projection of the given scene data.
    pub fn project(
        &self,
        items: &[CanvasItem],
        connections: &[Connection],
        viewport_bounds: Rect,
    ) -> MinimapProjection {
        profile_scope!("minimap_project");

        let visible: Vec<&CanvasItem> = items.iter().filter(|item| self.filter.allows(item)).collect();
        // An empty scene frames the viewport itself
        let world = bounding_box(visible.iter().copied())
            .unwrap_or(viewport_bounds)
            .padded(self.padding);

        let scale = (self.size.0 / world.w.max(1.0)).min(self.size.1 / world.h.max(1.0));
        let transform = MinimapTransform {
            scale,
            world_origin: Point::new(world.x, world.y),
            offset: Point::new(
                (self.size.0 - world.w * scale) / 2.0,
                (self.size.1 - world.h * scale) / 2.0,
            ),
        };

        let centers: HashMap<&str, (Point, &'static str)> = visible
            .iter()
            .map(|item| {
                let (cx, cy) = item.center();
                (
                    item.id.as_str(),
                    (transform.world_to_minimap(Point::new(cx, cy)), item_color(item)),
                )
            })
            .collect();

        let lines = connections
            .iter()
            .filter_map(|conn| {
                let (from, color) = centers.get(conn.from.as_str())?;
                let (to, _) = centers.get(conn.to.as_str())?;
                Some(MinimapLine {
                    from: *from,
                    to: *to,
                    color: *color,
                })
            })
            .collect();

        let items = visible
            .iter()
            .map(|item| MinimapItem {
                id: item.id.clone(),
                rect: transform.rect_to_minimap(&Rect::of_item(item)),
                color: item_color(item),
            })
            .collect();

        MinimapProjection {
            items,
            lines,
            viewport: transform.rect_to_minimap(&viewport_bounds),
            transform,
        }
    }

    /// Map an overview click back to world space using the last projection.
    pub fn click_to_world(&self, p: Point) -> Option<Point> {
        self.last
            .as_ref()
            .map(|projection| projection.transform.minimap_to_world(p))
    }
}

fn item_color(item: &CanvasItem) -> &'static str {
    item.color.map_or(MINIMAP_NEUTRAL_COLOR, |tag| tag.hex())
}
