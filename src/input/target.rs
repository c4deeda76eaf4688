//! Pointer hit resolution - what lies under a screen position.
//!
//! Precedence, highest first: connection anchors, the topmost item's resize
//! corner, the topmost item's body, connection curves, background.

use crate::geometry::{Point, curve_path, handle_anchor};
use crate::profile_scope;
use crate::scene::Scene;
use crate::types::{ConnectionId, Handle, ItemId};
use crate::viewport::Viewport;

use super::ControllerSettings;

#[derive(Clone, Debug, PartialEq)]
pub enum PointerTarget {
    Anchor { item: ItemId, handle: Handle },
    ResizeCorner(ItemId),
    ItemBody(ItemId),
    Connection(ConnectionId),
    Background,
}

pub fn resolve_target(
    scene: &Scene,
    viewport: &Viewport,
    screen: Point,
    settings: &ControllerSettings,
) -> PointerTarget {
    profile_scope!("resolve_pointer_target");

    if let Some((item, handle)) = anchor_at(scene, viewport, screen, settings.anchor_hit_radius) {
        return PointerTarget::Anchor { item, handle };
    }

    let world = viewport.screen_to_world(screen);
    if let Some(item) = scene.topmost_item_at(world) {
        if !item.locked {
            let corner = viewport.world_to_screen(Point::new(
                item.position.0 + item.size.0,
                item.position.1 + item.size.1,
            ));
            let size = settings.resize_corner_size;
            if screen.x >= corner.x - size && screen.y >= corner.y - size {
                return PointerTarget::ResizeCorner(item.id.clone());
            }
        }
        return PointerTarget::ItemBody(item.id.clone());
    }

    if let Some(id) = connection_at(scene, viewport, screen, settings) {
        return PointerTarget::Connection(id);
    }

    PointerTarget::Background
}

/// Nearest anchor within `radius` screen pixels, searching topmost items first.
pub fn anchor_at(
    scene: &Scene,
    viewport: &Viewport,
    screen: Point,
    radius: f32,
) -> Option<(ItemId, Handle)> {
    let mut best: Option<(ItemId, Handle, f32)> = None;
    for item in scene.render_order().into_iter().rev() {
        for &handle in Handle::all() {
            let anchor = viewport.world_to_screen(handle_anchor(item, handle));
            let d = anchor.distance(screen);
            if d <= radius && best.as_ref().is_none_or(|(_, _, bd)| d < *bd) {
                best = Some((item.id.clone(), handle, d));
            }
        }
        if best.is_some() {
            break;
        }
    }
    best.map(|(id, handle, _)| (id, handle))
}

fn connection_at(
    scene: &Scene,
    viewport: &Viewport,
    screen: Point,
    settings: &ControllerSettings,
) -> Option<ConnectionId> {
    scene
        .connections()
        .iter()
        .rev()
        .find(|conn| {
            let (Some(from), Some(to)) = (scene.get_item(&conn.from), scene.get_item(&conn.to)) else {
                return false;
            };
            let curve = curve_path(
                handle_anchor(from, conn.from_handle),
                handle_anchor(to, conn.to_handle),
            )
            .map(|p| viewport.world_to_screen(p));
            curve.distance_to(screen, settings.curve_samples) <= settings.connection_hit_distance
        })
        .map(|conn| conn.id.clone())
}
