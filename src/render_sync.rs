//! Render sync - reflects scene and viewport state onto a host surface.
//!
//! Data flows one way. The scene never holds a visual reference; this
//! module owns the only `item id -> VisualHandle` table and rebuilds it from
//! the `SceneEvent`s it drains. Connections and overlays (marquee, pending
//! edge) are cheap and redrawn in full on every sync.

use crate::constants::MINIMAP_NEUTRAL_COLOR;
use crate::events::SceneEvent;
use crate::geometry::{CubicCurve, Rect, curve_path, handle_anchor};
use crate::input::InputState;
use crate::media::{MediaHandle, MediaStore};
use crate::minimap::ItemFilter;
use crate::profile_scope;
use crate::scene::Scene;
use crate::selection::Selection;
use crate::types::{CanvasItem, ColorTag, ConnectionId, ItemId, ItemKind};
use crate::viewport::Viewport;
use std::collections::{HashMap, HashSet};
use tracing::trace;

/// Opaque handle minted by the host surface.
pub type VisualHandle = u64;

/// Screen-space description of one item.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemVisual {
    pub id: ItemId,
    pub kind: ItemKind,
    pub rect: Rect,
    /// Paint order, back to front
    pub layer: usize,
    pub color: Option<ColorTag>,
    pub locked: bool,
    pub selected: bool,
    pub label: String,
    pub media: Option<MediaHandle>,
}

/// Screen-space curve for a connection or the pending edge preview.
#[derive(Clone, Debug, PartialEq)]
pub struct ConnectionVisual {
    /// `None` for the pending edge preview
    pub id: Option<ConnectionId>,
    pub path: CubicCurve,
    pub color: &'static str,
    pub arrow_start: bool,
    pub arrow_end: bool,
    pub selected: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct OverlayVisual {
    pub marquee: Option<Rect>,
    pub pending: Option<ConnectionVisual>,
}

/// Host-side drawing target.
pub trait RenderSurface {
    fn create_visual(&mut self, visual: &ItemVisual) -> VisualHandle;
    fn update_visual(&mut self, handle: VisualHandle, visual: &ItemVisual);
    fn remove_visual(&mut self, handle: VisualHandle);
    fn draw_connections(&mut self, connections: &[ConnectionVisual]);
    fn draw_overlay(&mut self, overlay: &OverlayVisual);
}

/// Work done by one `sync` call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub created: usize,
    pub updated: usize,
    pub removed: usize,
}

/// Everything a sync pass reads.
pub struct RenderInputs<'a> {
    pub scene: &'a Scene,
    pub viewport: &'a Viewport,
    pub input: &'a InputState,
    pub selection: &'a Selection,
    pub media: &'a dyn MediaStore,
}

#[derive(Default)]
pub struct RenderSync {
    handles: HashMap<ItemId, VisualHandle>,
    /// Layer last sent for each live visual
    sent_layers: HashMap<ItemId, usize>,
    dirty: HashSet<ItemId>,
    rebuild_all: bool,
    refresh_all: bool,
    filter: ItemFilter,
}

impl RenderSync {
    pub fn new() -> Self {
        Self {
            rebuild_all: true,
            ..Self::default()
        }
    }

    pub fn handle_of(&self, id: &str) -> Option<VisualHandle> {
        self.handles.get(id).copied()
    }

    pub fn visual_count(&self) -> usize {
        self.handles.len()
    }

    pub fn set_filter(&mut self, filter: ItemFilter) {
        self.filter = filter;
        self.refresh_all = true;
    }

    /// Record what changed; the surface is touched only in `sync`.
    pub fn apply_events(&mut self, events: &[SceneEvent]) {
        for event in events {
            match event {
                SceneEvent::ItemCreated(id) | SceneEvent::ItemUpdated(id) | SceneEvent::ItemDeleted(id) => {
                    self.dirty.insert(id.clone());
                }
                // Connections are redrawn in full every sync
                SceneEvent::ConnectionCreated(_)
                | SceneEvent::ConnectionUpdated(_)
                | SceneEvent::ConnectionDeleted(_) => {}
                SceneEvent::SceneReplaced => self.rebuild_all = true,
                SceneEvent::ViewportChanged | SceneEvent::SelectionChanged => self.refresh_all = true,
            }
        }
    }

    /// Drop every visual, e.g. when the canvas is torn down.
    pub fn teardown(&mut self, surface: &mut dyn RenderSurface) {
        for (_, handle) in self.handles.drain() {
            surface.remove_visual(handle);
        }
        self.sent_layers.clear();
        self.dirty.clear();
        self.rebuild_all = true;
        self.refresh_all = false;
    }

    pub fn sync(&mut self, inputs: &RenderInputs<'_>, surface: &mut dyn RenderSurface) -> SyncStats {
        profile_scope!("render_sync");

        let mut stats = SyncStats::default();
        let scene = inputs.scene;

        if self.rebuild_all {
            let stale: Vec<ItemId> = self
                .handles
                .keys()
                .filter(|id| !scene.contains_item(id))
                .cloned()
                .collect();
            self.dirty.extend(stale);
            self.dirty.extend(scene.items().iter().map(|item| item.id.clone()));
        } else if self.refresh_all {
            self.dirty.extend(self.handles.keys().cloned());
            self.dirty.extend(scene.items().iter().map(|item| item.id.clone()));
        }

        if !self.dirty.is_empty() {
            let layers: HashMap<&str, usize> = scene
                .render_order()
                .into_iter()
                .enumerate()
                .map(|(layer, item)| (item.id.as_str(), layer))
                .collect();

            // A z or lock change on one item shifts the layers of others
            let shifted: Vec<ItemId> = self
                .sent_layers
                .iter()
                .filter(|(id, sent)| layers.get(id.as_str()).is_some_and(|layer| layer != *sent))
                .map(|(id, _)| id.clone())
                .collect();
            self.dirty.extend(shifted);

            for id in std::mem::take(&mut self.dirty) {
                let visual = scene
                    .get_item(&id)
                    .filter(|item| self.filter.allows(item))
                    .map(|item| item_visual(item, layers.get(id.as_str()).copied().unwrap_or(0), inputs));
                if let Some(ref visual) = visual {
                    self.sent_layers.insert(id.clone(), visual.layer);
                } else {
                    self.sent_layers.remove(&id);
                }

                match (visual, self.handles.get(&id).copied()) {
                    (Some(visual), Some(handle)) => {
                        surface.update_visual(handle, &visual);
                        stats.updated += 1;
                    }
                    (Some(visual), None) => {
                        let handle = surface.create_visual(&visual);
                        self.handles.insert(id, handle);
                        stats.created += 1;
                    }
                    (None, Some(handle)) => {
                        surface.remove_visual(handle);
                        self.handles.remove(&id);
                        stats.removed += 1;
                    }
                    (None, None) => {}
                }
            }
        }
        self.rebuild_all = false;
        self.refresh_all = false;

        surface.draw_connections(&self.connection_visuals(inputs));
        surface.draw_overlay(&overlay_visual(inputs));

        trace!(
            created = stats.created,
            updated = stats.updated,
            removed = stats.removed,
            "Render sync"
        );
        stats
    }

    fn connection_visuals(&self, inputs: &RenderInputs<'_>) -> Vec<ConnectionVisual> {
        let scene = inputs.scene;
        let viewport = inputs.viewport;
        scene
            .connections()
            .iter()
            .filter_map(|conn| {
                let from = scene.get_item(&conn.from).filter(|item| self.filter.allows(item))?;
                let to = scene.get_item(&conn.to).filter(|item| self.filter.allows(item))?;
                let path = curve_path(
                    handle_anchor(from, conn.from_handle),
                    handle_anchor(to, conn.to_handle),
                )
                .map(|p| viewport.world_to_screen(p));
                let (arrow_start, arrow_end) = conn.direction.arrowheads();
                Some(ConnectionVisual {
                    id: Some(conn.id.clone()),
                    path,
                    color: from.color.map_or(MINIMAP_NEUTRAL_COLOR, |tag| tag.hex()),
                    arrow_start,
                    arrow_end,
                    selected: inputs.selection.connection() == Some(conn.id.as_str()),
                })
            })
            .collect()
    }
}

fn item_visual(item: &CanvasItem, layer: usize, inputs: &RenderInputs<'_>) -> ItemVisual {
    ItemVisual {
        id: item.id.clone(),
        kind: item.kind(),
        rect: inputs.viewport.world_rect_to_screen(&Rect::of_item(item)),
        layer,
        color: item.color,
        locked: item.locked,
        selected: inputs.selection.contains(&item.id),
        label: item.content.display_name(),
        media: item
            .content
            .media_id()
            .and_then(|media_id| inputs.media.resolve(media_id)),
    }
}

fn overlay_visual(inputs: &RenderInputs<'_>) -> OverlayVisual {
    let pending = inputs
        .input
        .pending_connection()
        .and_then(|(from, handle, pointer)| {
            let item = inputs.scene.get_item(from)?;
            let start = inputs.viewport.world_to_screen(handle_anchor(item, handle));
            Some(ConnectionVisual {
                id: None,
                path: curve_path(start, pointer),
                color: item.color.map_or(MINIMAP_NEUTRAL_COLOR, |tag| tag.hex()),
                arrow_start: false,
                arrow_end: true,
                selected: false,
            })
        });

    OverlayVisual {
        marquee: inputs.input.marquee(),
        pending,
    }
}
