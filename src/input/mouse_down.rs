//! Press handling - selection, gesture start, connection completion.
//!
//! ## Performance Notes
//!
//! Hit-testing runs through the scene's R-tree, so a press costs
//! O(log n) for item lookup plus a linear anchor/curve scan.
//!
//! Enable profiling with `cargo build --features profiling` to see timing.

use super::target::{PointerTarget, resolve_target};
use super::{Controller, InputOutcome, InputState, PointerButton, PointerEvent};
use crate::geometry::Point;
use crate::profile_scope;
use crate::scene::Scene;
use crate::types::{Handle, ItemId};
use crate::viewport::Viewport;
use tracing::debug;

impl Controller {
    pub(super) fn handle_mouse_down(
        &mut self,
        event: &PointerEvent,
        scene: &mut Scene,
        viewport: &mut Viewport,
    ) -> InputOutcome {
        profile_scope!("handle_mouse_down");

        let pos = event.position;

        // A release we never saw leaves a stale drag; drop it
        if self.state.is_drag_class() {
            self.state.reset();
        }

        let target = resolve_target(scene, viewport, pos, &self.settings);

        // A pending connection consumes the next press either way
        if let InputState::ConnectingDrag { from, handle, .. } = std::mem::take(&mut self.state) {
            return match target {
                PointerTarget::Anchor { item, handle: to_handle } if item != from => {
                    self.complete_connection(scene, &from, handle, &item, to_handle)
                }
                _ => {
                    debug!(from = %from, "Discarded pending connection");
                    InputOutcome::Redraw
                }
            };
        }

        if event.button == PointerButton::Middle {
            self.state = InputState::Panning { last_pos: pos };
            return InputOutcome::Redraw;
        }

        match target {
            PointerTarget::Anchor { item, handle } => {
                self.state = InputState::ConnectingDrag {
                    from: item,
                    handle,
                    pointer: pos,
                };
                InputOutcome::Redraw
            }
            PointerTarget::ResizeCorner(id) if event.button == PointerButton::Primary => {
                let Some(item) = scene.get_item(&id) else {
                    return InputOutcome::Ignored;
                };
                self.state = InputState::Resizing {
                    item: id.clone(),
                    start_size: item.size,
                    start_pos: pos,
                };
                if !self.selection.contains(&id) {
                    self.selection.collapse_to(&id);
                }
                InputOutcome::Redraw
            }
            PointerTarget::ResizeCorner(id) | PointerTarget::ItemBody(id) => {
                if event.button != PointerButton::Primary {
                    return InputOutcome::Ignored;
                }
                self.press_item(event, scene, viewport, id)
            }
            PointerTarget::Connection(id) if event.button == PointerButton::Primary && !event.modifiers.pan => {
                self.selection.select_connection(&id);
                InputOutcome::Redraw
            }
            PointerTarget::Connection(_) | PointerTarget::Background => {
                if event.button == PointerButton::Secondary || event.modifiers.pan {
                    self.state = InputState::Panning { last_pos: pos };
                    return InputOutcome::Redraw;
                }
                if !event.modifiers.additive {
                    self.selection.clear();
                }
                self.state = InputState::BoxSelecting {
                    start: pos,
                    current: pos,
                    additive: event.modifiers.additive,
                };
                InputOutcome::Redraw
            }
        }
    }

    /// Primary press on an item body: update the selection and, for
    /// unlocked items, start a group drag.
    fn press_item(
        &mut self,
        event: &PointerEvent,
        scene: &mut Scene,
        viewport: &Viewport,
        id: ItemId,
    ) -> InputOutcome {
        if event.modifiers.additive {
            if !self.selection.toggle(&id) {
                return InputOutcome::Redraw;
            }
        } else if !self.selection.contains(&id) {
            self.selection.collapse_to(&id);
        }

        let Some(item) = scene.get_item(&id) else {
            return InputOutcome::Ignored;
        };
        if item.locked {
            return InputOutcome::Redraw;
        }

        let world = viewport.screen_to_world(event.position);
        let grab_offset = (world.x - item.position.0, world.y - item.position.1);
        scene.bring_to_front(&id);

        let origins = self
            .selection
            .items()
            .into_iter()
            .filter_map(|sid| {
                let selected = scene.get_item(&sid)?;
                (!selected.locked).then(|| (sid.clone(), selected.position))
            })
            .collect();

        self.state = InputState::DraggingItems {
            primary: id,
            grab_offset,
            origins,
        };
        InputOutcome::Redraw
    }

    fn complete_connection(
        &mut self,
        scene: &mut Scene,
        from: &str,
        from_handle: Handle,
        to: &str,
        to_handle: Handle,
    ) -> InputOutcome {
        match scene.create_connection(from, from_handle, to, to_handle) {
            Some(conn) => {
                debug!(id = %conn.id, from, to, "Completed connection");
                InputOutcome::Commit
            }
            None => InputOutcome::Redraw,
        }
    }

    /// Anchor under the pointer on an item other than `from`.
    pub(super) fn release_anchor(
        &self,
        scene: &Scene,
        viewport: &Viewport,
        pos: Point,
        from: &str,
    ) -> Option<(ItemId, Handle)> {
        super::target::anchor_at(scene, viewport, pos, self.settings.anchor_hit_radius)
            .filter(|(item, _)| item != from)
    }
}
