//! Move handling - item dragging, resizing, panning, marquee, live edge.
//!
//! ## Performance Notes
//!
//! Pointer moves arrive 60+ times per second during a gesture:
//! - Early exit for Idle
//! - Only the dragged geometry is written; history and persistence wait
//!   for release
//!
//! Enable profiling with `cargo build --features profiling` to see timing.

use super::{Controller, InputOutcome, InputState, PointerEvent};
use crate::profile_scope;
use crate::scene::Scene;
use crate::types::ItemPatch;
use crate::viewport::Viewport;

impl Controller {
    pub(super) fn handle_mouse_move(
        &mut self,
        event: &PointerEvent,
        scene: &mut Scene,
        viewport: &mut Viewport,
    ) -> InputOutcome {
        profile_scope!("handle_mouse_move");

        let pos = event.position;
        match &mut self.state {
            InputState::Idle => InputOutcome::Ignored,

            InputState::Panning { last_pos } => {
                let (dx, dy) = (pos.x - last_pos.x, pos.y - last_pos.y);
                *last_pos = pos;
                if viewport.pan_by(dx, dy) {
                    InputOutcome::Redraw
                } else {
                    InputOutcome::Ignored
                }
            }

            InputState::BoxSelecting { current, .. } => {
                *current = pos;
                InputOutcome::Redraw
            }

            InputState::DraggingItems {
                primary,
                grab_offset,
                origins,
            } => {
                let Some(item) = scene.get_item(primary) else {
                    return InputOutcome::Ignored;
                };
                let world = viewport.screen_to_world(pos);
                let dx = world.x - grab_offset.0 - item.position.0;
                let dy = world.y - grab_offset.1 - item.position.1;
                if dx == 0.0 && dy == 0.0 {
                    return InputOutcome::Ignored;
                }
                let ids: Vec<_> = origins.iter().map(|(id, _)| id.clone()).collect();
                scene.translate_items(&ids, dx, dy);
                InputOutcome::Redraw
            }

            InputState::Resizing {
                item,
                start_size,
                start_pos,
            } => {
                let scale = viewport.scale();
                let w = start_size.0 + (pos.x - start_pos.x) / scale;
                let h = start_size.1 + (pos.y - start_pos.y) / scale;
                // Bounds are enforced by the scene
                scene.mutate_item(item, ItemPatch::new().size(w, h));
                InputOutcome::Redraw
            }

            InputState::ConnectingDrag { pointer, .. } => {
                *pointer = pos;
                InputOutcome::Redraw
            }
        }
    }
}
