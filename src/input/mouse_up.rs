//! Release handling - finalize gestures.

use super::{Controller, InputOutcome, InputState, PointerEvent};
use crate::geometry::Rect;
use crate::scene::Scene;
use crate::viewport::Viewport;
use tracing::debug;

impl Controller {
    pub(super) fn handle_mouse_up(
        &mut self,
        event: &PointerEvent,
        scene: &mut Scene,
        viewport: &mut Viewport,
    ) -> InputOutcome {
        let pos = event.position;

        // Connecting survives release unless it ends on another item's anchor
        if let InputState::ConnectingDrag { from, handle, pointer } = &mut self.state {
            *pointer = pos;
            let (from, handle) = (from.clone(), *handle);
            return match self.release_anchor(scene, viewport, pos, &from) {
                Some((to, to_handle)) => {
                    self.state.reset();
                    match scene.create_connection(&from, handle, &to, to_handle) {
                        Some(conn) => {
                            debug!(id = %conn.id, "Completed connection on release");
                            InputOutcome::Commit
                        }
                        None => InputOutcome::Redraw,
                    }
                }
                None => InputOutcome::Redraw,
            };
        }

        match std::mem::take(&mut self.state) {
            InputState::Idle => InputOutcome::Ignored,

            InputState::Panning { .. } => InputOutcome::Redraw,

            InputState::BoxSelecting { start, .. } => {
                let rect = Rect::from_corners(start, pos);
                let eps = self.settings.min_marquee_size;
                // A near-zero box is a plain click on the background
                if rect.w > eps || rect.h > eps {
                    let world = viewport.screen_rect_to_world(&rect);
                    let hits = scene.items_in_rect(&world);
                    debug!(count = hits.len(), "Box selection committed");
                    self.selection.extend(hits);
                }
                InputOutcome::Redraw
            }

            InputState::DraggingItems { origins, .. } => {
                let moved = origins.iter().any(|(id, origin)| {
                    scene
                        .get_item(id)
                        .is_some_and(|item| item.position != *origin)
                });
                if moved {
                    InputOutcome::Commit
                } else {
                    InputOutcome::Redraw
                }
            }

            InputState::Resizing { item, start_size, .. } => {
                let resized = scene.get_item(&item).is_some_and(|it| it.size != start_size);
                if resized {
                    InputOutcome::Commit
                } else {
                    InputOutcome::Redraw
                }
            }

            // Handled above
            InputState::ConnectingDrag { .. } => InputOutcome::Redraw,
        }
    }
}
