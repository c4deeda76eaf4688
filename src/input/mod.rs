//! Pointer, wheel, and keyboard handling for the canvas.
//!
//! ## Architecture
//!
//! The controller uses an explicit state machine (`InputState`) to track the
//! current gesture. Handlers read and write the scene and viewport directly
//! and report an `InputOutcome` so the owner knows when a mutation boundary
//! was crossed (history snapshot plus autosave).
//!
//! ## Modules
//!
//! - `events` - Normalized pointer/wheel/key input
//! - `state` - Input state machine enum and helper methods
//! - `target` - Hit resolution for a screen position
//! - `mouse_down` - Press handling (selection, gesture start, connection commit)
//! - `drag` - Move handling (drag, resize, pan, marquee, live edge)
//! - `mouse_up` - Release handling (finalize gestures)

mod drag;
mod events;
mod mouse_down;
mod mouse_up;
mod state;
mod target;

pub use events::{GesturePhase, KeyIntent, Modifiers, PointerButton, PointerEvent, WheelEvent};
pub use state::InputState;
pub use target::{PointerTarget, anchor_at, resolve_target};

use crate::constants::{
    ANCHOR_HIT_RADIUS, CONNECTION_HIT_DISTANCE, CURVE_HIT_SAMPLES, MIN_MARQUEE_SIZE,
    RESIZE_CORNER_SIZE, WHEEL_ZOOM_DIVISOR,
};
use crate::scene::Scene;
use crate::selection::Selection;
use crate::types::ItemPatch;
use crate::viewport::Viewport;
use tracing::debug;

/// What the owner should do after an input event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputOutcome {
    /// Not consumed by the controller
    Ignored,
    /// Transient state, selection, or viewport changed; redraw
    Redraw,
    /// A model mutation finished; snapshot history and schedule a save
    Commit,
}

impl InputOutcome {
    pub fn is_commit(&self) -> bool {
        matches!(self, InputOutcome::Commit)
    }
}

/// Screen-space tolerances for hit-testing and gesture thresholds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControllerSettings {
    pub min_marquee_size: f32,
    pub anchor_hit_radius: f32,
    pub resize_corner_size: f32,
    pub connection_hit_distance: f32,
    pub curve_samples: usize,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            min_marquee_size: MIN_MARQUEE_SIZE,
            anchor_hit_radius: ANCHOR_HIT_RADIUS,
            resize_corner_size: RESIZE_CORNER_SIZE,
            connection_hit_distance: CONNECTION_HIT_DISTANCE,
            curve_samples: CURVE_HIT_SAMPLES,
        }
    }
}

/// Interprets gestures into scene and viewport changes.
#[derive(Debug, Default)]
pub struct Controller {
    state: InputState,
    selection: Selection,
    settings: ControllerSettings,
}

impl Controller {
    pub fn new(settings: ControllerSettings) -> Self {
        Self {
            state: InputState::Idle,
            selection: Selection::new(),
            settings,
        }
    }

    pub fn state(&self) -> &InputState {
        &self.state
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: ControllerSettings) {
        self.settings = settings;
    }

    pub fn handle_pointer(
        &mut self,
        event: &PointerEvent,
        scene: &mut Scene,
        viewport: &mut Viewport,
    ) -> InputOutcome {
        // Editable sub-regions own their events unless a gesture is already live
        if event.over_editable && self.state.is_idle() {
            return InputOutcome::Ignored;
        }
        match event.phase {
            GesturePhase::Start => self.handle_mouse_down(event, scene, viewport),
            GesturePhase::Move => self.handle_mouse_move(event, scene, viewport),
            GesturePhase::End => self.handle_mouse_up(event, scene, viewport),
        }
    }

    /// Zoom around the pointer with the zoom modifier, pan otherwise.
    pub fn handle_wheel(&mut self, event: &WheelEvent, viewport: &mut Viewport) -> InputOutcome {
        if event.over_editable {
            return InputOutcome::Ignored;
        }
        let (dx, dy) = event.delta;
        let changed = if event.modifiers.zoom {
            let factor = 1.0 - dy / WHEEL_ZOOM_DIVISOR;
            viewport.zoom_by(factor, event.position.x, event.position.y)
        } else {
            viewport.pan_by(-dx, -dy)
        };
        if changed {
            InputOutcome::Redraw
        } else {
            InputOutcome::Ignored
        }
    }

    /// Abandon the current gesture, restoring any geometry it touched.
    pub fn cancel(&mut self, scene: &mut Scene) -> InputOutcome {
        let state = std::mem::take(&mut self.state);
        match state {
            InputState::Idle => InputOutcome::Ignored,
            InputState::DraggingItems { origins, .. } => {
                for (id, position) in origins {
                    if let Some(item) = scene.get_item(&id) {
                        if item.position != position {
                            scene.mutate_item(&id, ItemPatch::new().position(position.0, position.1));
                        }
                    }
                }
                debug!("Cancelled item drag");
                InputOutcome::Redraw
            }
            InputState::Resizing { item, start_size, .. } => {
                scene.mutate_item(&item, ItemPatch::new().size(start_size.0, start_size.1));
                debug!("Cancelled resize");
                InputOutcome::Redraw
            }
            InputState::ConnectingDrag { .. } => {
                debug!("Discarded pending connection");
                InputOutcome::Redraw
            }
            InputState::Panning { .. } | InputState::BoxSelecting { .. } => InputOutcome::Redraw,
        }
    }

    pub fn select_all(&mut self, scene: &Scene) -> InputOutcome {
        self.selection.clear();
        self.selection
            .extend(scene.items().iter().map(|item| item.id.clone()));
        InputOutcome::Redraw
    }

    /// Forget the gesture and selection, e.g. when the scene is swapped.
    pub fn reset(&mut self) {
        self.state.reset();
        self.selection.clear();
    }

    /// Drop selected ids that no longer exist in the scene.
    pub fn sync_selection(&mut self, scene: &Scene) {
        self.selection.retain_existing(
            |id| scene.contains_item(id),
            |id| scene.get_connection(id).is_some(),
        );
    }
}
