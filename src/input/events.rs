//! Normalized input delivered by the host's input dispatch.
//!
//! Positions are screen-space pixels relative to the canvas surface. The
//! host decides which physical keys map to which modifier or intent.

use crate::geometry::Point;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Logical modifiers, already mapped from platform keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Add to or toggle the selection instead of replacing it
    pub additive: bool,
    /// Primary-button drags pan instead of box-selecting
    pub pan: bool,
    /// Wheel events zoom instead of panning
    pub zoom: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GesturePhase {
    Start,
    Move,
    End,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub position: Point,
    pub button: PointerButton,
    pub modifiers: Modifiers,
    pub phase: GesturePhase,
    /// The event landed on an editable text region inside an item
    pub over_editable: bool,
}

impl PointerEvent {
    pub fn new(phase: GesturePhase, x: f32, y: f32) -> Self {
        Self {
            position: Point::new(x, y),
            button: PointerButton::Primary,
            modifiers: Modifiers::default(),
            phase,
            over_editable: false,
        }
    }

    pub fn down(x: f32, y: f32) -> Self {
        Self::new(GesturePhase::Start, x, y)
    }

    pub fn moved(x: f32, y: f32) -> Self {
        Self::new(GesturePhase::Move, x, y)
    }

    pub fn up(x: f32, y: f32) -> Self {
        Self::new(GesturePhase::End, x, y)
    }

    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }

    pub fn additive(mut self) -> Self {
        self.modifiers.additive = true;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn over_editable(mut self) -> Self {
        self.over_editable = true;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WheelEvent {
    pub position: Point,
    /// Scroll delta in pixels
    pub delta: (f32, f32),
    pub modifiers: Modifiers,
    pub over_editable: bool,
}

impl WheelEvent {
    pub fn new(x: f32, y: f32, dx: f32, dy: f32) -> Self {
        Self {
            position: Point::new(x, y),
            delta: (dx, dy),
            modifiers: Modifiers::default(),
            over_editable: false,
        }
    }

    pub fn zooming(mut self) -> Self {
        self.modifiers.zoom = true;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyIntent {
    Undo,
    Redo,
    DeleteSelection,
    Cancel,
    SelectAll,
}
