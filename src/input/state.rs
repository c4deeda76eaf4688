//! Input state machine - a single explicit gesture state.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Panning          (secondary/middle press, or pan modifier on background)
//! Idle -> BoxSelecting     (primary press on empty background)
//! Idle -> DraggingItems    (primary press on an unlocked item body)
//! Idle -> Resizing         (primary press on an item's resize corner)
//! Idle -> ConnectingDrag   (press on an anchor)
//!
//! Panning/BoxSelecting/DraggingItems/Resizing -> Idle   (pointer release)
//! ConnectingDrag -> Idle   (second anchor, same item again, or cancel)
//! ```

use crate::geometry::{Point, Rect};
use crate::types::{Handle, ItemId};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum InputState {
    /// No active gesture
    #[default]
    Idle,

    /// Canvas panning
    Panning {
        /// Last pointer position for delta calculation (screen)
        last_pos: Point,
    },

    /// Marquee selection, both corners in screen space
    BoxSelecting {
        start: Point,
        current: Point,
        /// Selection held over from before the press (additive modifier)
        additive: bool,
    },

    /// Moving every selected item together
    DraggingItems {
        /// Item under the pointer at press time
        primary: ItemId,
        /// World offset from the primary item's origin to the pointer
        grab_offset: (f32, f32),
        /// Positions at press time, restored if the drag is cancelled
        origins: Vec<(ItemId, (f32, f32))>,
    },

    /// Resizing a single item
    Resizing {
        item: ItemId,
        start_size: (f32, f32),
        /// Pointer position at press time (screen)
        start_pos: Point,
    },

    /// A connection in progress from an anchor to the live pointer
    ConnectingDrag {
        from: ItemId,
        handle: Handle,
        /// Live pointer position (screen)
        pointer: Point,
    },
}

impl InputState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Returns true for states that end on pointer release
    pub fn is_drag_class(&self) -> bool {
        matches!(
            self,
            Self::Panning { .. }
                | Self::BoxSelecting { .. }
                | Self::DraggingItems { .. }
                | Self::Resizing { .. }
        )
    }

    pub fn is_panning(&self) -> bool {
        matches!(self, Self::Panning { .. })
    }

    pub fn is_box_selecting(&self) -> bool {
        matches!(self, Self::BoxSelecting { .. })
    }

    pub fn is_dragging_items(&self) -> bool {
        matches!(self, Self::DraggingItems { .. })
    }

    pub fn is_resizing(&self) -> bool {
        matches!(self, Self::Resizing { .. })
    }

    pub fn is_connecting(&self) -> bool {
        matches!(self, Self::ConnectingDrag { .. })
    }

    pub fn dragged_item(&self) -> Option<&str> {
        match self {
            Self::DraggingItems { primary, .. } => Some(primary),
            _ => None,
        }
    }

    pub fn resized_item(&self) -> Option<&str> {
        match self {
            Self::Resizing { item, .. } => Some(item),
            _ => None,
        }
    }

    /// Normalized marquee rectangle in screen space
    pub fn marquee(&self) -> Option<Rect> {
        match self {
            Self::BoxSelecting { start, current, .. } => Some(Rect::from_corners(*start, *current)),
            _ => None,
        }
    }

    /// Source anchor and live pointer of a pending connection
    pub fn pending_connection(&self) -> Option<(&str, Handle, Point)> {
        match self {
            Self::ConnectingDrag { from, handle, pointer } => Some((from, *handle, *pointer)),
            _ => None,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::Idle;
    }
}
