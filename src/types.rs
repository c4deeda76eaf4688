//! Core types for the canvas scene.
//!
//! This module defines the fundamental data structures shared by the scene
//! model, the controller, history, and persistence: items, their typed
//! content, connections between items, and the patch/spec values used to
//! create and mutate them.

use crate::constants::{
    DEFAULT_IMAGE_SIZE, DEFAULT_LINK_SIZE, DEFAULT_MEMO_SIZE, DEFAULT_NOTE_SIZE,
    DEFAULT_VIDEO_SIZE, MIN_ITEM_HEIGHT, MIN_ITEM_WIDTH,
};
use serde::{Deserialize, Serialize};

/// Opaque, stable identifier of an item.
pub type ItemId = String;

/// Opaque identifier of a connection.
pub type ConnectionId = String;

/// Opaque reference into the external media store.
pub type MediaId = String;

// ============================================================================
// Item Kinds & Content
// ============================================================================

/// Variant tag of an item, fixed at creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Note,
    Memo,
    Link,
    Image,
    Video,
}

impl ItemKind {
    pub fn label(&self) -> &'static str {
        match self {
            ItemKind::Note => "Note",
            ItemKind::Memo => "Memo",
            ItemKind::Link => "Link",
            ItemKind::Image => "Image",
            ItemKind::Video => "Video",
        }
    }

    pub fn all() -> &'static [ItemKind] {
        &[
            ItemKind::Note,
            ItemKind::Memo,
            ItemKind::Link,
            ItemKind::Image,
            ItemKind::Video,
        ]
    }

    pub fn default_size(&self) -> (f32, f32) {
        match self {
            ItemKind::Note => DEFAULT_NOTE_SIZE,
            ItemKind::Memo => DEFAULT_MEMO_SIZE,
            ItemKind::Link => DEFAULT_LINK_SIZE,
            ItemKind::Image => DEFAULT_IMAGE_SIZE,
            ItemKind::Video => DEFAULT_VIDEO_SIZE,
        }
    }

    /// Returns true if the item's payload lives in the external media store.
    pub fn is_media(&self) -> bool {
        matches!(self, ItemKind::Image | ItemKind::Video)
    }
}

/// The payload of a canvas item.
///
/// The variant determines the item's kind; a patch may replace the payload
/// but never with a payload of a different kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemContent {
    /// A titled note with free-form body
    Note { title: String, body: String },
    /// A short plain-text memo
    Memo { text: String },
    /// A web link card
    Link {
        url: String,
        title: String,
        display_text: String,
    },
    /// An image owned by the media store
    Image { media_id: MediaId },
    /// A video owned by the media store
    Video { media_id: MediaId },
}

impl ItemContent {
    pub fn note(title: impl Into<String>, body: impl Into<String>) -> Self {
        ItemContent::Note {
            title: title.into(),
            body: body.into(),
        }
    }

    pub fn memo(text: impl Into<String>) -> Self {
        ItemContent::Memo { text: text.into() }
    }

    pub fn link(url: impl Into<String>) -> Self {
        let url = url.into();
        ItemContent::Link {
            display_text: url.clone(),
            title: String::new(),
            url,
        }
    }

    pub fn image(media_id: impl Into<MediaId>) -> Self {
        ItemContent::Image {
            media_id: media_id.into(),
        }
    }

    pub fn video(media_id: impl Into<MediaId>) -> Self {
        ItemContent::Video {
            media_id: media_id.into(),
        }
    }

    /// Empty payload of the given kind, used for spawned children.
    pub fn empty(kind: ItemKind) -> Self {
        match kind {
            ItemKind::Note => Self::note("", ""),
            ItemKind::Memo => Self::memo(""),
            ItemKind::Link => Self::link(""),
            ItemKind::Image => Self::image(""),
            ItemKind::Video => Self::video(""),
        }
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            ItemContent::Note { .. } => ItemKind::Note,
            ItemContent::Memo { .. } => ItemKind::Memo,
            ItemContent::Link { .. } => ItemKind::Link,
            ItemContent::Image { .. } => ItemKind::Image,
            ItemContent::Video { .. } => ItemKind::Video,
        }
    }

    pub fn media_id(&self) -> Option<&str> {
        match self {
            ItemContent::Image { media_id } | ItemContent::Video { media_id } => {
                Some(media_id.as_str())
            }
            _ => None,
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            ItemContent::Note { title, .. } if !title.is_empty() => title.clone(),
            ItemContent::Note { .. } => "Untitled note".to_string(),
            ItemContent::Memo { text } => text.lines().next().unwrap_or("").to_string(),
            ItemContent::Link {
                display_text, url, ..
            } => {
                if display_text.is_empty() {
                    url.clone()
                } else {
                    display_text.clone()
                }
            }
            ItemContent::Image { media_id } => format!("Image {}", media_id),
            ItemContent::Video { media_id } => format!("Video {}", media_id),
        }
    }

    /// Returns true if any textual field contains `needle` (already lowercased).
    pub fn matches(&self, needle: &str) -> bool {
        let hit = |s: &str| s.to_lowercase().contains(needle);
        match self {
            ItemContent::Note { title, body } => hit(title) || hit(body),
            ItemContent::Memo { text } => hit(text),
            ItemContent::Link {
                url,
                title,
                display_text,
            } => hit(url) || hit(title) || hit(display_text),
            ItemContent::Image { .. } | ItemContent::Video { .. } => false,
        }
    }
}

// ============================================================================
// Color Palette
// ============================================================================

/// Accent tag from the fixed seven-color palette.
///
/// Drives both the item accent and the tint of its outgoing connections.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorTag {
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
    Pink,
}

impl ColorTag {
    pub fn hex(&self) -> &'static str {
        match self {
            ColorTag::Red => "#ef4444",
            ColorTag::Orange => "#f97316",
            ColorTag::Yellow => "#eab308",
            ColorTag::Green => "#22c55e",
            ColorTag::Blue => "#3b82f6",
            ColorTag::Purple => "#a855f7",
            ColorTag::Pink => "#ec4899",
        }
    }

    pub fn all() -> &'static [ColorTag] {
        &[
            ColorTag::Red,
            ColorTag::Orange,
            ColorTag::Yellow,
            ColorTag::Green,
            ColorTag::Blue,
            ColorTag::Purple,
            ColorTag::Pink,
        ]
    }
}

// ============================================================================
// Items
// ============================================================================

/// An item placed on the infinite canvas.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanvasItem {
    /// Unique identifier for this item
    pub id: ItemId,
    /// Top-left corner in world coordinates
    pub position: (f32, f32),
    /// Size in world units, never below the minimum item size
    pub size: (f32, f32),
    /// The content this item displays
    pub content: ItemContent,
    #[serde(default)]
    pub color: Option<ColorTag>,
    #[serde(default)]
    pub locked: bool,
    /// Literal bring-to-front value; compared, never renumbered
    #[serde(default)]
    pub z_order: u64,
}

impl CanvasItem {
    pub fn kind(&self) -> ItemKind {
        self.content.kind()
    }

    pub fn center(&self) -> (f32, f32) {
        (
            self.position.0 + self.size.0 / 2.0,
            self.position.1 + self.size.1 / 2.0,
        )
    }
}

/// Clamp a size to the minimum item bounds.
#[inline]
pub fn clamp_item_size(size: (f32, f32)) -> (f32, f32) {
    clamp_size_to(size, (MIN_ITEM_WIDTH, MIN_ITEM_HEIGHT))
}

#[inline]
pub fn clamp_size_to(size: (f32, f32), min: (f32, f32)) -> (f32, f32) {
    let w = if size.0.is_finite() { size.0 } else { min.0 };
    let h = if size.1.is_finite() { size.1 } else { min.1 };
    (w.max(min.0), h.max(min.1))
}

/// Everything needed to construct an item.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemSpec {
    pub content: ItemContent,
    pub position: (f32, f32),
    /// Defaults to the kind's default size
    pub size: Option<(f32, f32)>,
    pub color: Option<ColorTag>,
    pub locked: bool,
}

impl ItemSpec {
    pub fn new(content: ItemContent) -> Self {
        Self {
            content,
            position: (0.0, 0.0),
            size: None,
            color: None,
            locked: false,
        }
    }

    pub fn note(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(ItemContent::note(title, body))
    }

    pub fn memo(text: impl Into<String>) -> Self {
        Self::new(ItemContent::memo(text))
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.position = (x, y);
        self
    }

    pub fn with_size(mut self, w: f32, h: f32) -> Self {
        self.size = Some((w, h));
        self
    }

    pub fn with_color(mut self, color: ColorTag) -> Self {
        self.color = Some(color);
        self
    }

    pub fn locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }
}

/// A partial update applied atomically by `Scene::mutate_item`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ItemPatch {
    pub position: Option<(f32, f32)>,
    pub size: Option<(f32, f32)>,
    pub content: Option<ItemContent>,
    /// `Some(None)` clears the color tag
    pub color: Option<Option<ColorTag>>,
    pub locked: Option<bool>,
}

impl ItemPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(mut self, x: f32, y: f32) -> Self {
        self.position = Some((x, y));
        self
    }

    pub fn size(mut self, w: f32, h: f32) -> Self {
        self.size = Some((w, h));
        self
    }

    pub fn content(mut self, content: ItemContent) -> Self {
        self.content = Some(content);
        self
    }

    pub fn color(mut self, color: Option<ColorTag>) -> Self {
        self.color = Some(color);
        self
    }

    pub fn locked(mut self, locked: bool) -> Self {
        self.locked = Some(locked);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_none()
            && self.size.is_none()
            && self.content.is_none()
            && self.color.is_none()
            && self.locked.is_none()
    }
}

// ============================================================================
// Connections
// ============================================================================

/// One of the four anchor points on an item's bounding box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Handle {
    Top,
    Bottom,
    Left,
    Right,
}

impl Handle {
    pub fn all() -> &'static [Handle] {
        &[Handle::Top, Handle::Right, Handle::Bottom, Handle::Left]
    }
}

/// Arrowhead presentation of a connection; independent of topology.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionDirection {
    None,
    #[default]
    Forward,
    Backward,
    Both,
}

impl ConnectionDirection {
    /// Arrowheads drawn at (start, end).
    pub fn arrowheads(&self) -> (bool, bool) {
        match self {
            ConnectionDirection::None => (false, false),
            ConnectionDirection::Forward => (false, true),
            ConnectionDirection::Backward => (true, false),
            ConnectionDirection::Both => (true, true),
        }
    }
}

/// An edge between two items' anchor points.
///
/// Endpoints are weak references by id: deleting either item deletes the
/// connection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub id: ConnectionId,
    pub from: ItemId,
    pub to: ItemId,
    pub from_handle: Handle,
    pub to_handle: Handle,
    #[serde(default)]
    pub direction: ConnectionDirection,
}

impl Connection {
    pub fn touches(&self, item_id: &str) -> bool {
        self.from == item_id || self.to == item_id
    }

    /// Returns true if this connection joins the same unordered pair.
    pub fn joins(&self, a: &str, b: &str) -> bool {
        (self.from == a && self.to == b) || (self.from == b && self.to == a)
    }
}
