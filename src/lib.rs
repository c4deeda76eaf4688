//! canvasflow - scene model and interaction engine for an infinite canvas.
//!
//! The crate holds the in-memory graph of items and connections, the
//! viewport transform, hit-testing and selection, snapshot undo/redo, the
//! minimap projection, and one-directional render sync. Hosts provide the
//! window, the persistence backend, and the media store.

// Declared first so `profile_scope!` is in textual scope everywhere
pub mod perf;

pub mod animation;
pub mod autosave;
pub mod config;
pub mod config_watcher;
pub mod constants;
pub mod error;
pub mod events;
pub mod geometry;
pub mod history;
pub mod input;
pub mod logging;
pub mod media;
pub mod minimap;
pub mod notifications;
pub mod persistence;
pub mod render_sync;
pub mod scene;
pub mod selection;
pub mod spatial_index;
pub mod types;
pub mod viewport;
pub mod workspace;

pub use error::{CanvasError, CanvasResult};
pub use scene::Scene;
pub use types::{
    CanvasItem, ColorTag, Connection, ConnectionDirection, Handle, ItemContent, ItemKind, ItemPatch,
    ItemSpec,
};
pub use viewport::Viewport;
pub use workspace::Workspace;
