//! Media store collaborator.
//!
//! Image and video items only carry an opaque media id. The store resolves
//! that id to something the host can display; the core never sees bytes.

use crate::error::{CanvasError, CanvasResult};
use crate::types::MediaId;
use std::collections::HashMap;
use tracing::debug;

/// Displayable reference to a resident media resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaHandle {
    pub media_id: MediaId,
    /// Host-specific locator (object URL, file path, texture key)
    pub uri: String,
}

pub trait MediaStore {
    fn resolve(&self, id: &str) -> Option<MediaHandle>;

    fn is_resident(&self, id: &str) -> bool {
        self.resolve(id).is_some()
    }

    /// Release a resource whose owning item was deleted.
    fn release(&mut self, id: &str) -> CanvasResult<()>;
}

/// In-memory store keyed by media id.
#[derive(Debug, Default)]
pub struct MemoryMediaStore {
    entries: HashMap<MediaId, MediaHandle>,
}

impl MemoryMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<MediaId>, uri: impl Into<String>) {
        let id = id.into();
        self.entries.insert(
            id.clone(),
            MediaHandle {
                media_id: id,
                uri: uri.into(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl MediaStore for MemoryMediaStore {
    fn resolve(&self, id: &str) -> Option<MediaHandle> {
        self.entries.get(id).cloned()
    }

    fn is_resident(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    fn release(&mut self, id: &str) -> CanvasResult<()> {
        match self.entries.remove(id) {
            Some(_) => {
                debug!(id, "Released media");
                Ok(())
            }
            None => Err(CanvasError::Media(format!("unknown media id: {id}"))),
        }
    }
}
