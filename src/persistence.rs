//! Scene serialization and the persistence collaborators.
//!
//! `SceneData` is the stable structural shape shared by persistence,
//! export, and import. Connections reference items by id, and anything that
//! no longer resolves is dropped on load instead of failing it.

use crate::error::{CanvasError, CanvasResult};
use crate::scene::{Scene, SceneCounters};
use crate::types::{CanvasItem, Connection};
use crate::viewport::{ViewTransform, Viewport};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Current on-disk format version.
pub const SCENE_FORMAT_VERSION: u32 = 1;

fn default_version() -> u32 {
    SCENE_FORMAT_VERSION
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneData {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub items: Vec<CanvasItem>,
    #[serde(default)]
    pub connections: Vec<Connection>,
    #[serde(default)]
    pub viewport: ViewTransform,
    #[serde(default)]
    pub counters: SceneCounters,
}

impl Default for SceneData {
    fn default() -> Self {
        Self {
            version: SCENE_FORMAT_VERSION,
            items: Vec::new(),
            connections: Vec::new(),
            viewport: ViewTransform::default(),
            counters: SceneCounters::default(),
        }
    }
}

pub fn serialize_scene(scene: &Scene, viewport: &Viewport) -> SceneData {
    SceneData {
        version: SCENE_FORMAT_VERSION,
        items: scene.items().to_vec(),
        connections: scene.connections().to_vec(),
        viewport: viewport.transform(),
        counters: scene.counters(),
    }
}

/// Load `data` into the scene and viewport, replacing their contents.
pub fn deserialize_scene(data: SceneData, scene: &mut Scene, viewport: &mut Viewport) -> CanvasResult<()> {
    check_version(data.version)?;
    let SceneData {
        items,
        connections,
        viewport: transform,
        counters,
        ..
    } = data;
    scene.restore_counters(counters);
    scene.replace_contents(items, connections);
    viewport.set_transform(transform);
    Ok(())
}

fn check_version(found: u32) -> CanvasResult<()> {
    if found > SCENE_FORMAT_VERSION {
        return Err(CanvasError::UnsupportedVersion {
            found,
            supported: SCENE_FORMAT_VERSION,
        });
    }
    Ok(())
}

pub fn export_json(data: &SceneData) -> CanvasResult<String> {
    Ok(serde_json::to_string_pretty(data)?)
}

pub fn import_json(json: &str) -> CanvasResult<SceneData> {
    let data: SceneData = serde_json::from_str(json)?;
    check_version(data.version)?;
    Ok(data)
}

// ============================================================================
// Stores
// ============================================================================

/// Key-value persistence for whole scenes, keyed by canvas id.
pub trait SceneStore {
    fn save(&self, canvas_id: &str, data: &SceneData) -> CanvasResult<()>;
    /// `Ok(None)` for a canvas that was never saved.
    fn load(&self, canvas_id: &str) -> CanvasResult<Option<SceneData>>;
    fn delete(&self, canvas_id: &str) -> CanvasResult<()>;
}

/// Shared in-memory store. Clones see the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryStoreInner>>,
}

#[derive(Default)]
struct MemoryStoreInner {
    scenes: HashMap<String, String>,
    writes: usize,
    failing: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent save fail, to exercise error paths.
    pub fn set_failing(&self, failing: bool) {
        self.inner.lock().failing = failing;
    }

    pub fn write_count(&self) -> usize {
        self.inner.lock().writes
    }

    pub fn contains(&self, canvas_id: &str) -> bool {
        self.inner.lock().scenes.contains_key(canvas_id)
    }
}

impl SceneStore for MemoryStore {
    fn save(&self, canvas_id: &str, data: &SceneData) -> CanvasResult<()> {
        let json = serde_json::to_string(data)?;
        let mut inner = self.inner.lock();
        if inner.failing {
            return Err(CanvasError::Persistence(format!("write rejected for {canvas_id}")));
        }
        inner.scenes.insert(canvas_id.to_string(), json);
        inner.writes += 1;
        Ok(())
    }

    fn load(&self, canvas_id: &str) -> CanvasResult<Option<SceneData>> {
        let inner = self.inner.lock();
        match inner.scenes.get(canvas_id) {
            Some(json) => Ok(Some(serde_json::from_str(json)?)),
            None => Ok(None),
        }
    }

    fn delete(&self, canvas_id: &str) -> CanvasResult<()> {
        self.inner.lock().scenes.remove(canvas_id);
        Ok(())
    }
}

/// One pretty-printed JSON file per canvas under a root directory.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `<data dir>/canvasflow/canvases`, if the platform has a data dir.
    pub fn default_location() -> Option<Self> {
        dirs::data_dir().map(|dir| Self::new(dir.join("canvasflow").join("canvases")))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Percent-encoded, so distinct ids never share a file and no id can
    /// name a path outside `root`.
    pub fn path_for(&self, canvas_id: &str) -> PathBuf {
        let encoded = urlencoding::encode(canvas_id);
        self.root.join(format!("{encoded}.json"))
    }
}

impl SceneStore for JsonFileStore {
    fn save(&self, canvas_id: &str, data: &SceneData) -> CanvasResult<()> {
        std::fs::create_dir_all(&self.root)?;
        let path = self.path_for(canvas_id);

        // Write beside the target, then rename over it
        let mut tmp = tempfile::NamedTempFile::new_in(&self.root)?;
        serde_json::to_writer_pretty(&mut tmp, data)?;
        tmp.flush()?;
        tmp.persist(&path).map_err(|e| CanvasError::Io(e.error))?;

        debug!(path = %path.display(), items = data.items.len(), "Saved canvas");
        Ok(())
    }

    fn load(&self, canvas_id: &str) -> CanvasResult<Option<SceneData>> {
        let path = self.path_for(canvas_id);
        if !path.exists() {
            return Ok(None);
        }
        let json = std::fs::read_to_string(&path)?;
        let data = import_json(&json)?;
        info!(path = %path.display(), items = data.items.len(), "Loaded canvas");
        Ok(Some(data))
    }

    fn delete(&self, canvas_id: &str) -> CanvasResult<()> {
        let path = self.path_for(canvas_id);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
