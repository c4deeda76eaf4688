//! Test helpers and builders for reducing boilerplate in tests.
//!
//! This module provides:
//! - `TestSceneBuilder` - Builder pattern for creating test scenes with items
//! - `TestWorkspace` - A workspace wired to in-memory collaborators
//! - Pointer gesture shorthands (`click`, `drag`) and common assertions

#![allow(dead_code)]

use canvasflow::config::EngineConfig;
use canvasflow::input::{InputOutcome, PointerEvent};
use canvasflow::media::MemoryMediaStore;
use canvasflow::persistence::MemoryStore;
use canvasflow::scene::Scene;
use canvasflow::types::{ItemContent, ItemId, ItemSpec};
use canvasflow::workspace::Workspace;

// ============================================================================
// TestSceneBuilder - Builder pattern for creating test scenes
// ============================================================================

/// Builder for creating test scenes with items.
///
/// # Example
/// ```ignore
/// let (scene, ids) = TestSceneBuilder::new()
///     .with_note("First", (0.0, 0.0))
///     .with_memo("Second", (300.0, 0.0))
///     .build();
/// ```
pub struct TestSceneBuilder {
    specs: Vec<ItemSpec>,
    min_size: Option<(f32, f32)>,
}

impl Default for TestSceneBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestSceneBuilder {
    pub fn new() -> Self {
        Self {
            specs: Vec::new(),
            min_size: None,
        }
    }

    /// Lower the minimum item size so tests can use exact small rects.
    pub fn with_min_size(mut self, w: f32, h: f32) -> Self {
        self.min_size = Some((w, h));
        self
    }

    pub fn with_note(mut self, title: &str, pos: (f32, f32)) -> Self {
        self.specs.push(ItemSpec::note(title, "").at(pos.0, pos.1));
        self
    }

    pub fn with_memo(mut self, text: &str, pos: (f32, f32)) -> Self {
        self.specs.push(ItemSpec::memo(text).at(pos.0, pos.1));
        self
    }

    /// Add a memo with an explicit rect `(x, y, w, h)`.
    pub fn with_rect(mut self, text: &str, rect: (f32, f32, f32, f32)) -> Self {
        self.specs
            .push(ItemSpec::memo(text).at(rect.0, rect.1).with_size(rect.2, rect.3));
        self
    }

    pub fn with_item(mut self, content: ItemContent, pos: (f32, f32)) -> Self {
        self.specs.push(ItemSpec::new(content).at(pos.0, pos.1));
        self
    }

    /// Add N memos spaced 300 units apart along the x axis.
    pub fn with_n_memos(mut self, count: usize) -> Self {
        for i in 0..count {
            self.specs
                .push(ItemSpec::memo(format!("Item {i}")).at(i as f32 * 300.0, 0.0));
        }
        self
    }

    /// Build the scene, returning the created ids in insertion order.
    pub fn build(self) -> (Scene, Vec<ItemId>) {
        let mut scene = match self.min_size {
            Some(min) => Scene::new().with_min_size(min),
            None => Scene::new(),
        };
        let ids = self
            .specs
            .into_iter()
            .map(|spec| scene.create_item(spec).id)
            .collect();
        (scene, ids)
    }
}

// ============================================================================
// TestWorkspace
// ============================================================================

/// A workspace over `MemoryStore`, keeping a handle to the store so tests
/// can inspect writes.
pub struct TestWorkspace {
    pub ws: Workspace,
    pub store: MemoryStore,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self::with_media(config, MemoryMediaStore::new())
    }

    pub fn with_media(config: EngineConfig, media: MemoryMediaStore) -> Self {
        let store = MemoryStore::new();
        let ws = Workspace::new(config, Box::new(store.clone()), Box::new(media));
        Self { ws, store }
    }

    /// Same as `new`, with a canvas already open.
    pub fn opened(canvas_id: &str) -> Self {
        let mut test = Self::new();
        test.ws
            .open_canvas(canvas_id)
            .expect("memory store never fails to load");
        test
    }
}

// ============================================================================
// Gestures
// ============================================================================

/// Press and release at the same screen point.
pub fn click(ws: &mut Workspace, x: f32, y: f32) -> InputOutcome {
    ws.handle_pointer(&PointerEvent::down(x, y));
    ws.handle_pointer(&PointerEvent::up(x, y))
}

/// Primary drag from one screen point to another in a few move steps.
/// Returns the outcome of the release.
pub fn drag(ws: &mut Workspace, from: (f32, f32), to: (f32, f32)) -> InputOutcome {
    ws.handle_pointer(&PointerEvent::down(from.0, from.1));
    for step in 1..=4 {
        let t = step as f32 / 4.0;
        ws.handle_pointer(&PointerEvent::moved(
            from.0 + (to.0 - from.0) * t,
            from.1 + (to.1 - from.1) * t,
        ));
    }
    ws.handle_pointer(&PointerEvent::up(to.0, to.1))
}

// ============================================================================
// Assertions
// ============================================================================

pub fn assert_item_count(scene: &Scene, expected: usize) {
    assert_eq!(
        scene.item_count(),
        expected,
        "expected {expected} items, found {}",
        scene.item_count()
    );
}

pub fn assert_position(scene: &Scene, id: &str, expected: (f32, f32)) {
    let item = scene.get_item(id).unwrap_or_else(|| panic!("missing item {id}"));
    assert!(
        (item.position.0 - expected.0).abs() < 1e-3 && (item.position.1 - expected.1).abs() < 1e-3,
        "item {id} at {:?}, expected {:?}",
        item.position,
        expected
    );
}

pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}
