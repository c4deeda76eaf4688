//! Unit tests for the minimap projector.

use crate::helpers::{TestSceneBuilder, approx_eq};
use canvasflow::geometry::Rect;
use canvasflow::minimap::{ItemFilter, MinimapProjector};
use canvasflow::types::ItemKind;

#[test]
fn test_empty_scene_frames_viewport() {
    let projector = MinimapProjector::new((200.0, 140.0), 0.0);
    let viewport = Rect::new(0.0, 0.0, 1000.0, 700.0);
    let projection = projector.project(&[], &[], viewport);

    assert!(projection.items.is_empty());
    assert!(approx_eq(projection.viewport.w, 200.0));
    assert!(approx_eq(projection.viewport.h, 140.0));
}

#[test]
fn test_scale_is_uniform_and_content_centered() {
    let (scene, _) = TestSceneBuilder::new()
        .with_min_size(1.0, 1.0)
        .with_rect("wide", (0.0, 0.0, 1000.0, 100.0))
        .build();
    let projector = MinimapProjector::new((200.0, 140.0), 0.0);
    let projection = projector.project(scene.items(), scene.connections(), Rect::new(0.0, 0.0, 10.0, 10.0));

    let rect = projection.items[0].rect;
    // Width-limited: 1000 world units fill 200 px, so 100 becomes 20
    assert!(approx_eq(rect.w, 200.0));
    assert!(approx_eq(rect.h, 20.0));
    assert!(approx_eq(rect.y, 60.0));
}

#[test]
fn test_filter_toggles_by_kind() {
    let mut filter = ItemFilter::all();
    assert!(filter.shows(ItemKind::Video));
    filter.set_visible(ItemKind::Video, false);
    assert!(!filter.shows(ItemKind::Video));
    assert!(filter.shows(ItemKind::Note));
}
