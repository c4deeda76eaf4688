//! Unit tests for the viewport transform.

use crate::helpers::{TestSceneBuilder, approx_eq};
use canvasflow::geometry::{Point, Rect, bounding_box};
use canvasflow::viewport::{ViewTransform, Viewport};
use std::time::{Duration, Instant};

fn viewport_at(scale: f32, ox: f32, oy: f32) -> Viewport {
    let mut viewport = Viewport::new();
    viewport.set_transform(ViewTransform {
        scale,
        offset_x: ox,
        offset_y: oy,
    });
    viewport
}

#[test]
fn test_transform_invertibility_across_scales() {
    for &(scale, ox, oy) in &[(0.1, -500.0, 20.0), (1.0, 0.0, 0.0), (2.5, 300.0, -75.0), (5.0, 12.5, 12.5)] {
        let viewport = viewport_at(scale, ox, oy);
        for &p in &[Point::new(0.0, 0.0), Point::new(-1234.5, 987.25), Point::new(40.0, -3.0)] {
            let back = viewport.screen_to_world(viewport.world_to_screen(p));
            assert!(
                (back.x - p.x).abs() <= 1e-3 * p.x.abs().max(1.0) && (back.y - p.y).abs() <= 1e-3 * p.y.abs().max(1.0),
                "round trip of {p:?} at scale {scale} gave {back:?}"
            );
        }
    }
}

#[test]
fn test_zoom_pivot_stays_fixed() {
    let mut viewport = viewport_at(1.3, 40.0, -60.0);
    let pivot = Point::new(512.0, 300.0);
    let world_before = viewport.screen_to_world(pivot);

    for target in [0.1, 0.75, 2.0, 4.9] {
        viewport.set_zoom(target, pivot.x, pivot.y);
        let screen_after = viewport.world_to_screen(world_before);
        assert!((screen_after.x - pivot.x).abs() < 0.05, "pivot drifted at scale {target}");
        assert!((screen_after.y - pivot.y).abs() < 0.05, "pivot drifted at scale {target}");
    }
}

#[test]
fn test_zoom_outside_bounds_is_clamped() {
    let mut viewport = Viewport::new();
    viewport.set_zoom(50.0, 0.0, 0.0);
    assert_eq!(viewport.scale(), 5.0);
    viewport.set_zoom(0.0001, 0.0, 0.0);
    assert_eq!(viewport.scale(), 0.1);
}

#[test]
fn test_custom_zoom_bounds_reclamp_current_scale() {
    let mut viewport = viewport_at(4.0, 0.0, 0.0);
    viewport.set_zoom_bounds(0.5, 2.0);
    assert_eq!(viewport.scale(), 2.0);
    assert_eq!(viewport.zoom_bounds(), (0.5, 2.0));
}

#[test]
fn test_fit_makes_every_item_visible() {
    let (scene, _) = TestSceneBuilder::new()
        .with_memo("far left", (-2000.0, -500.0))
        .with_memo("far right", (3000.0, 1200.0))
        .build();
    let mut viewport = Viewport::new();
    viewport.set_screen_size(1280.0, 800.0);

    let target = viewport.fit_target(scene.items());
    viewport.set_transform(target);

    let visible = viewport.visible_world_rect();
    let bounds = bounding_box(scene.items()).unwrap();
    assert!(visible.x <= bounds.x && visible.y <= bounds.y);
    assert!(visible.max_x() >= bounds.max_x() && visible.max_y() >= bounds.max_y());
}

#[test]
fn test_animation_ends_at_target_and_can_be_cancelled() {
    let mut viewport = Viewport::new().with_animation_duration(Duration::from_millis(300));
    let start = Instant::now();
    viewport.pan_to(Point::new(1000.0, 1000.0), start);
    assert!(viewport.is_animating());

    assert!(viewport.tick(start + Duration::from_millis(150)));
    assert!(viewport.is_animating());
    viewport.tick(start + Duration::from_millis(400));
    assert!(!viewport.is_animating());

    let center = viewport.screen_to_world(Point::new(640.0, 400.0));
    assert!(approx_eq(center.x, 1000.0) && approx_eq(center.y, 1000.0));

    viewport.pan_to(Point::new(0.0, 0.0), start);
    assert!(viewport.cancel_animation());
    assert!(!viewport.tick(start + Duration::from_millis(100)));
}

#[test]
fn test_rect_conversion_scales_size() {
    let viewport = viewport_at(2.0, 10.0, 20.0);
    let screen = viewport.world_rect_to_screen(&Rect::new(0.0, 0.0, 100.0, 50.0));
    assert_eq!(screen, Rect::new(10.0, 20.0, 200.0, 100.0));
    assert_eq!(viewport.screen_rect_to_world(&screen), Rect::new(0.0, 0.0, 100.0, 50.0));
}
