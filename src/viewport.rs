//! Viewport transform - world <-> screen mapping and zoom/pan state.
//!
//! The transform is the per-axis affine map `screen = world * scale + offset`.
//! Zoom, pan, and fit requests either apply immediately or start an eased
//! `Transition` that the frame loop advances through `tick`.

use crate::animation::{Lerp, Transition};
use crate::constants::{
    DEFAULT_VIEWPORT_SIZE, DEFAULT_ZOOM, FIT_MARGIN_FACTOR, FIT_MAX_SCALE, FIT_PADDING, MAX_ZOOM,
    MIN_ZOOM, VIEWPORT_ANIMATION_MS,
};
use crate::geometry::{Point, Rect, bounding_box};
use crate::types::CanvasItem;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

/// Scale and offset, persisted with the scene.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            scale: DEFAULT_ZOOM,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

impl Lerp for ViewTransform {
    fn lerp(&self, to: &Self, t: f32) -> Self {
        Self {
            scale: self.scale + (to.scale - self.scale) * t,
            offset_x: self.offset_x + (to.offset_x - self.offset_x) * t,
            offset_y: self.offset_y + (to.offset_y - self.offset_y) * t,
        }
    }
}

/// Fit-to-content tuning.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitOptions {
    pub padding: f32,
    pub max_scale: f32,
    pub margin_factor: f32,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            padding: FIT_PADDING,
            max_scale: FIT_MAX_SCALE,
            margin_factor: FIT_MARGIN_FACTOR,
        }
    }
}

pub struct Viewport {
    transform: ViewTransform,
    screen_size: (f32, f32),
    zoom_bounds: (f32, f32),
    fit: FitOptions,
    animation_duration: Duration,
    animation: Option<Transition<ViewTransform>>,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self {
            transform: ViewTransform::default(),
            screen_size: DEFAULT_VIEWPORT_SIZE,
            zoom_bounds: (MIN_ZOOM, MAX_ZOOM),
            fit: FitOptions::default(),
            animation_duration: Duration::from_millis(VIEWPORT_ANIMATION_MS),
            animation: None,
        }
    }

    pub fn with_zoom_bounds(mut self, min: f32, max: f32) -> Self {
        self.set_zoom_bounds(min, max);
        self
    }

    pub fn with_fit_options(mut self, fit: FitOptions) -> Self {
        self.fit = fit;
        self
    }

    pub fn with_animation_duration(mut self, duration: Duration) -> Self {
        self.animation_duration = duration;
        self
    }

    pub fn zoom_bounds(&self) -> (f32, f32) {
        self.zoom_bounds
    }

    /// Narrowing the bounds re-clamps the current scale.
    pub fn set_zoom_bounds(&mut self, min: f32, max: f32) {
        self.zoom_bounds = (min.min(max), max.max(min));
        self.transform.scale = self.clamp_scale(self.transform.scale);
    }

    pub fn fit_options(&self) -> FitOptions {
        self.fit
    }

    pub fn set_fit_options(&mut self, fit: FitOptions) {
        self.fit = fit;
    }

    pub fn set_animation_duration(&mut self, duration: Duration) {
        self.animation_duration = duration;
    }

    pub fn scale(&self) -> f32 {
        self.transform.scale
    }

    pub fn offset(&self) -> (f32, f32) {
        (self.transform.offset_x, self.transform.offset_y)
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    /// Replace the transform outright (e.g. after loading a canvas).
    pub fn set_transform(&mut self, transform: ViewTransform) {
        self.animation = None;
        self.transform = ViewTransform {
            scale: self.clamp_scale(transform.scale),
            offset_x: finite_or_zero(transform.offset_x),
            offset_y: finite_or_zero(transform.offset_y),
        };
    }

    pub fn screen_size(&self) -> (f32, f32) {
        self.screen_size
    }

    pub fn set_screen_size(&mut self, width: f32, height: f32) {
        self.screen_size = (width.max(1.0), height.max(1.0));
    }

    fn clamp_scale(&self, scale: f32) -> f32 {
        if !scale.is_finite() {
            return DEFAULT_ZOOM.clamp(self.zoom_bounds.0, self.zoom_bounds.1);
        }
        scale.clamp(self.zoom_bounds.0, self.zoom_bounds.1)
    }

    // ==================== Coordinate Conversion ====================

    #[inline]
    pub fn world_to_screen(&self, p: Point) -> Point {
        Point::new(
            p.x * self.transform.scale + self.transform.offset_x,
            p.y * self.transform.scale + self.transform.offset_y,
        )
    }

    #[inline]
    pub fn screen_to_world(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.transform.offset_x) / self.transform.scale,
            (p.y - self.transform.offset_y) / self.transform.scale,
        )
    }

    pub fn world_rect_to_screen(&self, r: &Rect) -> Rect {
        let origin = self.world_to_screen(Point::new(r.x, r.y));
        Rect::new(
            origin.x,
            origin.y,
            r.w * self.transform.scale,
            r.h * self.transform.scale,
        )
    }

    pub fn screen_rect_to_world(&self, r: &Rect) -> Rect {
        let origin = self.screen_to_world(Point::new(r.x, r.y));
        Rect::new(
            origin.x,
            origin.y,
            r.w / self.transform.scale,
            r.h / self.transform.scale,
        )
    }

    /// World-space extent currently visible on screen.
    pub fn visible_world_rect(&self) -> Rect {
        self.screen_rect_to_world(&Rect::new(0.0, 0.0, self.screen_size.0, self.screen_size.1))
    }

    // ==================== Zoom & Pan ====================

    /// Zoom to `target` keeping the world point under the pivot fixed.
    /// Returns true if the transform changed.
    pub fn set_zoom(&mut self, target: f32, pivot_x: f32, pivot_y: f32) -> bool {
        self.animation = None;
        let target = self.clamp_scale(target);
        let current = self.transform.scale;
        if (target - current).abs() <= f32::EPSILON {
            return false;
        }

        let ratio = target / current;
        self.transform.offset_x = pivot_x - (pivot_x - self.transform.offset_x) * ratio;
        self.transform.offset_y = pivot_y - (pivot_y - self.transform.offset_y) * ratio;
        self.transform.scale = target;
        true
    }

    /// Multiply the zoom around a pivot (wheel/pinch steps).
    pub fn zoom_by(&mut self, factor: f32, pivot_x: f32, pivot_y: f32) -> bool {
        if !factor.is_finite() || factor <= 0.0 {
            return false;
        }
        self.set_zoom(self.transform.scale * factor, pivot_x, pivot_y)
    }

    /// Pan by a screen-space delta.
    pub fn pan_by(&mut self, dx: f32, dy: f32) -> bool {
        if !(dx.is_finite() && dy.is_finite()) || (dx == 0.0 && dy == 0.0) {
            return false;
        }
        self.animation = None;
        self.transform.offset_x += dx;
        self.transform.offset_y += dy;
        true
    }

    /// Back to the identity transform.
    pub fn reset(&mut self) {
        self.animation = None;
        self.transform = ViewTransform {
            scale: self.clamp_scale(DEFAULT_ZOOM),
            offset_x: 0.0,
            offset_y: 0.0,
        };
    }

    // ==================== Fit & Animated Targets ====================

    /// Transform that fits all items in the viewport. Empty scenes fit to
    /// the identity transform.
    pub fn fit_target<'a, I>(&self, items: I) -> ViewTransform
    where
        I: IntoIterator<Item = &'a CanvasItem>,
    {
        let Some(bounds) = bounding_box(items) else {
            return ViewTransform::default();
        };
        let padded = bounds.padded(self.fit.padding);
        let (vw, vh) = self.screen_size;

        let fit_scale = (vw / padded.w.max(1.0)).min(vh / padded.h.max(1.0));
        let scale = self.clamp_scale(fit_scale.min(self.fit.max_scale) * self.fit.margin_factor);
        let center = padded.center();

        ViewTransform {
            scale,
            offset_x: vw / 2.0 - center.x * scale,
            offset_y: vh / 2.0 - center.y * scale,
        }
    }

    /// Transform that centers a world point at the current scale.
    pub fn pan_target(&self, world: Point) -> ViewTransform {
        let scale = self.transform.scale;
        ViewTransform {
            scale,
            offset_x: self.screen_size.0 / 2.0 - world.x * scale,
            offset_y: self.screen_size.1 / 2.0 - world.y * scale,
        }
    }

    pub fn fit_to_content<'a, I>(&mut self, items: I, now: Instant)
    where
        I: IntoIterator<Item = &'a CanvasItem>,
    {
        let target = self.fit_target(items);
        self.animate_to(target, now);
    }

    pub fn pan_to(&mut self, world: Point, now: Instant) {
        let target = self.pan_target(world);
        self.animate_to(target, now);
    }

    pub fn animate_to(&mut self, target: ViewTransform, now: Instant) {
        debug!(
            scale = target.scale,
            offset_x = target.offset_x,
            offset_y = target.offset_y,
            "Starting viewport transition"
        );
        self.animation = Some(Transition::new(
            self.transform,
            target,
            now,
            self.animation_duration,
        ));
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn cancel_animation(&mut self) -> bool {
        self.animation.take().is_some()
    }

    /// Advance any in-flight transition. Returns true if the transform moved.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(ref animation) = self.animation else {
            return false;
        };
        let next = animation.sample(now);
        if animation.is_finished(now) {
            self.animation = None;
        }
        let changed = next != self.transform;
        self.transform = next;
        changed
    }
}

fn finite_or_zero(v: f32) -> f32 {
    if v.is_finite() { v } else { 0.0 }
}
