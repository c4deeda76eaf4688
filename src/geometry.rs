//! Geometry primitives and hit-testing helpers.
//!
//! Everything here is pure math over world- or screen-space values; the
//! caller decides which space a `Point` or `Rect` lives in.

use crate::constants::{CURVE_MAX_OFFSET, CURVE_OFFSET_FACTOR};
use crate::types::{CanvasItem, Handle};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn distance(&self, other: Point) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    #[inline]
    pub fn lerp(&self, other: Point, t: f32) -> Point {
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Point::new(x, y)
    }
}

/// Axis-aligned rectangle with a top-left origin and non-negative size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Normalizes two arbitrary corners (e.g. a drag start and current point).
    pub fn from_corners(a: Point, b: Point) -> Self {
        let min_x = a.x.min(b.x);
        let min_y = a.y.min(b.y);
        Self::new(min_x, min_y, (a.x - b.x).abs(), (a.y - b.y).abs())
    }

    pub fn of_item(item: &CanvasItem) -> Self {
        Self::new(item.position.0, item.position.1, item.size.0, item.size.1)
    }

    #[inline]
    pub fn max_x(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn max_y(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    #[inline]
    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.max_x() && p.y >= self.y && p.y <= self.max_y()
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let min_x = self.x.min(other.x);
        let min_y = self.y.min(other.y);
        let max_x = self.max_x().max(other.max_x());
        let max_y = self.max_y().max(other.max_y());
        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    pub fn padded(&self, pad: f32) -> Rect {
        Rect::new(self.x - pad, self.y - pad, self.w + pad * 2.0, self.h + pad * 2.0)
    }
}

/// Standard AABB overlap test. Partial overlap qualifies; touching edges count.
#[inline]
pub fn rect_intersects(a: &Rect, b: &Rect) -> bool {
    a.x <= b.max_x() && b.x <= a.max_x() && a.y <= b.max_y() && b.y <= a.max_y()
}

/// Bounding box of a set of items, or `None` when empty.
pub fn bounding_box<'a, I>(items: I) -> Option<Rect>
where
    I: IntoIterator<Item = &'a CanvasItem>,
{
    items
        .into_iter()
        .map(Rect::of_item)
        .reduce(|acc, r| acc.union(&r))
}

/// World-space point of the named anchor (mid-point of that edge).
pub fn handle_anchor(item: &CanvasItem, handle: Handle) -> Point {
    let (x, y) = item.position;
    let (w, h) = item.size;
    match handle {
        Handle::Top => Point::new(x + w / 2.0, y),
        Handle::Bottom => Point::new(x + w / 2.0, y + h),
        Handle::Left => Point::new(x, y + h / 2.0),
        Handle::Right => Point::new(x + w, y + h / 2.0),
    }
}

/// Cubic Bézier description between two points.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CubicCurve {
    pub start: Point,
    pub c1: Point,
    pub c2: Point,
    pub end: Point,
}

impl CubicCurve {
    pub fn point_at(&self, t: f32) -> Point {
        let mt = 1.0 - t;
        let a = mt * mt * mt;
        let b = 3.0 * mt * mt * t;
        let c = 3.0 * mt * t * t;
        let d = t * t * t;
        Point::new(
            a * self.start.x + b * self.c1.x + c * self.c2.x + d * self.end.x,
            a * self.start.y + b * self.c1.y + c * self.c2.y + d * self.end.y,
        )
    }

    /// Approximate distance from `p` to the curve by sampling.
    pub fn distance_to(&self, p: Point, samples: usize) -> f32 {
        let samples = samples.max(2);
        let mut prev = self.start;
        let mut best = f32::MAX;
        for i in 1..=samples {
            let next = self.point_at(i as f32 / samples as f32);
            best = best.min(distance_to_segment(p, prev, next));
            prev = next;
        }
        best
    }

    pub fn to_svg_path(&self) -> String {
        format!(
            "M {} {} C {} {}, {} {}, {} {}",
            self.start.x,
            self.start.y,
            self.c1.x,
            self.c1.y,
            self.c2.x,
            self.c2.y,
            self.end.x,
            self.end.y
        )
    }

    pub fn map(&self, f: impl Fn(Point) -> Point) -> CubicCurve {
        CubicCurve {
            start: f(self.start),
            c1: f(self.c1),
            c2: f(self.c2),
            end: f(self.end),
        }
    }
}

/// S-curve between two points with horizontal control offsets of
/// `min(distance * 0.3, 80)`. When the endpoints share an x coordinate the
/// offset direction defaults to positive.
pub fn curve_path(p1: Point, p2: Point) -> CubicCurve {
    let dx = p2.x - p1.x;
    let offset = (p1.distance(p2) * CURVE_OFFSET_FACTOR).min(CURVE_MAX_OFFSET);
    let sign = if dx < 0.0 { -1.0 } else { 1.0 };
    CubicCurve {
        start: p1,
        c1: Point::new(p1.x + offset * sign, p1.y),
        c2: Point::new(p2.x - offset * sign, p2.y),
        end: p2,
    }
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let abx = b.x - a.x;
    let aby = b.y - a.y;
    let len_sq = abx * abx + aby * aby;
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * abx + (p.y - a.y) * aby) / len_sq).clamp(0.0, 1.0);
    p.distance(Point::new(a.x + abx * t, a.y + aby * t))
}
