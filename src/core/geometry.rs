//! Planar primitives shared by the motion models: points, segments, the
//! axis-aligned rectangle used as the indicator's valid band, and the
//! segment/rectangle intersection that finds where a fling leaves it.

use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

/// Clamp `value` into `[min, max]`.  Unlike `f64::clamp` this never panics
/// when the range is inverted; `max` wins.
pub fn interval(min: f64, value: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

// ───────────────────────────────────────── point ─────────────

/// A 2-D point / vector.  Only `y` is non-zero for a vertical scroll bar,
/// but the models keep both components so the maths reads as written.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[cfg(test)]
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Shorthand for a purely vertical vector.
    pub const fn vertical(y: f64) -> Self {
        Self { x: 0.0, y }
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance(self, other: Point) -> f64 {
        (self - other).length()
    }

    fn dot(self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Shortest distance from this point to the closed segment.
    pub fn distance_to_segment(self, segment: Segment) -> f64 {
        let along = segment.end - segment.start;
        let len_sq = along.dot(along);
        if len_sq == 0.0 {
            return self.distance(segment.start);
        }
        let t = interval(0.0, (self - segment.start).dot(along) / len_sq, 1.0);
        self.distance(segment.start + along * t)
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;
    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for Point {
    type Output = Point;
    fn div(self, rhs: f64) -> Point {
        Point::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Point {
    type Output = Point;
    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

// ───────────────────────────────────────── segment ───────────

/// Closed line segment from `start` to `end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Intersection with another segment as `(t, point)`, where `t ∈ [0, 1]`
    /// is the parameter along `self`.  Parallel segments never intersect.
    pub fn intersection(&self, other: &Segment) -> Option<(f64, Point)> {
        let (p1, p2, p3, p4) = (self.start, self.end, other.start, other.end);
        let d = (p2.x - p1.x) * (p4.y - p3.y) - (p2.y - p1.y) * (p4.x - p3.x);
        if d == 0.0 {
            return None;
        }
        let ua = ((p3.x - p1.x) * (p4.y - p3.y) - (p3.y - p1.y) * (p4.x - p3.x)) / d;
        let ub = ((p3.x - p1.x) * (p2.y - p1.y) - (p3.y - p1.y) * (p2.x - p1.x)) / d;
        if !(0.0..=1.0).contains(&ua) || !(0.0..=1.0).contains(&ub) {
            return None;
        }
        Some((ua, p1 + (p2 - p1) * ua))
    }
}

// ───────────────────────────────────────── rect ──────────────

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub origin: Point,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            origin: Point::new(x, y),
            width,
            height,
        }
    }

    /// A one-unit-wide band centred on `x = 0` spanning `[min_y, max_y]`.
    ///
    /// Vertical trajectories run along `x = 0`, so they cross the band's top
    /// and bottom edges at their midpoints instead of grazing a zero-width
    /// rectangle.
    pub fn vertical_band(min_y: f64, max_y: f64) -> Self {
        Self::new(-0.5, min_y, 1.0, max_y - min_y)
    }

    pub fn min_x(&self) -> f64 {
        self.origin.x
    }

    pub fn max_x(&self) -> f64 {
        self.origin.x + self.width
    }

    pub fn min_y(&self) -> f64 {
        self.origin.y
    }

    pub fn max_y(&self) -> f64 {
        self.origin.y + self.height
    }

    /// Inclusive containment.
    pub fn contains(&self, p: Point) -> bool {
        (self.min_x()..=self.max_x()).contains(&p.x) && (self.min_y()..=self.max_y()).contains(&p.y)
    }

    pub fn edges(&self) -> [Segment; 4] {
        let tl = Point::new(self.min_x(), self.min_y());
        let tr = Point::new(self.max_x(), self.min_y());
        let br = Point::new(self.max_x(), self.max_y());
        let bl = Point::new(self.min_x(), self.max_y());
        [
            Segment::new(tl, tr),
            Segment::new(tr, br),
            Segment::new(br, bl),
            Segment::new(bl, tl),
        ]
    }

    /// All boundary crossings of `segment`, ordered by distance from its start.
    pub fn intersections(&self, segment: &Segment) -> Vec<(f64, Point)> {
        let mut hits: Vec<(f64, Point)> = self
            .edges()
            .iter()
            .filter_map(|edge| segment.intersection(edge))
            .collect();
        hits.sort_by(|a, b| a.0.total_cmp(&b.0));
        hits.dedup_by(|a, b| (a.0 - b.0).abs() < 1e-12);
        hits
    }

    /// Where `segment` leaves the rectangle for good.
    ///
    /// `None` when the segment ends inside.  The rectangle is convex, so once
    /// the segment is outside at its end, the last boundary crossing is the
    /// exit, even when the start point sits exactly on an edge.
    pub fn exit_point(&self, segment: &Segment) -> Option<Point> {
        if self.contains(segment.end) {
            return None;
        }
        self.intersections(segment).last().map(|&(_, p)| p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_clamps_both_ends() {
        assert_eq!(interval(1.0, 0.5, 30.0), 1.0);
        assert_eq!(interval(1.0, 45.0, 30.0), 30.0);
        assert_eq!(interval(-7000.0, 1234.0, 7000.0), 1234.0);
    }

    #[test]
    fn distance_to_segment_uses_perpendicular_inside_and_endpoints_outside() {
        let seg = Segment::new(Point::new(0.0, 0.0), Point::new(0.0, 10.0));
        assert!((Point::new(3.0, 5.0).distance_to_segment(seg) - 3.0).abs() < 1e-12);
        assert!((Point::new(0.0, 14.0).distance_to_segment(seg) - 4.0).abs() < 1e-12);
        let degenerate = Segment::new(Point::new(1.0, 1.0), Point::new(1.0, 1.0));
        assert!((Point::new(4.0, 5.0).distance_to_segment(degenerate) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn parallel_segments_do_not_intersect() {
        let a = Segment::new(Point::new(0.0, 0.0), Point::new(0.0, 10.0));
        let b = Segment::new(Point::new(1.0, 0.0), Point::new(1.0, 10.0));
        assert!(a.intersection(&b).is_none());
    }

    #[test]
    fn segment_inside_rect_has_no_exit() {
        let band = Rect::vertical_band(8.0, 700.0);
        let seg = Segment::new(Point::vertical(100.0), Point::vertical(300.0));
        assert!(band.intersections(&seg).is_empty());
        assert!(band.exit_point(&seg).is_none());
    }

    #[test]
    fn segment_leaving_band_exits_at_the_crossed_edge() {
        let band = Rect::vertical_band(8.0, 700.0);
        let down = Segment::new(Point::vertical(650.0), Point::vertical(900.0));
        let exit = band.exit_point(&down).expect("should exit at the bottom");
        assert!((exit.y - 700.0).abs() < 1e-9);
        assert!(exit.x.abs() < 1e-9);

        let up = Segment::new(Point::vertical(40.0), Point::vertical(-120.0));
        let (_, exit) = band.intersections(&up)[0];
        assert!((exit.y - 8.0).abs() < 1e-9);
    }

    #[test]
    fn exit_ignores_a_start_point_resting_on_the_edge() {
        let band = Rect::vertical_band(0.0, 100.0);
        // Starts on the bottom edge, travels all the way past the top edge.
        let seg = Segment::new(Point::vertical(100.0), Point::vertical(-50.0));
        assert_eq!(band.intersections(&seg).len(), 2);
        let exit = band.exit_point(&seg).unwrap();
        assert!(exit.y.abs() < 1e-9);
    }
}
