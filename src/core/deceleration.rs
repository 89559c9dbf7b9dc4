//! Exponential-decay fling curve.
//!
//! Velocity decays by `rate` every millisecond, so with `k = 1000·ln(rate)`:
//!
//! ```text
//! velocity(t) = v0 · rate^(1000t)
//! value(t)    = x0 + (rate^(1000t) − 1) / k · v0
//! destination = x0 − v0 / k
//! ```
//!
//! Times are in seconds; positions in points; velocities in points/second.

use super::geometry::{Point, Segment};
use super::TimingParameters;

/// Per-millisecond decay rate that matches a native scroll view fling.
pub const NORMAL_DECELERATION_RATE: f64 = 0.998;
/// A snappier curve that stops sooner.
pub const FAST_DECELERATION_RATE: f64 = 0.99;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecelerationTimingParameters {
    pub initial_value: Point,
    pub initial_velocity: Point,
    /// In `(0, 1)`.
    pub deceleration_rate: f64,
    /// The curve counts as finished once it is closer than this to `destination`.
    pub threshold: f64,
}

impl DecelerationTimingParameters {
    pub fn new(initial_value: Point, initial_velocity: Point, deceleration_rate: f64, threshold: f64) -> Self {
        Self {
            initial_value,
            initial_velocity,
            deceleration_rate,
            threshold,
        }
    }

    fn coefficient(&self) -> f64 {
        1000.0 * self.deceleration_rate.ln()
    }

    fn decay(&self, time: f64) -> f64 {
        self.deceleration_rate.powf(1000.0 * time)
    }

    /// Asymptotic resting point.
    pub fn destination(&self) -> Point {
        self.initial_value - self.initial_velocity / self.coefficient()
    }

    pub fn velocity(&self, time: f64) -> Point {
        self.initial_velocity * self.decay(time)
    }

    /// Time at which the curve passes `point`.
    ///
    /// `None` unless `point` lies within `threshold` of the segment from the
    /// initial value to the destination.
    pub fn time_to_reach(&self, point: Point) -> Option<f64> {
        let speed = self.initial_velocity.length();
        if speed == 0.0 {
            return (point.distance(self.initial_value) < self.threshold).then_some(0.0);
        }
        let path = Segment::new(self.initial_value, self.destination());
        if point.distance_to_segment(path) >= self.threshold {
            return None;
        }
        let k = self.coefficient();
        let remaining = 1.0 + k * (point - self.initial_value).length() / speed;
        if remaining <= 0.0 {
            // Within threshold of the destination itself; the curve only gets
            // there asymptotically, so report the natural end instead.
            return Some(self.duration());
        }
        Some((remaining.ln() / k).max(0.0))
    }
}

impl TimingParameters for DecelerationTimingParameters {
    /// Time until the remaining distance to `destination` drops under `threshold`.
    fn duration(&self) -> f64 {
        let speed = self.initial_velocity.length();
        if speed == 0.0 {
            return 0.0;
        }
        let k = self.coefficient();
        ((-k * self.threshold / speed).ln() / k).max(0.0)
    }

    fn value(&self, time: f64) -> Point {
        self.initial_value + self.initial_velocity * ((self.decay(time) - 1.0) / self.coefficient())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLD: f64 = 0.25;

    fn fling(v: f64) -> DecelerationTimingParameters {
        DecelerationTimingParameters::new(
            Point::vertical(100.0),
            Point::vertical(v),
            NORMAL_DECELERATION_RATE,
            THRESHOLD,
        )
    }

    #[test]
    fn moves_monotonically_towards_destination_without_overshoot() {
        for v in [150.0, -900.0, 4000.0] {
            let p = fling(v);
            let dest = p.destination().y;
            let duration = p.duration();
            let mut prev = p.value(0.0).y;
            for i in 1..=200 {
                let y = p.value(duration * i as f64 / 200.0).y;
                if v > 0.0 {
                    assert!(y >= prev && y <= dest, "v={v} y={y} prev={prev} dest={dest}");
                } else {
                    assert!(y <= prev && y >= dest, "v={v} y={y} prev={prev} dest={dest}");
                }
                prev = y;
            }
        }
    }

    #[test]
    fn duration_stops_one_threshold_short_of_destination() {
        for v in [150.0, -2500.0] {
            let p = fling(v);
            let gap = (p.value(p.duration()) - p.destination()).length();
            assert!((gap - THRESHOLD).abs() < 1e-9, "gap {gap}");
        }
    }

    #[test]
    fn velocity_decays_from_initial() {
        let p = fling(800.0);
        assert_eq!(p.velocity(0.0), Point::vertical(800.0));
        let expected = 800.0 * NORMAL_DECELERATION_RATE.powf(250.0);
        assert!((p.velocity(0.25).y - expected).abs() < 1e-9);
        assert!(p.velocity(60.0).y.abs() < 1e-9);
    }

    #[test]
    fn zero_velocity_resolves_immediately() {
        let p = fling(0.0);
        assert_eq!(p.duration(), 0.0);
        assert_eq!(p.destination(), p.initial_value);
        assert_eq!(p.value(p.duration()), p.initial_value);
    }

    #[test]
    fn time_to_reach_inverts_value() {
        let p = fling(1200.0);
        let t = 0.3;
        let point = p.value(t);
        let solved = p.time_to_reach(point).expect("point is on the path");
        assert!((solved - t).abs() < 1e-9);
    }

    #[test]
    fn time_to_reach_rejects_points_off_the_path() {
        let p = fling(1200.0);
        assert!(p.time_to_reach(Point::new(5.0, 200.0)).is_none());
        // Behind the start.
        assert!(p.time_to_reach(Point::vertical(50.0)).is_none());
        // Beyond the destination.
        assert!(p.time_to_reach(p.destination() + Point::vertical(10.0)).is_none());
    }

    #[test]
    fn fast_rate_travels_less() {
        let normal = fling(1000.0);
        let fast = DecelerationTimingParameters {
            deceleration_rate: FAST_DECELERATION_RATE,
            ..normal
        };
        assert!(fast.destination().y < normal.destination().y);
        assert!(fast.duration() < normal.duration());
    }
}
