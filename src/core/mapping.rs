//! Bidirectional mapping between content-offset space and indicator-track
//! space.
//!
//! Inside the bounds both directions are the same linear rescale, so they
//! invert each other.  Outside, the indicator-driven direction stretches the
//! overshoot with a rubber band before rescaling, and the content-driven
//! direction can compress the rescaled overshoot so the thumb never runs far
//! off its track while the content bounces.

use super::geometry::{interval, Rect};
use super::host::{HostMetrics, Insets};
use super::rubber_band::{RubberBand, RubberBandConfig};

/// Closed range `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn length(&self) -> f64 {
        self.max - self.min
    }

    /// Empty or inverted ranges cannot be mapped onto.
    pub fn is_degenerate(&self) -> bool {
        !(self.length() > 0.0)
    }

    /// Inclusive on both ends.
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    pub fn clamp(&self, value: f64) -> f64 {
        interval(self.min, value, self.max)
    }

    /// Distance past the nearest bound, zero inside.
    pub fn overscroll(&self, value: f64) -> f64 {
        (value - self.clamp(value)).abs()
    }

    /// Fraction of the way from `min` to `max`; unbounded outside.
    pub fn progress(&self, value: f64) -> f64 {
        (value - self.min) / self.length()
    }

    pub fn lerp(&self, progress: f64) -> f64 {
        self.min + progress * self.length()
    }
}

/// Valid scroll offsets of the host.
pub fn content_bounds(metrics: &HostMetrics) -> Bounds {
    let min = -metrics.content_inset.top - metrics.safe_area.top;
    let max = metrics.content_height - metrics.viewport_height + metrics.safe_area.bottom + metrics.content_inset.bottom;
    Bounds::new(min, max)
}

/// Where the thumb sits on the track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackLayout {
    pub track_height: f64,
    pub thumb_height: f64,
    pub insets: Insets,
}

impl TrackLayout {
    pub fn indicator_bounds(&self) -> Bounds {
        Bounds::new(
            self.insets.top,
            self.track_height - self.thumb_height - self.insets.bottom,
        )
    }
}

/// Mapping for one geometry snapshot.  Build a fresh one whenever the host
/// or track geometry may have changed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffsetMapping {
    pub indicator: Bounds,
    pub content: Bounds,
    /// Band applied to indicator overshoot while dragging.
    drag_band: RubberBand,
    /// Band applied to thumb overshoot while the content overscrolls.
    content_band: RubberBand,
}

impl OffsetMapping {
    /// `None` when either range is empty; the bar has nothing to show then.
    pub fn new(track: &TrackLayout, metrics: &HostMetrics, rubber_band: &RubberBandConfig) -> Option<Self> {
        let indicator = track.indicator_bounds();
        let content = content_bounds(metrics);
        if indicator.is_degenerate() || content.is_degenerate() {
            return None;
        }
        let ratio = indicator.length() / content.length();

        // The drag band works in track units; its limit is one viewport
        // expressed in track units, so a hard pull overscrolls the content by
        // at most a screenful.
        let drag_band = RubberBand {
            coeff: rubber_band.scaled_coefficient(ratio),
            dim: metrics.viewport_height * ratio,
        };
        let content_band = RubberBand {
            coeff: rubber_band.scaled_coefficient(1.0 / ratio),
            dim: track.thumb_height,
        };

        Some(Self {
            indicator,
            content,
            drag_band,
            content_band,
        })
    }

    /// Content offset for a thumb position.
    pub fn content_offset(&self, indicator_offset: f64) -> f64 {
        let i = &self.indicator;
        let adjusted = if i.contains(indicator_offset) {
            indicator_offset
        } else {
            self.drag_band.clamp(indicator_offset, i.min, i.max)
        };
        self.content.lerp(i.progress(adjusted))
    }

    /// Thumb position for a content offset.
    ///
    /// With `adjust_for_overscroll` the thumb's overshoot past its track is
    /// compressed; without it the rescale stays linear, which is what keeps
    /// it consistent with [`OffsetMapping::content_offset`] mid-drag.
    pub fn indicator_offset(&self, content_offset: f64, adjust_for_overscroll: bool) -> f64 {
        let i = &self.indicator;
        let linear = i.lerp(self.content.progress(content_offset));
        if adjust_for_overscroll && !self.content.contains(content_offset) {
            self.content_band.clamp(linear, i.min, i.max)
        } else {
            linear
        }
    }

    /// Content-to-indicator length ratio, kept within `[min, max]`.
    pub fn velocity_multiplier(&self, min: f64, max: f64) -> f64 {
        interval(min, self.content.length() / self.indicator.length(), max)
    }

    /// The indicator's valid band as a rectangle for trajectory clipping.
    pub fn indicator_band(&self) -> Rect {
        Rect::vertical_band(self.indicator.min, self.indicator.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics() -> HostMetrics {
        HostMetrics {
            content_height: 2000.0,
            viewport_height: 500.0,
            content_inset: Insets::vertical(16.0, 0.0),
            safe_area: Insets::ZERO,
        }
    }

    fn track() -> TrackLayout {
        TrackLayout {
            track_height: 500.0,
            thumb_height: 34.0,
            insets: Insets::vertical(8.0, 8.0),
        }
    }

    fn mapping() -> OffsetMapping {
        OffsetMapping::new(&track(), &metrics(), &RubberBandConfig::default()).unwrap()
    }

    #[test]
    fn bounds_include_insets() {
        let m = mapping();
        assert_eq!(m.content, Bounds::new(-16.0, 1500.0));
        assert_eq!(m.indicator, Bounds::new(8.0, 458.0));

        let with_safe_area = HostMetrics {
            safe_area: Insets::vertical(20.0, 34.0),
            ..metrics()
        };
        assert_eq!(content_bounds(&with_safe_area), Bounds::new(-36.0, 1534.0));
    }

    #[test]
    fn ends_map_to_ends() {
        let m = mapping();
        assert_eq!(m.content_offset(8.0), -16.0);
        assert!((m.content_offset(458.0) - 1500.0).abs() < 1e-9);
        assert_eq!(m.indicator_offset(-16.0, true), 8.0);
        assert!((m.indicator_offset(1500.0, true) - 458.0).abs() < 1e-9);
    }

    #[test]
    fn round_trips_inside_bounds() {
        let m = mapping();
        for i in 1..100 {
            let content = -16.0 + 1516.0 * i as f64 / 100.0;
            let back = m.content_offset(m.indicator_offset(content, false));
            assert!((back - content).abs() < 1e-9, "content {content} back {back}");
        }
    }

    #[test]
    fn drag_past_track_overscrolls_content_elastically() {
        let m = mapping();
        let mut previous = m.content_offset(458.0);
        for step in 1..50 {
            let content = m.content_offset(458.0 + step as f64 * 20.0);
            assert!(content > previous);
            assert!(content < 1500.0 + 500.0);
            previous = content;
        }
        let above = m.content_offset(-400.0);
        assert!(above < -16.0 && above > -16.0 - 500.0);
    }

    #[test]
    fn content_overscroll_keeps_thumb_near_its_track() {
        let m = mapping();
        let linear = m.indicator_offset(3000.0, false);
        let adjusted = m.indicator_offset(3000.0, true);
        assert!(linear > 458.0 + 34.0);
        assert!(adjusted > 458.0 && adjusted < 458.0 + 34.0);

        let adjusted = m.indicator_offset(-600.0, true);
        assert!(adjusted < 8.0 && adjusted > 8.0 - 34.0);
    }

    #[test]
    fn degenerate_geometry_has_no_mapping() {
        let short = HostMetrics {
            content_height: 300.0,
            content_inset: Insets::ZERO,
            ..metrics()
        };
        assert!(OffsetMapping::new(&track(), &short, &RubberBandConfig::default()).is_none());

        let cramped = TrackLayout {
            track_height: 40.0,
            ..track()
        };
        assert!(OffsetMapping::new(&cramped, &metrics(), &RubberBandConfig::default()).is_none());
    }

    #[test]
    fn velocity_multiplier_is_clamped() {
        let m = mapping();
        assert!((m.velocity_multiplier(1.0, 30.0) - 1516.0 / 450.0).abs() < 1e-12);
        assert_eq!(m.velocity_multiplier(1.0, 2.0), 2.0);
    }
}
