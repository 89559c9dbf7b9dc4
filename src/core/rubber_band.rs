//! Rubber-band compression for positions past a bound.
//!
//! Near the bound the overshoot grows with slope `coeff`; far past it the
//! overshoot approaches `dim` but never reaches it.

use super::geometry::interval;

/// Compress an overshoot distance `x ≥ 0`.
pub fn rubber_band_clamp(x: f64, coeff: f64, dim: f64) -> f64 {
    (1.0 - 1.0 / (x * coeff / dim + 1.0)) * dim
}

/// Clamp `x` into `[min, max]`, letting the part outside stretch elastically.
pub fn rubber_band_clamp_to(x: f64, coeff: f64, dim: f64, min: f64, max: f64) -> f64 {
    let clamped = interval(min, x, max);
    let overshoot = (x - clamped).abs();
    let sign = if clamped > x { -1.0 } else { 1.0 };
    clamped + sign * rubber_band_clamp(overshoot, coeff, dim)
}

/// Coefficient limits for elastic overscroll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RubberBandConfig {
    pub coefficient: f64,
    /// Floor for the track-ratio-scaled coefficient.
    pub min_coefficient: f64,
}

impl RubberBandConfig {
    pub const DEFAULT_COEFFICIENT: f64 = 0.55;
    pub const MIN_COEFFICIENT: f64 = 0.1;

    /// Coefficient scaled by a track-length ratio and kept within
    /// `[min_coefficient, coefficient]`.
    ///
    /// The ratio is `source track / destination track`: an overshoot measured
    /// on a short track and replayed on a long one would otherwise be
    /// amplified by the same factor.
    pub fn scaled_coefficient(&self, ratio: f64) -> f64 {
        if !ratio.is_finite() {
            return self.min_coefficient;
        }
        interval(self.min_coefficient, self.coefficient * ratio, self.coefficient)
    }
}

impl Default for RubberBandConfig {
    fn default() -> Self {
        Self {
            coefficient: Self::DEFAULT_COEFFICIENT,
            min_coefficient: Self::MIN_COEFFICIENT,
        }
    }
}

/// A concrete band: coefficient plus the asymptotic overshoot limit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RubberBand {
    pub coeff: f64,
    pub dim: f64,
}

impl RubberBand {
    pub fn clamp(&self, x: f64, min: f64, max: f64) -> f64 {
        if self.dim <= 0.0 {
            return interval(min, x, max);
        }
        rubber_band_clamp_to(x, self.coeff, self.dim, min, max)
    }
}
