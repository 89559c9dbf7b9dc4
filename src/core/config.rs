//! Engine configuration, one plain struct per concern, validated once when a
//! [`ScrollBar`](super::ScrollBar) is built and immutable afterwards.
//!
//! Lengths are in points.  Presets mirror the three looks the demo can cycle
//! through: a chunky draggable handle, a thin native-style line, and a thin
//! line that grows into the chunky handle while dragged.

use std::time::Duration;

use thiserror::Error;

use super::deceleration::{FAST_DECELERATION_RATE, NORMAL_DECELERATION_RATE};
use super::host::Insets;
use super::rubber_band::RubberBandConfig;
use super::spring::Spring;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("deceleration rate must lie in (0, 1), got {0}")]
    DecelerationRate(f64),
    #[error("stop threshold must be positive, got {0}")]
    StopThreshold(f64),
    #[error("spring {field} must be positive, got {value}")]
    Spring { field: &'static str, value: f64 },
    #[error("spring damping ratio must be positive, got {0}")]
    DampingRatio(f64),
    #[error("rubber-band coefficient must be positive, got {0}")]
    RubberBandCoefficient(f64),
    #[error("minimum rubber-band coefficient {min} exceeds the default {default}")]
    RubberBandRange { min: f64, default: f64 },
    #[error("hide timeout must be positive")]
    HideTimeout,
    #[error("indicator {field} must be positive, got {value}")]
    IndicatorSize { field: &'static str, value: f64 },
}

// ───────────────────────────────────────── indicator ─────────

/// Geometry of the thumb in one appearance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateConfig {
    pub width: f64,
    /// Thumb length along the track.
    pub height: f64,
    /// Track insets; only `top` and `bottom` affect the mapping.
    pub insets: Insets,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            width: 34.0,
            height: 34.0,
            insets: Insets::new(8.0, 0.0, 8.0, 0.0),
        }
    }
}

impl StateConfig {
    /// Thin line in the style of a native scroll indicator.
    pub fn native(width: f64) -> Self {
        Self {
            width,
            height: 100.0,
            insets: Insets::new(4.0, 0.0, 4.0, 2.0),
        }
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            width: self.width * factor,
            height: self.height * factor,
            insets: self.insets,
        }
    }
}

/// Styling for text drawn inside the thumb.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextConfig {
    pub insets: Insets,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            insets: Insets::new(0.0, 8.0, 0.0, 8.0),
        }
    }
}

/// How the thumb looks while a gesture is active.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActiveState {
    Unchanged,
    Scaled(f64),
    Custom { state: StateConfig, text: Option<TextConfig> },
}

/// Appearance chosen for one gesture session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedAppearance {
    pub state: StateConfig,
    pub text: Option<TextConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorConfig {
    pub normal: StateConfig,
    pub active: ActiveState,
    /// Add the host's safe-area insets to the track insets.
    pub insets_follow_safe_area: bool,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            normal: StateConfig::default(),
            active: ActiveState::Unchanged,
            insets_follow_safe_area: true,
        }
    }
}

impl IndicatorConfig {
    pub fn normal_appearance(&self) -> ResolvedAppearance {
        ResolvedAppearance {
            state: self.normal,
            text: None,
        }
    }

    pub fn active_appearance(&self) -> ResolvedAppearance {
        match self.active {
            ActiveState::Unchanged => self.normal_appearance(),
            ActiveState::Scaled(factor) => ResolvedAppearance {
                state: self.normal.scaled(factor),
                text: None,
            },
            ActiveState::Custom { state, text } => ResolvedAppearance { state, text },
        }
    }
}

// ───────────────────────────────────────── timing ────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingConfig {
    pub deceleration_rate: f64,
    /// Distance under which a motion counts as settled; half a device pixel.
    pub stop_threshold: f64,
    /// Release speeds above this (exclusive) fling; at or below they snap.
    pub significant_velocity: f64,
    pub max_bounce_velocity: f64,
    pub min_velocity_multiplier: f64,
    pub max_velocity_multiplier: f64,
    pub bounce_spring: Spring,
    /// Extra stiffness per viewport-height of overscroll on release.
    pub overscroll_stiffness_gain: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            deceleration_rate: NORMAL_DECELERATION_RATE,
            stop_threshold: Self::threshold_for_scale(1.0),
            significant_velocity: 100.0,
            max_bounce_velocity: 7000.0,
            min_velocity_multiplier: 1.0,
            max_velocity_multiplier: 30.0,
            bounce_spring: Spring::default(),
            overscroll_stiffness_gain: 400.0,
        }
    }
}

impl TimingConfig {
    pub fn fast() -> Self {
        Self {
            deceleration_rate: FAST_DECELERATION_RATE,
            ..Self::default()
        }
    }

    /// Half a device pixel at `pixels_per_point`.
    pub fn threshold_for_scale(pixels_per_point: f64) -> f64 {
        0.5 / pixels_per_point.max(f64::MIN_POSITIVE)
    }
}

// ───────────────────────────────────────── scroll bar ────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollBarConfig {
    pub indicator: IndicatorConfig,
    pub timing: TimingConfig,
    pub rubber_band: RubberBandConfig,
    pub always_visible: bool,
    pub hide_after: Duration,
    pub decelerates: bool,
}

impl Default for ScrollBarConfig {
    fn default() -> Self {
        Self {
            indicator: IndicatorConfig::default(),
            timing: TimingConfig::default(),
            rubber_band: RubberBandConfig::default(),
            always_visible: false,
            hide_after: Duration::from_secs(2),
            decelerates: true,
        }
    }
}

impl ScrollBarConfig {
    /// Thin native-style line that widens while dragged.
    pub fn ios_style() -> Self {
        Self {
            indicator: IndicatorConfig {
                normal: StateConfig::native(3.0),
                active: ActiveState::Custom {
                    state: StateConfig::native(8.0),
                    text: None,
                },
                ..IndicatorConfig::default()
            },
            ..Self::default()
        }
    }

    /// Thin line at rest, full handle with a label while dragged.
    pub fn combined() -> Self {
        Self {
            indicator: IndicatorConfig {
                normal: StateConfig::native(3.0),
                active: ActiveState::Custom {
                    state: StateConfig::default(),
                    text: Some(TextConfig::default()),
                },
                ..IndicatorConfig::default()
            },
            ..Self::default()
        }
    }

    /// Handle that swells while held.
    pub fn growing() -> Self {
        Self {
            indicator: IndicatorConfig {
                normal: StateConfig {
                    width: 35.0,
                    height: 35.0,
                    ..StateConfig::default()
                },
                active: ActiveState::Scaled(50.0 / 35.0),
                ..IndicatorConfig::default()
            },
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.timing;
        if !(t.deceleration_rate > 0.0 && t.deceleration_rate < 1.0) {
            return Err(ConfigError::DecelerationRate(t.deceleration_rate));
        }
        if !(t.stop_threshold > 0.0) {
            return Err(ConfigError::StopThreshold(t.stop_threshold));
        }
        if !(t.bounce_spring.mass > 0.0) {
            return Err(ConfigError::Spring {
                field: "mass",
                value: t.bounce_spring.mass,
            });
        }
        if !(t.bounce_spring.stiffness > 0.0) {
            return Err(ConfigError::Spring {
                field: "stiffness",
                value: t.bounce_spring.stiffness,
            });
        }
        // An undamped spring never settles.
        if !(t.bounce_spring.damping_ratio > 0.0) {
            return Err(ConfigError::DampingRatio(t.bounce_spring.damping_ratio));
        }

        let rb = &self.rubber_band;
        if !(rb.coefficient > 0.0) {
            return Err(ConfigError::RubberBandCoefficient(rb.coefficient));
        }
        if !(rb.min_coefficient > 0.0) {
            return Err(ConfigError::RubberBandCoefficient(rb.min_coefficient));
        }
        if rb.min_coefficient > rb.coefficient {
            return Err(ConfigError::RubberBandRange {
                min: rb.min_coefficient,
                default: rb.coefficient,
            });
        }

        if self.hide_after.is_zero() {
            return Err(ConfigError::HideTimeout);
        }

        check_state(&self.indicator.normal)?;
        match self.indicator.active {
            ActiveState::Unchanged => {}
            ActiveState::Scaled(factor) => check_state(&self.indicator.normal.scaled(factor))?,
            ActiveState::Custom { state, .. } => check_state(&state)?,
        }
        Ok(())
    }
}

fn check_state(state: &StateConfig) -> Result<(), ConfigError> {
    if !(state.height > 0.0) {
        return Err(ConfigError::IndicatorSize {
            field: "height",
            value: state.height,
        });
    }
    if !(state.width > 0.0) {
        return Err(ConfigError::IndicatorSize {
            field: "width",
            value: state.width,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        for config in [ScrollBarConfig::default(), ScrollBarConfig::ios_style(), ScrollBarConfig::combined()] {
            assert_eq!(config.validate(), Ok(()));
        }
    }

    #[test]
    fn rejects_out_of_range_deceleration_rate() {
        for rate in [0.0, 1.0, 1.5, -0.2, f64::NAN] {
            let mut config = ScrollBarConfig::default();
            config.timing.deceleration_rate = rate;
            assert!(matches!(config.validate(), Err(ConfigError::DecelerationRate(_))), "rate {rate}");
        }
    }

    #[test]
    fn rejects_bad_spring_and_threshold() {
        let mut config = ScrollBarConfig::default();
        config.timing.bounce_spring.stiffness = 0.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::Spring {
                field: "stiffness",
                value: 0.0
            })
        );

        let mut config = ScrollBarConfig::default();
        config.timing.stop_threshold = 0.0;
        assert_eq!(config.validate(), Err(ConfigError::StopThreshold(0.0)));

        let mut config = ScrollBarConfig::default();
        config.timing.bounce_spring.damping_ratio = -1.0;
        assert_eq!(config.validate(), Err(ConfigError::DampingRatio(-1.0)));
    }

    #[test]
    fn rejects_undamped_spring() {
        let mut config = ScrollBarConfig::default();
        config.timing.bounce_spring.damping_ratio = 0.0;
        assert_eq!(config.validate(), Err(ConfigError::DampingRatio(0.0)));

        config.timing.bounce_spring.damping_ratio = 0.05;
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn rejects_inverted_rubber_band_range() {
        let mut config = ScrollBarConfig::default();
        config.rubber_band.min_coefficient = 0.8;
        assert!(matches!(config.validate(), Err(ConfigError::RubberBandRange { .. })));
    }

    #[test]
    fn rejects_zero_hide_timeout_and_collapsed_thumb() {
        let mut config = ScrollBarConfig::default();
        config.hide_after = Duration::ZERO;
        assert_eq!(config.validate(), Err(ConfigError::HideTimeout));

        let mut config = ScrollBarConfig::default();
        config.indicator.active = ActiveState::Scaled(0.0);
        assert!(matches!(config.validate(), Err(ConfigError::IndicatorSize { .. })));
    }

    #[test]
    fn active_appearance_resolves_each_variant() {
        let mut indicator = IndicatorConfig::default();
        assert_eq!(indicator.active_appearance(), indicator.normal_appearance());

        indicator.active = ActiveState::Scaled(1.5);
        let scaled = indicator.active_appearance();
        assert_eq!(scaled.state.height, 51.0);
        assert_eq!(scaled.state.insets, indicator.normal.insets);
        assert!(scaled.text.is_none());

        let combined = ScrollBarConfig::combined().indicator.active_appearance();
        assert_eq!(combined.state, StateConfig::default());
        assert!(combined.text.is_some());

        let growing = ScrollBarConfig::growing().indicator.active_appearance();
        assert!((growing.state.height - 50.0).abs() < 1e-9);
        assert!(ScrollBarConfig::growing().validate().is_ok());
    }

    #[test]
    fn threshold_is_half_a_device_pixel() {
        assert_eq!(TimingConfig::threshold_for_scale(1.0), 0.5);
        assert_eq!(TimingConfig::threshold_for_scale(2.0), 0.25);
        assert_eq!(TimingConfig::fast().deceleration_rate, FAST_DECELERATION_RATE);
    }
}
