//! Core engine: motion models, offset mapping and the scroll-bar state machine.
//!
//! Nothing in this module depends on any TUI or rendering crate.
//! Everything is single-threaded and advanced by an external [`FrameClock`].

pub mod config;
pub mod deceleration;
pub mod frame_clock;
pub mod geometry;
pub mod host;
pub mod mapping;
pub mod rubber_band;
pub mod scroll_bar;
pub mod spring;

pub use config::{ConfigError, ScrollBarConfig, TimingConfig};
pub use frame_clock::FrameClock;
pub use host::{HostMetrics, Insets, ScrollBarDelegate, ScrollHost};
pub use scroll_bar::{Gesture, GestureSource, ScrollBar, ScrollBarEvent, ScrollBarSnapshot, TextTransition};

use geometry::Point;

/// A motion curve sampled by elapsed time in seconds.
pub trait TimingParameters {
    /// Seconds until the motion is indistinguishable from rest.
    fn duration(&self) -> f64;
    fn value(&self, time: f64) -> Point;
}
