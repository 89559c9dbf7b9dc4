//! One-dimensional velocity estimate for mouse drags.
//!
//! Terminals report motion at irregular intervals and only in whole cells,
//! so the estimate is the average slope over a short trailing window rather
//! than the last delta.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Samples older than this are ignored.
pub const WINDOW: Duration = Duration::from_millis(100);

#[derive(Debug, Default)]
pub struct VelocityTracker {
    samples: VecDeque<(Instant, f64)>,
}

impl VelocityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, at: Instant, position: f64) {
        self.samples.push_back((at, position));
        self.prune(at);
    }

    /// Points per second over the window ending at `now`.  Zero when the
    /// pointer has been still for the whole window.
    pub fn velocity(&self, now: Instant) -> f64 {
        let mut recent = self
            .samples
            .iter()
            .filter(|(at, _)| now.saturating_duration_since(*at) <= WINDOW);
        let Some(&(first_at, first)) = recent.next() else {
            return 0.0;
        };
        let Some(&(last_at, last)) = recent.last() else {
            return 0.0;
        };
        let dt = last_at.saturating_duration_since(first_at).as_secs_f64();
        if dt <= 0.0 {
            return 0.0;
        }
        (last - first) / dt
    }

    fn prune(&mut self, now: Instant) {
        while let Some(&(at, _)) = self.samples.front() {
            if now.saturating_duration_since(at) > WINDOW {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }
}
