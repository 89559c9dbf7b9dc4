//! The scroll-bar interaction engine.
//!
//! A [`ScrollBar`] sits next to a [`ScrollHost`], mirrors its content offset
//! onto a thumb position, and drives the host's offset back when the thumb is
//! dragged.  On release it decides between a deceleration, a spring bounce
//! back into bounds, or an immediate snap:
//!
//! | release speed      | offset in bounds | offset out of bounds      |
//! |--------------------|------------------|---------------------------|
//! | above threshold    | decelerate       | bounce, release velocity  |
//! | at or below        | snap             | bounce, zero velocity     |
//!
//! A deceleration runs in track space and is clipped where it would leave the
//! track; from there a bounce takes over with the velocity at the exit.
//! At most one motion is alive at a time.
//!
//! Side effects the host has to present (haptics, show/hide, text changes)
//! are queued as [`ScrollBarEvent`]s and collected with
//! [`ScrollBar::drain_events`]; the drawable state is in
//! [`ScrollBar::snapshot`].

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};
use std::time::Duration;

use tracing::{debug, trace};

use super::config::{ConfigError, ResolvedAppearance, ScrollBarConfig, StateConfig};
use super::deceleration::DecelerationTimingParameters;
use super::frame_clock::{FrameClock, TimerAnimation};
use super::geometry::{interval, Point, Segment};
use super::host::{HostMetrics, ScrollBarDelegate, ScrollHost};
use super::mapping::{Bounds, OffsetMapping, TrackLayout};
use super::spring::{Spring, SpringTimingParameters};
use super::TimingParameters;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Dragging,
    Decelerating,
    Bouncing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureSource {
    Pan,
    LongPress,
}

/// Input from the host's gesture recognition, in points and points/second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Began { source: GestureSource },
    /// `translation` is measured from where the pan began.
    Changed { translation: f64, velocity: f64 },
    Ended { velocity: f64 },
    /// Handled as a release with zero velocity.
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionKind {
    Deceleration,
    Bounce,
}

/// Direction the info text should slide in from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextTransition {
    None,
    /// The offset grew since the previous text.
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScrollBarEvent {
    Haptic,
    Shown,
    Hidden,
    InfoShown,
    InfoHidden,
    InfoTextChanged { text: String, transition: TextTransition },
    PhaseChanged(Phase),
    MotionEnded { kind: MotionKind, finished: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub struct InfoBubble {
    pub text: String,
    pub transition: TextTransition,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollBarSnapshot {
    /// `false` while the geometry cannot be mapped (content fits the viewport).
    pub enabled: bool,
    pub visible: bool,
    pub phase: Phase,
    pub track_height: f64,
    pub indicator_offset: f64,
    pub thumb: StateConfig,
    /// The active appearance is applied.
    pub active: bool,
    pub info: Option<InfoBubble>,
    pub indicator_label: Option<String>,
}

impl ScrollBarSnapshot {
    /// Whether a press at track position `y` lands on the thumb.
    pub fn thumb_contains(&self, y: f64) -> bool {
        self.enabled && self.visible && (self.indicator_offset..=self.indicator_offset + self.thumb.height).contains(&y)
    }
}

// ───────────────────────────────────────── engine ────────────

/// Handle to the engine.  Owned by whoever composes it with the host; the
/// engine itself only keeps weak references to the host and the delegate.
pub struct ScrollBar {
    inner: Rc<RefCell<Inner>>,
}

impl ScrollBar {
    pub fn new<H: ScrollHost + 'static>(
        config: ScrollBarConfig,
        clock: &FrameClock,
        host: &Rc<RefCell<H>>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let host: Rc<RefCell<dyn ScrollHost>> = host.clone();
        let host = Rc::downgrade(&host);
        let inner = Rc::new_cyclic(|this| {
            RefCell::new(Inner {
                this: this.clone(),
                appearance: config.indicator.normal_appearance(),
                config,
                clock: clock.clone(),
                host,
                delegate: None,
                track_height: 0.0,
                active: false,
                indicator_offset: 0.0,
                phase: Phase::Idle,
                motion: None,
                motion_generation: 0,
                retired: Vec::new(),
                hide_timer: None,
                drag_start: None,
                started_by_long_press: false,
                visible: false,
                info_visible: false,
                info_text: None,
                info_transition: TextTransition::None,
                indicator_label: None,
                last_observed: None,
                events: VecDeque::new(),
            })
        });
        Ok(Self { inner })
    }

    pub fn set_delegate<D: ScrollBarDelegate + 'static>(&self, delegate: &Rc<D>) {
        let delegate: Rc<dyn ScrollBarDelegate> = delegate.clone();
        self.inner.borrow_mut().delegate = Some(Rc::downgrade(&delegate));
    }

    #[cfg(test)]
    pub fn config(&self) -> ScrollBarConfig {
        self.inner.borrow().config
    }

    /// Set the track length and re-place the thumb.  Call on every layout
    /// pass; degenerate geometry hides the bar until a later pass fixes it.
    pub fn layout(&self, track_height: f64) {
        let mut inner = self.inner.borrow_mut();
        inner.track_height = track_height;
        match inner.geometry() {
            None => {
                inner.set_visible(false);
                inner.hide_info();
            }
            Some(g) => {
                inner.indicator_offset = g.mapping.indicator_offset(g.offset, inner.drag_start.is_none());
                inner.last_observed = Some(g.offset);
                if inner.config.always_visible {
                    inner.set_visible(true);
                }
            }
        }
    }

    pub fn handle_gesture(&self, gesture: Gesture) {
        match gesture {
            Gesture::Began { source } => self.begin(source),
            Gesture::Changed { translation, velocity } => self.inner.borrow_mut().drag_changed(translation, velocity),
            Gesture::Ended { velocity } => self.inner.borrow_mut().end(velocity),
            Gesture::Cancelled => self.inner.borrow_mut().end(0.0),
        }
        self.release_retired();
    }

    /// Report a content offset change the engine did not cause itself.
    pub fn content_offset_changed(&self, previous: Option<f64>, current: f64) {
        self.inner.borrow_mut().observe(previous, current);
        self.release_retired();
    }

    /// The host's own scroll gesture changed state; the user has grabbed the
    /// content directly.
    pub fn host_scroll_gesture_changed(&self) {
        self.cancel_motion();
        self.inner.borrow_mut().hide_info();
    }

    pub fn drain_events(&self) -> Vec<ScrollBarEvent> {
        self.inner.borrow_mut().events.drain(..).collect()
    }

    #[cfg(test)]
    pub fn phase(&self) -> Phase {
        self.inner.borrow().phase
    }

    /// A deceleration or bounce is running.
    pub fn is_animating(&self) -> bool {
        self.inner.borrow().motion.as_ref().is_some_and(TimerAnimation::is_running)
    }

    pub fn snapshot(&self) -> ScrollBarSnapshot {
        let inner = self.inner.borrow();
        let info = match (&inner.info_text, inner.info_visible) {
            (Some(text), true) => Some(InfoBubble {
                text: text.clone(),
                transition: inner.info_transition,
            }),
            _ => None,
        };
        ScrollBarSnapshot {
            enabled: inner.geometry().is_some(),
            visible: inner.visible,
            phase: inner.phase,
            track_height: inner.track_height,
            indicator_offset: inner.indicator_offset,
            thumb: inner.appearance.state,
            active: inner.active,
            info,
            indicator_label: inner.indicator_label.clone(),
        }
    }

    fn begin(&self, source: GestureSource) {
        if self.inner.borrow().geometry().is_none() {
            debug!(?source, "gesture ignored, nothing to scroll");
            return;
        }
        self.cancel_motion();
        self.inner.borrow_mut().begin(source);
    }

    /// Completion callbacks re-enter the engine, so the motion is taken out
    /// and cancelled with the state unborrowed.
    fn cancel_motion(&self) {
        let motion = self.inner.borrow_mut().motion.take();
        if let Some(motion) = motion {
            debug!("cancelling motion");
            motion.cancel();
        }
    }

    fn release_retired(&self) {
        let retired = std::mem::take(&mut self.inner.borrow_mut().retired);
        drop(retired);
    }
}

// ───────────────────────────────────────── state ─────────────

#[derive(Debug, Clone, Copy)]
struct Geometry {
    offset: f64,
    metrics: HostMetrics,
    mapping: OffsetMapping,
}

/// Which content bound a bounce settles on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    Min,
    Max,
}

impl Anchor {
    fn nearest(bounds: Bounds, value: f64) -> Self {
        if (value - bounds.max).abs() < (value - bounds.min).abs() {
            Anchor::Max
        } else {
            Anchor::Min
        }
    }

    fn pick(self, bounds: Bounds) -> f64 {
        match self {
            Anchor::Min => bounds.min,
            Anchor::Max => bounds.max,
        }
    }
}

/// Rest offset of a running bounce.  When the host's insets change between
/// frames the rest offset moves by the same amount as its anchoring bound.
#[derive(Debug, Clone, Copy)]
struct RestDrift {
    rest: f64,
    anchor: Anchor,
    bounds: Bounds,
}

impl RestDrift {
    fn follow(&mut self, bounds: Bounds) {
        self.rest += self.anchor.pick(bounds) - self.anchor.pick(self.bounds);
        self.bounds = bounds;
    }
}

struct Inner {
    this: Weak<RefCell<Inner>>,
    config: ScrollBarConfig,
    clock: FrameClock,
    host: Weak<RefCell<dyn ScrollHost>>,
    delegate: Option<Weak<dyn ScrollBarDelegate>>,
    track_height: f64,
    appearance: ResolvedAppearance,
    active: bool,
    indicator_offset: f64,
    phase: Phase,

    motion: Option<TimerAnimation>,
    /// Bumped for every motion; completions of superseded motions only report.
    motion_generation: u64,
    /// Running motions replaced while borrowed, cancelled once released.
    retired: Vec<TimerAnimation>,
    hide_timer: Option<TimerAnimation>,

    /// Thumb offset when the current pan began; `None` when not dragging.
    drag_start: Option<f64>,
    started_by_long_press: bool,

    visible: bool,
    info_visible: bool,
    info_text: Option<String>,
    info_transition: TextTransition,
    indicator_label: Option<String>,
    last_observed: Option<f64>,
    events: VecDeque<ScrollBarEvent>,
}

impl Inner {
    fn geometry(&self) -> Option<Geometry> {
        let host = self.host.upgrade()?;
        let (offset, metrics) = {
            let host = host.borrow();
            (host.content_offset(), host.metrics())
        };
        let mapping = OffsetMapping::new(&self.track_layout(&metrics), &metrics, &self.config.rubber_band)?;
        Some(Geometry {
            offset,
            metrics,
            mapping,
        })
    }

    fn track_layout(&self, metrics: &HostMetrics) -> TrackLayout {
        let state = self.appearance.state;
        let mut insets = state.insets;
        if self.config.indicator.insets_follow_safe_area {
            insets.top += metrics.safe_area.top;
            insets.bottom += metrics.safe_area.bottom;
        }
        TrackLayout {
            track_height: self.track_height,
            thumb_height: state.height,
            insets,
        }
    }

    fn delegate(&self) -> Option<Rc<dyn ScrollBarDelegate>> {
        self.delegate.as_ref().and_then(Weak::upgrade)
    }

    fn emit(&mut self, event: ScrollBarEvent) {
        self.events.push_back(event);
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            debug!(from = ?self.phase, to = ?phase, "phase");
            self.phase = phase;
            self.emit(ScrollBarEvent::PhaseChanged(phase));
        }
    }

    fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            self.emit(if visible { ScrollBarEvent::Shown } else { ScrollBarEvent::Hidden });
        }
    }

    fn show_info(&mut self) {
        if !self.info_visible {
            self.info_visible = true;
            self.emit(ScrollBarEvent::InfoShown);
        }
    }

    fn hide_info(&mut self) {
        if self.info_visible {
            self.info_visible = false;
            self.emit(ScrollBarEvent::InfoHidden);
        }
    }

    // ── offsets ──

    /// Push an offset to the host and run the observation path.  `false`
    /// when the host is gone.
    fn write_offset(&mut self, offset: f64) -> bool {
        let Some(host) = self.host.upgrade() else {
            return false;
        };
        let previous = host.borrow().content_offset();
        host.borrow_mut().set_content_offset(offset);
        self.observe(Some(previous), offset);
        true
    }

    fn observe(&mut self, previous: Option<f64>, current: f64) {
        if self.last_observed == Some(current) {
            return;
        }
        self.last_observed = Some(current);
        let Some(g) = self.geometry() else {
            self.set_visible(false);
            return;
        };
        self.set_visible(true);

        let dragging = self.drag_start.is_some();
        self.indicator_offset = g.mapping.indicator_offset(current, !dragging);
        if !dragging {
            self.restart_hide_timer();
            if self.info_visible {
                self.update_info(current, previous);
            }
        }
        self.refresh_label(current);
    }

    fn relayout(&mut self) {
        if let Some(g) = self.geometry() {
            self.indicator_offset = g.mapping.indicator_offset(g.offset, self.drag_start.is_none());
            self.refresh_label(g.offset);
        }
    }

    // ── text ──

    fn update_info(&mut self, content_offset: f64, previous: Option<f64>) {
        let text = self
            .delegate()
            .and_then(|d| d.info_text(content_offset, self.indicator_offset));
        let Some(text) = text else {
            self.hide_info();
            return;
        };
        self.show_info();
        if self.info_text.as_deref() == Some(text.as_str()) {
            return;
        }
        let transition = match previous {
            None => TextTransition::None,
            Some(previous) if content_offset > previous => TextTransition::Up,
            Some(_) => TextTransition::Down,
        };
        self.info_text = Some(text.clone());
        self.info_transition = transition;
        self.emit(ScrollBarEvent::InfoTextChanged { text, transition });
        self.emit(ScrollBarEvent::Haptic);
    }

    fn refresh_label(&mut self, content_offset: f64) {
        self.indicator_label = match self.appearance.text {
            Some(_) => self
                .delegate()
                .and_then(|d| d.indicator_label_text(content_offset, self.indicator_offset)),
            None => None,
        };
    }

    // ── appearance ──

    fn apply_active_appearance(&mut self) {
        self.active = true;
        self.appearance = self.config.indicator.active_appearance();
        self.relayout();
    }

    fn restore_normal_appearance(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        self.appearance = self.config.indicator.normal_appearance();
        self.relayout();
    }

    // ── hide timer ──

    fn restart_hide_timer(&mut self) {
        let this = self.this.clone();
        let timer = TimerAnimation::after(&self.clock, self.config.hide_after, move |finished| {
            if !finished {
                return;
            }
            if let Some(inner) = this.upgrade() {
                inner.borrow_mut().hide_timer_fired();
            }
        });
        // The replaced timer's cancellation does not touch this state.
        self.hide_timer = Some(timer);
    }

    fn hide_timer_fired(&mut self) {
        self.hide_timer = None;
        if !self.config.always_visible {
            self.set_visible(false);
        }
        self.hide_info();
    }

    // ── gestures ──

    fn begin(&mut self, source: GestureSource) {
        debug!(?source, "gesture began");
        self.hide_timer = None;
        self.set_visible(true);
        match source {
            GestureSource::LongPress => {
                self.started_by_long_press = true;
                self.emit(ScrollBarEvent::Haptic);
                self.apply_active_appearance();
            }
            GestureSource::Pan => {
                if self.started_by_long_press {
                    self.started_by_long_press = false;
                } else {
                    self.emit(ScrollBarEvent::Haptic);
                }
                self.apply_active_appearance();
                self.drag_start = Some(self.indicator_offset);
                self.set_phase(Phase::Dragging);
            }
        }
        if let Some(g) = self.geometry() {
            self.update_info(g.offset, None);
        }
    }

    fn drag_changed(&mut self, translation: f64, velocity: f64) {
        let Some(start) = self.drag_start else {
            return;
        };
        let Some(g) = self.geometry() else {
            return;
        };
        let target = g.mapping.content_offset(start + translation);
        trace!(translation, velocity, target, "drag");
        if self.write_offset(target) {
            self.update_info(target, Some(g.offset));
        }
    }

    fn end(&mut self, velocity: f64) {
        let dragged = self.drag_start.take().is_some();
        self.started_by_long_press = false;
        self.restart_hide_timer();
        if !dragged {
            // A long press released without moving.
            if self.motion.is_none() {
                self.restore_normal_appearance();
            }
            return;
        }

        let Some(g) = self.geometry() else {
            self.set_phase(Phase::Idle);
            self.restore_normal_appearance();
            return;
        };
        let significant = velocity.abs() > self.config.timing.significant_velocity;
        let in_bounds = g.mapping.content.contains(g.offset);
        debug!(velocity, offset = g.offset, significant, in_bounds, "drag ended");

        let moving = match (significant, in_bounds) {
            (true, true) if self.config.decelerates => self.decelerate(velocity, &g),
            (_, true) => {
                self.emit(ScrollBarEvent::Haptic);
                false
            }
            (true, false) => self.bounce_to_bounds(velocity, &g),
            (false, false) => self.bounce_to_bounds(0.0, &g),
        };
        if !moving {
            self.set_phase(Phase::Idle);
            self.restore_normal_appearance();
        }
    }

    // ── motion ──

    fn install_motion(&mut self, generation: u64, motion: TimerAnimation) {
        self.motion_generation = generation;
        if let Some(previous) = self.motion.replace(motion) {
            if previous.is_running() {
                self.retired.push(previous);
            }
        }
    }

    fn completion(&self, generation: u64, kind: MotionKind, exit_velocity: Option<f64>) -> impl FnOnce(bool) + 'static {
        let this = self.this.clone();
        move |finished| {
            if let Some(inner) = this.upgrade() {
                inner.borrow_mut().motion_ended(generation, kind, finished, exit_velocity);
            }
        }
    }

    fn motion_ended(&mut self, generation: u64, kind: MotionKind, finished: bool, exit_velocity: Option<f64>) {
        debug!(?kind, finished, "motion ended");
        self.emit(ScrollBarEvent::MotionEnded { kind, finished });
        if generation != self.motion_generation {
            return;
        }
        if finished {
            if let Some(velocity) = exit_velocity {
                if self.bounce(velocity, self.config.timing.bounce_spring) {
                    return;
                }
            }
        }
        self.motion = None;
        if self.drag_start.is_none() {
            self.set_phase(Phase::Idle);
            self.restore_normal_appearance();
        }
    }

    /// Fling the thumb with `velocity` in track space.
    fn decelerate(&mut self, velocity: f64, g: &Geometry) -> bool {
        let timing = self.config.timing;
        let start = Point::vertical(self.indicator_offset);
        let params = DecelerationTimingParameters::new(
            start,
            Point::vertical(velocity),
            timing.deceleration_rate,
            timing.stop_threshold,
        );
        let path = Segment::new(start, params.destination());
        let exit_time = g
            .mapping
            .indicator_band()
            .exit_point(&path)
            .and_then(|exit| params.time_to_reach(exit));

        let seconds = match exit_time {
            Some(t) if t <= 0.0 => return self.bounce(velocity, timing.bounce_spring),
            Some(t) => t,
            None => params.duration(),
        };
        let Ok(duration) = Duration::try_from_secs_f64(seconds) else {
            return false;
        };
        if duration.is_zero() {
            return false;
        }

        let this = self.this.clone();
        let on_tick = move |_progress: f64, elapsed: Duration| {
            let Some(inner) = this.upgrade() else {
                return;
            };
            let indicator = params.value(elapsed.as_secs_f64()).y;
            Inner::run_frame(&inner, |inner| inner.deceleration_frame(indicator));
        };
        let generation = self.motion_generation + 1;
        let exit_velocity = exit_time.map(|t| params.velocity(t).y);
        let completion = self.completion(generation, MotionKind::Deceleration, exit_velocity);
        let motion = TimerAnimation::start(&self.clock, duration, on_tick, completion);
        self.install_motion(generation, motion);

        debug!(velocity, seconds, clipped = exit_time.is_some(), "deceleration started");
        self.set_phase(Phase::Decelerating);
        true
    }

    fn deceleration_frame(&mut self, indicator: f64) -> bool {
        let Some(g) = self.geometry() else {
            return false;
        };
        let content = g.mapping.content_offset(indicator);
        trace!(indicator, content, "deceleration frame");
        self.write_offset(content)
    }

    /// Bounce back from an overscrolled release.  Farther overscroll pulls
    /// back with a stiffer spring.
    fn bounce_to_bounds(&mut self, velocity: f64, g: &Geometry) -> bool {
        let overscroll = g.mapping.content.overscroll(g.offset);
        if !(overscroll > 0.0) {
            return false;
        }
        let timing = self.config.timing;
        let extra = if g.metrics.viewport_height > 0.0 {
            overscroll / g.metrics.viewport_height * timing.overscroll_stiffness_gain
        } else {
            0.0
        };
        let base = timing.bounce_spring;
        let spring = Spring::new(base.mass, base.stiffness + extra, base.damping_ratio);
        self.bounce(velocity, spring)
    }

    /// Spring the content back to its nearest bound.  `velocity` is in track
    /// space and is scaled up to content space.
    fn bounce(&mut self, velocity: f64, spring: Spring) -> bool {
        let Some(g) = self.geometry() else {
            return false;
        };
        let timing = self.config.timing;
        let multiplier = g
            .mapping
            .velocity_multiplier(timing.min_velocity_multiplier, timing.max_velocity_multiplier);
        let velocity = interval(
            -timing.max_bounce_velocity,
            velocity * multiplier,
            timing.max_bounce_velocity,
        );

        let bounds = g.mapping.content;
        let rest = bounds.clamp(g.offset);
        let params = SpringTimingParameters::new(
            spring,
            Point::vertical(g.offset - rest),
            Point::vertical(velocity),
            timing.stop_threshold,
        );
        let seconds = params.duration();
        let duration = Duration::try_from_secs_f64(seconds).unwrap_or(Duration::ZERO);
        if duration.is_zero() {
            if rest != g.offset {
                self.write_offset(rest);
            }
            return false;
        }

        let mut drift = RestDrift {
            rest,
            anchor: Anchor::nearest(bounds, rest),
            bounds,
        };
        let this = self.this.clone();
        let on_tick = move |_progress: f64, elapsed: Duration| {
            let Some(inner) = this.upgrade() else {
                return;
            };
            let displacement = params.value(elapsed.as_secs_f64()).y;
            Inner::run_frame(&inner, |inner| inner.bounce_frame(&mut drift, displacement));
        };
        let generation = self.motion_generation + 1;
        let completion = self.completion(generation, MotionKind::Bounce, None);
        let motion = TimerAnimation::start(&self.clock, duration, on_tick, completion);
        self.install_motion(generation, motion);

        debug!(velocity, displacement = g.offset - rest, stiffness = spring.stiffness, seconds, "bounce started");
        self.set_phase(Phase::Bouncing);
        true
    }

    fn bounce_frame(&mut self, drift: &mut RestDrift, displacement: f64) -> bool {
        let Some(g) = self.geometry() else {
            return false;
        };
        drift.follow(g.mapping.content);
        let offset = drift.rest + displacement;
        trace!(rest = drift.rest, offset, "bounce frame");
        self.write_offset(offset)
    }

    /// Run one motion frame; a frame that finds nothing to drive cancels its
    /// motion once the state is released.
    fn run_frame(inner: &Rc<RefCell<Inner>>, frame: impl FnOnce(&mut Inner) -> bool) {
        let orphaned = {
            let mut inner = inner.borrow_mut();
            if frame(&mut *inner) {
                None
            } else {
                inner.motion.take()
            }
        };
        if let Some(motion) = orphaned {
            debug!("host unavailable, cancelling motion");
            motion.cancel();
        }
    }
}
