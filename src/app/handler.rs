//! Input handling: maps key/mouse events and frames to state mutations.
//!
//! Mouse presses on the thumb become gesture events for the scroll bar;
//! everything else (wheel, keys) scrolls the list directly, the way a
//! native scroll view would, and reports the change afterwards.

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use tracing::{debug, trace, warn};

use crate::config::Action;
use crate::core::{Gesture, GestureSource, ScrollBarEvent};

use super::content::ROW_POINTS;
use super::state::{AppState, DragSession};

/// Press duration without movement that counts as a long press.
pub const LONG_PRESS: Duration = Duration::from_millis(200);
/// How long the thumb stays highlighted after a haptic tick.
pub const HAPTIC_FLASH: Duration = Duration::from_millis(80);
/// Rows moved per wheel notch.
const WHEEL_ROWS: f64 = 3.0;

// ── keys ────────────────────────────────────────────────────────

/// Process a key event.
pub fn handle_key(state: &mut AppState, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    // Ctrl+c always quits.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return;
    }

    let Some(action) = state.config.match_key(key) else {
        return;
    };
    debug!(?action, "key action");
    let page = state.content.borrow().viewport_height();

    match action {
        Action::Quit => state.should_quit = true,
        Action::ScrollUp => native_scroll_by(state, -ROW_POINTS),
        Action::ScrollDown => native_scroll_by(state, ROW_POINTS),
        Action::PageUp => native_scroll_by(state, -page),
        Action::PageDown => native_scroll_by(state, page),
        Action::Top => native_scroll_to(state, f64::NEG_INFINITY),
        Action::Bottom => native_scroll_to(state, f64::INFINITY),
        Action::CyclePreset => {
            let preset = state.prefs.preset.next();
            state.prefs.preset = preset;
            state.config.prefs.preset = preset;
            apply_prefs(state, format!("preset: {}", preset.name()));
        }
        Action::ToggleDeceleration => {
            let decelerate = !state.prefs.decelerate;
            state.prefs.decelerate = decelerate;
            state.config.prefs.decelerate = decelerate;
            apply_prefs(state, format!("deceleration: {}", on_off(decelerate)));
        }
        Action::ToggleAlwaysVisible => {
            let always_visible = !state.prefs.always_visible;
            state.prefs.always_visible = always_visible;
            state.config.prefs.always_visible = always_visible;
            apply_prefs(state, format!("always visible: {}", on_off(always_visible)));
        }
    }
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

fn apply_prefs(state: &mut AppState, message: String) {
    if let Err(err) = state.rebuild_scroll_bar() {
        warn!(%err, "rejected scroll bar configuration");
        state.status_message = Some(err.to_string());
        return;
    }
    if let Err(err) = state.config.save() {
        warn!(%err, "failed to save config");
    }
    state.status_message = Some(message);
}

// ── native scrolling ────────────────────────────────────────────

fn native_scroll_by(state: &mut AppState, delta: f64) {
    let target = state.content.borrow().offset() + delta;
    native_scroll_to(state, target);
}

/// Scroll the list itself.  Grabbing the content interrupts whatever the
/// scroll bar is animating.
fn native_scroll_to(state: &mut AppState, target: f64) {
    if state.drag.as_ref().is_some_and(DragSession::is_reported) {
        return;
    }
    state.scroll_bar.host_scroll_gesture_changed();
    let (previous, current) = {
        let mut content = state.content.borrow_mut();
        let previous = content.scroll_to(target);
        (previous, content.offset())
    };
    if previous != current {
        trace!(previous, current, "native scroll");
        state.scroll_bar.content_offset_changed(Some(previous), current);
    }
}

// ── mouse ───────────────────────────────────────────────────────

/// Track position of the middle of a terminal row, in points.  Rows outside
/// the track give positions outside it.
fn track_y(track: Rect, row: u16) -> f64 {
    (f64::from(row) - f64::from(track.y)) * ROW_POINTS + ROW_POINTS / 2.0
}

fn point_in_rect(area: Rect, col: u16, row: u16) -> bool {
    col >= area.x
        && col < area.x.saturating_add(area.width)
        && row >= area.y
        && row < area.y.saturating_add(area.height)
}

pub fn handle_mouse(state: &mut AppState, mouse: MouseEvent, now: Instant) {
    let track = state.layout.track_area;
    let y = track_y(track, mouse.row);

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            // A new press means the previous release never reached us, e.g.
            // the button came up outside the window.
            if let Some(stale) = state.drag.take() {
                if stale.is_reported() {
                    debug!("lost release, cancelling drag");
                    state.scroll_bar.handle_gesture(Gesture::Cancelled);
                }
            }
            if !point_in_rect(track, mouse.column, mouse.row) {
                return;
            }
            if !state.scroll_bar.snapshot().thumb_contains(y) {
                return;
            }
            debug!(y, "thumb pressed");
            state.drag = Some(DragSession::new(y, now));
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            let Some(drag) = state.drag.as_mut() else {
                return;
            };
            if !drag.pan_began {
                if y == drag.start_y {
                    return;
                }
                drag.pan_began = true;
                debug!("pan began");
                state.scroll_bar.handle_gesture(Gesture::Began {
                    source: GestureSource::Pan,
                });
            }
            drag.tracker.push(now, y);
            let gesture = Gesture::Changed {
                translation: y - drag.start_y,
                velocity: drag.tracker.velocity(now),
            };
            trace!(?gesture, "drag");
            state.scroll_bar.handle_gesture(gesture);
        }
        MouseEventKind::Up(MouseButton::Left) => {
            let Some(mut drag) = state.drag.take() else {
                return;
            };
            if !drag.is_reported() {
                return;
            }
            drag.tracker.push(now, y);
            let velocity = drag.tracker.velocity(now);
            debug!(velocity, "released");
            state.scroll_bar.handle_gesture(Gesture::Ended { velocity });
        }
        MouseEventKind::ScrollDown | MouseEventKind::ScrollUp => {
            if !point_in_rect(state.layout.scroll_area(), mouse.column, mouse.row) {
                return;
            }
            let sign = if mouse.kind == MouseEventKind::ScrollDown { 1.0 } else { -1.0 };
            native_scroll_by(state, sign * WHEEL_ROWS * ROW_POINTS);
        }
        _ => {}
    }
}

// ── frames ──────────────────────────────────────────────────────

/// Advance everything time-driven to `now`.  Returns whether anything may
/// have changed on screen.
pub fn handle_frame(state: &mut AppState, now: Instant) -> bool {
    let mut dirty = !state.clock.is_idle();

    if let Some(drag) = state.drag.as_mut() {
        if !drag.is_reported() && now.saturating_duration_since(drag.started_at) >= LONG_PRESS {
            drag.long_pressed = true;
            debug!("long press");
            state.scroll_bar.handle_gesture(Gesture::Began {
                source: GestureSource::LongPress,
            });
            dirty = true;
        }
    }

    trace!(subscribers = state.clock.subscriber_count(), "frame");
    state.clock.tick(now);

    for event in state.scroll_bar.drain_events() {
        dirty = true;
        match event {
            ScrollBarEvent::Haptic => state.haptic_until = Some(now + HAPTIC_FLASH),
            ScrollBarEvent::PhaseChanged(phase) => debug!(?phase, "phase"),
            other => trace!(event = ?other, "scroll bar event"),
        }
    }

    if state.haptic_until.is_some_and(|until| until <= now) {
        state.haptic_until = None;
        dirty = true;
    }
    dirty
}

pub fn handle_resize(state: &mut AppState, width: u16, height: u16) {
    state.resize(Rect::new(0, 0, width, height));
}
