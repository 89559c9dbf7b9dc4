//! Central application state.
//!
//! All mutable state lives here so that the rest of the app can be pure
//! functions over `&AppState` (rendering) or `&mut AppState` (event handling).

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use ratatui::layout::Rect;
use tracing::debug;

use crate::config::{AppConfig, ScrollBarPrefs};
use crate::core::{ConfigError, FrameClock, ScrollBar};
use crate::ui::layout::AppLayout;

use super::content::{ContentView, SectionTitles, ROW_POINTS};
use super::velocity::VelocityTracker;

/// A mouse press that landed on the thumb, until its release.
#[derive(Debug)]
pub struct DragSession {
    /// Track position of the press, in points.
    pub start_y: f64,
    pub started_at: Instant,
    pub pan_began: bool,
    pub long_pressed: bool,
    pub tracker: VelocityTracker,
}

impl DragSession {
    pub fn new(y: f64, now: Instant) -> Self {
        let mut tracker = VelocityTracker::new();
        tracker.push(now, y);
        Self {
            start_y: y,
            started_at: now,
            pan_began: false,
            long_pressed: false,
            tracker,
        }
    }

    /// A press the engine has been told about.
    pub fn is_reported(&self) -> bool {
        self.pan_began || self.long_pressed
    }
}

/// Top-level application state.
pub struct AppState {
    pub clock: FrameClock,
    pub content: Rc<RefCell<ContentView>>,
    /// Owned here; the scroll bar only holds it weakly.
    pub titles: Rc<SectionTitles>,
    pub scroll_bar: ScrollBar,
    /// Persisted configuration.
    pub config: AppConfig,
    /// Effective preferences: the file's, with command-line overrides.
    pub prefs: ScrollBarPrefs,
    pub layout: AppLayout,
    pub drag: Option<DragSession>,
    /// Thumb highlight after a haptic tick.
    pub haptic_until: Option<Instant>,
    /// An optional status message shown in the bottom bar.
    pub status_message: Option<String>,
    /// Controls the main event loop.
    pub should_quit: bool,
}

impl AppState {
    pub fn new(content: ContentView, config: AppConfig, prefs: ScrollBarPrefs, area: Rect) -> Result<Self, ConfigError> {
        Self::with_clock(FrameClock::new(), content, config, prefs, area)
    }

    /// Like [`AppState::new`], driven by `clock`.
    pub fn with_clock(
        clock: FrameClock,
        content: ContentView,
        config: AppConfig,
        prefs: ScrollBarPrefs,
        area: Rect,
    ) -> Result<Self, ConfigError> {
        let layout = AppLayout::from_area(area);
        let mut content = content;
        content.set_viewport_rows(layout.list_area.height);
        let titles = Rc::new(SectionTitles::new(&content));
        let content = Rc::new(RefCell::new(content));
        let scroll_bar = build_scroll_bar(&prefs, &clock, &content, &titles, &layout)?;

        Ok(Self {
            clock,
            content,
            titles,
            scroll_bar,
            config,
            prefs,
            layout,
            drag: None,
            haptic_until: None,
            status_message: None,
            should_quit: false,
        })
    }

    /// Replace the scroll bar after a preference change.  A motion in flight
    /// is dropped with the old one.
    pub fn rebuild_scroll_bar(&mut self) -> Result<(), ConfigError> {
        let scroll_bar = build_scroll_bar(&self.prefs, &self.clock, &self.content, &self.titles, &self.layout)?;
        self.scroll_bar = scroll_bar;
        self.drag = None;
        self.haptic_until = None;
        debug!(prefs = ?self.prefs, "scroll bar rebuilt");
        Ok(())
    }

    pub fn resize(&mut self, area: Rect) {
        self.layout = AppLayout::from_area(area);
        let settled = self.drag.is_none() && !self.scroll_bar.is_animating();
        let change = {
            let mut content = self.content.borrow_mut();
            content.set_viewport_rows(self.layout.list_area.height);
            // Keep a resting list inside its new bounds.
            settled.then(|| (content.scroll_by(0.0), content.offset()))
        };
        self.titles = Rc::new(SectionTitles::new(&self.content.borrow()));
        self.scroll_bar.set_delegate(&self.titles);
        self.scroll_bar.layout(track_height(&self.layout));
        if let Some((previous, current)) = change.filter(|(p, c)| p != c) {
            self.scroll_bar.content_offset_changed(Some(previous), current);
        }
    }
}

pub fn track_height(layout: &AppLayout) -> f64 {
    f64::from(layout.track_area.height) * ROW_POINTS
}

fn build_scroll_bar(
    prefs: &ScrollBarPrefs,
    clock: &FrameClock,
    content: &Rc<RefCell<ContentView>>,
    titles: &Rc<SectionTitles>,
    layout: &AppLayout,
) -> Result<ScrollBar, ConfigError> {
    let scroll_bar = ScrollBar::new(prefs.scroll_bar_config(), clock, content)?;
    scroll_bar.set_delegate(titles);
    scroll_bar.layout(track_height(layout));
    Ok(scroll_bar)
}
