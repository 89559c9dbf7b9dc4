//! Contracts between the engine and the view it decorates.

/// Edge insets in points.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Insets {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

impl Insets {
    pub const ZERO: Insets = Insets::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(top: f64, left: f64, bottom: f64, right: f64) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    pub const fn vertical(top: f64, bottom: f64) -> Self {
        Self::new(top, 0.0, bottom, 0.0)
    }
}

/// Geometry of the scrollable view, polled whenever the engine needs it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HostMetrics {
    pub content_height: f64,
    pub viewport_height: f64,
    pub content_inset: Insets,
    pub safe_area: Insets,
}

/// The scrollable view the bar is attached to.
///
/// The engine holds the host weakly and calls it while its own state is
/// borrowed, so `set_content_offset` must only store the value.  Hosts that
/// scroll on their own (wheel, keyboard, native gestures) report it back via
/// [`ScrollBar::content_offset_changed`](super::ScrollBar::content_offset_changed)
/// after releasing their own borrow.
pub trait ScrollHost {
    fn content_offset(&self) -> f64;
    fn set_content_offset(&mut self, offset: f64);
    fn metrics(&self) -> HostMetrics;
}

/// Supplies the text shown next to and inside the thumb.  Returning `None`
/// hides the corresponding label.
pub trait ScrollBarDelegate {
    fn info_text(&self, content_offset: f64, indicator_offset: f64) -> Option<String>;

    fn indicator_label_text(&self, _content_offset: f64, _indicator_offset: f64) -> Option<String> {
        None
    }
}
