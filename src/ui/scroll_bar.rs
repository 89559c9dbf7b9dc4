//! Draws a [`ScrollBarSnapshot`]: the track, the thumb with its optional
//! label, and the info bubble beside the thumb.

use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

use crate::app::content::{COLUMN_POINTS, ROW_POINTS};
use crate::core::{ScrollBarSnapshot, TextTransition};

use super::layout::TRACK_COLUMNS;
use super::theme::Theme;

/// Renders into the list-plus-track area; the track is the rightmost
/// [`TRACK_COLUMNS`] columns.
pub struct ScrollBarWidget<'a> {
    snapshot: &'a ScrollBarSnapshot,
    flash: bool,
}

impl<'a> ScrollBarWidget<'a> {
    pub fn new(snapshot: &'a ScrollBarSnapshot) -> Self {
        Self { snapshot, flash: false }
    }

    /// Highlight the thumb for a haptic tick.
    pub fn flash(mut self, flash: bool) -> Self {
        self.flash = flash;
        self
    }
}

/// Cell span `[start, end)` covering `[from, from + len)` points, clipped to
/// `0..limit`.
fn cell_span(from: f64, len: f64, unit: f64, limit: u16) -> Option<(u16, u16)> {
    let start = (from / unit).round();
    let end = ((from + len) / unit).round().max(start + 1.0);
    let start = start.clamp(0.0, f64::from(limit)) as u16;
    let end = end.clamp(0.0, f64::from(limit)) as u16;
    (start < end).then_some((start, end))
}

impl Widget for ScrollBarWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let s = self.snapshot;
        if !s.enabled || !s.visible || area.width < TRACK_COLUMNS {
            return;
        }
        let right = area.right();
        let track_x = right - TRACK_COLUMNS;

        for y in area.top()..area.bottom() {
            buf.set_string(right - 1, y, "│", Theme::track_style());
        }

        let Some((top, bottom)) = cell_span(s.indicator_offset, s.thumb.height, ROW_POINTS, area.height) else {
            return;
        };
        let columns = ((s.thumb.width / COLUMN_POINTS).round() as u16).clamp(1, TRACK_COLUMNS);
        let thumb_x = right - columns;
        let style = if self.flash {
            Theme::thumb_haptic_style()
        } else if s.active {
            Theme::thumb_active_style()
        } else {
            Theme::thumb_style()
        };
        let fill = "█".repeat(usize::from(columns));
        for y in top..bottom {
            buf.set_string(thumb_x, area.y + y, &fill, style);
        }

        let middle = area.y + top + (bottom - top - 1) / 2;
        if let Some(label) = &s.indicator_label {
            let label: String = label.chars().take(usize::from(columns)).collect();
            let x = thumb_x + (columns - label.chars().count() as u16) / 2;
            buf.set_string(x, middle, &label, Theme::thumb_label_style());
        }

        if let Some(info) = &s.info {
            let arrow = match info.transition {
                TextTransition::Up => "↑ ",
                TextTransition::Down => "↓ ",
                TextTransition::None => "",
            };
            let text = format!(" {arrow}{} ", info.text);
            let room = usize::from(track_x - area.x);
            let width = text.chars().count().min(room);
            if width == 0 {
                return;
            }
            let x = track_x - width as u16;
            buf.set_stringn(x, middle, &text, width, Theme::info_bubble_style());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::StateConfig;
    use crate::core::scroll_bar::InfoBubble;
    use crate::core::scroll_bar::Phase;

    fn snapshot() -> ScrollBarSnapshot {
        ScrollBarSnapshot {
            enabled: true,
            visible: true,
            phase: Phase::Dragging,
            track_height: 10.0 * ROW_POINTS,
            indicator_offset: 2.0 * ROW_POINTS,
            thumb: StateConfig::default(),
            active: true,
            info: Some(InfoBubble {
                text: "Oct 19, 2026".into(),
                transition: TextTransition::None,
            }),
            indicator_label: None,
        }
    }

    fn render(snapshot: &ScrollBarSnapshot) -> Buffer {
        let area = Rect::new(0, 0, 30, 10);
        let mut buf = Buffer::empty(area);
        ScrollBarWidget::new(snapshot).render(area, &mut buf);
        buf
    }

    #[test]
    fn thumb_covers_its_rows() {
        let buf = render(&snapshot());
        // 34 pt from row 2 rounds to rows 2..4, 4 columns wide.
        assert_eq!(buf[(29, 1)].symbol(), "│");
        assert_eq!(buf[(29, 2)].symbol(), "█");
        assert_eq!(buf[(26, 3)].symbol(), "█");
        assert_eq!(buf[(25, 3)].symbol(), " ");
        assert_eq!(buf[(29, 4)].symbol(), "│");
    }

    #[test]
    fn bubble_sits_left_of_the_track() {
        let buf = render(&snapshot());
        let row: String = (0..25).map(|x| buf[(x, 2)].symbol().to_string()).collect();
        assert!(row.trim_end().ends_with("Oct 19, 2026"), "{row:?}");
        assert_eq!(buf[(24, 2)].symbol(), " ");
    }

    #[test]
    fn thumb_is_clipped_while_overscrolled() {
        let mut s = snapshot();
        s.indicator_offset = -20.0;
        s.info = None;
        let buf = render(&s);
        assert_eq!(buf[(29, 0)].symbol(), "█");
        assert_eq!(buf[(29, 1)].symbol(), "│");
    }

    #[test]
    fn hidden_bar_draws_nothing() {
        let mut s = snapshot();
        s.visible = false;
        let buf = render(&s);
        assert_eq!(buf[(29, 2)].symbol(), " ");
        s.visible = true;
        s.enabled = false;
        let buf = render(&s);
        assert_eq!(buf[(29, 2)].symbol(), " ");
    }
}
