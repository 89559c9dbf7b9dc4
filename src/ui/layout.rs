//! Layout helpers: split the terminal area into regions.

use ratatui::layout::{Constraint, Direction, Layout, Margin, Rect};

/// Columns reserved on the right of the list for the scroll bar track.
pub const TRACK_COLUMNS: u16 = 5;

/// Primary screen layout: a bordered list pane with the track along its
/// right edge, and a bottom status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AppLayout {
    pub pane_area: Rect,
    pub list_area: Rect,
    pub track_area: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    /// Compute the layout from the full terminal area.
    pub fn from_area(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),    // list pane (takes all remaining space)
                Constraint::Length(1), // status bar
            ])
            .split(area);

        let inner = chunks[0].inner(Margin::new(1, 1));
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(1), Constraint::Length(TRACK_COLUMNS)])
            .split(inner);

        Self {
            pane_area: chunks[0],
            list_area: columns[0],
            track_area: columns[1],
            status_area: chunks[1],
        }
    }

    /// List and track together; the info bubble may overlap the list.
    pub fn scroll_area(&self) -> Rect {
        self.list_area.union(self.track_area)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_runs_along_the_right_edge() {
        let layout = AppLayout::from_area(Rect::new(0, 0, 80, 24));
        assert_eq!(layout.status_area, Rect::new(0, 23, 80, 1));
        assert_eq!(layout.list_area, Rect::new(1, 1, 73, 21));
        assert_eq!(layout.track_area, Rect::new(74, 1, TRACK_COLUMNS, 21));
        assert_eq!(layout.scroll_area(), Rect::new(1, 1, 78, 21));
    }
}
