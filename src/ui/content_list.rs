//! Renders the visible slice of a [`ContentView`].

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::Widget,
};

use crate::app::content::{ContentView, Row};

use super::theme::Theme;

pub struct ContentList<'a> {
    content: &'a ContentView,
}

impl<'a> ContentList<'a> {
    pub fn new(content: &'a ContentView) -> Self {
        Self { content }
    }
}

impl Widget for ContentList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Rows above the first or past the last one (inset, overscroll) stay blank.
        let first = self.content.first_visible_row();
        for y in 0..area.height {
            let Some(row) = self.content.row(first + i64::from(y)) else {
                continue;
            };
            let text = self.content.row_text(row);
            let line = match row {
                Row::Header { .. } => Line::from(Span::styled(text, Theme::header_style())),
                Row::Item { .. } => Line::from(vec![Span::raw("  "), Span::styled(text, Theme::item_style())]),
            };
            buf.set_line(area.x, area.y + y, &line, area.width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn draws_rows_from_the_offset() {
        let first_day = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let mut content = ContentView::generate_from(first_day, 3, 2);
        content.set_viewport_rows(4);

        let area = Rect::new(0, 0, 20, 4);
        let mut buf = Buffer::empty(area);
        ContentList::new(&content).render(area, &mut buf);
        // Resting at the top inset: one blank row, then the first header.
        assert_eq!(buf[(0, 0)].symbol(), " ");
        assert_eq!(buf[(0, 1)].symbol(), "M");
        assert_eq!(buf[(2, 2)].symbol(), "I");

        content.scroll_to(3.0 * 16.0);
        let mut buf = Buffer::empty(area);
        ContentList::new(&content).render(area, &mut buf);
        assert_eq!(buf[(0, 0)].symbol(), "M");
        assert_eq!(buf[(0, 3)].symbol(), "M");
    }
}
