//! Demo content: a list of dated sections, exposed to the engine as a
//! scroll host measured in points.
//!
//! One terminal row is [`ROW_POINTS`] tall and one column is
//! [`COLUMN_POINTS`] wide, so the engine's constants (thumb sizes, rubber
//! band limits, spring stiffness) behave the way they would on a phone.

use chrono::{Duration as Days, Local, NaiveDate};

use crate::core::mapping::{content_bounds, Bounds};
use crate::core::{HostMetrics, Insets, ScrollBarDelegate, ScrollHost};

pub const ROW_POINTS: f64 = 16.0;
pub const COLUMN_POINTS: f64 = 8.0;

/// Blank space above the first header.
const TOP_INSET: f64 = ROW_POINTS;

#[derive(Debug, Clone)]
pub struct Section {
    pub title: String,
    pub items: Vec<String>,
}

/// One row of the flattened list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Row {
    Header { section: usize },
    Item { section: usize, item: usize },
}

#[derive(Debug)]
pub struct ContentView {
    sections: Vec<Section>,
    rows: Vec<Row>,
    offset: f64,
    viewport_rows: u16,
}

impl ContentView {
    /// `sections` consecutive days starting today, `items` rows each.
    pub fn generate(sections: usize, items: usize) -> Self {
        Self::generate_from(Local::now().date_naive(), sections, items)
    }

    pub fn generate_from(first_day: NaiveDate, sections: usize, items: usize) -> Self {
        let sections = (0..sections)
            .map(|n| Section {
                title: (first_day + Days::days(n as i64)).format("%b %-d, %Y").to_string(),
                items: (0..items).map(|i| format!("Item #{i}")).collect(),
            })
            .collect();
        Self::from_sections(sections)
    }

    pub fn from_sections(sections: Vec<Section>) -> Self {
        let mut rows = Vec::new();
        for (s, section) in sections.iter().enumerate() {
            rows.push(Row::Header { section: s });
            rows.extend((0..section.items.len()).map(|item| Row::Item { section: s, item }));
        }
        Self {
            sections,
            rows,
            offset: -TOP_INSET,
            viewport_rows: 0,
        }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, index: i64) -> Option<Row> {
        usize::try_from(index).ok().and_then(|i| self.rows.get(i).copied())
    }

    /// Text of a row, as drawn.
    pub fn row_text(&self, row: Row) -> &str {
        match row {
            Row::Header { section } => &self.sections[section].title,
            Row::Item { section, item } => &self.sections[section].items[item],
        }
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Index of the row under the top edge of the viewport; negative while
    /// the top inset or an overscroll is showing.
    pub fn first_visible_row(&self) -> i64 {
        (self.offset / ROW_POINTS).floor() as i64
    }

    pub fn set_viewport_rows(&mut self, rows: u16) {
        self.viewport_rows = rows;
    }

    pub fn bounds(&self) -> Bounds {
        content_bounds(&self.metrics())
    }

    /// Native scroll: move to `target`, kept within the bounds.  Returns the
    /// offset before the move so the caller can report the change.
    pub fn scroll_to(&mut self, target: f64) -> f64 {
        let previous = self.offset;
        let bounds = self.bounds();
        self.offset = if bounds.is_degenerate() {
            bounds.min
        } else {
            bounds.clamp(target)
        };
        previous
    }

    pub fn scroll_by(&mut self, delta: f64) -> f64 {
        self.scroll_to(self.offset + delta)
    }

    pub fn viewport_height(&self) -> f64 {
        f64::from(self.viewport_rows) * ROW_POINTS
    }
}

impl ScrollHost for ContentView {
    fn content_offset(&self) -> f64 {
        self.offset
    }

    fn set_content_offset(&mut self, offset: f64) {
        self.offset = offset;
    }

    fn metrics(&self) -> HostMetrics {
        HostMetrics {
            content_height: self.rows.len() as f64 * ROW_POINTS,
            viewport_height: self.viewport_height(),
            content_inset: Insets::vertical(TOP_INSET, 0.0),
            safe_area: Insets::ZERO,
        }
    }
}

// ───────────────────────────────────────── delegate ──────────

/// Shows the title of the section at the top of the viewport, and the
/// scroll progress inside the thumb.
#[derive(Debug)]
pub struct SectionTitles {
    titles: Vec<String>,
    /// Offset where each section's header reaches the top edge.
    starts: Vec<f64>,
    bounds: Bounds,
}

impl SectionTitles {
    pub fn new(content: &ContentView) -> Self {
        let starts = content
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| matches!(row, Row::Header { .. }))
            .map(|(i, _)| i as f64 * ROW_POINTS)
            .collect();
        Self {
            titles: content.sections.iter().map(|s| s.title.clone()).collect(),
            starts,
            bounds: content.bounds(),
        }
    }

    fn title_at(&self, offset: f64) -> Option<&str> {
        let section = self.starts.partition_point(|&start| start <= offset.max(0.0));
        self.titles.get(section.saturating_sub(1)).map(String::as_str)
    }
}

impl ScrollBarDelegate for SectionTitles {
    fn info_text(&self, content_offset: f64, _indicator_offset: f64) -> Option<String> {
        self.title_at(content_offset).map(str::to_owned)
    }

    fn indicator_label_text(&self, content_offset: f64, _indicator_offset: f64) -> Option<String> {
        if self.bounds.is_degenerate() {
            return None;
        }
        let percent = (self.bounds.progress(content_offset) * 100.0).round().clamp(0.0, 100.0);
        Some(format!("{percent:.0}%"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> ContentView {
        let first_day = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let mut view = ContentView::generate_from(first_day, 20, 10);
        view.set_viewport_rows(30);
        view
    }

    #[test]
    fn generates_dated_sections() {
        let view = view();
        assert_eq!(view.sections().len(), 20);
        assert_eq!(view.row_count(), 20 * 11);
        assert_eq!(view.sections()[0].title, "Oct 19, 2026");
        assert_eq!(view.sections()[13].title, "Nov 1, 2026");
        assert_eq!(view.row_text(Row::Item { section: 2, item: 4 }), "Item #4");
        assert_eq!(view.row(0), Some(Row::Header { section: 0 }));
        assert_eq!(view.row(-1), None);
    }

    #[test]
    fn metrics_in_points() {
        let view = view();
        let m = view.metrics();
        assert_eq!(m.content_height, 220.0 * 16.0);
        assert_eq!(m.viewport_height, 480.0);
        assert_eq!(view.bounds(), Bounds::new(-16.0, 3520.0 - 480.0));
        assert_eq!(view.offset(), -16.0);
        assert_eq!(view.first_visible_row(), -1);
    }

    #[test]
    fn native_scroll_is_clamped() {
        let mut view = view();
        assert_eq!(view.scroll_by(-100.0), -16.0);
        assert_eq!(view.offset(), -16.0);
        view.scroll_to(1e6);
        assert_eq!(view.offset(), 3040.0);
        let previous = view.scroll_by(-48.0);
        assert_eq!(previous, 3040.0);
        assert_eq!(view.first_visible_row(), 187);
    }

    #[test]
    fn short_content_pins_to_top() {
        let mut view = ContentView::generate_from(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(), 1, 3);
        view.set_viewport_rows(30);
        view.scroll_to(200.0);
        assert_eq!(view.offset(), -16.0);
    }

    #[test]
    fn delegate_reports_top_section() {
        let view = view();
        let titles = SectionTitles::new(&view);
        assert_eq!(titles.info_text(-16.0, 0.0).as_deref(), Some("Oct 19, 2026"));
        assert_eq!(titles.info_text(175.0, 0.0).as_deref(), Some("Oct 19, 2026"));
        assert_eq!(titles.info_text(176.0, 0.0).as_deref(), Some("Oct 20, 2026"));
        assert_eq!(titles.info_text(1e6, 0.0).as_deref(), Some("Nov 7, 2026"));
    }

    #[test]
    fn delegate_label_is_progress() {
        let titles = SectionTitles::new(&view());
        assert_eq!(titles.indicator_label_text(-16.0, 0.0).as_deref(), Some("0%"));
        assert_eq!(titles.indicator_label_text(3040.0, 0.0).as_deref(), Some("100%"));
        assert_eq!(titles.indicator_label_text(5000.0, 0.0).as_deref(), Some("100%"));
    }
}
