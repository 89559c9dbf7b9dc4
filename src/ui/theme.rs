//! Colour palette and text styles used across the UI.

use ratatui::style::{Color, Modifier, Style};

/// Central theme; change colours here and they propagate everywhere.
pub struct Theme;

impl Theme {
    // ── list ───────────────────────────────────────────────────
    pub fn header_style() -> Style {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    }

    pub fn item_style() -> Style {
        Style::default().fg(Color::White)
    }

    // ── scroll bar ─────────────────────────────────────────────
    pub fn track_style() -> Style {
        Style::default().fg(Color::DarkGray)
    }

    pub fn thumb_style() -> Style {
        Style::default().fg(Color::Gray)
    }

    pub fn thumb_active_style() -> Style {
        Style::default().fg(Color::White)
    }

    /// Brief flash standing in for a haptic tick.
    pub fn thumb_haptic_style() -> Style {
        Style::default().fg(Color::Yellow)
    }

    pub fn thumb_label_style() -> Style {
        Style::default()
            .bg(Color::White)
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD)
    }

    pub fn info_bubble_style() -> Style {
        Style::default()
            .bg(Color::Blue)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    }

    // ── chrome ─────────────────────────────────────────────────
    pub fn border_style() -> Style {
        Style::default().fg(Color::Gray)
    }

    pub fn title_style() -> Style {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    }

    pub fn status_bar_style() -> Style {
        Style::default().bg(Color::DarkGray).fg(Color::White)
    }
}
