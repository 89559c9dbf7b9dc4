//! UI / rendering layer, everything that touches Ratatui widgets.
//!
//! This layer takes the app state and the scroll bar's snapshot and turns
//! them into cells on the terminal.  No state changes happen here.

pub mod content_list;
pub mod layout;
pub mod scroll_bar;
pub mod theme;
