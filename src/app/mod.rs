//! Application orchestration: state management, input handling, and the
//! demo content the scroll bar is attached to.

pub mod content;
pub mod event;
pub mod handler;
pub mod state;
pub mod velocity;
