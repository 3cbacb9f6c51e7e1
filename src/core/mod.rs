//! Core cube logic – face assignment, rotation control, easing, gesture
//! recognition, and story loading.
//!
//! Nothing in this module depends on any TUI or rendering crate.

pub mod cube;
pub mod gesture;
pub mod panes;
pub mod scale;
pub mod scroll_lock;
pub mod spring;
pub mod story;
