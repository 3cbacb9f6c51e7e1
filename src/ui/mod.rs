//! UI / rendering layer — everything that touches Ratatui widgets.
//!
//! This layer takes the *core* data structures and turns them into cells on
//! the terminal.  No filesystem I/O happens here.

pub mod cube_widget;
pub mod halfblocks;
pub mod layout;
pub mod popup;
pub mod spinner;
pub mod story_list;
pub mod story_renderer;
pub mod theme;
