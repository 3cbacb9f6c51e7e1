//! A 3D cube carousel for the terminal.
//!
//! Each image in a directory is a *story* mounted on one face of a rotating
//! cube.  Swipe the cube with the mouse or step through with the keyboard.
//!
//! * [`core`] — pane assignment, rotation controller, springs, gestures and
//!   story discovery.  No terminal or widget code.
//! * [`ui`] — Ratatui widgets, including the perspective [`ui::cube_widget`].
//! * [`app`] — host state, input handling and background decoding.

pub mod app;
pub mod config;
pub mod core;
pub mod ui;
