//! Input handling — maps key/mouse events to state mutations.

use std::time::Instant;

use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Position;

use crate::config::Action;
use crate::core::cube::CubeEvent;
use crate::ui::cube_widget::PaneRenderer;
use crate::ui::story_renderer::StoryPanes;

use super::settings::SETTINGS_ITEMS;
use super::state::{ActiveView, AppState};

/// Terminal cells are roughly twice as tall as wide.
const CELL_ASPECT: f64 = 2.0;

/// Process a key event, dispatching based on the active view.
pub fn handle_key(state: &mut AppState, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    // Ctrl+c always quits, regardless of view.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return;
    }

    match state.active_view {
        ActiveView::Viewer => handle_viewer_key(state, key),
        ActiveView::SettingsMenu => handle_settings_key(state, key),
    }
}

// ── Viewer (configurable bindings) ──────────────────────────────

fn handle_viewer_key(state: &mut AppState, key: KeyEvent) {
    let Some(action) = state.config.match_key(key) else {
        return;
    };

    let current = state.cube.index();
    let last = state.stories.len() as i64 - 1;
    match action {
        Action::Quit => state.should_quit = true,
        Action::OpenSettings => {
            state.active_view = ActiveView::SettingsMenu;
            state.settings_selected = 0;
        }
        Action::Next => {
            if !request_index(state, current + 1, false) {
                state.status_message = Some("Last story".into());
            }
        }
        Action::Prev => {
            if !request_index(state, current - 1, false) {
                state.status_message = Some("First story".into());
            }
        }
        Action::First => {
            request_index(state, 0, true);
        }
        Action::Last => {
            request_index(state, last, true);
        }
    }
}

// ── Settings popup (hardcoded navigation) ───────────────────────

fn handle_settings_key(state: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
            state.active_view = ActiveView::Viewer;
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.settings_selected = state.settings_selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if state.settings_selected < SETTINGS_ITEMS.len() - 1 {
                state.settings_selected += 1;
            }
        }
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => {
            if let Some(item) = SETTINGS_ITEMS.get(state.settings_selected) {
                item.activate(state);
            }
        }
        _ => {}
    }
}

// ── Mouse ───────────────────────────────────────────────────────

pub fn handle_mouse(state: &mut AppState, mouse: MouseEvent) {
    handle_mouse_at(state, mouse, Instant::now());
}

/// [`handle_mouse`] with an explicit timestamp for gesture velocity.
pub fn handle_mouse_at(state: &mut AppState, mouse: MouseEvent, at: Instant) {
    if state.active_view != ActiveView::Viewer {
        return;
    }
    let layout = state.layout();
    let (x, y) = (mouse.column as f64, mouse.row as f64 * CELL_ASPECT);
    let pos = Position::new(mouse.column, mouse.row);

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if layout.cube_area.contains(pos) {
                state.cube.pointer_down(x, y, at);
            } else if let Some(row) = layout.list_row_at(mouse.column, mouse.row, state.list_offset) {
                let current = state.current();
                request_index(state, row as i64, row.abs_diff(current) > 1);
            }
        }
        // Drags keep tracking outside the cube so a swipe can overshoot.
        MouseEventKind::Drag(MouseButton::Left) => state.cube.pointer_move(x, y, at),
        MouseEventKind::Up(MouseButton::Left) => {
            state.cube.pointer_up(x, y, at);
            process_cube_events(state);
        }
        MouseEventKind::ScrollDown => scroll_list(state, 1),
        MouseEventKind::ScrollUp => scroll_list(state, -1),
        _ => {}
    }
}

fn scroll_list(state: &mut AppState, delta: isize) {
    if state.scroll_lock.is_locked() {
        return;
    }
    let max = state.max_list_offset();
    state.list_offset = state.list_offset.saturating_add_signed(delta).min(max);
}

// ── Cube index ownership ────────────────────────────────────────

/// Move the cube to `index` if it names a story.  Returns `false` (and
/// leaves the cube alone) otherwise.
pub fn request_index(state: &mut AppState, index: i64, immediate: bool) -> bool {
    if !state.contains(index) {
        return false;
    }
    state.cube.set_index((index, immediate));
    state.status_message = None;
    state.follow_current();
    true
}

/// Answer the cube's pending events: accept committed swipes that land on a
/// story, snap back from the rest.
pub fn process_cube_events(state: &mut AppState) {
    for event in state.cube.take_events() {
        match event {
            CubeEvent::Change(index) => {
                let current = state.cube.index();
                let allowed = if index > current {
                    StoryPanes::for_state(state).has_next(current)
                } else {
                    index >= 0
                };
                if !allowed || !request_index(state, index, false) {
                    tracing::debug!(index, "swipe refused");
                    state.cube.snap_back();
                    state.status_message = Some(if index < 0 {
                        "First story".into()
                    } else {
                        "Last story".into()
                    });
                }
            }
            CubeEvent::Rest => {
                tracing::trace!(index = state.cube.index(), "cube settled");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::app::state::tests::state_with;
    use crate::core::cube::Phase;

    fn press(state: &mut AppState, code: KeyCode) {
        handle_key(state, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn settle(state: &mut AppState) {
        for _ in 0..2_000 {
            state.cube.tick(Duration::from_millis(16));
            process_cube_events(state);
            if !state.cube.is_animating() {
                break;
            }
        }
    }

    /// Drag from `from` to `to` (columns) on row 10 over 400 ms.
    fn swipe(state: &mut AppState, from: u16, to: u16) {
        let t = Instant::now();
        let at = |ms| t + Duration::from_millis(ms);
        let step = if to < from { from - 5 } else { from + 5 };
        handle_mouse_at(state, mouse(MouseEventKind::Down(MouseButton::Left), from, 10), at(0));
        handle_mouse_at(state, mouse(MouseEventKind::Drag(MouseButton::Left), step, 10), at(200));
        handle_mouse_at(state, mouse(MouseEventKind::Drag(MouseButton::Left), to, 10), at(400));
        handle_mouse_at(state, mouse(MouseEventKind::Up(MouseButton::Left), to, 10), at(400));
    }

    #[test]
    fn keys_step_within_bounds() {
        let mut state = state_with(3);
        press(&mut state, KeyCode::Left);
        assert_eq!(state.cube.index(), 0);
        assert_eq!(state.status_message.as_deref(), Some("First story"));

        press(&mut state, KeyCode::Right);
        press(&mut state, KeyCode::Char('l'));
        assert_eq!(state.cube.index(), 2);
        assert_eq!(state.status_message, None);

        press(&mut state, KeyCode::Char(' '));
        assert_eq!(state.cube.index(), 2);
        assert_eq!(state.status_message.as_deref(), Some("Last story"));
    }

    #[test]
    fn first_and_last_jump_immediately() {
        let mut state = state_with(9);
        press(&mut state, KeyCode::End);
        assert_eq!(state.cube.index(), 8);
        state.cube.tick(Duration::ZERO);
        assert_eq!(state.cube.rotation(), -720.0);
        assert!(!state.cube.is_animating());

        press(&mut state, KeyCode::Home);
        state.cube.tick(Duration::ZERO);
        assert_eq!(state.cube.rotation(), 0.0);
    }

    #[test]
    fn settings_popup_navigation() {
        let mut state = state_with(2);
        press(&mut state, KeyCode::Char('?'));
        assert_eq!(state.active_view, ActiveView::SettingsMenu);

        press(&mut state, KeyCode::Up);
        assert_eq!(state.settings_selected, 0);
        for _ in 0..20 {
            press(&mut state, KeyCode::Down);
        }
        assert_eq!(state.settings_selected, SETTINGS_ITEMS.len() - 1);

        state.settings_selected = 1;
        press(&mut state, KeyCode::Enter);
        assert!(!state.config.enable_gestures);

        // Viewer keys do nothing while the popup is open.
        press(&mut state, KeyCode::End);
        assert_eq!(state.cube.index(), 0);

        press(&mut state, KeyCode::Esc);
        assert_eq!(state.active_view, ActiveView::Viewer);
        assert!(!state.should_quit);
        press(&mut state, KeyCode::Char('q'));
        assert!(state.should_quit);
    }

    #[test]
    fn ctrl_c_quits_from_settings() {
        let mut state = state_with(2);
        state.active_view = ActiveView::SettingsMenu;
        handle_key(&mut state, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(state.should_quit);
    }

    #[test]
    fn mouse_swipe_advances() {
        let mut state = state_with(3);
        swipe(&mut state, 100, 40);
        assert_eq!(state.cube.index(), 1);
        settle(&mut state);
        assert_eq!(state.cube.rotation(), -90.0);
        assert!(state.cube.gestures_enabled());
    }

    #[test]
    fn swipe_past_last_story_snaps_back() {
        let mut state = state_with(1);
        swipe(&mut state, 100, 40);
        assert_eq!(state.cube.index(), 0);
        assert_eq!(state.cube.phase(), Phase::SnappingBack);
        assert_eq!(state.status_message.as_deref(), Some("Last story"));
        settle(&mut state);
        assert_eq!(state.cube.rotation(), 0.0);
    }

    #[test]
    fn press_outside_cube_is_not_a_swipe() {
        let mut state = state_with(3);
        // Row 39 is the status bar.
        let t = Instant::now();
        handle_mouse_at(&mut state, mouse(MouseEventKind::Down(MouseButton::Left), 60, 39), t);
        handle_mouse_at(
            &mut state,
            mouse(MouseEventKind::Drag(MouseButton::Left), 10, 39),
            t + Duration::from_millis(50),
        );
        handle_mouse_at(
            &mut state,
            mouse(MouseEventKind::Up(MouseButton::Left), 10, 39),
            t + Duration::from_millis(60),
        );
        assert_eq!(state.cube.index(), 0);
        assert!(!state.cube.is_animating());
    }

    #[test]
    fn list_click_selects_story() {
        let mut state = state_with(10);
        let t = Instant::now();
        handle_mouse_at(&mut state, mouse(MouseEventKind::Down(MouseButton::Left), 4, 6), t);
        assert_eq!(state.cube.index(), 5);
        state.cube.tick(Duration::ZERO);
        assert_eq!(state.cube.rotation(), -450.0);
    }

    #[test]
    fn wheel_scrolls_list_unless_locked() {
        let mut state = state_with(60);
        let t = Instant::now();
        handle_mouse_at(&mut state, mouse(MouseEventKind::ScrollDown, 4, 4), t);
        assert_eq!(state.list_offset, 1);
        handle_mouse_at(&mut state, mouse(MouseEventKind::ScrollUp, 4, 4), t);
        handle_mouse_at(&mut state, mouse(MouseEventKind::ScrollUp, 4, 4), t);
        assert_eq!(state.list_offset, 0);

        press(&mut state, KeyCode::Right);
        assert_eq!(state.sync_scroll_lock(), Some(true));
        handle_mouse_at(&mut state, mouse(MouseEventKind::ScrollDown, 4, 4), t);
        assert_eq!(state.list_offset, 0);

        settle(&mut state);
        assert_eq!(state.sync_scroll_lock(), Some(false));
        for _ in 0..100 {
            handle_mouse_at(&mut state, mouse(MouseEventKind::ScrollDown, 4, 4), t);
        }
        assert_eq!(state.list_offset, state.max_list_offset());
    }
}
