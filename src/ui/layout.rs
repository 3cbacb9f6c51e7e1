//! Layout helpers — split the terminal area into regions.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Width of the story list panel.
const LIST_WIDTH: u16 = 28;
/// Below this terminal width the story list is hidden.
const MIN_WIDTH_FOR_LIST: u16 = 70;

/// Primary screen layout: story list, cube stage and a bottom status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppLayout {
    /// Empty when the terminal is too narrow.
    pub list_area: Rect,
    pub cube_area: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    /// Compute the layout from the full terminal area.
    pub fn from_area(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),    // stage (takes all remaining space)
                Constraint::Length(1), // status bar
            ])
            .split(area);

        let (list_area, cube_area) = if chunks[0].width >= MIN_WIDTH_FOR_LIST {
            let cols = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(LIST_WIDTH), Constraint::Min(1)])
                .split(chunks[0]);
            (cols[0], cols[1])
        } else {
            (Rect::new(chunks[0].x, chunks[0].y, 0, 0), chunks[0])
        };

        Self {
            list_area,
            cube_area,
            status_area: chunks[1],
        }
    }

    /// Story rows that fit inside the list border.
    pub fn list_rows(&self) -> usize {
        self.list_area.height.saturating_sub(2) as usize
    }

    /// Story index under a click at `row` in the list, before bounds checks.
    pub fn list_row_at(&self, col: u16, row: u16, offset: usize) -> Option<usize> {
        let inner = Rect::new(
            self.list_area.x + 1,
            self.list_area.y + 1,
            self.list_area.width.saturating_sub(2),
            self.list_area.height.saturating_sub(2),
        );
        inner
            .contains(ratatui::layout::Position::new(col, row))
            .then(|| offset + (row - inner.y) as usize)
    }
}
