//! Loading indicator — a braille spinner followed by a label.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::Widget,
};

use super::theme::Theme;

/// Braille-dot spinner frames.  Cycles through these on each tick.
const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Frames shown per spinner step.
const FRAMES_PER_STEP: u64 = 5;

pub fn spinner_frame(tick: u64) -> &'static str {
    SPINNER_FRAMES[((tick / FRAMES_PER_STEP) as usize) % SPINNER_FRAMES.len()]
}

/// "⠋ Loading…" centred in its area.
pub struct Spinner<'a> {
    pub label: &'a str,
    /// Monotonically increasing tick counter (drives the spinner frame).
    pub tick: u64,
}

impl Widget for Spinner<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let text = format!("{} {}", spinner_frame(self.tick), self.label);
        let width = (text.chars().count() as u16).min(area.width);
        let x = area.x + (area.width - width) / 2;
        let y = area.y + area.height / 2;
        let line = Line::from(Span::styled(text, Theme::loading_style()));
        buf.set_line(x, y, &line, width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_advance_slowly_and_wrap() {
        assert_eq!(spinner_frame(0), "⠋");
        assert_eq!(spinner_frame(FRAMES_PER_STEP - 1), "⠋");
        assert_eq!(spinner_frame(FRAMES_PER_STEP), "⠙");
        assert_eq!(spinner_frame(FRAMES_PER_STEP * SPINNER_FRAMES.len() as u64), "⠋");
    }

    #[test]
    fn renders_centred() {
        let area = Rect::new(0, 0, 20, 5);
        let mut buf = Buffer::empty(area);
        Spinner { label: "Loading…", tick: 0 }.render(area, &mut buf);
        let row: String = (0..20).map(|x| buf[(x, 2)].symbol().to_string()).collect();
        assert_eq!(row.trim(), "⠋ Loading…");
    }
}
