//! Side panel listing every story, with the current one highlighted.
//!
//! This is the scrollable "page" around the cube: the mouse wheel moves it,
//! except while the scroll lock holds.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

use super::theme::Theme;
use crate::core::story::Story;

pub struct StoryList<'a> {
    pub stories: &'a [Story],
    pub current: usize,
    /// First visible row.
    pub offset: usize,
    pub locked: bool,
}

impl Widget for StoryList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 4 || area.height < 3 {
            return;
        }
        let block = Block::default()
            .title(format!(" Stories {}/{} ", self.current + 1, self.stories.len()))
            .title_style(Theme::title_style())
            .borders(Borders::ALL)
            .border_style(Theme::border_style());
        let inner = block.inner(area);
        block.render(area, buf);

        for (row, (i, story)) in self
            .stories
            .iter()
            .enumerate()
            .skip(self.offset)
            .take(inner.height as usize)
            .enumerate()
        {
            let y = inner.y + row as u16;
            let (marker, style) = if i == self.current {
                ("▸ ", Theme::selected_style())
            } else {
                ("  ", Theme::list_item_style())
            };
            if i == self.current {
                buf.set_style(Rect::new(inner.x, y, inner.width, 1), style);
            }
            let line = Line::from(Span::styled(format!("{marker}{}", story.name), style));
            buf.set_line(inner.x, y, &line, inner.width);
        }

        if self.locked {
            let badge = " locked ";
            let width = badge.len() as u16;
            if area.width > width + 2 {
                let x = area.x + area.width - width - 1;
                let line = Line::from(Span::styled(badge, Theme::lock_badge_style()));
                buf.set_line(x, area.bottom() - 1, &line, width);
            }
        }
    }
}
