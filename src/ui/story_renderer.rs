//! Face content for the story cube: the image, a caption, or a loading
//! indicator while the image decodes.

use std::collections::HashMap;

use image::RgbaImage;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};

use super::cube_widget::PaneRenderer;
use super::halfblocks;
use super::spinner::Spinner;
use super::theme::Theme;
use crate::app::state::AppState;
use crate::core::story::Story;

pub struct StoryPanes<'a> {
    pub stories: &'a [Story],
    pub images: &'a HashMap<usize, RgbaImage>,
    pub errors: &'a HashMap<usize, String>,
    pub tick: u64,
}

impl<'a> StoryPanes<'a> {
    /// Faces for everything `state` has discovered and decoded so far.
    pub fn for_state(state: &'a AppState) -> Self {
        Self {
            stories: &state.stories,
            images: &state.images,
            errors: &state.decode_errors,
            tick: state.tick,
        }
    }

    fn caption(&self, index: usize, story: &Story, active: bool) -> Line<'static> {
        let name_style = if active {
            Theme::active_caption_style()
        } else {
            Theme::caption_style()
        };
        Line::from(vec![
            Span::styled(story.name.clone(), name_style),
            Span::raw("  "),
            Span::styled(
                format!("{}/{} · {}", index + 1, self.stories.len(), story.modified_label()),
                Theme::timestamp_style(),
            ),
        ])
    }
}

impl PaneRenderer for StoryPanes<'_> {
    fn render_item(&self, index: i64, active: bool, _rotation: f64, area: Rect, buf: &mut Buffer) {
        let Some((i, story)) = usize::try_from(index)
            .ok()
            .and_then(|i| self.stories.get(i).map(|s| (i, s)))
        else {
            return;
        };
        if area.height == 0 || area.width == 0 {
            return;
        }

        let [body, caption] = Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);
        Paragraph::new(self.caption(i, story, active)).render(caption, buf);

        if let Some(img) = self.images.get(&i) {
            halfblocks::render_image(img, body, buf);
        } else if let Some(err) = self.errors.get(&i) {
            Paragraph::new(Span::styled(err.clone(), Theme::error_style()))
                .wrap(Wrap { trim: true })
                .render(body, buf);
        } else {
            Spinner {
                label: "Loading…",
                tick: self.tick,
            }
            .render(body, buf);
        }
    }

    fn has_next(&self, index: i64) -> bool {
        index + 1 < self.stories.len() as i64
    }
}
