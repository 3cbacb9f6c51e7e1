//! Central application state.
//!
//! All mutable state lives here so that the rest of the app can be pure
//! functions over `&AppState` (rendering) or `&mut AppState` (event handling).

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use image::RgbaImage;
use ratatui::layout::Rect;

use crate::config::AppConfig;
use crate::core::cube::{Cube, CubeOptions};
use crate::core::scroll_lock::ScrollLock;
use crate::core::spring::SpringConfig;
use crate::core::story::Story;
use crate::ui::layout::AppLayout;

/// Columns kept free on either side of the cube.
const FACE_MARGIN_X: u16 = 4;
/// Rows kept free above and below the cube.
const FACE_MARGIN_Y: u16 = 2;
const MIN_FACE_WIDTH: u16 = 8;
const MIN_FACE_HEIGHT: u16 = 4;
/// Decodes kept this many stories beyond the outermost cube face.
const CACHE_MARGIN: i64 = 2;

/// Which view / overlay is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveView {
    #[default]
    Viewer,
    SettingsMenu,
}

/// Top-level application state.
pub struct AppState {
    /// Directory the stories were discovered in.
    pub root: PathBuf,
    pub stories: Vec<Story>,
    /// Rotation controller.  Its index is only ever changed by the host.
    pub cube: Cube,
    pub config: AppConfig,
    /// Where settings changes are written.  `None` keeps them in memory.
    pub config_path: Option<PathBuf>,
    /// Decoded images by story index.
    pub images: HashMap<usize, RgbaImage>,
    /// Decode failures by story index.
    pub decode_errors: HashMap<usize, String>,
    /// Story indices with a decode in flight.
    pub pending: HashSet<usize>,
    /// Bumped whenever cached images are invalidated; stale decodes carry
    /// an older value and are dropped.
    pub decode_generation: u64,
    /// Pixel budget (w, h) the cached images were decoded for.
    pub decode_budget: (u32, u32),
    /// Controls the main event loop.
    pub should_quit: bool,
    /// An optional status message shown in the bottom bar.
    pub status_message: Option<String>,
    /// Which view / overlay is currently shown.
    pub active_view: ActiveView,
    /// Currently highlighted item in the settings menu.
    pub settings_selected: usize,
    /// First visible row of the story list.
    pub list_offset: usize,
    /// Suspends list scrolling while the cube moves.
    pub scroll_lock: ScrollLock,
    /// Last known terminal size.
    pub terminal_area: Rect,
    /// Frame counter (drives the loading spinner).
    pub tick: u64,
}

impl AppState {
    pub fn new(root: PathBuf, stories: Vec<Story>, config: AppConfig, index: usize) -> Self {
        let index = index.min(stories.len().saturating_sub(1));
        let terminal_area = Rect::new(0, 0, 80, 24);
        let options = cube_options(&config, AppLayout::from_area(terminal_area).cube_area);
        Self {
            root,
            stories,
            cube: Cube::new(index as i64, options),
            config,
            config_path: None,
            images: HashMap::new(),
            decode_errors: HashMap::new(),
            pending: HashSet::new(),
            decode_generation: 0,
            decode_budget: (0, 0),
            should_quit: false,
            status_message: None,
            active_view: ActiveView::default(),
            settings_selected: 0,
            list_offset: 0,
            scroll_lock: ScrollLock::default(),
            terminal_area,
            tick: 0,
        }
    }

    pub fn layout(&self) -> AppLayout {
        AppLayout::from_area(self.terminal_area)
    }

    /// Index of the story currently facing the viewer.
    pub fn current(&self) -> usize {
        self.cube.index().max(0) as usize
    }

    /// Whether `index` names a story.
    pub fn contains(&self, index: i64) -> bool {
        index >= 0 && index < self.stories.len() as i64
    }

    /// Pixel budget for decoding one face: each cell holds 1×2 pixels.
    pub fn face_pixels(&self) -> (u32, u32) {
        let options = self.cube.options();
        (options.width as u32, options.height as u32 * 2)
    }

    /// Push the current config and terminal size into the cube.
    pub fn apply_cube_options(&mut self) {
        let options = cube_options(&self.config, self.layout().cube_area);
        self.cube.set_options(options);
    }

    /// React to a new terminal size.
    pub fn resize(&mut self, area: Rect) {
        self.terminal_area = area;
        self.apply_cube_options();

        let (w, h) = self.face_pixels();
        if w > self.decode_budget.0 || h > self.decode_budget.1 {
            // Images decoded for a smaller face would look blocky.
            self.invalidate_images();
        }
    }

    /// Drop all cached images and ignore decodes still in flight.
    pub fn invalidate_images(&mut self) {
        self.decode_generation = self.decode_generation.wrapping_add(1);
        self.images.clear();
        self.decode_errors.clear();
        self.pending.clear();
        self.decode_budget = self.face_pixels();
    }

    /// Drop decodes for stories well away from every cube face.
    pub fn evict_far_images(&mut self) {
        let panes = self.cube.panes();
        let lo = panes.iter().map(|p| p.index).min().unwrap_or(0) - CACHE_MARGIN;
        let hi = panes.iter().map(|p| p.index).max().unwrap_or(0) + CACHE_MARGIN;
        let keep = |i: &usize| (lo..=hi).contains(&(*i as i64));
        let before = self.images.len();
        self.images.retain(|i, _| keep(i));
        self.decode_errors.retain(|i, _| keep(i));
        if self.images.len() < before {
            tracing::debug!(evicted = before - self.images.len(), lo, hi, "image cache trimmed");
        }
    }

    /// Mirror the cube's lock state into the host; returns the new state on
    /// a transition.
    pub fn sync_scroll_lock(&mut self) -> Option<bool> {
        self.scroll_lock.update(self.cube.scroll_locked())
    }

    /// Scroll the story list so the current story is visible.
    pub fn follow_current(&mut self) {
        let rows = self.layout().list_rows();
        if rows == 0 {
            return;
        }
        let current = self.current();
        if current < self.list_offset {
            self.list_offset = current;
        } else if current >= self.list_offset + rows {
            self.list_offset = current + 1 - rows;
        }
    }

    /// Largest useful list offset.
    pub fn max_list_offset(&self) -> usize {
        self.stories.len().saturating_sub(self.layout().list_rows())
    }

    /// Write the config to disk when a path is configured.
    pub fn persist(&self) {
        let Some(path) = &self.config_path else {
            return;
        };
        if let Err(e) = self.config.save_to(path) {
            tracing::warn!("cannot save config to {}: {e}", path.display());
        }
    }
}

/// Face size for the given cube area: the area minus a margin, capped by
/// the configured maximum.
pub fn face_size(config: &AppConfig, area: Rect) -> (u16, u16) {
    let width = area
        .width
        .saturating_sub(FACE_MARGIN_X * 2)
        .min(config.max_width)
        .max(MIN_FACE_WIDTH);
    let height = area
        .height
        .saturating_sub(FACE_MARGIN_Y * 2)
        .min(config.max_height)
        .max(MIN_FACE_HEIGHT);
    (width, height)
}

/// Cube options derived from the config for a cube drawn into `area`.
pub fn cube_options(config: &AppConfig, area: Rect) -> CubeOptions {
    let (width, height) = face_size(config, area);
    CubeOptions {
        width: width as f64,
        height: height as f64,
        perspective: config.perspective as f64,
        scale_range: [1.0, config.scale_min],
        lock_scrolling: config.lock_scrolling,
        enable_gestures: config.enable_gestures,
        spring: SpringConfig {
            tension: config.spring_tension,
            friction: config.spring_friction,
            ..SpringConfig::default()
        },
        ..CubeOptions::default()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::time::SystemTime;

    use super::*;

    /// State with `count` fake stories and a 120×40 terminal.
    pub(crate) fn state_with(count: usize) -> AppState {
        let stories = (0..count)
            .map(|i| Story {
                path: PathBuf::from(format!("/tmp/story-{i}.png")),
                name: format!("story-{i}.png"),
                modified: Some(SystemTime::UNIX_EPOCH),
                mime: Some("image/png".into()),
            })
            .collect();
        let mut state = AppState::new(PathBuf::from("/tmp"), stories, AppConfig::default(), 0);
        state.resize(Rect::new(0, 0, 120, 40));
        state
    }

    #[test]
    fn face_is_capped_and_margined() {
        let config = AppConfig::default();
        assert_eq!(face_size(&config, Rect::new(0, 0, 200, 100)), (60, 30));
        assert_eq!(face_size(&config, Rect::new(0, 0, 40, 14)), (32, 10));
        assert_eq!(face_size(&config, Rect::new(0, 0, 3, 3)), (8, 4));
    }

    #[test]
    fn options_follow_config() {
        let mut config = AppConfig::default();
        config.scale_min = 0.8;
        config.enable_gestures = false;
        let options = cube_options(&config, Rect::new(0, 0, 100, 50));
        assert_eq!(options.scale_range, [1.0, 0.8]);
        assert!(!options.enable_gestures);
        assert_eq!(options.perspective, 100.0);
    }

    #[test]
    fn start_index_is_clamped() {
        let stories = state_with(3).stories;
        let state = AppState::new(PathBuf::from("/tmp"), stories, AppConfig::default(), 9);
        assert_eq!(state.current(), 2);
        assert!(state.contains(2));
        assert!(!state.contains(3));
    }

    #[test]
    fn far_images_are_evicted() {
        let mut state = state_with(12);
        for i in 0..12 {
            state.images.insert(i, RgbaImage::new(1, 1));
        }
        state.decode_errors.insert(0, "bad".into());
        state.cube.set_index(8);

        // Faces around 8 span 7..=10; the margin keeps 5..=12.
        state.evict_far_images();
        let mut kept: Vec<usize> = state.images.keys().copied().collect();
        kept.sort_unstable();
        assert_eq!(kept, vec![5, 6, 7, 8, 9, 10, 11]);
        assert!(state.decode_errors.is_empty());
    }

    #[test]
    fn growing_terminal_invalidates_images() {
        let stories = state_with(2).stories;
        let mut state = AppState::new(PathBuf::from("/tmp"), stories, AppConfig::default(), 0);
        state.resize(Rect::new(0, 0, 50, 20));
        let generation = state.decode_generation;
        assert_eq!(state.decode_budget, (42, 30));
        state.images.insert(0, RgbaImage::new(1, 1));

        state.resize(Rect::new(0, 0, 50, 18));
        assert_eq!(state.decode_generation, generation);
        assert!(state.images.contains_key(&0));

        state.resize(Rect::new(0, 0, 120, 40));
        assert_eq!(state.decode_generation, generation + 1);
        assert!(state.images.is_empty());
        assert_eq!(state.decode_budget, (60, 60));
    }
}
