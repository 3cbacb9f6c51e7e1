//! A 3D cube carousel for browsing the images in a directory.
//!
//! Run the binary on a directory; every image becomes a face of the cube.
//! Swipe with the mouse or use the arrow keys to rotate.

use std::io::stderr;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    cursor::Show,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, widgets::Paragraph, Frame, Terminal};
use tokio::sync::mpsc;

use cube_story::app::{
    event::{spawn_event_reader, AppEvent},
    handler,
    state::{ActiveView, AppState},
    story_runtime::{self, DecodeUpdate},
};
use cube_story::config::{self, AppConfig};
use cube_story::core::story::{self, DiscoverConfig};
use cube_story::ui::{
    cube_widget::{CubeWidget, PaneStyle}, layout::AppLayout, popup::SettingsPopup, story_list::StoryList,
    story_renderer::StoryPanes, theme::Theme,
};

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), about = "3D cube story viewer")]
struct Cli {
    /// Directory of images to open (defaults to `.`).
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Story to show first (0-based).
    #[arg(long, default_value_t = 0)]
    index: usize,

    /// Maximum face width in cells.
    #[arg(long)]
    width: Option<u16>,

    /// Maximum face height in cells.
    #[arg(long)]
    height: Option<u16>,

    /// Viewer distance in cells; smaller is more dramatic.
    #[arg(long)]
    perspective: Option<u16>,

    /// Disable mouse swipes.
    #[arg(long)]
    no_gestures: bool,

    /// Keep the story list from scrolling at all.
    #[arg(long)]
    lock_scroll: bool,

    /// Include hidden (dot) files.
    #[arg(long)]
    hidden: bool,

    /// Write logs to this file (filtered by `RUST_LOG`).
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(width) = self.width {
            config.max_width = width.max(8);
        }
        if let Some(height) = self.height {
            config.max_height = height.max(4);
        }
        if let Some(perspective) = self.perspective {
            config.perspective = perspective.max(20);
        }
        if self.no_gestures {
            config.enable_gestures = false;
        }
        if self.lock_scroll {
            config.lock_scrolling = true;
        }
    }
}

// ───────────────────────────────────────── terminal ──────────

/// Restores the terminal when dropped, including on error paths.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        let guard = TerminalGuard;
        execute!(stderr(), EnterAlternateScreen, EnableMouseCapture)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(stderr(), LeaveAlternateScreen, DisableMouseCapture, Show);
    }
}

fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    match log_file {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("cannot create log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(stderr) // never pollute stdout
                .init();
        }
    }
    Ok(())
}

// ───────────────────────────────────────── drawing ───────────

fn draw(frame: &mut Frame, state: &AppState) {
    let layout = AppLayout::from_area(frame.area());

    if layout.list_area.area() > 0 {
        frame.render_widget(
            StoryList {
                stories: &state.stories,
                current: state.current(),
                offset: state.list_offset,
                locked: state.scroll_lock.is_locked(),
            },
            layout.list_area,
        );
    }

    let panes = StoryPanes::for_state(state);
    frame.render_widget(
        CubeWidget::new(&state.cube, &panes).pane_style(PaneStyle {
            border_style: Theme::border_style(),
            active_border_style: Theme::active_border_style(),
            ..PaneStyle::default()
        }),
        layout.cube_area,
    );

    let hint = state.config.status_bar_hint();
    let status_text = match state.active_view {
        ActiveView::Viewer => state.status_message.as_deref().unwrap_or(&hint),
        ActiveView::SettingsMenu => "",
    };
    frame.render_widget(
        Paragraph::new(status_text).style(Theme::status_bar_style()),
        layout.status_area,
    );

    if state.active_view == ActiveView::SettingsMenu {
        frame.render_widget(
            SettingsPopup {
                state,
                selected: state.settings_selected,
            },
            frame.area(),
        );
    }
}

// ───────────────────────────────────────── main ─────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_deref())?;

    // ── discover stories ──────────────────────────────────────
    let root = cli
        .path
        .canonicalize()
        .with_context(|| format!("cannot open {}", cli.path.display()))?;
    let discover = DiscoverConfig {
        show_hidden: cli.hidden,
        ..DiscoverConfig::default()
    };
    let stories = story::discover(&root, &discover)?;

    let mut user_config = AppConfig::load();
    cli.apply_overrides(&mut user_config);
    let mut state = AppState::new(root, stories, user_config, cli.index);
    state.config_path = Some(config::config_path());

    // ── terminal setup ────────────────────────────────────────
    let _guard = TerminalGuard::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stderr()))?;
    let size = terminal.size()?;
    state.resize(Rect::new(0, 0, size.width, size.height));
    state.follow_current();

    // ── async channels ────────────────────────────────────────
    let mut events = spawn_event_reader(Duration::from_millis(state.config.frame_ms));
    let (decode_tx, mut decode_rx) = mpsc::unbounded_channel::<DecodeUpdate>();
    let mut last_frame = Instant::now();

    // ── event loop ────────────────────────────────────────────
    loop {
        let now = Instant::now();
        state.cube.tick(now.saturating_duration_since(last_frame));
        last_frame = now;
        handler::process_cube_events(&mut state);
        state.sync_scroll_lock();
        story_runtime::request_visible(&mut state, &decode_tx);

        terminal.draw(|frame| draw(frame, &state))?;

        tokio::select! {
            biased;

            event = events.recv() => {
                let Some(event) = event else {
                    tracing::warn!("terminal event reader stopped");
                    break;
                };
                match event {
                    AppEvent::Key(k) => handler::handle_key(&mut state, k),
                    AppEvent::Mouse(m) => handler::handle_mouse(&mut state, m),
                    AppEvent::Resize(w, h) => state.resize(Rect::new(0, 0, w, h)),
                    AppEvent::Frame => state.tick = state.tick.wrapping_add(1),
                }
            }

            Some(update) = decode_rx.recv() => {
                // Batch-drain everything queued before redrawing.
                story_runtime::apply(&mut state, update);
                while let Ok(update) = decode_rx.try_recv() {
                    story_runtime::apply(&mut state, update);
                }
            }
        }

        if state.should_quit {
            break;
        }
    }

    terminal.show_cursor()?;
    Ok(())
}
