//! A terminal demo of a draggable, flingable scroll bar.
//!
//! Drag the thumb on the right edge, fling it, pull it past either end and
//! let it bounce back.  Hold the thumb still to show the section bubble
//! without scrolling.

mod app;
mod config;
mod core;
mod ui;

use std::fs::File;
use std::io::{self, stderr};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::Rect,
    widgets::{Block, Borders, Paragraph},
    Terminal,
};
use tokio::time::MissedTickBehavior;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::app::{
    content::ContentView,
    event::{spawn_event_reader, AppEvent},
    handler,
    state::AppState,
};
use crate::config::{AppConfig, Preset};
use crate::ui::{content_list::ContentList, scroll_bar::ScrollBarWidget, theme::Theme};

/// About 60 frames per second.
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), about = "Draggable scroll bar with momentum and bounce")]
struct Cli {
    /// Number of dated sections in the list.
    #[arg(long, default_value_t = 20)]
    sections: usize,

    /// Items per section.
    #[arg(long, default_value_t = 10)]
    items: usize,

    /// Scroll bar look (overrides the config file for this session).
    #[arg(long, value_enum)]
    style: Option<Preset>,

    /// Snap instead of gliding after a fast release.
    #[arg(long)]
    no_decelerate: bool,

    /// Keep the scroll bar on screen when idle.
    #[arg(long)]
    always_visible: bool,

    /// Idle time before the scroll bar hides, in milliseconds.
    #[arg(long)]
    hide_after_ms: Option<u64>,

    /// Write logs here instead of stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_tracing(log_file: Option<&PathBuf>) -> Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env());
    match log_file {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("cannot create log file {}", path.display()))?;
            builder.with_writer(Mutex::new(file)).with_ansi(false).init();
        }
        None => builder.with_writer(io::stderr).init(), // never pollute stdout
    }
    Ok(())
}

fn draw(terminal: &mut Terminal<CrosstermBackend<io::Stderr>>, state: &AppState) -> Result<()> {
    let snapshot = state.scroll_bar.snapshot();
    let content = state.content.borrow();

    terminal.draw(|frame| {
        let layout = &state.layout;

        let pane = Block::default()
            .title(format!(" {} sections, {} rows ", content.sections().len(), content.row_count()))
            .title_style(Theme::title_style())
            .borders(Borders::ALL)
            .border_style(Theme::border_style());
        frame.render_widget(pane, layout.pane_area);
        frame.render_widget(ContentList::new(&content), layout.list_area);
        frame.render_widget(
            ScrollBarWidget::new(&snapshot).flash(state.haptic_until.is_some()),
            layout.scroll_area(),
        );

        let hint = state.config.status_bar_hint();
        let message = state.status_message.as_deref().unwrap_or(&hint);
        let status_text = format!(" {:?} | {} | {}", snapshot.phase, state.prefs.preset.name(), message);
        let status = Paragraph::new(status_text).style(Theme::status_bar_style());
        frame.render_widget(status, layout.status_area);
    })?;
    Ok(())
}

// ───────────────────────────────────────── main ─────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_ref())?;

    let config = AppConfig::load();
    let mut prefs = config.prefs;
    if let Some(style) = cli.style {
        prefs.preset = style;
    }
    if cli.no_decelerate {
        prefs.decelerate = false;
    }
    if cli.always_visible {
        prefs.always_visible = true;
    }
    if let Some(ms) = cli.hide_after_ms {
        prefs = prefs.with_hide_after_ms(ms);
    }
    info!(?prefs, sections = cli.sections, items = cli.items, "starting");

    // ── terminal setup ────────────────────────────────────────
    enable_raw_mode()?;
    let mut stderr_handle = stderr();
    execute!(stderr_handle, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stderr());
    let mut terminal = Terminal::new(backend)?;

    let size = terminal.size()?;
    let area = Rect::new(0, 0, size.width, size.height);
    let content = ContentView::generate(cli.sections, cli.items);
    let result = match AppState::new(content, config, prefs, area) {
        Ok(mut state) => run(&mut terminal, &mut state).await,
        Err(err) => Err(err.into()),
    };

    // ── teardown ──────────────────────────────────────────────
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    result
}

async fn run(terminal: &mut Terminal<CrosstermBackend<io::Stderr>>, state: &mut AppState) -> Result<()> {
    let mut events = spawn_event_reader(Duration::from_millis(50));
    let mut frames = tokio::time::interval(FRAME_INTERVAL);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    draw(terminal, state)?;

    loop {
        let dirty = tokio::select! {
            biased;

            Some(event) = events.recv() => {
                match event {
                    AppEvent::Key(k) => handler::handle_key(state, k),
                    AppEvent::Mouse(m, at) => handler::handle_mouse(state, m, at),
                    AppEvent::Resize(w, h) => handler::handle_resize(state, w, h),
                }
                true
            }

            _ = frames.tick() => handler::handle_frame(state, Instant::now()),
        };

        if state.should_quit {
            break;
        }
        if dirty {
            draw(terminal, state)?;
        }
    }
    Ok(())
}
