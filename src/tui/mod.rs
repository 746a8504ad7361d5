//! Terminal User Interface for habitree
//!
//! The habit list next to the growing tree.
//! Features:
//! - Vim-style navigation and one-key check-off
//! - Add/edit/delete prompts
//! - Braille-canvas tree that regrows as habits change
//! - Auto-refresh when the data file changes on disk

pub mod app;
pub mod events;
pub mod state; // Pure state transformations (functional core)
pub mod ui;
pub mod views;

use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::{
    event::{poll, read, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use ratatui::prelude::*;

use crate::config::Config;
use app::App;
use events::handle_event;

/// Run the TUI application
pub fn run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app, ensuring cleanup happens even on error
    let result = run_app_inner(&mut terminal, config);

    // Restore terminal - this MUST run even if app fails
    let _ = disable_raw_mode();
    let _ = execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    );
    let _ = terminal.show_cursor();

    result
}

fn run_app_inner<B: Backend + std::io::Write>(
    terminal: &mut Terminal<B>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App::new(config);
    let size = terminal.size()?;
    app.resize(size.width, size.height);

    // Setup file watcher for auto-refresh
    let (tx, rx) = mpsc::channel();
    let data_path = app.data_path().to_path_buf();
    let file_name = data_path.file_name().map(|n| n.to_os_string());

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<notify::Event, notify::Error>| {
            if let Ok(event) = res {
                let ours = event
                    .paths
                    .iter()
                    .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                if ours && (event.kind.is_modify() || event.kind.is_create()) {
                    let _ = tx.send(());
                }
            }
        },
        notify::Config::default(),
    )?;

    // Watch the directory, the file itself may not exist yet
    match data_path.parent() {
        Some(dir) if dir.is_dir() => {
            if let Err(e) = watcher.watch(dir, RecursiveMode::NonRecursive) {
                log::warn!("cannot watch {}: {}", dir.display(), e);
            }
        }
        _ => log::warn!("no data directory to watch for {}", data_path.display()),
    }

    run_event_loop(terminal, &mut app, rx)
}

fn run_event_loop<B: Backend + std::io::Write>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    file_change_rx: mpsc::Receiver<()>,
) -> Result<(), Box<dyn std::error::Error>> {
    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();

    loop {
        // Draw the UI
        app.refresh_scene();
        terminal.draw(|f| ui::draw(f, app))?;

        // Handle input with timeout
        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if poll(timeout)? {
            match read()? {
                Event::Key(key) => {
                    if handle_event(app, key) {
                        return Ok(()); // Quit signal
                    }
                }
                Event::Mouse(mouse) => {
                    app.handle_mouse(mouse);
                }
                Event::Resize(width, height) => {
                    app.resize(width, height);
                }
                _ => {}
            }
        }

        // Drain file changes (non-blocking), one reload per burst
        if file_change_rx.try_iter().count() > 0 && app.reload_external() {
            log::info!("data file changed on disk, reloaded");
        }

        // Tick for animations/updates
        if last_tick.elapsed() >= tick_rate {
            app.tick();
            last_tick = Instant::now();
        }
    }
}
