//! specnote: annotate markdown specs and export the notes as instructions for
//! an editing agent.
//!
//! Entry point for the `specnote` binary. Wires together configuration
//! (`config`), logging, the terminal lifecycle (`tui`), the unified event bus
//! (`event`), the spec-folder watcher (`watcher`), the annotation core
//! (`specnote-core`) behind a `session::Session`, and the UI (`ui`).
//!
//! # Startup sequence
//!
//! 1. Parse flags and load the config file. Config errors print to stderr,
//!    which is still the normal terminal at this point.
//! 2. Start file logging. The UI owns the terminal, so nothing logs to it.
//! 3. `install_panic_hook()` then `register_sigterm()`.
//! 4. Open the annotation database before the first frame, so there is no
//!    loading state to manage.
//! 5. `init_tui()`, spawn the event task, the notification forwarder, and the
//!    watcher.
//!
//! # Safety
//!
//! `restore_tui()` is called after the event loop exits (quit key, SIGTERM, or
//! channel close). Inside the loop `?` is only used on `terminal.draw`, and the
//! panic hook covers unexpected panics.

mod app;
mod clipboard;
mod config;
mod event;
mod session;
mod tui;
mod ui;
mod watcher;

use std::sync::atomic::Ordering;

use clap::Parser;
use specnote_core::{Coordinator, FsSource, SqliteKv};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::event::AppEvent;
use crate::ui::keybindings::{handle_key, handle_mouse};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let cli = config::Cli::parse();
    let config = config::load_config().with_cli(&cli);

    std::fs::create_dir_all(&config.log_dir)?;
    let file_appender = tracing_appender::rolling::never(&config.log_dir, "specnote.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "specnote=info,specnote_core=info,warn".into()),
        )
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();
    tracing::info!(folder = %config.folder.display(), db = %config.db_path.display(), "starting specnote");

    tui::install_panic_hook();
    let term_flag = tui::register_sigterm()?;

    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let kv = SqliteKv::open(&config.db_path.to_string_lossy())
        .await
        .map_err(std::io::Error::other)?;
    let co = Coordinator::new(kv);

    let handler = event::EventHandler::new();
    let sink = clipboard::Sink::from_config(&config);
    let destination = sink.describe();
    let mut session = session::Session::new(
        co,
        FsSource::new(&config.folder),
        sink,
        &config.folder,
        destination,
    );
    event::forward_notifications(session.coordinator().subscribe(), handler.tx.clone());

    let mut state = app::AppState::default();
    session.refresh_catalog(&mut state).await;
    if let Some(file) = &cli.file {
        session.open(file, &mut state).await;
        state.focus = app::PanelFocus::Document;
    }

    // A missing folder only disables live updates.
    let _watcher = match watcher::watch(&config.folder, handler.tx.clone()) {
        Ok(w) => Some(w),
        Err(e) => {
            tracing::warn!(error = %e, "live updates disabled");
            state.set_status(format!("not watching {}: {e}", config.folder.display()));
            None
        }
    };

    let mut terminal = tui::init_tui()?;
    event::spawn_event_task(handler.tx.clone());
    let mut rx = handler.rx;

    // Exits only via `break`, so `restore_tui()` below is always reached.
    'event_loop: loop {
        tokio::select! {
            // Heartbeat: a quiescent terminal would otherwise block in
            // rx.recv() and never poll the SIGTERM flag.
            _ = tokio::time::sleep(std::time::Duration::from_millis(50)) => {
                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
            maybe_event = rx.recv() => {
                match maybe_event {
                    Some(AppEvent::Render) => {
                        terminal.draw(|frame| ui::render(frame, &mut state))?;
                    }
                    Some(AppEvent::Key(key)) => {
                        state.status = None;
                        let action = handle_key(key, &mut state);
                        if !session.apply(action, &mut state).await {
                            break 'event_loop;
                        }
                    }
                    Some(AppEvent::Mouse(mouse)) => {
                        let action = handle_mouse(mouse, &mut state);
                        if !session.apply(action, &mut state).await {
                            break 'event_loop;
                        }
                    }
                    Some(AppEvent::LiveUpdate(payload)) => {
                        session.live_update(&payload, &mut state).await;
                    }
                    Some(AppEvent::Notification(note)) => {
                        session.notify(note, &mut state).await;
                    }
                    // ratatui picks up the new size on the next Render.
                    Some(AppEvent::Resize(_, _)) => {}
                    Some(AppEvent::Quit) | None => break 'event_loop,
                }
                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
        }
    }

    tui::restore_tui()?;
    tracing::info!("specnote exited");
    Ok(())
}
