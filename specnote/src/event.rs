//! Event bus for specnote.
//!
//! Terminal input, render ticks, file-watcher pushes, and core notifications
//! all become one `AppEvent` on a single tokio unbounded channel. The main
//! loop handles them strictly in arrival order, which is what serialises every
//! store mutation and reconciliation pass.

use std::time::Duration;

use crossterm::event::{Event as TermEvent, EventStream, KeyEvent, KeyEventKind, MouseEvent};
use futures::{FutureExt, StreamExt};
use specnote_core::Notification;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Frame interval, roughly 30 FPS.
const RENDER_INTERVAL: Duration = Duration::from_millis(33);

/// Everything the main loop reacts to.
#[derive(Debug)]
#[non_exhaustive]
pub enum AppEvent {
    /// A key press (`KeyEventKind::Press` only).
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// New terminal size as (columns, rows).
    Resize(u16, u16),
    /// Time to call `terminal.draw()`.
    Render,
    /// Raw live-update payload pushed by the file watcher.
    LiveUpdate(String),
    /// A notification published by the annotation core.
    Notification(Notification),
    /// The terminal input stream ended.
    Quit,
}

/// Both ends of the app channel. Clone `tx` for each background producer;
/// the main loop owns `rx`.
pub struct EventHandler {
    pub tx: UnboundedSender<AppEvent>,
    pub rx: UnboundedReceiver<AppEvent>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps a crossterm event onto the app channel's vocabulary.
///
/// Key releases and repeats are dropped so platforms that report them do not
/// double-fire; focus and paste events are not used.
fn translate(event: TermEvent) -> Option<AppEvent> {
    match event {
        TermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(AppEvent::Key(key)),
        TermEvent::Mouse(mouse) => Some(AppEvent::Mouse(mouse)),
        TermEvent::Resize(w, h) => Some(AppEvent::Resize(w, h)),
        _ => None,
    }
}

/// Spawns the task that turns crossterm input and the render interval into
/// `AppEvent`s. The task ends once the main loop drops its receiver.
pub fn spawn_event_task(tx: UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        let mut frames = tokio::time::interval(RENDER_INTERVAL);
        let mut input = EventStream::new();

        loop {
            // fuse() keeps select! from polling a finished stream.
            let next_input = input.next().fuse();
            let outgoing = tokio::select! {
                _ = frames.tick() => Some(AppEvent::Render),
                polled = next_input => match polled {
                    Some(Ok(event)) => translate(event),
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "terminal input error");
                        None
                    }
                    None => Some(AppEvent::Quit),
                },
            };
            let Some(event) = outgoing else { continue };
            let last = matches!(event, AppEvent::Quit);
            if tx.send(event).is_err() || last {
                break;
            }
        }
    });
}

/// Forwards core notifications into the app channel until either side closes.
pub fn forward_notifications(mut notes: UnboundedReceiver<Notification>, tx: UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        while let Some(note) = notes.recv().await {
            if tx.send(AppEvent::Notification(note)).is_err() {
                break;
            }
        }
    });
}
