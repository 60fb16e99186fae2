//! Live-update channel: watches the spec folder and pushes `"reload"`.
//!
//! Any create, modify, or remove of a `.md` file anywhere under the folder
//! pushes one reload payload. The recursive watch also covers directories
//! created after start-up. Every push is delivered; nothing is debounced.

use std::path::Path;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use specnote_core::live::RELOAD_PAYLOAD;
use tokio::sync::mpsc::UnboundedSender;

use crate::event::AppEvent;

/// Keeps the OS watcher alive; dropping it stops the pushes.
pub struct WatcherHandle {
    _watcher: RecommendedWatcher,
}

/// Starts watching `root` and forwards reload payloads into `tx`.
///
/// # Errors
///
/// Returns `notify::Error` if the watcher cannot be created or the folder
/// cannot be watched.
pub fn watch(root: &Path, tx: UnboundedSender<AppEvent>) -> Result<WatcherHandle, notify::Error> {
    let mut watcher = RecommendedWatcher::new(
        move |result: Result<Event, notify::Error>| match result {
            Ok(event) if is_spec_change(&event) => {
                tracing::debug!(paths = ?event.paths, kind = ?event.kind, "spec changed");
                let _ = tx.send(AppEvent::LiveUpdate(RELOAD_PAYLOAD.to_owned()));
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "watcher error"),
        },
        notify::Config::default(),
    )?;
    watcher.watch(root, RecursiveMode::Recursive)?;
    tracing::info!(path = %root.display(), "spec watcher started");
    Ok(WatcherHandle { _watcher: watcher })
}

/// True for create / modify / remove events touching a markdown file.
fn is_spec_change(event: &Event) -> bool {
    let relevant = matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    );
    relevant
        && event
            .paths
            .iter()
            .any(|p| p.extension().is_some_and(|ext| ext == "md"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, ModifyKind};
    use std::path::PathBuf;

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn markdown_writes_are_changes() {
        assert!(is_spec_change(&event(
            EventKind::Modify(ModifyKind::Any),
            "/specs/a.md"
        )));
        assert!(is_spec_change(&event(
            EventKind::Create(CreateKind::File),
            "/specs/new.md"
        )));
    }

    #[test]
    fn other_files_and_access_are_ignored() {
        assert!(!is_spec_change(&event(
            EventKind::Modify(ModifyKind::Any),
            "/specs/a.md.swp"
        )));
        assert!(!is_spec_change(&event(
            EventKind::Access(AccessKind::Any),
            "/specs/a.md"
        )));
    }
}
