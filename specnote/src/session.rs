//! Runs `KeyAction`s and live-update pushes against the annotation core.
//!
//! The session owns the coordinator and its collaborators. It is only ever
//! driven from the main loop, one event at a time, so every store mutation and
//! reconciliation pass happens in arrival order. After each step it refreshes
//! the `AppState` snapshot the renderer reads.

use std::path::PathBuf;

use specnote_core::catalog::{badge_counts, discover};
use specnote_core::export::ExportSink;
use specnote_core::kv::KvStore;
use specnote_core::{
    Coordinator, DocumentSource, ExportOutcome, LiveUpdateOutcome, Notification, Trigger,
};

use crate::app::AppState;
use crate::ui::keybindings::KeyAction;

pub struct Session<K, S, E> {
    co: Coordinator<K>,
    source: S,
    sink: E,
    folder: PathBuf,
    /// Where exports go, for status messages.
    destination: String,
}

impl<K: KvStore, S: DocumentSource, E: ExportSink> Session<K, S, E> {
    pub fn new(
        co: Coordinator<K>,
        source: S,
        sink: E,
        folder: impl Into<PathBuf>,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            co,
            source,
            sink,
            folder: folder.into(),
            destination: destination.into(),
        }
    }

    pub fn coordinator(&self) -> &Coordinator<K> {
        &self.co
    }

    /// Rescans the spec folder and recomputes badges.
    pub async fn refresh_catalog(&self, state: &mut AppState) {
        state.set_catalog(discover(&self.folder));
        self.refresh_badges(state).await;
    }

    pub async fn refresh_badges(&self, state: &mut AppState) {
        state.badges = badge_counts(self.co.store(), &state.catalog).await;
    }

    /// Fetches and mounts `document_id`, replacing whatever was open.
    pub async fn open(&mut self, document_id: &str, state: &mut AppState) {
        match self.source.fetch(document_id).await {
            Ok(document) => {
                let markers = self.co.mount(document).await;
                state.block_list_state.select(None);
                state.comment_list_state.select(None);
                state.sync_document(&self.co);
                let commented = markers.values().filter(|m| m.has_comment).count();
                state.set_status(format!(
                    "opened {document_id} ({} blocks, {commented} commented)",
                    state.blocks.len()
                ));
            }
            Err(e) => {
                tracing::warn!(document = document_id, error = %e, "open failed");
                state.set_status(format!("cannot open {document_id}: {e}"));
            }
        }
    }

    /// Handles one raw live-update payload.
    ///
    /// A failed incremental refresh falls back to a full re-mount of the open
    /// document. Every reload also rescans the catalog, since the change may
    /// have added or removed files.
    pub async fn live_update(&mut self, payload: &str, state: &mut AppState) {
        let trigger = Trigger::parse(payload);
        match self.co.on_live_update(trigger, &self.source).await {
            LiveUpdateOutcome::Ignored => return,
            LiveUpdateOutcome::Refreshed(_) => {}
            LiveUpdateOutcome::FullReload => {
                if let Some(id) = self.co.document_id().map(str::to_owned) {
                    self.co.reload_from_scratch(&id, &self.source).await;
                    if self.co.document().is_none() {
                        state.set_status(format!("{id} is no longer available"));
                    }
                }
            }
        }
        state.sync_document(&self.co);
        self.refresh_catalog(state).await;
    }

    /// Routes a core notification into UI state.
    pub async fn notify(&self, note: Notification, state: &mut AppState) {
        match note {
            Notification::CommentsChanged => self.refresh_badges(state).await,
            Notification::OpenAnnotationRequested { block_index } => {
                state.open_annotations(block_index);
            }
        }
    }

    /// Runs `action`. Returns `false` when the app should quit.
    pub async fn apply(&mut self, action: KeyAction, state: &mut AppState) -> bool {
        match action {
            KeyAction::Continue => {}
            KeyAction::Quit => return false,
            KeyAction::OpenDocument(id) => self.open(&id, state).await,
            KeyAction::SubmitComment { block_index, text } => {
                match self.co.add_comment(block_index, &text).await {
                    Some(_) => state.set_status(format!("comment added to block {block_index}")),
                    None => state.set_status("comment not added"),
                }
                state.sync_document(&self.co);
            }
            KeyAction::DeleteComment(id) => {
                if self.co.delete_comment(&id).await {
                    state.set_status("comment deleted");
                }
                state.sync_document(&self.co);
            }
            KeyAction::Export => {
                let msg = match self.co.export(&mut self.sink).await {
                    ExportOutcome::Empty => "nothing to export".to_owned(),
                    ExportOutcome::Delivered { comments, purged: true } => {
                        format!("exported {comments} comments to {}", self.destination)
                    }
                    ExportOutcome::Delivered { comments, purged: false } => format!(
                        "exported {comments} comments to {}, but could not clear them",
                        self.destination
                    ),
                    ExportOutcome::Failed(e) => format!("export failed, comments kept: {e}"),
                };
                state.set_status(msg);
                state.sync_document(&self.co);
            }
            KeyAction::RequestOpen(raw) => {
                // The resulting notification arrives through the event channel.
                self.co.request_open(&raw);
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::PanelFocus;
    use specnote_core::export::FileSink;
    use specnote_core::{FsSource, MemoryKv};
    use tempfile::TempDir;

    type TestSession = Session<MemoryKv, FsSource, FileSink>;

    fn session(dir: &TempDir) -> TestSession {
        let specs = dir.path().join("specs");
        std::fs::create_dir_all(&specs).unwrap();
        Session::new(
            Coordinator::new(MemoryKv::new()),
            FsSource::new(&specs),
            FileSink::new(dir.path().join("out/prompt.md")),
            specs,
            "export file",
        )
    }

    fn write_spec(dir: &TempDir, name: &str, body: &str) {
        std::fs::create_dir_all(dir.path().join("specs")).unwrap();
        std::fs::write(dir.path().join("specs").join(name), body).unwrap();
    }

    #[tokio::test]
    async fn open_comment_and_export_to_file() {
        let dir = TempDir::new().unwrap();
        write_spec(&dir, "intro.md", "# Intro\n\nFirst paragraph.\n");
        let mut s = session(&dir);
        let mut state = AppState::default();

        s.refresh_catalog(&mut state).await;
        assert_eq!(state.catalog.len(), 1);
        s.apply(KeyAction::OpenDocument("intro.md".to_owned()), &mut state).await;
        assert_eq!(state.open_document.as_deref(), Some("intro.md"));
        assert_eq!(state.blocks.len(), 2);

        s.apply(
            KeyAction::SubmitComment { block_index: 1, text: "expand".to_owned() },
            &mut state,
        )
        .await;
        assert!(state.markers[&1].has_comment);
        s.refresh_badges(&mut state).await;
        assert_eq!(state.badges.get("intro.md"), Some(&1));

        assert!(s.apply(KeyAction::Export, &mut state).await);
        let written = std::fs::read_to_string(dir.path().join("out/prompt.md")).unwrap();
        assert!(written.contains("- expand"));
        assert!(state.comments.is_empty());
        s.refresh_badges(&mut state).await;
        assert!(state.badges.is_empty());
    }

    #[tokio::test]
    async fn deleted_file_unmounts_on_live_update() {
        let dir = TempDir::new().unwrap();
        write_spec(&dir, "a.md", "Only paragraph.\n");
        let mut s = session(&dir);
        let mut state = AppState::default();
        s.open("a.md", &mut state).await;
        assert_eq!(state.blocks.len(), 1);

        std::fs::remove_file(dir.path().join("specs/a.md")).unwrap();
        s.live_update("reload", &mut state).await;
        assert!(state.open_document.is_none());
        assert!(state.blocks.is_empty());
        assert!(state.catalog.is_empty());
    }

    #[tokio::test]
    async fn request_open_round_trips_through_notification() {
        let dir = TempDir::new().unwrap();
        write_spec(&dir, "a.md", "One.\n\nTwo.\n");
        let mut s = session(&dir);
        let mut notes = s.coordinator().subscribe();
        let mut state = AppState::default();
        s.open("a.md", &mut state).await;

        s.apply(KeyAction::RequestOpen("1".to_owned()), &mut state).await;
        let note = notes.try_recv().unwrap();
        s.notify(note, &mut state).await;
        assert_eq!(state.focus, PanelFocus::Comments);
        assert_eq!(state.selected_block(), Some(1));
    }

    #[tokio::test]
    async fn quit_stops_the_loop_and_unknown_payload_is_ignored() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        let mut state = AppState::default();
        s.live_update("ping", &mut state).await;
        assert!(state.status.is_none());
        assert!(!s.apply(KeyAction::Quit, &mut state).await);
    }
}
