//! End-to-end test of the annotation lifecycle.
//!
//! add → persist → live update with reordered blocks → reconcile → export →
//! purge, plus the live-update and export failure paths.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use specnote_core::blocks::Document;
use specnote_core::error::{ExportError, KvError, SourceError};
use specnote_core::export::ExportSink;
use specnote_core::kv::{KvStore, MemoryKv, SqliteKv};
use specnote_core::lifecycle::{Coordinator, ExportOutcome, LiveUpdateOutcome};
use specnote_core::live::{DocumentSource, FsSource, Trigger};
use specnote_core::store::storage_key;
use specnote_core::types::{Block, BlockKind, MarkerState};

/// Serves whatever document was last staged; `None` simulates a failed fetch.
struct StagedSource {
    next: Mutex<Option<Document>>,
}

impl StagedSource {
    fn new() -> Self {
        Self { next: Mutex::new(None) }
    }

    fn stage(&self, doc: Document) {
        *self.next.lock().unwrap() = Some(doc);
    }
}

impl DocumentSource for StagedSource {
    async fn fetch(&self, document_id: &str) -> Result<Document, SourceError> {
        self.next
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| SourceError::NotFound(document_id.to_owned()))
    }
}

#[derive(Default)]
struct CaptureSink {
    delivered: Vec<String>,
    fail: bool,
}

impl ExportSink for CaptureSink {
    fn deliver(&mut self, text: &str) -> Result<(), ExportError> {
        if self.fail {
            return Err(ExportError::Clipboard("no display".to_owned()));
        }
        self.delivered.push(text.to_owned());
        Ok(())
    }
}

/// [`MemoryKv`] whose deletes can be switched off.
#[derive(Default)]
struct StuckDeleteKv {
    inner: MemoryKv,
    refuse_delete: AtomicBool,
}

impl KvStore for StuckDeleteKv {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        self.inner.set(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<(), KvError> {
        if self.refuse_delete.load(Ordering::SeqCst) {
            return Err(KvError::Sqlite(rusqlite::Error::InvalidQuery));
        }
        self.inner.delete(key).await
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, KvError> {
        self.inner.keys_with_prefix(prefix).await
    }
}

fn doc(texts: &[&str]) -> Document {
    Document::new(
        "specs/intro.md",
        texts
            .iter()
            .map(|t| Block::plain(BlockKind::Paragraph, *t))
            .collect(),
    )
}

#[tokio::test]
async fn comment_follows_its_block_through_a_reorder() {
    let mut co = Coordinator::new(MemoryKv::new());
    let source = StagedSource::new();

    co.mount(doc(&["Intro paragraph...", "Details", "More details", "Closing"]))
        .await;
    co.add_comment(0, "fix typo").await.unwrap();
    assert_eq!(co.store().load("specs/intro.md").await.len(), 1);

    source.stage(doc(&["Details", "More details", "Closing", "Intro paragraph..."]));
    let outcome = co.on_live_update(Trigger::parse("reload"), &source).await;
    let markers = match outcome {
        LiveUpdateOutcome::Refreshed(markers) => markers,
        other => panic!("expected refreshed markers, got {other:?}"),
    };
    assert_eq!(markers[&3], MarkerState { count: 1, has_comment: true });
    assert!(!markers[&0].has_comment);

    let stored = co.store().load("specs/intro.md").await;
    assert_eq!(stored[0].block_index, 3);
    assert_eq!(stored[0].block_text_preview, "Intro paragraph...");

    let mut sink = CaptureSink::default();
    let outcome = co.export(&mut sink).await;
    assert!(matches!(outcome, ExportOutcome::Delivered { comments: 1, purged: true }));
    assert_eq!(sink.delivered.len(), 1);
    let prompt = &sink.delivered[0];
    assert!(prompt.contains("specification file: specs/intro.md"));
    assert!(prompt.ends_with("### Section starting with: \"Intro paragraph...\"\n- fix typo"));
    assert_eq!(prompt.matches("### Section").count(), 1);

    assert!(co.store().load("specs/intro.md").await.is_empty());
    assert!(co.comments().is_empty());
}

#[tokio::test]
async fn reconciling_consistent_state_rewrites_identical_bytes() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("a.db").to_string_lossy().to_string();
    let mut co = Coordinator::new(SqliteKv::open(&path).await.unwrap());
    let source = StagedSource::new();

    co.mount(doc(&["alpha text", "beta text", "gamma text"])).await;
    co.add_comment(1, "one").await.unwrap();
    co.add_comment(2, "two").await.unwrap();
    let key = storage_key("specs/intro.md");
    let before = co.store().kv().get(&key).await.unwrap().unwrap();

    source.stage(doc(&["alpha text", "beta text", "gamma text"]));
    co.on_live_update(Trigger::Reload, &source).await;
    let after = co.store().kv().get(&key).await.unwrap().unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn ignored_payload_does_nothing() {
    let mut co = Coordinator::new(MemoryKv::new());
    let source = StagedSource::new();
    co.mount(doc(&["a"])).await;
    let outcome = co.on_live_update(Trigger::parse("ping"), &source).await;
    assert_eq!(outcome, LiveUpdateOutcome::Ignored);
}

#[tokio::test]
async fn live_update_without_comments_still_refreshes() {
    let mut co = Coordinator::new(MemoryKv::new());
    let source = StagedSource::new();
    co.mount(doc(&["a"])).await;

    source.stage(doc(&["a", "b"]));
    match co.on_live_update(Trigger::Reload, &source).await {
        LiveUpdateOutcome::Refreshed(markers) => assert_eq!(markers.len(), 2),
        other => panic!("unexpected outcome {other:?}"),
    }
    assert!(co.store().kv().get(&storage_key("specs/intro.md")).await.unwrap().is_none());
}

#[tokio::test]
async fn failed_fetch_requests_full_reload_and_keeps_comments() {
    let mut co = Coordinator::new(MemoryKv::new());
    let source = StagedSource::new();
    co.mount(doc(&["Intro paragraph...", "Body"])).await;
    co.add_comment(1, "keep me").await.unwrap();

    let outcome = co.on_live_update(Trigger::Reload, &source).await;
    assert_eq!(outcome, LiveUpdateOutcome::FullReload);
    assert_eq!(co.comments().len(), 1, "nothing reconciled against stale state");

    source.stage(doc(&["Body", "Intro paragraph..."]));
    let markers = co.reload_from_scratch("specs/intro.md", &source).await;
    assert_eq!(markers[&0].count, 1);
    assert_eq!(co.comments()[0].text, "keep me");
}

#[tokio::test]
async fn failed_delivery_keeps_comments() {
    let mut co = Coordinator::new(MemoryKv::new());
    co.mount(doc(&["a"])).await;
    co.add_comment(0, "note").await.unwrap();

    let mut sink = CaptureSink { fail: true, ..Default::default() };
    assert!(matches!(co.export(&mut sink).await, ExportOutcome::Failed(_)));
    assert_eq!(co.store().load("specs/intro.md").await.len(), 1);

    let mut empty = CaptureSink::default();
    let id = co.comments()[0].id.clone();
    co.delete_comment(&id).await;
    assert!(matches!(co.export(&mut empty).await, ExportOutcome::Empty));
    assert!(empty.delivered.is_empty());
}

#[tokio::test]
async fn failed_purge_keeps_memory_and_store_in_step() {
    let mut co = Coordinator::new(StuckDeleteKv::default());
    co.mount(doc(&["a", "b"])).await;
    co.add_comment(1, "note").await.unwrap();
    co.store().kv().refuse_delete.store(true, Ordering::SeqCst);

    let mut sink = CaptureSink::default();
    let outcome = co.export(&mut sink).await;
    assert!(matches!(
        outcome,
        ExportOutcome::Delivered { comments: 1, purged: false }
    ));
    assert_eq!(co.comments().len(), 1, "still pending in memory");
    assert_eq!(co.store().count("specs/intro.md").await, 1);

    // Remounting agrees with what is on screen.
    co.mount(doc(&["a", "b"])).await;
    assert_eq!(co.comments().len(), 1);

    co.store().kv().refuse_delete.store(false, Ordering::SeqCst);
    let outcome = co.export(&mut sink).await;
    assert!(matches!(
        outcome,
        ExportOutcome::Delivered { comments: 1, purged: true }
    ));
    assert_eq!(sink.delivered.len(), 2);
    assert_eq!(sink.delivered[0], sink.delivered[1]);
    assert!(co.comments().is_empty());
    assert_eq!(co.store().count("specs/intro.md").await, 0);
}

#[tokio::test]
async fn unmatched_comment_survives_rewrite() {
    let mut co = Coordinator::new(MemoryKv::new());
    let source = StagedSource::new();
    co.mount(doc(&["Intro", "The quick brown fox jumps over the lazy dog"]))
        .await;
    co.add_comment(1, "orphan soon").await.unwrap();

    source.stage(doc(&["Intro", "Entirely rewritten paragraph"]));
    co.on_live_update(Trigger::Reload, &source).await;

    let stored = co.store().load("specs/intro.md").await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].block_index, 1);
    assert_eq!(
        stored[0].block_text_preview,
        "The quick brown fox jumps over the lazy dog"
    );
}

#[tokio::test]
async fn filesystem_source_drives_live_update() {
    let dir = tempfile::TempDir::new().unwrap();
    let file = dir.path().join("spec.md");
    std::fs::write(&file, "# Title\n\nIntro paragraph here.\n\nBody.\n").unwrap();

    let source = FsSource::new(dir.path());
    let mut co = Coordinator::new(MemoryKv::new());
    co.mount(source.fetch("spec.md").await.unwrap()).await;
    co.add_comment(1, "reword").await.unwrap();

    std::fs::write(&file, "# Title\n\nNew lead-in.\n\nIntro paragraph here.\n\nBody.\n").unwrap();
    co.on_live_update(Trigger::Reload, &source).await;
    assert_eq!(co.comments()[0].block_index, 2);
}
