//! Lifecycle coordinator: the single actor that owns the mounted document and
//! its comment collection.
//!
//! # Triggers
//!
//! | Trigger | Sequence |
//! |---------|----------|
//! | document ready | load → reconcile → persist → markers |
//! | live update (`"reload"`) | fetch → replace document → reconcile → persist → markers |
//! | comment add / delete | mutate in memory → persist → markers |
//! | export | format → deliver → purge → clear memory (each step only after the previous one succeeded) |
//!
//! Every mutating operation takes `&mut self`, so triggers are handled strictly
//! one after another in arrival order. Store write failures are logged and
//! swallowed; the in-memory collection stays authoritative until the next
//! successful write.

use chrono::{SecondsFormat, Utc};
use tokio::sync::mpsc;

use crate::blocks::{list_blocks, preview, Document};
use crate::error::ExportError;
use crate::events::{EventBus, Notification};
use crate::export::ExportSink;
use crate::kv::KvStore;
use crate::live::{DocumentSource, Trigger};
use crate::markers::{compute_marker_state, Markers};
use crate::prompt::format_comments;
use crate::reconcile::reconcile;
use crate::store::AnnotationStore;
use crate::types::{Block, Comment};

/// Result of handling a live-update trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveUpdateOutcome {
    /// The payload was not a reload request.
    Ignored,
    /// The document was replaced and reconciled; fresh marker state attached.
    Refreshed(Markers),
    /// The replacement could not be fetched. The caller must take the heavier
    /// path and re-mount from scratch (see [`Coordinator::reload_from_scratch`]).
    FullReload,
}

/// Result of an export request.
#[derive(Debug)]
pub enum ExportOutcome {
    /// Nothing to export; the sink was not called.
    Empty,
    /// The sink accepted the prompt. `purged` is false when the store could
    /// not be cleared; the comments then stay mounted and stored.
    Delivered { comments: usize, purged: bool },
    /// The sink refused the prompt; comments are kept.
    Failed(ExportError),
}

/// Owns the annotation state for the currently open document.
pub struct Coordinator<K> {
    store: AnnotationStore<K>,
    bus: EventBus,
    document: Option<Document>,
    comments: Vec<Comment>,
}

impl<K: KvStore> Coordinator<K> {
    /// Creates a coordinator over `kv` with no document mounted.
    pub fn new(kv: K) -> Self {
        let bus = EventBus::new();
        Self {
            store: AnnotationStore::new(kv, bus.clone()),
            bus,
            document: None,
            comments: Vec::new(),
        }
    }

    /// Registers a listener for [`Notification`]s.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<Notification> {
        self.bus.subscribe()
    }

    pub fn store(&self) -> &AnnotationStore<K> {
        &self.store
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn document_id(&self) -> Option<&str> {
        self.document.as_ref().map(|d| d.id.as_str())
    }

    /// Current blocks; empty when nothing is mounted.
    pub fn blocks(&self) -> &[Block] {
        list_blocks(self.document.as_ref())
    }

    /// The in-memory collection for the mounted document, in insertion order.
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Comments currently anchored at `block_index`, in insertion order.
    pub fn comments_for_block(&self, block_index: usize) -> Vec<&Comment> {
        self.comments
            .iter()
            .filter(|c| c.block_index == block_index)
            .collect()
    }

    /// Marker state for the mounted document.
    pub fn markers(&self) -> Markers {
        compute_marker_state(self.blocks(), &self.comments)
    }

    /// Document-ready trigger: mounts `document`, loads its stored comments,
    /// reconciles them against the new blocks, and returns marker state.
    pub async fn mount(&mut self, document: Document) -> Markers {
        self.comments = self.store.load(&document.id).await;
        tracing::info!(
            document = %document.id,
            blocks = document.blocks.len(),
            comments = self.comments.len(),
            "document mounted"
        );
        self.document = Some(document);
        self.reconcile().await;
        self.markers()
    }

    /// Drops the mounted document and its in-memory comments.
    pub fn unmount(&mut self) {
        self.document = None;
        self.comments.clear();
    }

    /// Live-update trigger.
    ///
    /// On `Reload`, fetches the replacement for the open identity from
    /// `source`. Reconciliation runs only after a successful fetch; a failed
    /// fetch (or nothing mounted) asks the caller for a full reload.
    pub async fn on_live_update<S: DocumentSource>(
        &mut self,
        trigger: Trigger,
        source: &S,
    ) -> LiveUpdateOutcome {
        if trigger == Trigger::Ignored {
            return LiveUpdateOutcome::Ignored;
        }
        let Some(id) = self.document_id().map(str::to_owned) else {
            return LiveUpdateOutcome::FullReload;
        };
        match source.fetch(&id).await {
            Ok(document) => {
                tracing::debug!(document = %id, blocks = document.blocks.len(), "live update fetched");
                self.document = Some(document);
                self.reconcile().await;
                LiveUpdateOutcome::Refreshed(self.markers())
            }
            Err(e) => {
                tracing::warn!(document = %id, error = %e, "live update fetch failed; full reload");
                LiveUpdateOutcome::FullReload
            }
        }
    }

    /// The heavier fallback after a failed live update: forgets all in-memory
    /// state and re-mounts `document_id` from `source` and the store.
    ///
    /// If the document still cannot be fetched, nothing stays mounted and the
    /// returned marker state is empty.
    pub async fn reload_from_scratch<S: DocumentSource>(
        &mut self,
        document_id: &str,
        source: &S,
    ) -> Markers {
        self.unmount();
        match source.fetch(document_id).await {
            Ok(document) => self.mount(document).await,
            Err(e) => {
                tracing::warn!(document = document_id, error = %e, "full reload failed");
                Markers::new()
            }
        }
    }

    /// Adds a comment on `block_index` of the mounted document.
    ///
    /// `text` is trimmed; blank text, an out-of-range index, or no mounted
    /// document is ignored and returns `None`.
    pub async fn add_comment(&mut self, block_index: usize, text: &str) -> Option<Comment> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let block = self.blocks().get(block_index)?;
        let comment = Comment {
            id: uuid::Uuid::new_v4().to_string(),
            block_index,
            block_text_preview: preview(block),
            text: text.to_owned(),
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        self.comments.push(comment.clone());
        self.persist().await;
        Some(comment)
    }

    /// Deletes the comment with `id`. Returns `false` when no comment matched.
    pub async fn delete_comment(&mut self, id: &str) -> bool {
        let before = self.comments.len();
        self.comments.retain(|c| c.id != id);
        if self.comments.len() == before {
            return false;
        }
        self.persist().await;
        true
    }

    /// Formats the collection, hands it to `sink`, and purges the store only
    /// once the sink has accepted it.
    ///
    /// The in-memory collection is cleared only after the purge succeeds, so
    /// memory and store never disagree about what is still pending.
    pub async fn export<E: ExportSink>(&mut self, sink: &mut E) -> ExportOutcome {
        let Some(id) = self.document_id().map(str::to_owned) else {
            return ExportOutcome::Empty;
        };
        if self.comments.is_empty() {
            return ExportOutcome::Empty;
        }
        let prompt = format_comments(&id, &self.comments);
        if let Err(e) = sink.deliver(&prompt) {
            tracing::warn!(document = %id, error = %e, "export delivery failed");
            return ExportOutcome::Failed(e);
        }
        let count = self.comments.len();
        let purged = match self.store.purge(&id).await {
            Ok(()) => {
                self.comments.clear();
                true
            }
            Err(e) => {
                tracing::warn!(document = %id, error = %e, "purge after export failed");
                false
            }
        };
        ExportOutcome::Delivered {
            comments: count,
            purged,
        }
    }

    /// Indicator interaction: parses a raw block-index payload and publishes
    /// [`Notification::OpenAnnotationRequested`].
    ///
    /// Returns the parsed index; malformed or out-of-range payloads are
    /// ignored and return `None`.
    pub fn request_open(&self, raw: &str) -> Option<usize> {
        let block_index: usize = raw.trim().parse().ok()?;
        if block_index >= self.blocks().len() {
            return None;
        }
        self.bus
            .publish(Notification::OpenAnnotationRequested { block_index });
        Some(block_index)
    }

    /// Reconciles the in-memory collection against the mounted blocks and
    /// persists it once. A no-op without comments.
    async fn reconcile(&mut self) {
        if self.comments.is_empty() {
            return;
        }
        let Some(document) = self.document.as_ref() else {
            return;
        };
        let report = reconcile(&mut self.comments, &document.blocks);
        tracing::debug!(
            document = %document.id,
            unchanged = report.unchanged,
            exact = report.exact,
            prefix = report.prefix,
            orphaned = report.orphaned,
            moved = report.moved(),
            "reconciled comments"
        );
        self.persist().await;
    }

    async fn persist(&self) {
        let Some(id) = self.document_id() else {
            return;
        };
        if let Err(e) = self.store.save(id, &self.comments).await {
            tracing::warn!(document = id, error = %e, "comment store write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKv;
    use crate::types::BlockKind;

    fn doc(id: &str, texts: &[&str]) -> Document {
        Document::new(
            id,
            texts
                .iter()
                .map(|t| Block::plain(BlockKind::Paragraph, *t))
                .collect(),
        )
    }

    #[tokio::test]
    async fn add_ignores_blank_text_and_bad_index() {
        let mut co = Coordinator::new(MemoryKv::new());
        assert!(co.add_comment(0, "no document").await.is_none());

        co.mount(doc("a.md", &["one"])).await;
        assert!(co.add_comment(0, "   ").await.is_none());
        assert!(co.add_comment(5, "out of range").await.is_none());
        assert!(co.comments().is_empty());
    }

    #[tokio::test]
    async fn add_captures_preview_and_timestamp() {
        let mut co = Coordinator::new(MemoryKv::new());
        co.mount(doc("a.md", &["  first block  ", "second"])).await;
        let c = co.add_comment(0, "  tighten wording ").await.unwrap();
        assert_eq!(c.block_text_preview, "first block");
        assert_eq!(c.text, "tighten wording");
        assert!(c.created_at.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&c.created_at).is_ok());
        assert_eq!(co.markers()[&0].count, 1);
    }

    #[tokio::test]
    async fn delete_unknown_id_is_noop() {
        let mut co = Coordinator::new(MemoryKv::new());
        co.mount(doc("a.md", &["one"])).await;
        let c = co.add_comment(0, "note").await.unwrap();
        assert!(!co.delete_comment("nope").await);
        assert!(co.delete_comment(&c.id).await);
        assert!(co.comments().is_empty());
        assert!(co.store().kv().get("specComments:a.md").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn request_open_ignores_malformed_payloads() {
        let mut co = Coordinator::new(MemoryKv::new());
        co.mount(doc("a.md", &["one", "two"])).await;
        let mut rx = co.subscribe();

        assert_eq!(co.request_open("x"), None);
        assert_eq!(co.request_open("-1"), None);
        assert_eq!(co.request_open("9"), None);
        assert!(rx.try_recv().is_err());

        assert_eq!(co.request_open(" 1 "), Some(1));
        assert_eq!(
            rx.try_recv().unwrap(),
            Notification::OpenAnnotationRequested { block_index: 1 }
        );
    }

    #[tokio::test]
    async fn mutations_notify_listeners() {
        let mut co = Coordinator::new(MemoryKv::new());
        co.mount(doc("a.md", &["one"])).await;
        let mut rx = co.subscribe();

        let c = co.add_comment(0, "note").await.unwrap();
        assert_eq!(rx.try_recv().unwrap(), Notification::CommentsChanged);
        co.delete_comment(&c.id).await;
        assert_eq!(rx.try_recv().unwrap(), Notification::CommentsChanged);
    }
}
