//! Annotation store: versioned envelope persistence per document identity.
//!
//! The store is a cache over a document the user can always re-derive, so
//! reads never fail: an absent, unparseable, or wrong-version blob loads as an
//! empty collection. Writes always replace the whole collection; an empty
//! collection deletes the key instead.

use crate::error::{EnvelopeError, KvError};
use crate::events::{EventBus, Notification};
use crate::kv::KvStore;
use crate::types::{Comment, Envelope, ENVELOPE_VERSION};

/// Prefix of every persistence key.
pub const KEY_PREFIX: &str = "specComments:";

/// Returns the persistence key for `document_id`.
pub fn storage_key(document_id: &str) -> String {
    format!("{KEY_PREFIX}{document_id}")
}

/// Parses a persisted blob, rejecting anything but a version-1 envelope.
///
/// # Errors
///
/// Returns `EnvelopeError::Malformed` for invalid JSON or shape, and
/// `EnvelopeError::Version` for any version other than [`ENVELOPE_VERSION`].
pub fn parse_envelope(raw: &str) -> Result<Vec<Comment>, EnvelopeError> {
    let envelope: Envelope = serde_json::from_str(raw)?;
    if envelope.version != ENVELOPE_VERSION {
        return Err(EnvelopeError::Version(envelope.version));
    }
    Ok(envelope.comments)
}

/// Serializes `comments` into a current-version envelope. Field order is
/// fixed, so identical collections always produce identical bytes.
///
/// # Errors
///
/// Returns `EnvelopeError::Malformed` if serialization fails.
pub fn encode_envelope(comments: &[Comment]) -> Result<String, EnvelopeError> {
    Ok(serde_json::to_string(&Envelope::current(comments.to_vec()))?)
}

/// Persists comment collections through a [`KvStore`] and announces every
/// successful write on the [`EventBus`].
pub struct AnnotationStore<K> {
    kv: K,
    bus: EventBus,
}

impl<K: KvStore> AnnotationStore<K> {
    pub fn new(kv: K, bus: EventBus) -> Self {
        Self { kv, bus }
    }

    /// The underlying key-value collaborator.
    pub fn kv(&self) -> &K {
        &self.kv
    }

    /// Loads the comments of `document_id`.
    ///
    /// Absent, malformed, or wrong-version data yields an empty vector; the
    /// cause is logged at `warn` and otherwise swallowed.
    pub async fn load(&self, document_id: &str) -> Vec<Comment> {
        let key = storage_key(document_id);
        let raw = match self.kv.get(&key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(document = document_id, error = %e, "comment store read failed");
                return Vec::new();
            }
        };
        match parse_envelope(&raw) {
            Ok(comments) => comments,
            Err(e) => {
                tracing::warn!(document = document_id, error = %e, "discarding stored comments");
                Vec::new()
            }
        }
    }

    /// Replaces the stored collection of `document_id` with `comments`.
    ///
    /// An empty slice deletes the key. Publishes
    /// [`Notification::CommentsChanged`] after the write succeeds.
    ///
    /// # Errors
    ///
    /// Returns `KvError` if encoding or the underlying write fails; nothing is
    /// written or published in that case.
    pub async fn save(&self, document_id: &str, comments: &[Comment]) -> Result<(), KvError> {
        let key = storage_key(document_id);
        if comments.is_empty() {
            self.kv.delete(&key).await?;
        } else {
            let raw = encode_envelope(comments)?;
            self.kv.set(&key, &raw).await?;
        }
        tracing::debug!(document = document_id, count = comments.len(), "comments saved");
        self.bus.publish(Notification::CommentsChanged);
        Ok(())
    }

    /// Unconditionally deletes the collection of `document_id` and publishes
    /// [`Notification::CommentsChanged`].
    ///
    /// # Errors
    ///
    /// Returns `KvError` if the delete fails.
    pub async fn purge(&self, document_id: &str) -> Result<(), KvError> {
        self.kv.delete(&storage_key(document_id)).await?;
        tracing::info!(document = document_id, "comments purged");
        self.bus.publish(Notification::CommentsChanged);
        Ok(())
    }

    /// Number of stored comments for `document_id` (0 when absent or corrupt).
    pub async fn count(&self, document_id: &str) -> usize {
        self.load(document_id).await.len()
    }

    /// Document identities that currently have a stored collection.
    pub async fn stored_documents(&self) -> Vec<String> {
        match self.kv.keys_with_prefix(KEY_PREFIX).await {
            Ok(keys) => keys
                .into_iter()
                .filter_map(|k| k.strip_prefix(KEY_PREFIX).map(str::to_owned))
                .collect(),
            Err(e) => {
                tracing::warn!(error = %e, "listing stored documents failed");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKv;

    /// Accepts reads but refuses every write.
    struct ReadOnlyKv(MemoryKv);

    impl KvStore for ReadOnlyKv {
        async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
            self.0.get(key).await
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<(), KvError> {
            Err(KvError::Sqlite(rusqlite::Error::InvalidQuery))
        }

        async fn delete(&self, _key: &str) -> Result<(), KvError> {
            Err(KvError::Sqlite(rusqlite::Error::InvalidQuery))
        }

        async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, KvError> {
            self.0.keys_with_prefix(prefix).await
        }
    }

    fn note(id: &str) -> Comment {
        Comment {
            id: id.into(),
            block_index: 0,
            block_text_preview: "Intro".into(),
            text: "fix typo".into(),
            created_at: "2026-01-01T00:00:00.000Z".into(),
        }
    }

    #[tokio::test]
    async fn failed_write_reports_error_and_stays_silent() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let store = AnnotationStore::new(ReadOnlyKv(MemoryKv::new()), bus);

        assert!(store.save("a.md", &[note("c1")]).await.is_err());
        assert!(store.purge("a.md").await.is_err());
        assert!(rx.try_recv().is_err(), "no change announced");
        assert!(store.kv().get(&storage_key("a.md")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn saved_bytes_are_a_parseable_envelope() {
        let store = AnnotationStore::new(MemoryKv::new(), EventBus::new());
        store.save("a.md", &[note("c1"), note("c2")]).await.unwrap();
        let raw = store.kv().get(&storage_key("a.md")).await.unwrap().unwrap();
        assert!(!raw.is_empty());
        assert_eq!(parse_envelope(&raw).unwrap().len(), 2);
    }

    #[test]
    fn rejects_other_versions() {
        let raw = r#"{"version":2,"comments":[]}"#;
        assert!(matches!(parse_envelope(raw), Err(EnvelopeError::Version(2))));
    }

    #[test]
    fn rejects_wrong_shape() {
        assert!(parse_envelope("not json").is_err());
        assert!(parse_envelope(r#"{"version":1}"#).is_err());
        assert!(parse_envelope(r#"{"version":1,"comments":{}}"#).is_err());
        assert!(parse_envelope("[]").is_err());
    }

    #[test]
    fn wire_shape_uses_camel_case() {
        let c = Comment {
            id: "c1".into(),
            block_index: 3,
            block_text_preview: "Intro".into(),
            text: "fix typo".into(),
            created_at: "2026-01-01T00:00:00.000Z".into(),
        };
        assert_eq!(
            encode_envelope(&[c]).unwrap(),
            r#"{"version":1,"comments":[{"id":"c1","blockIndex":3,"blockTextPreview":"Intro","text":"fix typo","createdAt":"2026-01-01T00:00:00.000Z"}]}"#
        );
    }

    #[test]
    fn storage_key_is_prefixed() {
        assert_eq!(storage_key("api/auth.md"), "specComments:api/auth.md");
    }
}
