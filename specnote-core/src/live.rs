//! Live-update collaborator: trigger payloads and replacement content.

use std::future::Future;
use std::path::{Component, Path, PathBuf};

use crate::blocks::Document;
use crate::error::SourceError;
use crate::render::render_markdown;

/// Payload that asks the viewer to refresh the open document.
pub const RELOAD_PAYLOAD: &str = "reload";

/// A parsed live-update message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// The open document may have changed; fetch and reconcile.
    Reload,
    /// Any other message type. Ignored.
    Ignored,
}

impl Trigger {
    /// Parses a transport payload. Only the exact `"reload"` payload triggers.
    pub fn parse(payload: &str) -> Self {
        if payload == RELOAD_PAYLOAD {
            Trigger::Reload
        } else {
            Trigger::Ignored
        }
    }
}

/// Fetches the latest rendered document for an identity.
pub trait DocumentSource: Send + Sync {
    fn fetch(
        &self,
        document_id: &str,
    ) -> impl Future<Output = Result<Document, SourceError>> + Send;
}

/// [`DocumentSource`] reading markdown files below a root folder.
///
/// Document identities are `/`-separated paths relative to `root`; identities
/// that would escape the root are reported as not found.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolves `document_id` to a path under the root.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::NotFound` for absolute identities or ones
    /// containing `..`.
    pub fn resolve(&self, document_id: &str) -> Result<PathBuf, SourceError> {
        let rel = Path::new(document_id);
        let escapes = rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if document_id.is_empty() || escapes {
            return Err(SourceError::NotFound(document_id.to_owned()));
        }
        Ok(self.root.join(rel))
    }
}

impl DocumentSource for FsSource {
    async fn fetch(&self, document_id: &str) -> Result<Document, SourceError> {
        let path = self.resolve(document_id)?;
        let source = match tokio::fs::read_to_string(&path).await {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SourceError::NotFound(document_id.to_owned()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Document::new(document_id, render_markdown(&source)))
    }
}
