use serde::{Deserialize, Serialize};

/// Envelope version written by this build. Any other version on disk is
/// discarded on load.
pub const ENVELOPE_VERSION: u32 = 1;

/// A single annotation anchored to one block of a document.
///
/// `id`, `text` and `created_at` never change after creation. The anchor pair
/// (`block_index`, `block_text_preview`) is rewritten by reconciliation so that
/// it keeps pointing at the same content after the document is regenerated.
///
/// Field names serialize in camelCase to match the persisted record shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,                 // UUID v4 text
    pub block_index: usize,
    pub block_text_preview: String, // <= 80 chars
    pub text: String,
    pub created_at: String,         // ISO-8601 UTC
}

/// The persisted unit for one document identity.
///
/// Serialized as `{"version": 1, "comments": [...]}`. An empty collection is
/// never written; absence of the key is the canonical empty state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub version: u32,
    pub comments: Vec<Comment>,
}

impl Envelope {
    /// Wraps `comments` in an envelope stamped with [`ENVELOPE_VERSION`].
    pub fn current(comments: Vec<Comment>) -> Self {
        Self {
            version: ENVELOPE_VERSION,
            comments,
        }
    }
}

/// The structural kind of a top-level document block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Heading(u8),
    Paragraph,
    List,
    CodeBlock,
    BlockQuote,
    Table,
    Rule,
    Html,
}

impl BlockKind {
    /// Short label shown next to blocks in the document panel.
    pub fn label(self) -> &'static str {
        match self {
            BlockKind::Heading(_) => "h",
            BlockKind::Paragraph => "p",
            BlockKind::List => "ul",
            BlockKind::CodeBlock => "pre",
            BlockKind::BlockQuote => "quote",
            BlockKind::Table => "table",
            BlockKind::Rule => "hr",
            BlockKind::Html => "html",
        }
    }
}

/// One rendered top-level element of a document.
///
/// Blocks are owned by the renderer and only read by the annotation engine.
/// `text` is the element's text content with markup removed; `source` is the
/// markdown slice it was parsed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub text: String,
    pub source: String,
}

impl Block {
    /// Builds a block whose `source` equals its `text`. Handy for callers that
    /// already hold plain text blocks.
    pub fn plain(kind: BlockKind, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            kind,
            source: text.clone(),
            text,
        }
    }
}

/// Per-block indicator state consumed by whatever draws comment markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MarkerState {
    pub count: usize,
    pub has_comment: bool,
}
