//! Block accessor: the mounted document and per-block text fingerprints.
//!
//! A preview is the trimmed text content of a block cut to its first
//! [`PREVIEW_LEN`] characters. It is the content-identity anchor stored on
//! every comment, so it must stay deterministic for identical content.

use crate::types::Block;

/// Maximum preview length in characters (not bytes).
pub const PREVIEW_LEN: usize = 80;

/// A rendered document currently mounted in the viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Document identity (e.g. path relative to the spec folder).
    pub id: String,
    /// Top-level blocks in document order.
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new(id: impl Into<String>, blocks: Vec<Block>) -> Self {
        Self {
            id: id.into(),
            blocks,
        }
    }
}

/// Returns the block sequence of `doc` in document order, or an empty slice
/// when no document is mounted.
pub fn list_blocks(doc: Option<&Document>) -> &[Block] {
    doc.map(|d| d.blocks.as_slice()).unwrap_or(&[])
}

/// Computes the preview of `block`: trimmed text, first 80 characters, no
/// truncation marker.
pub fn preview(block: &Block) -> String {
    truncate_chars(block.text.trim(), PREVIEW_LEN)
}

/// Previews for every block, index-aligned with `blocks`.
pub fn previews(blocks: &[Block]) -> Vec<String> {
    blocks.iter().map(preview).collect()
}

/// Returns the first `n` characters of `s` without splitting a code point.
pub(crate) fn truncate_chars(s: &str, n: usize) -> String {
    match s.char_indices().nth(n) {
        Some((byte_idx, _)) => s[..byte_idx].to_owned(),
        None => s.to_owned(),
    }
}
