//! Reconciliation: re-anchor stored comments onto the current block list.
//!
//! Block order and count change whenever the document is regenerated, so a
//! raw index is not a stable identity. Each comment is matched by content in
//! this order, stopping at the first hit:
//!
//! 1. its stored index still holds a block with the identical preview;
//! 2. some block anywhere has the identical preview (lowest index wins);
//! 3. some block shares the first [`PREFIX_LEN`] characters of the preview
//!    (lowest index wins);
//! 4. nothing matches, and the anchor is left as it was.
//!
//! An exact match always outranks a prefix match regardless of position.

use crate::blocks::{previews, truncate_chars};
use crate::types::{Block, Comment};

/// Number of leading preview characters compared by the prefix fallback.
pub const PREFIX_LEN: usize = 40;

/// Outcome counts of one reconciliation pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Comments whose stored index still pointed at identical content.
    pub unchanged: usize,
    /// Comments moved to a block with an identical preview.
    pub exact: usize,
    /// Comments moved to a block sharing the preview prefix.
    pub prefix: usize,
    /// Comments with no matching block; their anchor is stale.
    pub orphaned: usize,
}

impl ReconcileReport {
    /// Number of comments whose anchor was rewritten.
    pub fn moved(&self) -> usize {
        self.exact + self.prefix
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    InPlace,
    Exact(usize),
    Prefix(usize),
    Lost,
}

/// Re-anchors every comment in `comments` against `blocks`, in place.
///
/// After an exact or prefix move the comment carries the matched block's
/// index and its current preview. Unmatched comments are never dropped.
pub fn reconcile(comments: &mut [Comment], blocks: &[Block]) -> ReconcileReport {
    let previews = previews(blocks);
    let mut report = ReconcileReport::default();

    for comment in comments.iter_mut() {
        match locate(comment, &previews) {
            Anchor::InPlace => report.unchanged += 1,
            Anchor::Exact(idx) => {
                comment.block_index = idx;
                report.exact += 1;
            }
            Anchor::Prefix(idx) => {
                comment.block_index = idx;
                comment.block_text_preview = previews[idx].clone();
                report.prefix += 1;
            }
            Anchor::Lost => report.orphaned += 1,
        }
    }

    report
}

fn locate(comment: &Comment, previews: &[String]) -> Anchor {
    let stored = comment.block_text_preview.as_str();

    if previews.get(comment.block_index).map(String::as_str) == Some(stored) {
        return Anchor::InPlace;
    }

    if let Some(idx) = previews.iter().position(|p| p == stored) {
        return Anchor::Exact(idx);
    }

    if stored.is_empty() {
        return Anchor::Lost;
    }
    let head = truncate_chars(stored, PREFIX_LEN);
    previews
        .iter()
        .position(|p| !p.is_empty() && truncate_chars(p, PREFIX_LEN) == head)
        .map_or(Anchor::Lost, Anchor::Prefix)
}
