//! Per-block comment indicator state.

use std::collections::BTreeMap;

use crate::types::{Block, Comment, MarkerState};

/// Marker state keyed by block index.
pub type Markers = BTreeMap<usize, MarkerState>;

/// Counts comments per block.
///
/// Every index in `0..blocks.len()` is present, with `count == 0` for blocks
/// without comments. Comments whose anchor points past the last block are not
/// reported. Pure: call reconciliation first if freshness matters.
pub fn compute_marker_state(blocks: &[Block], comments: &[Comment]) -> Markers {
    let mut markers: Markers = (0..blocks.len())
        .map(|idx| (idx, MarkerState::default()))
        .collect();

    for comment in comments {
        if let Some(state) = markers.get_mut(&comment.block_index) {
            state.count += 1;
            state.has_comment = true;
        }
    }

    markers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BlockKind;

    fn comment(id: &str, index: usize) -> Comment {
        Comment {
            id: id.to_owned(),
            block_index: index,
            block_text_preview: String::new(),
            text: String::new(),
            created_at: String::new(),
        }
    }

    #[test]
    fn counts_comments_per_block() {
        let blocks = vec![
            Block::plain(BlockKind::Paragraph, "B0"),
            Block::plain(BlockKind::Paragraph, "B1"),
        ];
        let comments = vec![comment("a", 0), comment("b", 0)];
        let markers = compute_marker_state(&blocks, &comments);

        assert_eq!(markers[&0], MarkerState { count: 2, has_comment: true });
        assert_eq!(markers[&1], MarkerState { count: 0, has_comment: false });
    }

    #[test]
    fn out_of_range_anchors_are_skipped() {
        let blocks = vec![Block::plain(BlockKind::Paragraph, "only")];
        let markers = compute_marker_state(&blocks, &[comment("a", 4)]);
        assert_eq!(markers.len(), 1);
        assert!(!markers[&0].has_comment);
    }

    #[test]
    fn no_blocks_no_markers() {
        assert!(compute_marker_state(&[], &[comment("a", 0)]).is_empty());
    }
}
