//! Central UI state for specnote.
//!
//! Pure state: the current mode, which panel has focus, list selections, the
//! comment being typed, and a snapshot of the coordinator's view of the open
//! document. Rendering reads it; the keybinding dispatcher and the session
//! mutate it. No ratatui drawing happens here.

use std::collections::BTreeMap;

use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use specnote_core::catalog::CatalogEntry;
use specnote_core::kv::KvStore;
use specnote_core::markers::Markers;
use specnote_core::{Block, Comment, Coordinator};

/// Editor mode controlling which keybinding set is active.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Normal,
    /// Typing a new comment into the status-bar input.
    Insert,
    /// Full-screen help overlay shown above all panels.
    HelpOverlay,
}

/// Which panel currently has keyboard focus.
///
/// Cycle order: `Documents` → `Document` → `Comments` → `Documents`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PanelFocus {
    /// Left panel: the spec catalog.
    #[default]
    Documents,
    /// Centre panel: blocks of the open document.
    Document,
    /// Right panel: comments on the selected block.
    Comments,
}

impl PanelFocus {
    pub fn prev(self) -> Self {
        match self {
            PanelFocus::Documents => PanelFocus::Comments,
            PanelFocus::Document => PanelFocus::Documents,
            PanelFocus::Comments => PanelFocus::Document,
        }
    }

    pub fn next(self) -> Self {
        match self {
            PanelFocus::Documents => PanelFocus::Document,
            PanelFocus::Document => PanelFocus::Comments,
            PanelFocus::Comments => PanelFocus::Documents,
        }
    }
}

/// All mutable UI state passed through every render cycle.
#[derive(Debug, Default)]
pub struct AppState {
    pub mode: Mode,
    pub focus: PanelFocus,

    /// Markdown files under the spec folder.
    pub catalog: Vec<CatalogEntry>,
    /// Stored comment count per document identity (badges).
    pub badges: BTreeMap<String, usize>,
    pub doc_list_state: ListState,

    /// Identity of the mounted document, if any.
    pub open_document: Option<String>,
    /// Snapshot of the mounted document's blocks.
    pub blocks: Vec<Block>,
    /// Marker state for `blocks`.
    pub markers: Markers,
    /// Snapshot of the mounted document's full comment collection.
    pub comments: Vec<Comment>,
    pub block_list_state: ListState,
    pub comment_list_state: ListState,

    /// Text typed in Insert mode.
    pub input: String,
    /// One-line message shown in the status bar until the next action.
    pub status: Option<String>,
    pub help_scroll: u16,

    /// Outer rects of the three panels from the last frame (for mouse hits).
    pub panel_rects: [Rect; 3],
    /// Inner height of the document panel, cached after each render.
    pub document_viewport_height: u16,
}

impl AppState {
    /// Replaces the document snapshot with the coordinator's current view and
    /// clamps every selection to the new bounds.
    pub fn sync_document<K: KvStore>(&mut self, co: &Coordinator<K>) {
        self.open_document = co.document_id().map(str::to_owned);
        self.blocks = co.blocks().to_vec();
        self.markers = co.markers();
        self.comments = co.comments().to_vec();

        clamp(&mut self.block_list_state, self.blocks.len());
        if self.block_list_state.selected().is_none() && !self.blocks.is_empty() {
            self.block_list_state.select(Some(0));
        }
        let n = self.selected_block_comments().len();
        clamp(&mut self.comment_list_state, n);
    }

    /// Installs a freshly discovered catalog, keeping the selection in range.
    pub fn set_catalog(&mut self, catalog: Vec<CatalogEntry>) {
        self.catalog = catalog;
        clamp(&mut self.doc_list_state, self.catalog.len());
        if self.doc_list_state.selected().is_none() && !self.catalog.is_empty() {
            self.doc_list_state.select(Some(0));
        }
    }

    pub fn selected_document(&self) -> Option<&CatalogEntry> {
        self.doc_list_state
            .selected()
            .and_then(|i| self.catalog.get(i))
    }

    pub fn selected_block(&self) -> Option<usize> {
        self.block_list_state
            .selected()
            .filter(|&i| i < self.blocks.len())
    }

    /// Comments anchored at the selected block, in insertion order.
    pub fn selected_block_comments(&self) -> Vec<&Comment> {
        match self.selected_block() {
            Some(idx) => self.comments.iter().filter(|c| c.block_index == idx).collect(),
            None => Vec::new(),
        }
    }

    pub fn selected_comment(&self) -> Option<&Comment> {
        let idx = self.comment_list_state.selected()?;
        self.selected_block_comments().get(idx).copied()
    }

    /// Moves the focused panel's selection down by `n` rows.
    pub fn move_down(&mut self, n: u16) {
        match self.focus {
            PanelFocus::Documents => self.doc_list_state.scroll_down_by(n),
            PanelFocus::Document => {
                self.block_list_state.scroll_down_by(n);
                self.comment_list_state.select(None);
            }
            PanelFocus::Comments => self.comment_list_state.scroll_down_by(n),
        }
        self.clamp_all();
    }

    /// Moves the focused panel's selection up by `n` rows.
    pub fn move_up(&mut self, n: u16) {
        match self.focus {
            PanelFocus::Documents => self.doc_list_state.scroll_up_by(n),
            PanelFocus::Document => {
                self.block_list_state.scroll_up_by(n);
                self.comment_list_state.select(None);
            }
            PanelFocus::Comments => self.comment_list_state.scroll_up_by(n),
        }
        self.clamp_all();
    }

    pub fn move_top(&mut self) {
        match self.focus {
            PanelFocus::Documents => self.doc_list_state.select_first(),
            PanelFocus::Document => self.block_list_state.select_first(),
            PanelFocus::Comments => self.comment_list_state.select_first(),
        }
        self.clamp_all();
    }

    pub fn move_bottom(&mut self) {
        match self.focus {
            PanelFocus::Documents => self.doc_list_state.select_last(),
            PanelFocus::Document => self.block_list_state.select_last(),
            PanelFocus::Comments => self.comment_list_state.select_last(),
        }
        self.clamp_all();
    }

    /// Half the cached document viewport, at least one row.
    pub fn half_page(&self) -> u16 {
        (self.document_viewport_height / 2).max(1)
    }

    /// True while the last frame collapsed the catalog panel to zero width.
    pub fn catalog_hidden(&self) -> bool {
        let [left, center, _] = self.panel_rects;
        left.width == 0 && center.width > 0
    }

    /// Moves focus to the next visible panel.
    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
        if self.focus == PanelFocus::Documents && self.catalog_hidden() {
            self.focus = self.focus.next();
        }
    }

    /// Moves focus to the previous visible panel.
    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
        if self.focus == PanelFocus::Documents && self.catalog_hidden() {
            self.focus = self.focus.prev();
        }
    }

    /// Opens the annotation panel for `block_index`: selects the block and
    /// moves focus to its comments.
    pub fn open_annotations(&mut self, block_index: usize) {
        if block_index >= self.blocks.len() {
            return;
        }
        self.block_list_state.select(Some(block_index));
        self.focus = PanelFocus::Comments;
        let has_comments = !self.selected_block_comments().is_empty();
        self.comment_list_state
            .select(if has_comments { Some(0) } else { None });
    }

    /// Enters Insert mode for a new comment on the selected block.
    pub fn begin_comment(&mut self) {
        if self.selected_block().is_none() {
            self.status = Some("open a document and select a block first".to_owned());
            return;
        }
        self.input.clear();
        self.mode = Mode::Insert;
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = Some(msg.into());
    }

    fn clamp_all(&mut self) {
        clamp(&mut self.doc_list_state, self.catalog.len());
        clamp(&mut self.block_list_state, self.blocks.len());
        let n = self.selected_block_comments().len();
        clamp(&mut self.comment_list_state, n);
    }
}

/// Keeps `state`'s selection inside `0..len` (none when empty).
fn clamp(state: &mut ListState, len: usize) {
    match state.selected() {
        _ if len == 0 => state.select(None),
        Some(i) if i >= len => state.select(Some(len - 1)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use specnote_core::BlockKind;

    fn comment(id: &str, index: usize) -> Comment {
        Comment {
            id: id.to_owned(),
            block_index: index,
            block_text_preview: String::new(),
            text: id.to_owned(),
            created_at: String::new(),
        }
    }

    fn state_with_blocks(n: usize) -> AppState {
        let mut state = AppState::default();
        state.blocks = (0..n)
            .map(|i| Block::plain(BlockKind::Paragraph, format!("block {i}")))
            .collect();
        state.block_list_state.select(Some(0));
        state
    }

    #[test]
    fn focus_cycles_both_ways() {
        let f = PanelFocus::Documents;
        assert_eq!(f.next().next().next(), f);
        assert_eq!(f.prev(), PanelFocus::Comments);
    }

    #[test]
    fn selection_is_clamped_to_blocks() {
        let mut state = state_with_blocks(3);
        state.focus = PanelFocus::Document;
        state.move_down(10);
        assert_eq!(state.selected_block(), Some(2));
        state.move_up(1);
        assert_eq!(state.selected_block(), Some(1));
    }

    #[test]
    fn comment_selection_is_clamped_to_the_block() {
        let mut state = state_with_blocks(2);
        state.comments = vec![comment("a", 0), comment("b", 0), comment("c", 1)];
        state.focus = PanelFocus::Comments;
        state.comment_list_state.select(Some(5));
        state.move_down(1);
        assert_eq!(state.selected_comment().map(|c| c.id.as_str()), Some("b"));
    }

    #[test]
    fn open_annotations_focuses_comments_of_block() {
        let mut state = state_with_blocks(3);
        state.comments = vec![comment("a", 2), comment("b", 0), comment("c", 2)];
        state.open_annotations(2);
        assert_eq!(state.focus, PanelFocus::Comments);
        let ids: Vec<&str> = state.selected_block_comments().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(state.selected_comment().map(|c| c.id.as_str()), Some("a"));

        state.open_annotations(9);
        assert_eq!(state.selected_block(), Some(2), "out of range is ignored");
    }

    #[test]
    fn collapsed_catalog_is_skipped_by_focus_cycle() {
        let mut state = AppState::default();
        state.focus = PanelFocus::Document;
        state.panel_rects = [Rect::new(0, 0, 0, 20), Rect::new(0, 0, 48, 20), Rect::new(47, 0, 33, 20)];
        state.focus_prev();
        assert_eq!(state.focus, PanelFocus::Comments);
        state.focus_next();
        assert_eq!(state.focus, PanelFocus::Document);

        state.panel_rects[0] = Rect::new(0, 0, 22, 20);
        state.focus_prev();
        assert_eq!(state.focus, PanelFocus::Documents);
    }

    #[test]
    fn begin_comment_needs_a_block() {
        let mut state = AppState::default();
        state.begin_comment();
        assert_eq!(state.mode, Mode::Normal);
        assert!(state.status.is_some());

        let mut state = state_with_blocks(1);
        state.input.push_str("stale");
        state.begin_comment();
        assert_eq!(state.mode, Mode::Insert);
        assert!(state.input.is_empty());
    }
}
