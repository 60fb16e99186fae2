//! Comments panel renderer.
//!
//! Shows the full markdown source of the selected block followed by every
//! comment currently attached to it. The Document panel only has room for one
//! line per block, so this is where long paragraphs, lists, and code are read.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph, Wrap},
};
use specnote_core::{Block, Comment};

use crate::app::{AppState, PanelFocus};
use crate::ui::layout::{inner_rect, palette, panel_block};

pub fn render_comments(frame: &mut Frame, area: Rect, focus: PanelFocus, state: &mut AppState) {
    let count = state.selected_block_comments().len();
    let title = if count > 0 { format!("Comments ({count})") } else { "Comments".to_owned() };
    frame.render_widget(panel_block(title, focus == PanelFocus::Comments), area);

    let inner = inner_rect(area);
    let Some(block_index) = state.selected_block() else {
        frame.render_widget(
            Paragraph::new(Line::styled("No block selected", Style::default().fg(palette::DIM))),
            inner,
        );
        return;
    };

    let detail = state
        .blocks
        .get(block_index)
        .map(|b| block_detail_lines(block_index, b))
        .unwrap_or_default();
    // Detail takes at most half the panel; the rest stays for comments.
    let detail_height = u16::try_from(detail.len() + 1)
        .unwrap_or(u16::MAX)
        .min((inner.height / 2).max(2));
    let [header, list_area] = inner.layout(&Layout::vertical([
        Constraint::Length(detail_height),
        Constraint::Fill(1),
    ]));
    frame.render_widget(Paragraph::new(detail).wrap(Wrap { trim: false }), header);

    let items: Vec<ListItem> = if count == 0 {
        vec![ListItem::new(Line::styled(
            "No comments. Press c to add one.",
            Style::default().fg(palette::DIM),
        ))]
    } else {
        state.selected_block_comments().into_iter().map(comment_item).collect()
    };

    let list = List::new(items)
        .highlight_style(Style::default().fg(palette::SELECTED).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, list_area, &mut state.comment_list_state);
}

/// A dimmed `Block N · kind` caption followed by the block's source lines.
fn block_detail_lines(index: usize, block: &Block) -> Vec<Line<'static>> {
    let mut lines = vec![Line::styled(
        format!("Block {index} · {}", block.kind.label()),
        Style::default().fg(palette::DIM),
    )];
    lines.extend(
        block
            .source
            .trim_end()
            .lines()
            .map(|l| Line::styled(l.to_owned(), Style::default().add_modifier(Modifier::ITALIC))),
    );
    lines
}

/// Two lines per comment: the text, then its creation time dimmed.
fn comment_item(c: &Comment) -> ListItem<'static> {
    let stamp = c.created_at.get(..16).unwrap_or(&c.created_at).replace('T', " ");
    ListItem::new(vec![
        Line::from(vec![Span::raw("- "), Span::raw(c.text.clone())]),
        Line::styled(format!("  {stamp}"), Style::default().fg(palette::DIM)),
    ])
}
