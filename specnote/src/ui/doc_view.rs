//! Document panel renderer.
//!
//! Each top-level block is a single row: its marker indicator, a kind tag, and
//! the first line of its text, with `…` when more follows. Single-line rows
//! keep mouse hit-testing a plain offset calculation (see
//! `keybindings::handle_mouse`); the Comments panel shows the full source of
//! the selected block.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem},
};
use specnote_core::{Block, BlockKind, MarkerState};

use crate::app::{AppState, PanelFocus};
use crate::ui::layout::{palette, panel_block};

pub fn render_doc_view(frame: &mut Frame, area: Rect, focus: PanelFocus, state: &mut AppState) {
    let title = match &state.open_document {
        Some(id) => format!("Document: {id}"),
        None => "Document".to_owned(),
    };
    let block = panel_block(title, focus == PanelFocus::Document);

    let items: Vec<ListItem> = if state.blocks.is_empty() {
        let msg = if state.open_document.is_some() {
            "Document is empty"
        } else {
            "Select a spec and press Enter"
        };
        vec![ListItem::new(Line::raw(msg))]
    } else {
        state
            .blocks
            .iter()
            .enumerate()
            .map(|(i, b)| {
                let marker = state.markers.get(&i).copied().unwrap_or_default();
                block_row(b, marker)
            })
            .collect()
    };

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    frame.render_stateful_widget(list, area, &mut state.block_list_state);
}

fn block_row(block: &Block, marker: MarkerState) -> ListItem<'static> {
    let indicator = if marker.has_comment {
        Span::styled(format!("[{}] ", marker.count), Style::default().fg(palette::MARKER))
    } else {
        Span::styled(" ·  ", Style::default().fg(palette::DIM))
    };

    let (tag, text_style) = match block.kind {
        BlockKind::Heading(level) => (
            format!("{:<6}", format!("h{level}")),
            Style::default().fg(palette::HEADING).add_modifier(Modifier::BOLD),
        ),
        kind => (format!("{:<6}", kind.label()), Style::default()),
    };

    let mut lines = block.text.lines();
    let first_line = lines.next().unwrap_or("").trim().to_owned();
    let mut spans = vec![
        indicator,
        Span::styled(tag, Style::default().fg(palette::DIM)),
        Span::styled(first_line, text_style),
    ];
    if lines.next().is_some() {
        spans.push(Span::styled(" …", Style::default().fg(palette::DIM)));
    }
    ListItem::new(Line::from(spans))
}
