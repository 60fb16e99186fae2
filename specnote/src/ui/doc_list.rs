//! Catalog panel renderer.
//!
//! Files are listed by name under a header row for each folder; root-level
//! files come first without a header. A badge shows how many comments are
//! stored for that document; the mounted document is marked.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState},
};
use specnote_core::catalog::CatalogEntry;

use crate::app::{AppState, PanelFocus};
use crate::ui::layout::{palette, panel_block};

/// One display row of the catalog panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CatalogRow<'a> {
    Folder(&'a str),
    /// Index into the catalog.
    Entry(usize),
}

/// Interleaves folder headers with entries. Relies on `discover` keeping each
/// folder's files contiguous.
fn catalog_rows(catalog: &[CatalogEntry]) -> Vec<CatalogRow<'_>> {
    let mut rows = Vec::with_capacity(catalog.len());
    let mut current: Option<&str> = None;
    for (i, entry) in catalog.iter().enumerate() {
        let folder = entry.folder();
        if !folder.is_empty() && current != Some(folder) {
            rows.push(CatalogRow::Folder(folder));
        }
        current = Some(folder);
        rows.push(CatalogRow::Entry(i));
    }
    rows
}

pub fn render_doc_list(frame: &mut Frame, area: Rect, focus: PanelFocus, state: &mut AppState) {
    let title = if state.catalog.is_empty() {
        "Documents".to_owned()
    } else {
        format!("Documents ({})", state.catalog.len())
    };
    let block = panel_block(title, focus == PanelFocus::Documents);

    let rows = catalog_rows(&state.catalog);
    let items: Vec<ListItem> = if rows.is_empty() {
        vec![ListItem::new(Line::raw("No markdown files"))]
    } else {
        rows.iter()
            .map(|row| match *row {
                CatalogRow::Folder(folder) => ListItem::new(Line::styled(
                    format!("{folder}/"),
                    Style::default().fg(palette::HEADING).add_modifier(Modifier::BOLD),
                )),
                CatalogRow::Entry(i) => {
                    let entry = &state.catalog[i];
                    let open = state.open_document.as_deref() == Some(entry.id.as_str());
                    let count = state.badges.get(&entry.id).copied().unwrap_or(0);
                    let indent = if entry.folder().is_empty() { 0 } else { 2 };
                    catalog_item(&entry.name, indent, open, count)
                }
            })
            .collect()
    };

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().fg(palette::SELECTED).add_modifier(Modifier::REVERSED));

    // Selection lives in catalog space; the widget needs it in row space.
    let selected_row = state
        .doc_list_state
        .selected()
        .and_then(|sel| rows.iter().position(|r| *r == CatalogRow::Entry(sel)));
    let mut view = ListState::default()
        .with_offset(state.doc_list_state.offset())
        .with_selected(selected_row);
    frame.render_stateful_widget(list, area, &mut view);
    *state.doc_list_state.offset_mut() = view.offset();
}

/// Format: `● intro.md  (3)`; the dot marks the mounted document and the
/// badge is omitted at zero.
fn catalog_item(name: &str, indent: usize, open: bool, count: usize) -> ListItem<'static> {
    let mark = if open {
        Span::styled("● ", Style::default().fg(palette::SELECTED))
    } else {
        Span::raw("  ")
    };
    let mut spans = vec![Span::raw(" ".repeat(indent)), mark, Span::raw(name.to_owned())];
    if count > 0 {
        spans.push(Span::styled(
            format!("  ({count})"),
            Style::default().fg(palette::BADGE),
        ));
    }
    ListItem::new(Line::from(spans))
}
