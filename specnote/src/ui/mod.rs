//! UI rendering module for specnote.
//!
//! `render()` is the single entry point called by the event loop's
//! `terminal.draw()` closure. Layout arithmetic and panel chrome live in
//! `layout.rs`; each panel has its own renderer.

mod layout;
pub mod comments;
pub mod doc_list;
pub mod doc_view;
pub mod help;
pub mod keybindings;

use ratatui::Frame;

use crate::app::{AppState, Mode, PanelFocus};
use layout::{compute_layout, inner_rect, render_status_bar};

/// Renders one complete frame: three panels, status bar, and the help overlay
/// when it is open.
///
/// Panel rects and the document viewport height are written back into `state`
/// so the next mouse click and half-page scroll use this frame's geometry.
pub fn render(frame: &mut Frame, state: &mut AppState) {
    let [left, center, right, status_bar] = compute_layout(frame);

    state.panel_rects = [left, center, right];
    if state.catalog_hidden() && state.focus == PanelFocus::Documents {
        state.focus = PanelFocus::Document;
    }
    state.document_viewport_height = inner_rect(center).height;

    let focus = state.focus;

    if left.width > 0 {
        doc_list::render_doc_list(frame, left, focus, state);
    }
    doc_view::render_doc_view(frame, center, focus, state);
    comments::render_comments(frame, right, focus, state);

    render_status_bar(frame, status_bar, state);

    if state.mode == Mode::HelpOverlay {
        help::render_help_overlay(frame, state.help_scroll);
    }
}
