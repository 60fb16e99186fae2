//! Keybinding dispatcher for specnote.
//!
//! Translates raw crossterm `KeyEvent`s into `AppState` mutations and returns a
//! `KeyAction` telling the event loop what, if anything, to do next. Actions
//! that touch the annotation store are only described here; the session runs
//! them, so this module never awaits.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Position;

use crate::app::{AppState, Mode, PanelFocus};

/// Signal returned from the key dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    /// Nothing further to do; request another render.
    Continue,
    /// Exit cleanly. Comments are persisted on every mutation, so there is
    /// nothing to confirm.
    Quit,
    /// Mount the catalog entry with this identity.
    OpenDocument(String),
    /// Add a comment on `block_index` of the mounted document.
    SubmitComment { block_index: usize, text: String },
    /// Delete the comment with this id.
    DeleteComment(String),
    /// Format the collection and deliver it to the configured sink.
    Export,
    /// Raw indicator payload: open the annotation panel for a block.
    RequestOpen(String),
}

/// Dispatches a key event to the handler matching the current mode.
pub fn handle_key(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match state.mode {
        Mode::HelpOverlay => handle_help(key, state),
        Mode::Normal => handle_normal(key, state),
        Mode::Insert => handle_insert(key, state),
    }
}

// ---------------------------------------------------------------------------
// Normal mode
// ---------------------------------------------------------------------------

fn handle_normal(key: KeyEvent, state: &mut AppState) -> KeyAction {
    if let Some(action) = handle_scroll_key(key, state) {
        return action;
    }

    match key.code {
        KeyCode::Char('H') | KeyCode::BackTab => {
            state.focus_prev();
            KeyAction::Continue
        }
        KeyCode::Char('L') | KeyCode::Tab => {
            state.focus_next();
            KeyAction::Continue
        }

        KeyCode::Enter => match state.focus {
            PanelFocus::Documents => match state.selected_document() {
                Some(entry) => KeyAction::OpenDocument(entry.id.clone()),
                None => KeyAction::Continue,
            },
            PanelFocus::Document => match state.selected_block() {
                Some(idx) => KeyAction::RequestOpen(idx.to_string()),
                None => KeyAction::Continue,
            },
            PanelFocus::Comments => KeyAction::Continue,
        },

        KeyCode::Char('c') => {
            state.begin_comment();
            KeyAction::Continue
        }

        // Delete only acts on an explicitly selected comment.
        KeyCode::Char('d') if state.focus == PanelFocus::Comments => {
            match state.selected_comment() {
                Some(c) => KeyAction::DeleteComment(c.id.clone()),
                None => KeyAction::Continue,
            }
        }

        KeyCode::Char('y') => KeyAction::Export,

        KeyCode::Char('?') => {
            state.help_scroll = 0;
            state.mode = Mode::HelpOverlay;
            KeyAction::Continue
        }

        KeyCode::Char('q') | KeyCode::Esc => KeyAction::Quit,

        _ => KeyAction::Continue,
    }
}

/// Handles j / k / g / G and the Ctrl half-page combos.
///
/// Returns `None` when the key should fall through to the rest of the Normal
/// handler.
fn handle_scroll_key(key: KeyEvent, state: &mut AppState) -> Option<KeyAction> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('j') | KeyCode::Down => state.move_down(1),
        KeyCode::Char('k') | KeyCode::Up => state.move_up(1),
        KeyCode::Char('g') | KeyCode::Home => state.move_top(),
        KeyCode::Char('G') | KeyCode::End => state.move_bottom(),
        KeyCode::Char('d') if ctrl => state.move_down(state.half_page()),
        KeyCode::Char('u') if ctrl => state.move_up(state.half_page()),
        _ => return None,
    }
    Some(KeyAction::Continue)
}

// ---------------------------------------------------------------------------
// HelpOverlay mode
// ---------------------------------------------------------------------------

/// Any of `?`, `Esc`, or `q` dismisses the overlay; j / k scroll it.
fn handle_help(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            state.help_scroll = state.help_scroll.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.help_scroll = state.help_scroll.saturating_sub(1);
        }
        KeyCode::Char('g') => state.help_scroll = 0,
        KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q') => state.mode = Mode::Normal,
        _ => {}
    }
    KeyAction::Continue
}

// ---------------------------------------------------------------------------
// Insert mode
// ---------------------------------------------------------------------------

/// Edits the pending comment. `Enter` submits, `Esc` discards.
fn handle_insert(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Esc => {
            state.input.clear();
            state.mode = Mode::Normal;
            KeyAction::Continue
        }
        KeyCode::Enter => {
            state.mode = Mode::Normal;
            let text = std::mem::take(&mut state.input);
            match state.selected_block() {
                Some(block_index) if !text.trim().is_empty() => {
                    KeyAction::SubmitComment { block_index, text }
                }
                _ => KeyAction::Continue,
            }
        }
        KeyCode::Backspace => {
            state.input.pop();
            KeyAction::Continue
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            state.input.push(c);
            KeyAction::Continue
        }
        _ => KeyAction::Continue,
    }
}

// ---------------------------------------------------------------------------
// Mouse events
// ---------------------------------------------------------------------------

/// Handles a mouse event: click-to-focus, block indicators, and scroll-wheel.
///
/// A left click on a block row in the document panel selects it and yields a
/// `RequestOpen` for that row, which is how the marker indicator is clicked.
pub fn handle_mouse(mouse: MouseEvent, state: &mut AppState) -> KeyAction {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) if state.mode == Mode::Normal => {
            handle_mouse_click(mouse.column, mouse.row, state)
        }
        MouseEventKind::ScrollUp => {
            if state.mode == Mode::HelpOverlay {
                state.help_scroll = state.help_scroll.saturating_sub(3);
            } else {
                state.move_up(3);
            }
            KeyAction::Continue
        }
        MouseEventKind::ScrollDown => {
            if state.mode == Mode::HelpOverlay {
                state.help_scroll = state.help_scroll.saturating_add(3);
            } else {
                state.move_down(3);
            }
            KeyAction::Continue
        }
        _ => KeyAction::Continue,
    }
}

fn handle_mouse_click(col: u16, row: u16, state: &mut AppState) -> KeyAction {
    let pos = Position { x: col, y: row };
    let [left, center, right] = state.panel_rects;

    if left.contains(pos) {
        state.focus = PanelFocus::Documents;
    } else if center.contains(pos) {
        state.focus = PanelFocus::Document;
        // First inner row sits one below the top border.
        if row > center.y && row < center.y + center.height.saturating_sub(1) {
            let idx = state.block_list_state.offset() + usize::from(row - center.y - 1);
            if idx < state.blocks.len() {
                state.block_list_state.select(Some(idx));
                return KeyAction::RequestOpen(idx.to_string());
            }
        }
    } else if right.contains(pos) {
        state.focus = PanelFocus::Comments;
    }

    KeyAction::Continue
}
