//! Three-panel layout engine for specnote.
//!
//! Pure layout arithmetic plus the shared panel chrome. Called inside
//! `terminal.draw()` on every render, so every frame gets a fresh layout that
//! reflects the current terminal size.
//!
//! `Spacing::Overlap(1)` combined with `Block::merge_borders(MergeStrategy::Fuzzy)`
//! makes adjacent panel borders share a single column.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Margin, Rect, Spacing},
    style::{Color, Modifier, Style},
    symbols::merge::MergeStrategy,
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph},
};

use crate::app::{AppState, Mode};

/// Fixed colour palette. ANSI 16 colours only, so it renders on any terminal.
pub mod palette {
    use ratatui::style::Color;

    pub const BORDER_ACTIVE: Color = Color::Cyan;
    pub const BORDER_INACTIVE: Color = Color::DarkGray;
    pub const SELECTED: Color = Color::Cyan;
    pub const MARKER: Color = Color::Yellow;
    pub const DIM: Color = Color::DarkGray;
    pub const HEADING: Color = Color::Magenta;
    pub const BADGE: Color = Color::Yellow;
    pub const STATUS_BG: Color = Color::Black;
    pub const STATUS_FG: Color = Color::White;
    pub const MODE_NORMAL: Color = Color::Green;
    pub const MODE_INSERT: Color = Color::Yellow;
}

/// Returns `[documents, document, comments, status_bar]` rects for the frame.
///
/// Below 100 columns the catalog panel collapses to zero width and the
/// document fills its share.
pub fn compute_layout(frame: &Frame) -> [Rect; 4] {
    let term_width = frame.area().width;

    let [main_area, status_bar] =
        frame.area().layout(&Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]));

    let widths = if term_width >= 100 {
        [
            Constraint::Percentage(22),
            Constraint::Percentage(48),
            Constraint::Percentage(30),
        ]
    } else {
        [
            Constraint::Length(0),
            Constraint::Percentage(60),
            Constraint::Percentage(40),
        ]
    };
    let horizontal = Layout::horizontal(widths).spacing(Spacing::Overlap(1));

    let [left, center, right] = main_area.layout(&horizontal);
    [left, center, right, status_bar]
}

/// The inner `Rect` of a panel after removing the 1-cell border.
pub fn inner_rect(area: Rect) -> Rect {
    area.inner(Margin { vertical: 1, horizontal: 1 })
}

/// Builds a bordered `Block` for a panel; thick border when focused.
pub fn panel_block<'a>(title: impl Into<Line<'a>>, is_focused: bool) -> Block<'a> {
    let (border_type, colour) = if is_focused {
        (BorderType::Thick, palette::BORDER_ACTIVE)
    } else {
        (BorderType::Plain, palette::BORDER_INACTIVE)
    };

    Block::bordered()
        .title(title)
        .border_type(border_type)
        .border_style(Style::default().fg(colour))
        .merge_borders(MergeStrategy::Fuzzy)
}

/// Renders the 1-row status bar.
///
/// Insert mode shows the comment being typed with a trailing cursor glyph;
/// otherwise the last status message (if any) follows the mode indicator.
pub fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState) {
    let (mode_text, mode_fg) = match state.mode {
        Mode::Insert => (" INSERT ", palette::MODE_INSERT),
        Mode::Normal | Mode::HelpOverlay => (" NORMAL ", palette::MODE_NORMAL),
    };

    let mut spans = vec![Span::styled(
        mode_text,
        Style::default().fg(mode_fg).add_modifier(Modifier::BOLD),
    )];

    match state.mode {
        Mode::Insert => {
            spans.push(Span::raw(" comment> "));
            spans.push(Span::raw(state.input.as_str()));
            spans.push(Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)));
        }
        _ => {
            if let Some(doc) = &state.open_document {
                spans.push(Span::styled(format!(" {doc} "), Style::default().fg(Color::Gray)));
            }
            if let Some(msg) = &state.status {
                spans.push(Span::raw(format!("│ {msg}")));
            } else {
                spans.push(Span::styled("│ ? help", Style::default().fg(palette::DIM)));
            }
        }
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans))
            .style(Style::default().bg(palette::STATUS_BG).fg(palette::STATUS_FG)),
        area,
    );
}
