//! Help overlay renderer for specnote.
//!
//! Draws a centred modal over the panel layout. `Clear` erases the background
//! inside the same `terminal.draw()` closure, so no second draw call is needed.

use ratatui::{
    Frame,
    layout::Constraint,
    style::Style,
    text::{Line, Text},
    widgets::{Block, Clear, Paragraph, Wrap},
};

use crate::ui::layout::palette;

/// Renders the help overlay, scrolled by `help_scroll` rows.
///
/// Skipped on terminals narrower than 60 columns.
pub fn render_help_overlay(frame: &mut Frame, help_scroll: u16) {
    if frame.area().width < 60 {
        return;
    }

    let overlay_area = frame
        .area()
        .centered(Constraint::Percentage(70), Constraint::Percentage(80));

    frame.render_widget(Clear, overlay_area);

    let block = Block::bordered()
        .title(" Help  (j/k scroll, ? or Esc to dismiss) ")
        .border_style(Style::default().fg(palette::BORDER_ACTIVE));

    frame.render_widget(
        Paragraph::new(build_help_text())
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((help_scroll, 0)),
        overlay_area,
    );
}

fn build_help_text() -> Text<'static> {
    Text::from(vec![
        Line::from("Navigation"),
        Line::from("  j / k         Move selection down / up"),
        Line::from("  g / G         Jump to top / bottom"),
        Line::from("  Ctrl-d / u    Half page down / up"),
        Line::from("  H / L, Tab    Move panel focus left / right"),
        Line::from(""),
        Line::from("Documents"),
        Line::from("  Enter         Open the selected spec"),
        Line::from(""),
        Line::from("Document"),
        Line::from("  Enter, click  Show the comments on the selected block"),
        Line::from("  c             Comment on the selected block"),
        Line::from("  [N]           Block carries N comments"),
        Line::from(""),
        Line::from("Comments"),
        Line::from("  d             Delete the selected comment"),
        Line::from(""),
        Line::from("Comment input"),
        Line::from("  Enter         Save the comment"),
        Line::from("  Esc           Discard it"),
        Line::from(""),
        Line::from("General"),
        Line::from("  y             Export all comments as agent instructions"),
        Line::from("  ?             Open / close this help overlay"),
        Line::from("  q / Esc       Quit (comments are already saved)"),
    ])
}
