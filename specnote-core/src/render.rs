//! Markdown → block conversion.
//!
//! Uses pulldown-cmark to split a spec into its top-level elements. Every
//! element that starts at nesting depth zero becomes one [`Block`]:
//!
//! ```text
//! "# Title\n\nIntro paragraph.\n\n- a\n- b\n"
//!     ↓ pulldown-cmark events (depth-tracked)
//! [Block { Heading(1), "Title" },
//!  Block { Paragraph,  "Intro paragraph." },
//!  Block { List,       "a\nb" }]
//! ```

use std::ops::Range;

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag};

use crate::types::{Block, BlockKind};

/// Renders `source` into its ordered top-level blocks.
///
/// Never fails; whitespace-only input yields an empty vector.
pub fn render_markdown(source: &str) -> Vec<Block> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut blocks = Vec::new();
    let mut depth: usize = 0;
    let mut open: Option<(BlockKind, Range<usize>)> = None;
    let mut text = String::new();

    for (event, range) in Parser::new_ext(source, options).into_offset_iter() {
        match event {
            Event::Start(tag) => {
                if depth == 0 {
                    open = Some((kind_of(&tag), range));
                    text.clear();
                } else {
                    separate(&tag, &mut text);
                }
                depth += 1;
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    if let Some((kind, range)) = open.take() {
                        blocks.push(Block {
                            kind,
                            text: std::mem::take(&mut text),
                            source: slice(source, range),
                        });
                    }
                }
            }
            Event::Rule if depth == 0 => blocks.push(Block {
                kind: BlockKind::Rule,
                text: String::new(),
                source: slice(source, range),
            }),
            Event::Text(t) | Event::Code(t) => text.push_str(&t),
            Event::Html(t) => text.push_str(&strip_tags(&t)),
            Event::SoftBreak | Event::HardBreak => text.push('\n'),
            _ => {}
        }
    }

    blocks
}

fn kind_of(tag: &Tag<'_>) -> BlockKind {
    match tag {
        Tag::Heading { level, .. } => BlockKind::Heading(heading_level_to_u8(*level)),
        Tag::List(_) => BlockKind::List,
        Tag::CodeBlock(_) => BlockKind::CodeBlock,
        Tag::BlockQuote(_) => BlockKind::BlockQuote,
        Tag::Table(_) => BlockKind::Table,
        Tag::HtmlBlock => BlockKind::Html,
        _ => BlockKind::Paragraph,
    }
}

/// Inserts the separator a nested element contributes to its parent's text.
fn separate(tag: &Tag<'_>, text: &mut String) {
    if text.is_empty() {
        return;
    }
    match tag {
        Tag::Item
        | Tag::Paragraph
        | Tag::TableHead
        | Tag::TableRow
        | Tag::CodeBlock(_)
        | Tag::Heading { .. }
        | Tag::List(_) => {
            if !text.ends_with('\n') {
                text.push('\n');
            }
        }
        Tag::TableCell => {
            if !text.ends_with('\n') {
                text.push(' ');
            }
        }
        _ => {}
    }
}

fn slice(source: &str, range: Range<usize>) -> String {
    source.get(range).unwrap_or_default().trim_end().to_owned()
}

fn heading_level_to_u8(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Drops `<...>` tags from raw HTML, keeping the text between them.
fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}
