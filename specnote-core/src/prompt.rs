//! Export of a comment collection as instructions for an external editing
//! agent.
//!
//! Comments are grouped by anchored block index; groups are emitted in
//! ascending index order and comments keep their insertion order inside a
//! group. Formatting has no side effects: delivering the text and purging the
//! store are separate steps owned by the lifecycle coordinator.

use std::collections::BTreeMap;

use crate::kv::KvStore;
use crate::store::AnnotationStore;
use crate::types::Comment;

struct Group<'a> {
    preview: &'a str,
    items: Vec<&'a str>,
}

/// Renders `comments` on `document_id` as agent instructions.
///
/// Returns an empty string when `comments` is empty.
pub fn format_comments(document_id: &str, comments: &[Comment]) -> String {
    if comments.is_empty() {
        return String::new();
    }

    let mut groups: BTreeMap<usize, Group<'_>> = BTreeMap::new();
    for c in comments {
        groups
            .entry(c.block_index)
            .or_insert_with(|| Group {
                preview: &c.block_text_preview,
                items: Vec::new(),
            })
            .items
            .push(&c.text);
    }

    let mut lines = vec![
        "You are reviewing a technical specification document.".to_owned(),
        format!("Apply each requested change to the specification file: {document_id}"),
        "Preserve the existing markdown formatting and style.".to_owned(),
        "Only modify the sections mentioned. Do not change anything else.".to_owned(),
        String::new(),
        "---".to_owned(),
    ];

    for group in groups.values() {
        lines.push(String::new());
        lines.push(format!("### Section starting with: \"{}\"", group.preview));
        lines.extend(group.items.iter().map(|text| format!("- {text}")));
    }

    lines.join("\n")
}

/// Reads the stored collection of `document_id` and formats it.
pub async fn format_for_external_agent<K: KvStore>(
    store: &AnnotationStore<K>,
    document_id: &str,
) -> String {
    format_comments(document_id, &store.load(document_id).await)
}
