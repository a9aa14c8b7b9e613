//! Finders for the navigation and search controls on the listing screen.

use crate::dom::{DomNode, DomSnapshot, NodeRef};
use crate::settings::UiVocabulary;

const NON_CONTENT_TAGS: [&str; 7] = ["html", "head", "body", "title", "script", "style", "noscript"];

fn carries_text(node: &DomNode) -> bool {
    !NON_CONTENT_TAGS.contains(&node.tag.as_str())
}

/// Innermost element whose text holds every menu keyword.
#[must_use]
pub fn find_menu_entry(snapshot: &DomSnapshot, vocabulary: &UiVocabulary) -> Option<NodeRef> {
    snapshot.innermost_matching(|n| {
        carries_text(n) && vocabulary.menu_keywords.iter().all(|k| n.text_contains(k))
    })
}

/// Innermost rendered element whose text holds any filter label.
#[must_use]
pub fn find_filter_toggle(snapshot: &DomSnapshot, vocabulary: &UiVocabulary) -> Option<NodeRef> {
    snapshot.innermost_matching(|n| {
        carries_text(n)
            && n.is_rendered()
            && vocabulary.filter_labels.iter().any(|l| n.text_contains(l))
    })
}

/// The identifier search input.
///
/// Among inputs typed `text` or `number`, prefers one whose placeholder or
/// name hints at the identifier; otherwise the first one in layout.
#[must_use]
pub fn find_identifier_input(snapshot: &DomSnapshot, vocabulary: &UiVocabulary) -> Option<NodeRef> {
    let candidates: Vec<(NodeRef, &DomNode)> = snapshot
        .iter()
        .filter(|(_, n)| {
            n.is_tag("input") && matches!(n.input_type.as_deref(), Some("text" | "number"))
        })
        .collect();

    let hinted = candidates.iter().find(|(_, n)| {
        vocabulary
            .id_placeholder_hints
            .iter()
            .any(|h| n.placeholder.contains(h))
            || n.name.to_lowercase().contains(vocabulary.id_name_hint)
    });

    hinted
        .or_else(|| candidates.iter().find(|(_, n)| n.rendered))
        .map(|(r, _)| *r)
}
