//! Flat, document-ordered view of the live page.
//!
//! A [`DomSnapshot`] is captured in one script round-trip (see
//! `cdp::scripts::SNAPSHOT`). Every element is stamped with its index as a
//! `data-gc-ref` attribute so later actions can address it by [`NodeRef`].
//! All locator, validator and login heuristics are pure functions over a
//! snapshot.

use serde::{Deserialize, Serialize};

/// Index of an element within the snapshot that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeRef(pub usize);

impl std::fmt::Display for NodeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub text: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DomNode {
    pub parent: Option<usize>,
    /// Lowercase tag name.
    pub tag: String,
    pub class_name: String,
    pub element_id: String,
    pub name: String,
    pub placeholder: String,
    /// Lowercased `type` attribute; `None` when the attribute is absent.
    pub input_type: Option<String>,
    pub href: String,
    pub value: String,
    /// Trimmed `textContent`, capped at 1024 characters.
    pub text: String,
    /// Length of the full trimmed `textContent`.
    pub text_len: usize,
    pub rect: Rect,
    /// `offsetParent` is non-null, i.e. the element takes part in layout.
    pub rendered: bool,
    pub pointer_cursor: bool,
    pub has_click_handler: bool,
    pub options: Vec<SelectOption>,
}

impl DomNode {
    #[must_use]
    pub fn is_tag(&self, tag: &str) -> bool {
        self.tag == tag
    }

    #[must_use]
    pub fn class_contains(&self, fragment: &str) -> bool {
        self.class_name.contains(fragment)
    }

    #[must_use]
    pub fn text_contains(&self, needle: &str) -> bool {
        self.text.contains(needle)
    }

    /// Non-zero box and part of layout.
    #[must_use]
    pub fn is_rendered(&self) -> bool {
        self.rect.has_area() && self.rendered
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomSnapshot {
    pub url: String,
    pub viewport: Viewport,
    pub nodes: Vec<DomNode>,
}

impl DomSnapshot {
    #[must_use]
    pub fn node(&self, node: NodeRef) -> Option<&DomNode> {
        self.nodes.get(node.0)
    }

    /// Nodes in document order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeRef, &DomNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeRef(i), n))
    }

    /// Ancestors of `node`, nearest first. Does not include `node` itself.
    pub fn ancestors(&self, node: NodeRef) -> impl Iterator<Item = (NodeRef, &DomNode)> {
        let mut current = self.node(node).and_then(|n| n.parent);
        std::iter::from_fn(move || {
            let index = current?;
            let parent = self.nodes.get(index)?;
            current = parent.parent;
            Some((NodeRef(index), parent))
        })
    }

    #[must_use]
    pub fn exists(&self, predicate: impl Fn(&DomNode) -> bool) -> bool {
        self.nodes.iter().any(predicate)
    }

    /// True when `node` or any of its ancestors satisfies `predicate`.
    #[must_use]
    pub fn within(&self, node: NodeRef, predicate: impl Fn(&DomNode) -> bool) -> bool {
        self.node(node).is_some_and(&predicate)
            || self.ancestors(node).any(|(_, n)| predicate(n))
    }

    /// The first matching element, in document order, that has no matching
    /// descendant.
    ///
    /// Text predicates match every ancestor of the element that actually
    /// holds the text; this picks the element itself rather than `<html>`.
    #[must_use]
    pub fn innermost_matching(&self, predicate: impl Fn(&DomNode) -> bool) -> Option<NodeRef> {
        let matches: Vec<bool> = self.nodes.iter().map(&predicate).collect();
        let mut has_matching_descendant = vec![false; self.nodes.len()];

        for (index, matched) in matches.iter().enumerate() {
            if !matched {
                continue;
            }
            for (ancestor, _) in self.ancestors(NodeRef(index)) {
                if has_matching_descendant[ancestor.0] {
                    break;
                }
                has_matching_descendant[ancestor.0] = true;
            }
        }

        matches
            .iter()
            .zip(&has_matching_descendant)
            .position(|(matched, shadowed)| *matched && !shadowed)
            .map(NodeRef)
    }
}
