//! Result-entry resolution tiers.
//!
//! Each tier is a pure function over a [`DomSnapshot`]; [`resolve_result`]
//! tries them in order and returns the first hit.

use serde::Serialize;

use crate::dom::{DomNode, DomSnapshot, NodeRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LocateTier {
    /// A: element text contains the identifier.
    IdentifierMatch,
    /// B: card/list/result-like containers.
    Structural,
    /// C: topmost sizeable block of text.
    Positional,
    /// D: blind pointer click in the result area.
    PointerFallback,
}

impl LocateTier {
    #[must_use]
    pub fn letter(self) -> char {
        match self {
            LocateTier::IdentifierMatch => 'A',
            LocateTier::Structural => 'B',
            LocateTier::Positional => 'C',
            LocateTier::PointerFallback => 'D',
        }
    }
}

impl std::fmt::Display for LocateTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LocateTier::IdentifierMatch => "identifier-match",
            LocateTier::Structural => "structural",
            LocateTier::Positional => "positional",
            LocateTier::PointerFallback => "pointer-fallback",
        };
        write!(f, "{}/{name}", self.letter())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClickTarget {
    Node(NodeRef),
    Point { x: f64, y: f64 },
}

type TierFn = fn(&DomSnapshot, &str) -> Option<ClickTarget>;

const TIERS: [(LocateTier, TierFn); 4] = [
    (LocateTier::IdentifierMatch, identifier_match),
    (LocateTier::Structural, structural_match),
    (LocateTier::Positional, positional_match),
    (LocateTier::PointerFallback, pointer_fallback),
];

/// First tier that yields a target, in A→D order.
#[must_use]
pub fn resolve_result(snapshot: &DomSnapshot, record_id: &str) -> Option<(LocateTier, ClickTarget)> {
    TIERS.iter().find_map(|(tier, resolve)| {
        let target = resolve(snapshot, record_id);
        tracing::debug!(tier = %tier, hit = target.is_some(), "result tier evaluated");
        target.map(|t| (*tier, t))
    })
}

// ---------------------------------------------------------------------------
// Tier A
// ---------------------------------------------------------------------------

const NON_CONTENT_TAGS: [&str; 8] = [
    "html", "head", "body", "title", "script", "style", "noscript", "input",
];

/// Innermost element whose text holds the identifier, promoted to the
/// nearest clickable element at or above it (below `body`).
#[must_use]
pub fn identifier_match(snapshot: &DomSnapshot, record_id: &str) -> Option<ClickTarget> {
    if record_id.is_empty() {
        return None;
    }

    let matched = snapshot.innermost_matching(|n| {
        !NON_CONTENT_TAGS.contains(&n.tag.as_str()) && n.text_contains(record_id)
    })?;
    let node = snapshot.node(matched)?;

    let clickable = std::iter::once((matched, node))
        .chain(snapshot.ancestors(matched))
        .take_while(|(_, n)| !n.is_tag("body") && !n.is_tag("html"))
        .find(|(_, n)| looks_clickable(n))
        .map_or(matched, |(r, _)| r);

    Some(ClickTarget::Node(clickable))
}

fn looks_clickable(node: &DomNode) -> bool {
    node.has_click_handler
        || node.pointer_cursor
        || node.is_tag("a")
        || node.is_tag("button")
        || node.class_contains("card")
        || node.class_contains("item")
}

// ---------------------------------------------------------------------------
// Tier B
// ---------------------------------------------------------------------------

struct StructuralRule {
    tag: Option<&'static str>,
    class_fragment: Option<&'static str>,
    excluded_fragment: Option<&'static str>,
    needs_click_handler: bool,
}

impl StructuralRule {
    const fn class(fragment: &'static str) -> Self {
        Self {
            tag: None,
            class_fragment: Some(fragment),
            excluded_fragment: None,
            needs_click_handler: false,
        }
    }

    const fn class_except_filter(fragment: &'static str) -> Self {
        Self {
            excluded_fragment: Some("filter"),
            ..Self::class(fragment)
        }
    }

    fn matches(&self, node: &DomNode) -> bool {
        self.tag.is_none_or(|t| node.is_tag(t))
            && self.class_fragment.is_none_or(|f| node.class_contains(f))
            && self.excluded_fragment.is_none_or(|f| !node.class_contains(f))
            && (!self.needs_click_handler || node.has_click_handler)
    }
}

const STRUCTURAL_RULES: [StructuralRule; 8] = [
    StructuralRule::class_except_filter("card"),
    StructuralRule::class_except_filter("item"),
    StructuralRule::class_except_filter("list-"),
    StructuralRule::class("result"),
    StructuralRule::class("usaha"),
    StructuralRule::class("kelontong"),
    StructuralRule {
        tag: Some("div"),
        ..StructuralRule::class("border")
    },
    StructuralRule {
        tag: Some("div"),
        class_fragment: None,
        excluded_fragment: None,
        needs_click_handler: true,
    },
];

const STRUCTURAL_MIN_TEXT: usize = 20;

/// First rendered element with substantive text, trying each rule in order.
#[must_use]
pub fn structural_match(snapshot: &DomSnapshot, _record_id: &str) -> Option<ClickTarget> {
    STRUCTURAL_RULES.iter().find_map(|rule| {
        snapshot
            .iter()
            .find(|(_, n)| rule.matches(n) && n.is_rendered() && n.text_len > STRUCTURAL_MIN_TEXT)
            .map(|(r, _)| ClickTarget::Node(r))
    })
}

// ---------------------------------------------------------------------------
// Tier C
// ---------------------------------------------------------------------------

const POSITIONAL_TEXT_RANGE: (usize, usize) = (30, 500);
const SAME_ROW_PX: f64 = 50.0;

/// Scored candidate for the positional tier.
#[derive(Debug, Clone, Copy)]
struct LocatorCandidate {
    node: NodeRef,
    y: f64,
    text_len: usize,
}

/// The longest text among sizeable blocks within one row height of the
/// topmost candidate.
#[must_use]
pub fn positional_match(snapshot: &DomSnapshot, _record_id: &str) -> Option<ClickTarget> {
    let candidates: Vec<LocatorCandidate> = snapshot
        .iter()
        .filter(|(r, n)| {
            (n.is_tag("div") || n.is_tag("li") || n.is_tag("tr"))
                && n.rect.has_area()
                && n.text_len > POSITIONAL_TEXT_RANGE.0
                && n.text_len < POSITIONAL_TEXT_RANGE.1
                && !is_chrome_block(n)
                && !snapshot.within(*r, is_chrome_landmark)
        })
        .map(|(r, n)| LocatorCandidate {
            node: r,
            y: n.rect.y,
            text_len: n.text_len,
        })
        .collect();

    let top = candidates.iter().map(|c| c.y).reduce(f64::min)?;

    let mut best: Option<LocatorCandidate> = None;
    for candidate in candidates.iter().filter(|c| c.y - top < SAME_ROW_PX) {
        let better = best.is_none_or(|b| {
            candidate.text_len > b.text_len || (candidate.text_len == b.text_len && candidate.y < b.y)
        });
        if better {
            best = Some(*candidate);
        }
    }

    best.map(|c| ClickTarget::Node(c.node))
}

/// Class fragments only disqualify the block itself; page-wide wrappers
/// often carry layout classes such as `layout-navbar-fixed`.
fn is_chrome_block(node: &DomNode) -> bool {
    node.class_contains("filter") || node.class_contains("header") || node.class_contains("navbar")
}

fn is_chrome_landmark(node: &DomNode) -> bool {
    node.is_tag("nav") || node.is_tag("header")
}

// ---------------------------------------------------------------------------
// Tier D
// ---------------------------------------------------------------------------

/// Always yields a point at 60% width, 40% height of the viewport.
///
/// Nothing checks what, if anything, sits under that point; a dispatched
/// click counts as a resolved result.
#[must_use]
pub fn pointer_fallback(snapshot: &DomSnapshot, _record_id: &str) -> Option<ClickTarget> {
    Some(ClickTarget::Point {
        x: snapshot.viewport.width * 0.6,
        y: snapshot.viewport.height * 0.4,
    })
}

#[cfg(test)]
#[path = "tiers_test.rs"]
mod tests;
