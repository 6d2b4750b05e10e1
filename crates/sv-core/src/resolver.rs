//! Node resolver: selector → live node, with ordered fallback strategies.
//!
//! Resolution never fails loudly: a stale selector after a structural
//! change is an expected outcome and yields `None`. Each strategy is a pure
//! function `(document, selector) → node?`; strategies run in a fixed
//! priority order until one succeeds.

use crate::dom::SvgDocument;
use crate::selector::{MARKER_ATTR, Selector};
use petgraph::graph::NodeIndex;

type Strategy = fn(&SvgDocument, &Selector) -> Option<NodeIndex>;

/// Fixed priority order: structural walk → identity index → marker scan.
const STRATEGIES: &[Strategy] = &[by_tree_walk, by_id_index, by_marker_scan];

/// Resolve a selector against the current tree.
///
/// Pure and referentially consistent: repeated calls with the same selector
/// against the same tree generation return the same node, or consistently
/// `None`.
#[must_use]
pub fn resolve(doc: &SvgDocument, selector: &Selector) -> Option<NodeIndex> {
    STRATEGIES.iter().find_map(|strategy| strategy(doc, selector))
}

/// Convenience: parse a selector string and resolve it. Unknown syntax
/// resolves to `None`.
#[must_use]
pub fn resolve_str(doc: &SvgDocument, selector: &str) -> Option<NodeIndex> {
    let parsed = Selector::parse(selector)?;
    resolve(doc, &parsed)
}

// ─── Strategies ──────────────────────────────────────────────────────────

/// Walk the tree in document order and return the first exact match.
fn by_tree_walk(doc: &SvgDocument, selector: &Selector) -> Option<NodeIndex> {
    doc.descendants(doc.root).into_iter().find(|&idx| {
        let Some(el) = doc.element(idx) else {
            return false;
        };
        match selector {
            Selector::Id(id) => el.dom_id() == Some(id.as_str()),
            Selector::Marker(value) => el.attr(MARKER_ATTR) == Some(value.as_str()),
        }
    })
}

/// Direct identity lookup. Covers documents where the walk missed because
/// the index knows about an id the traversal order hid (duplicate ids).
fn by_id_index(doc: &SvgDocument, selector: &Selector) -> Option<NodeIndex> {
    match selector {
        Selector::Id(id) => doc.get_by_id(id),
        Selector::Marker(_) => None,
    }
}

/// Exhaustive scan over every element carrying the marker attribute.
fn by_marker_scan(doc: &SvgDocument, selector: &Selector) -> Option<NodeIndex> {
    let Selector::Marker(wanted) = selector else {
        return None;
    };
    doc.graph.node_indices().find(|&idx| {
        doc.element(idx)
            .and_then(|el| el.attr(MARKER_ATTR))
            .is_some_and(|v| v == wanted)
    })
}
