//! Group classifier: which nodes distribute edits, which receive them.

use crate::dom::SvgDocument;
use petgraph::graph::NodeIndex;

/// Tags that act as grouping containers when they have children.
/// Definition-like containers (defs, clipPath, mask, …) are deliberately
/// absent; their contents are never edited directly.
pub const GROUP_TAGS: &[&str] = &["g", "svg"];

/// Element kinds that can carry direct fill/stroke/stroke-width
/// presentation.
pub const STYLEABLE_TAGS: &[&str] = &[
    "path", "circle", "rect", "ellipse", "polygon", "polyline", "line", "text",
];

/// A node is a container iff its tag is a grouping kind AND it has at least
/// one element child. An empty `<g>` is a leaf for editing purposes.
#[must_use]
pub fn is_container(doc: &SvgDocument, idx: NodeIndex) -> bool {
    let Some(el) = doc.element(idx) else {
        return false;
    };
    let tag = el.local_name().to_ascii_lowercase();
    GROUP_TAGS.contains(&tag.as_str()) && !doc.element_children(idx).is_empty()
}

/// Whether a single element can be styled directly.
#[must_use]
pub fn is_styleable(doc: &SvgDocument, idx: NodeIndex) -> bool {
    doc.element(idx)
        .map(|el| STYLEABLE_TAGS.contains(&el.local_name().to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Every styleable descendant of `idx`, at any depth, in document order.
/// The node itself is included when it is styleable (a `<text>` inside a
/// group is both a descendant and independently styleable).
#[must_use]
pub fn styleable_descendants(doc: &SvgDocument, idx: NodeIndex) -> Vec<NodeIndex> {
    doc.descendants(idx)
        .into_iter()
        .filter(|&d| is_styleable(doc, d))
        .collect()
}
