//! Metadata tree builder: the serializable hierarchy the tree view renders.
//!
//! Built fresh from the live document on every committed edit. Nodes carry
//! a durable selector (stamped during the build, so even anonymous elements
//! are addressable afterwards) plus a logical id that is only stable within
//! one build unless the element has a native id.

use crate::dom::{Element, SvgDocument};
use crate::id::NodeId;
use crate::selector;
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};

/// Element kinds excluded from the tree: definition, metadata, and effect
/// containers that are not relevant for visual editing.
pub const TREE_DENYLIST: &[&str] = &[
    "defs",
    "metadata",
    "title",
    "desc",
    "clipPath",
    "mask",
    "pattern",
    "marker",
    "symbol",
    "filter",
    "feGaussianBlur",
    "feOffset",
    "feFlood",
    "feComposite",
    "feMorphology",
    "feColorMatrix",
    "style",
    "script",
];

/// One entry in the metadata tree, decoupled from the live document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeNode {
    pub tag_name: String,
    pub dom_id: Option<String>,
    /// First class token only, for display.
    pub class_name: Option<String>,
    /// Human-readable override from tool-specific naming attributes.
    pub display_name: Option<String>,
    pub children: Vec<TreeNode>,
    /// View fold state, not document state.
    pub is_expanded: bool,
    /// Derived identity, stable across rebuilds only with a native id.
    pub logical_id: NodeId,
    /// Durable locator string (`#id` or `[data-sv-id="…"]`).
    pub selector: String,
}

/// Whether an element belongs in the tree.
fn should_include(el: &Element) -> bool {
    if el.has_prefix() {
        return false;
    }
    !TREE_DENYLIST
        .iter()
        .any(|denied| denied.eq_ignore_ascii_case(&el.tag))
}

/// Display-name fallback precedence: tool name attribute → tool label →
/// generic `name` → accessibility label.
fn display_name(el: &Element) -> Option<String> {
    ["inkscape:name", "inkscape:label", "name", "aria-label"]
        .into_iter()
        .find_map(|attr| el.attr(attr))
        .map(str::to_string)
}

/// Build the metadata tree for the document. The `<svg>` root itself is not
/// an entry; its retained children are the tree roots.
///
/// Takes the document mutably because anonymous elements are stamped with
/// markers while their selectors are generated.
#[must_use]
pub fn build_tree(doc: &mut SvgDocument) -> Vec<TreeNode> {
    let root = doc.root;
    let mut nodes = Vec::new();
    for (index, child) in included_children(doc, root).into_iter().enumerate() {
        if let Some(node) = build_node(doc, child, "root", index) {
            nodes.push(node);
        }
    }
    nodes
}

fn included_children(doc: &SvgDocument, idx: NodeIndex) -> Vec<NodeIndex> {
    doc.element_children(idx)
        .into_iter()
        .filter(|&c| doc.element(c).is_some_and(should_include))
        .collect()
}

fn build_node(doc: &mut SvgDocument, idx: NodeIndex, path: &str, index: usize) -> Option<TreeNode> {
    let current_path = format!("{path}-{index}");

    let mut children = Vec::new();
    for (child_index, child) in included_children(doc, idx).into_iter().enumerate() {
        if let Some(node) = build_node(doc, child, &current_path, child_index) {
            children.push(node);
        }
    }

    let sel = selector::generate(doc, idx)?.to_string();

    let el = doc.element(idx)?;
    let tag_name = el.tag.to_ascii_lowercase();
    let dom_id = el.dom_id().map(str::to_string);
    let class_name = el
        .attr("class")
        .and_then(|c| c.split_whitespace().next())
        .map(str::to_string);
    let logical_id = match &dom_id {
        Some(id) => NodeId::from_dom_id(id),
        None => NodeId::from_path(&current_path, &tag_name),
    };

    Some(TreeNode {
        tag_name,
        dom_id,
        class_name,
        display_name: display_name(el),
        children,
        is_expanded: true,
        logical_id,
        selector: sel,
    })
}

/// Flip the fold state of the node with the given logical id.
/// Returns true when a node was found and toggled.
pub fn toggle_expanded(nodes: &mut [TreeNode], logical_id: NodeId) -> bool {
    for node in nodes {
        if node.logical_id == logical_id {
            node.is_expanded = !node.is_expanded;
            return true;
        }
        if toggle_expanded(&mut node.children, logical_id) {
            return true;
        }
    }
    false
}
