//! Live document model for SVG sources.
//!
//! The document is a tree of XML nodes stored in a `StableDiGraph` where
//! edges represent parent→child containment. Unlike the adjacency list,
//! which petgraph iterates in an unspecified order, document order is kept
//! explicitly per parent in `child_order`: serialization, styleable-
//! descendant collection, and tree display all depend on it.
//!
//! The tree is persistent: edits mutate it in place and the text form is
//! re-emitted afterwards. There is no parse-mutate-serialize-reparse cycle,
//! so identity stamped onto an element survives every subsequent edit.

use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use smallvec::SmallVec;
use std::collections::HashMap;

// ─── Attributes & Elements ───────────────────────────────────────────────

/// A single attribute. Source order is preserved through parse and emit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    pub name: String,
    pub value: String,
}

/// Element payload: tag name as written in the source plus ordered attributes.
#[derive(Debug, Clone)]
pub struct Element {
    /// Tag name, possibly namespace-prefixed (`sodipodi:namedview`).
    pub tag: String,
    pub attrs: SmallVec<[Attr; 8]>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: SmallVec::new(),
        }
    }

    /// Local part of the tag name (after any `prefix:`).
    pub fn local_name(&self) -> &str {
        match self.tag.split_once(':') {
            Some((_, local)) => local,
            None => &self.tag,
        }
    }

    /// Whether the tag carries a namespace prefix.
    pub fn has_prefix(&self) -> bool {
        self.tag.contains(':')
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Set an attribute, replacing any existing value in place so the
    /// attribute keeps its original position in the tag.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|a| a.name == name) {
            Some(attr) => attr.value = value,
            None => self.attrs.push(Attr {
                name: name.to_string(),
                value,
            }),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let pos = self.attrs.iter().position(|a| a.name == name)?;
        Some(self.attrs.remove(pos).value)
    }

    /// The native identity attribute, if present.
    pub fn dom_id(&self) -> Option<&str> {
        self.attr("id")
    }
}

// ─── Nodes ───────────────────────────────────────────────────────────────

/// The node kinds in the document tree.
#[derive(Debug, Clone)]
pub enum XmlNode {
    Element(Element),
    /// Character data with entities already decoded.
    Text(String),
    Comment(String),
    CData(String),
}

impl XmlNode {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            XmlNode::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            XmlNode::Element(el) => Some(el),
            _ => None,
        }
    }
}

// ─── Document ────────────────────────────────────────────────────────────

/// The complete parsed SVG document.
///
/// `id_index` maps native `id` attribute values to node indices for O(1)
/// identity lookup. On duplicate ids the first occurrence in document order
/// wins, matching `getElementById` behavior.
#[derive(Debug, Clone)]
pub struct SvgDocument {
    pub graph: StableDiGraph<XmlNode, ()>,

    /// The root `<svg>` element.
    pub root: NodeIndex,

    /// Native id attribute value → node index.
    pub id_index: HashMap<String, NodeIndex>,

    /// Document order of each parent's children.
    child_order: HashMap<NodeIndex, Vec<NodeIndex>>,

    /// XML declaration line (`<?xml …?>`), verbatim, if the source had one.
    pub declaration: Option<String>,

    /// DOCTYPE line, verbatim, if the source had one.
    pub doctype: Option<String>,
}

impl SvgDocument {
    /// Create a document with the given root element and nothing else.
    #[must_use]
    pub fn new(root_element: Element) -> Self {
        let mut graph = StableDiGraph::new();
        let dom_id = root_element.dom_id().map(str::to_string);
        let root = graph.add_node(XmlNode::Element(root_element));

        let mut id_index = HashMap::new();
        if let Some(id) = dom_id {
            id_index.insert(id, root);
        }

        Self {
            graph,
            root,
            id_index,
            child_order: HashMap::new(),
            declaration: None,
            doctype: None,
        }
    }

    /// Append a node as the last child of `parent`. Returns the new index.
    pub fn add_child(&mut self, parent: NodeIndex, node: XmlNode) -> NodeIndex {
        let dom_id = node
            .as_element()
            .and_then(Element::dom_id)
            .map(str::to_string);
        let idx = self.graph.add_node(node);
        self.graph.add_edge(parent, idx, ());
        self.child_order.entry(parent).or_default().push(idx);
        if let Some(id) = dom_id {
            self.id_index.entry(id).or_insert(idx);
        }
        idx
    }

    /// Insert a node as the FIRST child of `parent` (used to place `defs`
    /// at the top of the document).
    pub fn insert_first_child(&mut self, parent: NodeIndex, node: XmlNode) -> NodeIndex {
        let dom_id = node
            .as_element()
            .and_then(Element::dom_id)
            .map(str::to_string);
        let idx = self.graph.add_node(node);
        self.graph.add_edge(parent, idx, ());
        self.child_order.entry(parent).or_default().insert(0, idx);
        if let Some(id) = dom_id {
            self.id_index.entry(id).or_insert(idx);
        }
        idx
    }

    /// Remove a node and its whole subtree, keeping `id_index` and
    /// `child_order` synchronized.
    pub fn remove_subtree(&mut self, idx: NodeIndex) {
        let doomed = self.descendants(idx);
        if let Some(parent) = self.parent(idx)
            && let Some(order) = self.child_order.get_mut(&parent)
        {
            order.retain(|&c| c != idx);
        }
        for node_idx in doomed {
            if let Some(XmlNode::Element(el)) = self.graph.remove_node(node_idx)
                && let Some(id) = el.dom_id()
                && self.id_index.get(id) == Some(&node_idx)
            {
                self.id_index.remove(id);
            }
            self.child_order.remove(&node_idx);
        }
    }

    /// Get the parent index of a node.
    pub fn parent(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .neighbors_directed(idx, petgraph::Direction::Incoming)
            .next()
    }

    /// Children of a node in document order.
    pub fn children(&self, idx: NodeIndex) -> &[NodeIndex] {
        self.child_order.get(&idx).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Element children only, in document order.
    pub fn element_children(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.children(idx)
            .iter()
            .copied()
            .filter(|&c| self.graph[c].as_element().is_some())
            .collect()
    }

    /// The node itself plus every descendant, pre-order, document order.
    pub fn descendants(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut out = Vec::new();
        self.collect_descendants(idx, &mut out);
        out
    }

    fn collect_descendants(&self, idx: NodeIndex, out: &mut Vec<NodeIndex>) {
        out.push(idx);
        for &child in self.children(idx) {
            self.collect_descendants(child, out);
        }
    }

    /// Borrow the element at `idx`, if the node is one.
    pub fn element(&self, idx: NodeIndex) -> Option<&Element> {
        self.graph.node_weight(idx).and_then(XmlNode::as_element)
    }

    pub fn element_mut(&mut self, idx: NodeIndex) -> Option<&mut Element> {
        self.graph
            .node_weight_mut(idx)
            .and_then(XmlNode::as_element_mut)
    }

    /// Set an attribute on the element at `idx`, keeping `id_index` in sync
    /// when the identity attribute itself changes.
    pub fn set_attr(&mut self, idx: NodeIndex, name: &str, value: impl Into<String>) {
        let value = value.into();
        let old_id = if name == "id" {
            self.element(idx).and_then(Element::dom_id).map(str::to_string)
        } else {
            None
        };
        let Some(el) = self.element_mut(idx) else {
            return;
        };
        el.set_attr(name, value.clone());
        if name == "id" {
            if let Some(old) = old_id
                && self.id_index.get(&old) == Some(&idx)
            {
                self.id_index.remove(&old);
            }
            self.id_index.entry(value).or_insert(idx);
        }
    }

    /// Look up a node by its native `id` attribute value.
    pub fn get_by_id(&self, id: &str) -> Option<NodeIndex> {
        self.id_index.get(id).copied()
    }

    /// Rebuild the `id_index` from scratch (first occurrence wins).
    pub fn rebuild_index(&mut self) {
        self.id_index.clear();
        for idx in self.descendants(self.root) {
            if let Some(id) = self.element(idx).and_then(Element::dom_id) {
                let id = id.to_string();
                self.id_index.entry(id).or_insert(idx);
            }
        }
    }
}
